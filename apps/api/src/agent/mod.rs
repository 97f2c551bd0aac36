//! Agent Contract — the fixed run sequence shared by every single-shot LLM task.
//!
//! Flow: `user_prompt` → `system_prompt` → completion call → `process_response`.
//!
//! A task only supplies the fill-in points on [`Agent`]; [`run_agent`] owns the
//! orchestration. Completion-service failures are translated into [`AgentError`]
//! right at the call site, so no `LlmError` ever leaves this module.

use thiserror::Error;
use tracing::{debug, error, info};

use crate::llm_client::{Completion, CompletionRequest, CompletionService, LlmError, SamplingParams};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AgentError {
    /// Credential missing when the client was built; the agent cannot run at all.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid completion service API key. Please check your configuration.")]
    Authentication,

    #[error("Completion service rate limit exceeded. Please try again later.")]
    RateLimited,

    /// Caller-input problem: blank résumé, blank job description, empty completion.
    #[error("{0}")]
    Validation(String),

    #[error("Error in LLM operation: {0}")]
    Service(String),
}

impl From<LlmError> for AgentError {
    fn from(error: LlmError) -> Self {
        match error {
            LlmError::Configuration(message) => AgentError::Configuration(message),
            LlmError::Unauthorized { .. } => AgentError::Authentication,
            LlmError::RateLimited(_) => AgentError::RateLimited,
            other => AgentError::Service(other.to_string()),
        }
    }
}

/// System and user prompt for one completion call. Both are non-blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptPair {
    system: String,
    user: String,
}

impl PromptPair {
    pub fn new(system: String, user: String) -> Result<Self, AgentError> {
        if system.trim().is_empty() {
            return Err(AgentError::Validation("System prompt is empty".to_string()));
        }
        if user.trim().is_empty() {
            return Err(AgentError::Validation("User prompt is empty".to_string()));
        }
        Ok(Self { system, user })
    }

    pub fn system(&self) -> &str {
        &self.system
    }

    pub fn user(&self) -> &str {
        &self.user
    }
}

/// A single-shot text transformation backed by the completion service.
///
/// Implementations are stateless; one value can serve any number of runs.
pub trait Agent: Send + Sync {
    type Args: Send + Sync;
    type Output;

    /// Short label used in logs.
    fn name(&self) -> &'static str;

    fn system_prompt(&self) -> String;

    /// Builds the task content. Precondition violations fail here, before any
    /// network call.
    fn user_prompt(&self, args: &Self::Args) -> Result<String, AgentError>;

    fn sampling(&self) -> SamplingParams {
        SamplingParams::default()
    }

    fn process_response(
        &self,
        completion: &Completion,
        args: &Self::Args,
    ) -> Result<Self::Output, AgentError>;
}

/// Runs `agent` once against `llm`. All-or-nothing: either the processed output
/// or exactly one `AgentError`.
pub async fn run_agent<A: Agent>(
    agent: &A,
    llm: &dyn CompletionService,
    args: &A::Args,
) -> Result<A::Output, AgentError> {
    let user = agent.user_prompt(args)?;
    let prompts = PromptPair::new(agent.system_prompt(), user)?;
    debug!(
        "{}: built prompts (system {} chars, user {} chars)",
        agent.name(),
        prompts.system().len(),
        prompts.user().len()
    );

    let request = CompletionRequest {
        system: prompts.system(),
        user: prompts.user(),
        sampling: agent.sampling(),
    };
    let completion = llm.complete(request).await.map_err(|e| {
        error!("{}: completion failed: {e}", agent.name());
        AgentError::from(e)
    })?;
    debug!("{}: received completion", agent.name());

    let output = agent.process_response(&completion, args)?;
    info!("{}: completed", agent.name());
    Ok(output)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::test_support::StubCompletion;

    /// Upper-cases its input through the model.
    struct Shout;

    impl Agent for Shout {
        type Args = String;
        type Output = String;

        fn name(&self) -> &'static str {
            "shout"
        }

        fn system_prompt(&self) -> String {
            "Repeat the text in upper case.".to_string()
        }

        fn user_prompt(&self, args: &String) -> Result<String, AgentError> {
            if args.trim().is_empty() {
                return Err(AgentError::Validation("nothing to shout".to_string()));
            }
            Ok(args.clone())
        }

        fn sampling(&self) -> SamplingParams {
            SamplingParams {
                temperature: 0.0,
                ..SamplingParams::default()
            }
        }

        fn process_response(&self, completion: &Completion, _args: &String) -> Result<String, AgentError> {
            completion
                .text()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(String::from)
                .ok_or_else(|| AgentError::Validation("empty completion".to_string()))
        }
    }

    /// Keeps the trait defaults.
    struct Plain;

    impl Agent for Plain {
        type Args = ();
        type Output = ();

        fn name(&self) -> &'static str {
            "plain"
        }

        fn system_prompt(&self) -> String {
            "system".to_string()
        }

        fn user_prompt(&self, _args: &()) -> Result<String, AgentError> {
            Ok("user".to_string())
        }

        fn process_response(&self, _completion: &Completion, _args: &()) -> Result<(), AgentError> {
            Ok(())
        }
    }

    #[test]
    fn test_prompt_pair_rejects_blank_parts() {
        assert!(PromptPair::new(" ".to_string(), "user".to_string()).is_err());
        assert!(PromptPair::new("system".to_string(), "\n".to_string()).is_err());
        let pair = PromptPair::new("system".to_string(), "user".to_string()).unwrap();
        assert_eq!(pair.system(), "system");
        assert_eq!(pair.user(), "user");
    }

    #[test]
    fn test_llm_errors_map_to_agent_errors() {
        assert_eq!(
            AgentError::from(LlmError::Unauthorized {
                status: 401,
                message: "bad key".to_string()
            }),
            AgentError::Authentication
        );
        assert_eq!(
            AgentError::from(LlmError::RateLimited("slow down".to_string())),
            AgentError::RateLimited
        );
        assert_eq!(
            AgentError::from(LlmError::Configuration("no key".to_string())),
            AgentError::Configuration("no key".to_string())
        );
        assert!(matches!(
            AgentError::from(LlmError::Timeout(Duration::from_secs(120))),
            AgentError::Service(_)
        ));
        assert!(matches!(
            AgentError::from(LlmError::Api {
                status: 500,
                message: "boom".to_string()
            }),
            AgentError::Service(_)
        ));
    }

    #[tokio::test]
    async fn test_run_agent_sends_system_then_user_prompt() {
        let llm = StubCompletion::replying("  HELLO  ");
        let output = run_agent(&Shout, &llm, &"hello".to_string()).await.unwrap();

        assert_eq!(output, "HELLO");
        let calls = llm.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].system, "Repeat the text in upper case.");
        assert_eq!(calls[0].user, "hello");
        assert_eq!(calls[0].sampling.temperature, 0.0);
    }

    #[tokio::test]
    async fn test_run_agent_uses_default_sampling() {
        let llm = StubCompletion::replying("ok");
        run_agent(&Plain, &llm, &()).await.unwrap();
        assert_eq!(llm.calls()[0].sampling, SamplingParams::default());
    }

    #[tokio::test]
    async fn test_run_agent_validates_before_calling_service() {
        let llm = StubCompletion::replying("unused");
        let err = run_agent(&Shout, &llm, &"   ".to_string()).await.unwrap_err();

        assert_eq!(err, AgentError::Validation("nothing to shout".to_string()));
        assert!(llm.calls().is_empty());
    }

    #[tokio::test]
    async fn test_run_agent_maps_service_failures() {
        let llm = StubCompletion::failing(|| LlmError::Unauthorized {
            status: 401,
            message: "Incorrect API key".to_string(),
        });
        let err = run_agent(&Shout, &llm, &"hi".to_string()).await.unwrap_err();
        assert_eq!(err, AgentError::Authentication);

        let llm = StubCompletion::failing(|| LlmError::RateLimited("quota".to_string()));
        let err = run_agent(&Shout, &llm, &"hi".to_string()).await.unwrap_err();
        assert_eq!(err, AgentError::RateLimited);

        let llm = StubCompletion::failing(|| LlmError::Timeout(Duration::from_secs(120)));
        let err = run_agent(&Shout, &llm, &"hi".to_string()).await.unwrap_err();
        assert!(matches!(err, AgentError::Service(ref m) if m.contains("timed out")));
    }

    #[tokio::test]
    async fn test_run_agent_surfaces_processing_failure() {
        let llm = StubCompletion::replying("   ");
        let err = run_agent(&Shout, &llm, &"hi".to_string()).await.unwrap_err();
        assert_eq!(err, AgentError::Validation("empty completion".to_string()));
    }
}
