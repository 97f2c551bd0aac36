//! Résumé Tailoring Task — rewrites a résumé against a job description.

use serde::Serialize;

use crate::agent::{Agent, AgentError};
use crate::extract::ExtractedText;
use crate::llm_client::Completion;
use crate::tailoring::prompts::{resume_tailor_user_prompt, RESUME_TAILOR_SYSTEM};

#[derive(Debug, Clone)]
pub struct TailorArgs {
    pub resume_text: String,
    pub job_description: String,
}

/// The only value returned across the HTTP boundary on success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TailoringOutcome {
    pub original_text: ExtractedText,
    pub enhanced_text: ExtractedText,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ResumeTailor;

impl Agent for ResumeTailor {
    type Args = TailorArgs;
    type Output = TailoringOutcome;

    fn name(&self) -> &'static str {
        "resume_tailor"
    }

    fn system_prompt(&self) -> String {
        RESUME_TAILOR_SYSTEM.to_string()
    }

    fn user_prompt(&self, args: &TailorArgs) -> Result<String, AgentError> {
        if args.resume_text.trim().is_empty() {
            return Err(AgentError::Validation(
                "Empty resume text provided".to_string(),
            ));
        }
        if args.job_description.trim().is_empty() {
            return Err(AgentError::Validation(
                "Empty job description provided".to_string(),
            ));
        }
        Ok(resume_tailor_user_prompt(
            &args.resume_text,
            &args.job_description,
        ))
    }

    fn process_response(
        &self,
        completion: &Completion,
        args: &TailorArgs,
    ) -> Result<TailoringOutcome, AgentError> {
        let enhanced_text = completion
            .text()
            .and_then(|text| ExtractedText::new(text.trim()))
            .ok_or_else(|| {
                AgentError::Validation("Empty response from completion service".to_string())
            })?;
        let original_text = ExtractedText::new(args.resume_text.as_str()).ok_or_else(|| {
            AgentError::Validation("Empty resume text provided".to_string())
        })?;

        Ok(TailoringOutcome {
            original_text,
            enhanced_text,
        })
    }
}
