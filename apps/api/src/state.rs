use std::sync::Arc;

use crate::extract::pdf::PdfTextExtractor;
use crate::extract::web::WebPageExtractor;
use crate::llm_client::CompletionService;
use crate::tailoring::agent::ResumeTailor;

/// Shared application state injected into all route handlers via Axum extractors.
/// Read-only; nothing here is per-request.
#[derive(Clone)]
pub struct AppState {
    /// Completion service seam. Production: `LlmClient`.
    pub llm: Arc<dyn CompletionService>,
    pub pdf: PdfTextExtractor,
    pub web: WebPageExtractor,
    pub tailor: ResumeTailor,
}
