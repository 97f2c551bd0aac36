//! Axum route handler for the tailoring API.

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};
use bytes::Bytes;
use tracing::{debug, info, warn};

use crate::agent::run_agent;
use crate::errors::AppError;
use crate::state::AppState;
use crate::tailoring::agent::{TailorArgs, TailoringOutcome};

const RESUME_FIELD: &str = "resume";
const JOB_URL_FIELD: &str = "job_description";

#[derive(Debug, Default)]
struct TailorForm {
    resume: Option<ResumeUpload>,
    job_url: Option<String>,
}

#[derive(Debug)]
struct ResumeUpload {
    file_name: String,
    bytes: Bytes,
}

/// POST /tailor-resume
///
/// Multipart form: `resume` (PDF file) and `job_description` (job-posting URL).
/// Runs PDF parse → web fetch → LLM call, strictly in that order.
pub async fn handle_tailor_resume(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<TailoringOutcome>, AppError> {
    let multipart =
        multipart.map_err(|e| AppError::Validation(format!("Expected a multipart form: {e}")))?;
    let form = read_form(multipart).await?;

    let upload = form
        .resume
        .ok_or_else(|| AppError::Validation("No resume file provided".to_string()))?;
    let job_url = form
        .job_url
        .ok_or_else(|| AppError::Validation("No job description URL provided".to_string()))?;

    if upload.file_name.is_empty() {
        return Err(AppError::Validation("No selected file".to_string()));
    }
    if !upload.file_name.to_lowercase().ends_with(".pdf") {
        return Err(AppError::Validation("File must be a PDF".to_string()));
    }

    info!(
        "Tailoring {} ({} bytes) against {job_url}",
        upload.file_name,
        upload.bytes.len()
    );

    let resume_text = state.pdf.extract(upload.bytes).await.map_err(|e| {
        warn!("PDF extraction failed for {}: {e}", upload.file_name);
        AppError::Validation("Could not extract text from PDF".to_string())
    })?;

    let job_description = state.web.extract(&job_url).await.map_err(|e| {
        warn!("Job description extraction failed for {job_url}: {e}");
        AppError::Validation("Could not fetch job description from URL".to_string())
    })?;
    debug!(
        "Extracted job description: {}...",
        job_description.as_str().chars().take(200).collect::<String>()
    );

    let args = TailorArgs {
        resume_text: resume_text.into_string(),
        job_description: job_description.into_string(),
    };
    let outcome = run_agent(&state.tailor, state.llm.as_ref(), &args).await?;

    Ok(Json(outcome))
}

async fn read_form(mut multipart: Multipart) -> Result<TailorForm, AppError> {
    let mut form = TailorForm::default();

    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            RESUME_FIELD => {
                // A part without a `filename` is a plain form value, not an upload.
                let Some(file_name) = field.file_name().map(|name| name.trim().to_string()) else {
                    debug!("Ignoring '{RESUME_FIELD}' field sent without a file name");
                    continue;
                };
                let bytes = field.bytes().await.map_err(malformed)?;
                form.resume = Some(ResumeUpload { file_name, bytes });
            }
            JOB_URL_FIELD => {
                let url = field.text().await.map_err(malformed)?;
                let url = url.trim();
                if !url.is_empty() {
                    form.job_url = Some(url.to_string());
                }
            }
            other => debug!("Ignoring unexpected form field '{other}'"),
        }
    }

    Ok(form)
}

fn malformed(error: axum::extract::multipart::MultipartError) -> AppError {
    AppError::Validation(format!("Malformed multipart body: {error}"))
}
