//! Shared fixtures for unit tests: local HTTP servers, generated PDFs, and a
//! scripted completion service.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;

use crate::extract::pdf::PdfTextExtractor;
use crate::extract::web::WebPageExtractor;
use crate::llm_client::{Completion, CompletionRequest, CompletionService, LlmError, SamplingParams};
use crate::state::AppState;
use crate::tailoring::agent::ResumeTailor;

pub const JOB_PAGE_HTML: &str = "<html><body><h1>Backend Engineer</h1>\
    <p>Requires Go and Kubernetes.</p></body></html>";

/// Serves `router` on an ephemeral loopback port and returns its base URL.
pub async fn spawn_server(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("test listener address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("test server");
    });
    format!("http://{addr}")
}

/// A one-page PDF that draws each line in Helvetica, top to bottom.
/// An empty slice yields a page with no glyphs.
pub fn minimal_pdf(lines: &[&str]) -> Vec<u8> {
    multi_page_pdf(&[lines])
}

/// One page per entry, each drawn like `minimal_pdf`.
pub fn multi_page_pdf(pages: &[&[&str]]) -> Vec<u8> {
    let contents: Vec<String> = pages.iter().map(|lines| line_content(lines)).collect();
    pdf_from_contents(&contents)
}

/// A one-page PDF whose content stream is `content`, with Helvetica as `/F1`.
pub fn single_page_pdf(content: &str) -> Vec<u8> {
    pdf_from_contents(&[content.to_string()])
}

fn line_content(lines: &[&str]) -> String {
    let mut content = String::from("BT\n/F1 12 Tf\n16 TL\n72 720 Td");
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            content.push_str("\nT*");
        }
        content.push_str(&format!("\n({}) Tj", escape_pdf_string(line)));
    }
    content.push_str("\nET");
    content
}

/// Objects: 1 catalog, 2 page tree, 3 font, then a page and its content
/// stream for every entry of `contents`.
fn pdf_from_contents(contents: &[String]) -> Vec<u8> {
    let kids = (0..contents.len())
        .map(|i| format!("{} 0 R", 4 + 2 * i))
        .collect::<Vec<_>>()
        .join(" ");

    let mut objects = vec![
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        format!("<< /Type /Pages /Kids [{kids}] /Count {} >>", contents.len()),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
            .to_string(),
    ];
    for (i, content) in contents.iter().enumerate() {
        objects.push(format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
             /Resources << /Font << /F1 3 0 R >> >> /Contents {} 0 R >>",
            5 + 2 * i
        ));
        objects.push(format!(
            "<< /Length {} >>\nstream\n{}\nendstream",
            content.len(),
            content
        ));
    }

    let mut pdf = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(pdf.len());
        pdf.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, body).as_bytes());
    }

    let xref_at = pdf.len();
    let mut tail = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
    for offset in offsets {
        tail.push_str(&format!("{offset:010} 00000 n \n"));
    }
    tail.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_at}\n%%EOF\n",
        objects.len() + 1
    ));
    pdf.extend_from_slice(tail.as_bytes());
    pdf
}

fn escape_pdf_string(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('(', "\\(")
        .replace(')', "\\)")
}

/// App state wired to `llm`, with short extractor timeouts.
pub fn test_state(llm: Arc<dyn CompletionService>) -> AppState {
    AppState {
        llm,
        pdf: PdfTextExtractor::new(Duration::from_secs(10)),
        web: WebPageExtractor::new(Duration::from_secs(2)).expect("client builds"),
        tailor: ResumeTailor,
    }
}

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub system: String,
    pub user: String,
    pub sampling: SamplingParams,
}

type Responder = Box<dyn Fn() -> Result<Completion, LlmError> + Send + Sync>;

/// In-process completion service that records every request.
pub struct StubCompletion {
    respond: Responder,
    calls: Mutex<Vec<RecordedCall>>,
}

impl StubCompletion {
    pub fn replying(text: &'static str) -> Self {
        Self {
            respond: Box::new(move || Ok(Completion::from_text(text))),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: impl Fn() -> LlmError + Send + Sync + 'static) -> Self {
        Self {
            respond: Box::new(move || Err(error())),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().expect("calls lock").clone()
    }
}

#[async_trait]
impl CompletionService for StubCompletion {
    async fn complete(&self, request: CompletionRequest<'_>) -> Result<Completion, LlmError> {
        self.calls.lock().expect("calls lock").push(RecordedCall {
            system: request.system.to_string(),
            user: request.user.to_string(),
            sampling: request.sampling,
        });
        (self.respond)()
    }
}
