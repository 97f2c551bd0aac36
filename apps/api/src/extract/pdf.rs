//! PDF résumé text extraction.
//!
//! `pdf-extract` interprets each page's content stream and reports every glyph
//! with its device-space position. `GlyphGrouper` merges glyphs into words and
//! lines within a fixed tolerance window. Parsing runs off the async executor,
//! pages are joined in order, and the result is normalized for prompting.

use std::sync::OnceLock;
use std::time::Duration;

use bytes::Bytes;
use pdf_extract::{Document, MediaBox, OutputDev, OutputError, Transform};
use regex::Regex;
use tracing::{debug, warn};

use super::{ExtractedText, ExtractionFailure};

/// Upper bound on parsing a single uploaded document.
pub const DEFAULT_PDF_TIMEOUT_SECS: u64 = 30;

/// Layout units on either axis within which neighbouring glyphs share a word
/// (x) or a line (y).
pub const DEFAULT_GLYPH_TOLERANCE: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphTolerance {
    pub x: f64,
    pub y: f64,
}

impl Default for GlyphTolerance {
    fn default() -> Self {
        Self {
            x: DEFAULT_GLYPH_TOLERANCE,
            y: DEFAULT_GLYPH_TOLERANCE,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PdfTextExtractor {
    timeout: Duration,
    tolerance: GlyphTolerance,
}

impl Default for PdfTextExtractor {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_PDF_TIMEOUT_SECS))
    }
}

impl PdfTextExtractor {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            tolerance: GlyphTolerance::default(),
        }
    }

    pub fn with_glyph_tolerance(mut self, tolerance: GlyphTolerance) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Extracts normalized text from an in-memory PDF.
    ///
    /// Parse errors, parser panics, timeouts and documents without a text layer
    /// all come back as `ExtractionFailure`.
    pub async fn extract(&self, document: Bytes) -> Result<ExtractedText, ExtractionFailure> {
        let size = document.len();
        let tolerance = self.tolerance;
        // CPU-bound and panic-prone on malformed input: keep it on the blocking pool.
        let task = tokio::task::spawn_blocking(move || extract_pages(&document, tolerance));

        let pages = match tokio::time::timeout(self.timeout, task).await {
            Ok(Ok(result)) => result?,
            Ok(Err(join_error)) => {
                warn!("PDF parser aborted on {size}-byte document: {join_error}");
                return Err(ExtractionFailure::Unparseable(format!(
                    "parser aborted: {join_error}"
                )));
            }
            Err(_) => {
                warn!(
                    "PDF parsing exceeded {}ms on {size}-byte document",
                    self.timeout.as_millis()
                );
                return Err(ExtractionFailure::Timeout(self.timeout));
            }
        };

        let page_count = pages.len();
        let joined = join_pages(&pages);
        let cleaned = clean_text(&joined);
        debug!(
            "Extracted {} chars from {page_count} PDF page(s)",
            cleaned.len()
        );

        ExtractedText::new(cleaned).ok_or(ExtractionFailure::NoText)
    }
}

/// Text of every page, in page order.
fn extract_pages(
    document: &[u8],
    tolerance: GlyphTolerance,
) -> Result<Vec<String>, ExtractionFailure> {
    let mut doc =
        Document::load_mem(document).map_err(|e| ExtractionFailure::Unparseable(e.to_string()))?;
    if doc.is_encrypted() {
        // Only documents with an empty user password can be read.
        doc.decrypt("")
            .map_err(|e| ExtractionFailure::Unparseable(format!("encrypted document: {e}")))?;
    }

    doc.get_pages()
        .into_keys()
        .map(|page_num| -> Result<String, ExtractionFailure> {
            let mut grouper = GlyphGrouper::new(tolerance);
            pdf_extract::output_doc_page(&doc, &mut grouper, page_num).map_err(|e| {
                ExtractionFailure::Unparseable(format!("page {page_num}: {e:?}"))
            })?;
            Ok(grouper.into_text())
        })
        .collect()
}

#[derive(Debug, Clone, Copy)]
struct GlyphCursor {
    x_end: f64,
    y: f64,
}

/// Collects one page's glyphs in content-stream order.
///
/// A glyph starts a new line when its baseline is more than `tolerance.y` away
/// from the previous glyph's, and a new word when it starts more than
/// `tolerance.x` past the previous glyph's right edge. Otherwise it is appended
/// to the current word.
struct GlyphGrouper {
    tolerance: GlyphTolerance,
    text: String,
    cursor: Option<GlyphCursor>,
}

impl GlyphGrouper {
    fn new(tolerance: GlyphTolerance) -> Self {
        Self {
            tolerance,
            text: String::new(),
            cursor: None,
        }
    }

    fn into_text(self) -> String {
        self.text
    }
}

impl OutputDev for GlyphGrouper {
    fn begin_page(
        &mut self,
        _page_num: u32,
        _media_box: &MediaBox,
        _art_box: Option<(f64, f64, f64, f64)>,
    ) -> Result<(), OutputError> {
        self.cursor = None;
        Ok(())
    }

    fn end_page(&mut self) -> Result<(), OutputError> {
        Ok(())
    }

    fn output_character(
        &mut self,
        trm: &Transform,
        width: f64,
        _spacing: f64,
        font_size: f64,
        glyph: &str,
    ) -> Result<(), OutputError> {
        let (x, y) = (trm.m31, trm.m32);
        // Side of the square with the same area as the transformed em box.
        let scaled_size =
            (font_size * (trm.m11 + trm.m21) * font_size * (trm.m12 + trm.m22)).abs().sqrt();

        if let Some(cursor) = self.cursor {
            if (y - cursor.y).abs() > self.tolerance.y {
                self.text.push('\n');
            } else if x - cursor.x_end > self.tolerance.x {
                self.text.push(' ');
            }
        }

        self.text.push_str(glyph);
        self.cursor = Some(GlyphCursor {
            x_end: x + width * scaled_size,
            y,
        });
        Ok(())
    }

    fn begin_word(&mut self) -> Result<(), OutputError> {
        Ok(())
    }

    fn end_word(&mut self) -> Result<(), OutputError> {
        Ok(())
    }

    fn end_line(&mut self) -> Result<(), OutputError> {
        Ok(())
    }
}

/// Joins non-blank pages with a single newline, in page order.
fn join_pages(pages: &[String]) -> String {
    pages
        .iter()
        .map(String::as_str)
        .filter(|page| !page.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn regex(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("valid regex"))
}

/// Normalizes raw page text.
///
/// Order matters: blank-line runs collapse first, and the section break is
/// inserted last so it survives as the only blank line.
pub(crate) fn clean_text(text: &str) -> String {
    static BLANK_LINES: OnceLock<Regex> = OnceLock::new();
    static INLINE_SPACE: OnceLock<Regex> = OnceLock::new();
    static LEADING_SPACE: OnceLock<Regex> = OnceLock::new();
    static TRAILING_SPACE: OnceLock<Regex> = OnceLock::new();
    static SECTION_BREAK: OnceLock<Regex> = OnceLock::new();

    let text = regex(&BLANK_LINES, r"\n\s*\n").replace_all(text, "\n");
    let text = regex(&INLINE_SPACE, r"[^\S\n]+").replace_all(&text, " ");
    let text = space_after_punctuation(&text);
    let text = regex(&LEADING_SPACE, r"\n\s+").replace_all(&text, "\n");
    let text = regex(&TRAILING_SPACE, r"\s+\n").replace_all(&text, "\n");
    let text = regex(&SECTION_BREAK, r"([a-z])\n([A-Z])").replace_all(&text, "$1\n\n$2");

    text.trim().to_string()
}

/// Inserts a space after `.` and `,` when the next character is not whitespace.
fn space_after_punctuation(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 16);
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        out.push(c);
        if matches!(c, '.' | ',') {
            if let Some(next) = chars.peek() {
                if !next.is_whitespace() {
                    out.push(' ');
                }
            }
        }
    }
    out
}
