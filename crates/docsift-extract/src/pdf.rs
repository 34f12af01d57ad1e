//! PDF content extractor.
//!
//! Uses lopdf to walk pages in order and rebuild each page's text from its
//! text-showing operators (`Tj`, `TJ`, `'`, `"`), one fragment per operator. A page whose text cannot be retrieved is skipped;
//! only an unreadable file or an empty result fails the whole document.

use async_trait::async_trait;
use docsift_core::{ContentExtractor, ExtractError, PageText};
use lopdf::content::Content;
use lopdf::{Document, Object};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};

/// Extractor for PDF files.
pub struct PdfExtractor;

impl PdfExtractor {
    /// Create a new PDF extractor.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Extract per-page text without joining it.
    pub async fn extract_pages(&self, path: &Path) -> Result<Vec<PageText>, ExtractError> {
        let bytes = tokio::fs::read(path).await?;

        tokio::task::spawn_blocking(move || {
            let source = LopdfSource::load(&bytes)?;
            Ok(collect_pages(&source))
        })
        .await
        .map_err(|e| ExtractError::LoadFailure(format!("task join error: {e}")))?
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentExtractor for PdfExtractor {
    fn supported_types(&self) -> &[&str] {
        &["application/pdf"]
    }

    async fn extract(&self, path: &Path) -> Result<String, ExtractError> {
        debug!("Extracting PDF: {:?}", path);

        let pages = self.extract_pages(path).await?;
        let text = join_pages(&pages)?;

        debug!(
            "Extracted {} chars from {} pages of {:?}",
            text.len(),
            pages.len(),
            path
        );
        Ok(text)
    }
}

/// Convenience wrapper around [`PdfExtractor`].
pub async fn extract_pdf_text(path: &Path) -> Result<String, ExtractError> {
    PdfExtractor::new().extract(path).await
}

/// A paged document that can hand out the text fragments of each page.
pub trait PageSource {
    /// Page numbers in document order (1-indexed).
    fn page_numbers(&self) -> Vec<u32>;

    /// Ordered text fragments of one page.
    fn page_fragments(&self, page_number: u32) -> Result<Vec<String>, String>;
}

/// [`PageSource`] backed by an in-memory lopdf document.
struct LopdfSource {
    doc: Document,
    pages: BTreeMap<u32, lopdf::ObjectId>,
}

impl LopdfSource {
    fn load(bytes: &[u8]) -> Result<Self, ExtractError> {
        let doc = Document::load_mem(bytes)
            .map_err(|e| ExtractError::LoadFailure(format!("invalid PDF: {e}")))?;
        let pages = doc.get_pages();
        Ok(Self { doc, pages })
    }
}

impl PageSource for LopdfSource {
    fn page_numbers(&self) -> Vec<u32> {
        self.pages.keys().copied().collect()
    }

    fn page_fragments(&self, page_number: u32) -> Result<Vec<String>, String> {
        let page_id = *self
            .pages
            .get(&page_number)
            .ok_or_else(|| format!("page {page_number} not found"))?;

        let encodings: BTreeMap<Vec<u8>, &str> = self
            .doc
            .get_page_fonts(page_id)
            .into_iter()
            .map(|(name, font)| (name, font.get_font_encoding()))
            .collect();

        let data = self
            .doc
            .get_page_content(page_id)
            .map_err(|e| e.to_string())?;
        let content = Content::decode(&data).map_err(|e| e.to_string())?;

        let mut encoding = None;
        let mut fragments = Vec::new();
        for operation in &content.operations {
            let shown = match operation.operator.as_str() {
                "Tf" => {
                    if let Some(font) = operation.operands.first().and_then(|o| o.as_name().ok()) {
                        encoding = encodings.get(font).copied();
                    }
                    continue;
                }
                "Tj" | "TJ" | "'" => operation.operands.first().map(|o| show_text(encoding, o)),
                // aw ac string
                "\"" => operation.operands.get(2).map(|o| show_text(encoding, o)),
                _ => None,
            };

            if let Some(text) = shown {
                let text = text.trim();
                if !text.is_empty() {
                    fragments.push(text.to_string());
                }
            }
        }

        Ok(fragments)
    }
}

/// Kerning (thousandths of an em) past which a `TJ` gap counts as a word break.
const TJ_WORD_GAP: i64 = -100;

/// Decode the operand of one text-showing operator into a single fragment.
fn show_text(encoding: Option<&str>, operand: &Object) -> String {
    match operand {
        Object::String(bytes, _) => Document::decode_text(encoding, bytes),
        Object::Array(items) => {
            let mut text = String::new();
            for item in items {
                match item {
                    Object::String(bytes, _) => {
                        text.push_str(&Document::decode_text(encoding, bytes));
                    }
                    Object::Integer(gap) if *gap < TJ_WORD_GAP => text.push(' '),
                    Object::Real(gap) if f64::from(*gap) < TJ_WORD_GAP as f64 => text.push(' '),
                    _ => {}
                }
            }
            text
        }
        _ => String::new(),
    }
}

/// Walk every page in order, recording failures instead of aborting.
pub fn collect_pages(source: &dyn PageSource) -> Vec<PageText> {
    source
        .page_numbers()
        .into_iter()
        .map(|page_number| match source.page_fragments(page_number) {
            Ok(fragments) => PageText {
                page_number,
                text: fragments.join(" "),
                succeeded: true,
            },
            Err(e) => {
                warn!("Skipping PDF page {}: {}", page_number, e);
                PageText {
                    page_number,
                    text: String::new(),
                    succeeded: false,
                }
            }
        })
        .collect()
}

/// Join successful pages with newlines; fail if nothing readable remains.
pub fn join_pages(pages: &[PageText]) -> Result<String, ExtractError> {
    let text = pages
        .iter()
        .filter(|page| page.succeeded)
        .map(|page| page.text.trim())
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    if text.trim().is_empty() {
        let failed = pages.iter().filter(|page| !page.succeeded).count();
        return Err(ExtractError::NoContent(format!(
            "PDF has no extractable text ({} pages, {} unreadable)",
            pages.len(),
            failed
        )));
    }

    Ok(text)
}
