//! OCR extraction for PDF and image menus.
//!
//! PDFs are rasterized to per-page PNGs with poppler's pdftoppm, then each
//! page goes through the vision capability; single images go straight to
//! OCR. The combined text is structured by the language model.

use std::path::Path;
use std::process::Command;

use thiserror::Error;
use tracing::{debug, warn};

use crate::classify::ContentKind;
use crate::llm::{ocr_image, structure_menu_text, LanguageModel};
use crate::models::StructuredMenu;
use crate::scrapers::Fetcher;

/// Rasterization DPI for PDF pages.
const PDF_RENDER_DPI: &str = "200";

/// Errors preparing a document for OCR.
#[derive(Debug, Error)]
pub enum OcrError {
    #[error("external tool not found: {0}")]
    ToolNotFound(String),

    #[error("rasterization failed: {0}")]
    Rasterize(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Check if a binary is available in PATH.
fn check_binary(name: &str) -> bool {
    Command::new("which")
        .arg(name)
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Download a PDF or image menu, OCR it, and structure the text.
///
/// Used directly for `pdf`/`image` classifications; any failure along the
/// way means this tier produced nothing.
pub async fn extract_document_ocr(
    url: &str,
    kind: ContentKind,
    fetcher: &dyn Fetcher,
    model: &dyn LanguageModel,
) -> Option<StructuredMenu> {
    let body = match fetcher.fetch_bytes(url).await {
        Ok(body) => body,
        Err(e) => {
            warn!("Document fetch failed for {}: {}", url, e);
            return None;
        }
    };

    let text = match kind {
        ContentKind::Pdf => match ocr_pdf(&body.bytes, model).await {
            Ok(text) => text,
            Err(e) => {
                warn!("PDF OCR failed for {}: {}", url, e);
                return None;
            }
        },
        _ => match ocr_image(model, &body.bytes).await {
            Ok(text) => text,
            Err(e) => {
                warn!("Image OCR failed for {}: {}", url, e);
                return None;
            }
        },
    };

    if text.trim().is_empty() {
        return None;
    }

    match structure_menu_text(model, &text).await {
        Ok(menu) => Some(menu),
        Err(e) => {
            warn!("Structuring failed for {}: {}", url, e);
            None
        }
    }
}

/// Rasterize a PDF and OCR every page, concatenating with page markers.
async fn ocr_pdf(pdf_bytes: &[u8], model: &dyn LanguageModel) -> Result<String, OcrError> {
    let pages = rasterize_pdf(pdf_bytes)?;
    debug!("Rasterized PDF to {} pages", pages.len());

    let mut menu_text = String::new();
    for (index, page) in pages.iter().enumerate() {
        match ocr_image(model, page).await {
            Ok(page_text) => {
                menu_text.push_str(&format!("\n\n=== Page {} ===\n\n{}", index + 1, page_text));
            }
            Err(e) => warn!("OCR failed on page {}: {}", index + 1, e),
        }
    }
    Ok(menu_text)
}

/// Convert PDF bytes to per-page PNG bytes via pdftoppm.
fn rasterize_pdf(pdf_bytes: &[u8]) -> Result<Vec<Vec<u8>>, OcrError> {
    if !check_binary("pdftoppm") {
        return Err(OcrError::ToolNotFound("pdftoppm".to_string()));
    }

    let dir = tempfile::tempdir()?;
    let pdf_path = dir.path().join("menu.pdf");
    std::fs::write(&pdf_path, pdf_bytes)?;

    let output = Command::new("pdftoppm")
        .arg("-png")
        .arg("-r")
        .arg(PDF_RENDER_DPI)
        .arg(&pdf_path)
        .arg(dir.path().join("page"))
        .output()?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(OcrError::Rasterize(stderr.to_string()));
    }

    read_page_images(dir.path())
}

/// Read the page-*.png files pdftoppm produced, in page order.
fn read_page_images(dir: &Path) -> Result<Vec<Vec<u8>>, OcrError> {
    let mut paths: Vec<_> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "png"))
        .collect();
    // pdftoppm zero-pads page numbers, but sort by length first in case it
    // did not.
    paths.sort_by_key(|p| {
        let name = p.file_name().map(|n| n.to_string_lossy().to_string());
        (name.as_ref().map_or(0, |n| n.len()), name)
    });

    let mut pages = Vec::with_capacity(paths.len());
    for path in paths {
        pages.push(std::fs::read(path)?);
    }
    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_images_sorted_numerically() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["page-10.png", "page-2.png", "page-1.png"] {
            std::fs::write(dir.path().join(name), name.as_bytes()).unwrap();
        }
        let pages = read_page_images(dir.path()).unwrap();
        assert_eq!(pages.len(), 3);
        assert_eq!(pages[0], b"page-1.png");
        assert_eq!(pages[1], b"page-2.png");
        assert_eq!(pages[2], b"page-10.png");
    }

    #[test]
    fn test_non_png_files_ignored() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("menu.pdf"), b"pdf").unwrap();
        std::fs::write(dir.path().join("page-1.png"), b"img").unwrap();
        let pages = read_page_images(dir.path()).unwrap();
        assert_eq!(pages.len(), 1);
    }
}
