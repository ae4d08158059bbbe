//! Content-type classification for resolved menu URLs.
//!
//! Decides whether a URL points at a PDF, an image, or an HTML page.
//! Ambiguity is not an error: anything inconclusive is treated as HTML.

use tracing::debug;

use crate::scrapers::Fetcher;

/// What kind of document a menu URL points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Pdf,
    Image,
    Html,
}

const IMAGE_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".gif", ".webp"];

/// Classify by file extension alone. Returns None when inconclusive.
fn classify_by_extension(url: &str) -> Option<ContentKind> {
    let lower = url.to_lowercase();
    if lower.ends_with(".pdf") {
        return Some(ContentKind::Pdf);
    }
    if IMAGE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext)) {
        return Some(ContentKind::Image);
    }
    None
}

/// Classify a Content-Type header value. Returns None when inconclusive.
fn classify_content_type(content_type: &str) -> Option<ContentKind> {
    let lower = content_type.to_lowercase();
    if lower.contains("pdf") {
        return Some(ContentKind::Pdf);
    }
    if ["image/jpeg", "image/png", "image/gif"]
        .iter()
        .any(|t| lower.contains(t))
    {
        return Some(ContentKind::Image);
    }
    None
}

/// Classify a URL: extension first, then a bounded existence check on the
/// returned Content-Type, defaulting to HTML.
pub async fn classify_url(url: &str, fetcher: &dyn Fetcher) -> ContentKind {
    if let Some(kind) = classify_by_extension(url) {
        return kind;
    }

    match fetcher.probe(url).await {
        Ok(probe) => {
            if let Some(kind) = probe.content_type.as_deref().and_then(classify_content_type) {
                return kind;
            }
        }
        Err(e) => debug!("Probe failed while classifying {}: {}", url, e),
    }

    ContentKind::Html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrapers::{FetchError, FetchedBody, ProbeResponse};
    use async_trait::async_trait;

    struct FixedProbe {
        content_type: Option<String>,
    }

    #[async_trait]
    impl Fetcher for FixedProbe {
        async fn probe(&self, _url: &str) -> Result<ProbeResponse, FetchError> {
            Ok(ProbeResponse {
                status: 200,
                content_type: self.content_type.clone(),
            })
        }

        async fn fetch_text(&self, _url: &str) -> Result<String, FetchError> {
            Err(FetchError::Status(404))
        }

        async fn fetch_bytes(&self, _url: &str) -> Result<FetchedBody, FetchError> {
            Err(FetchError::Status(404))
        }
    }

    #[tokio::test]
    async fn test_extension_wins() {
        let fetcher = FixedProbe {
            content_type: Some("text/html".to_string()),
        };
        assert_eq!(
            classify_url("https://example.com/menu.PDF", &fetcher).await,
            ContentKind::Pdf
        );
        assert_eq!(
            classify_url("https://example.com/menu.webp", &fetcher).await,
            ContentKind::Image
        );
    }

    #[tokio::test]
    async fn test_content_type_fallback() {
        let fetcher = FixedProbe {
            content_type: Some("application/pdf".to_string()),
        };
        assert_eq!(
            classify_url("https://example.com/menu", &fetcher).await,
            ContentKind::Pdf
        );

        let fetcher = FixedProbe {
            content_type: Some("image/png".to_string()),
        };
        assert_eq!(
            classify_url("https://example.com/menu", &fetcher).await,
            ContentKind::Image
        );
    }

    #[tokio::test]
    async fn test_defaults_to_html() {
        let fetcher = FixedProbe { content_type: None };
        assert_eq!(
            classify_url("https://example.com/menu", &fetcher).await,
            ContentKind::Html
        );
    }
}
