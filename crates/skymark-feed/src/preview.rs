//! Open Graph page previews for link cards.
//!
//! Fetches the bookmarked page the way a social crawler would (the
//! `facebookexternalhit` user agent makes sites serve their share
//! markup), extracts og:/twitter: metadata, and downloads the preview
//! image when one is declared. Preview failures are never fatal: a post
//! without a card is better than no post.

use std::time::Duration;

use scraper::{Html, Selector};
use tracing::warn;

use crate::error::Result;

/// Sites serve their share-card markup to this UA.
const USER_AGENT: &str = "facebookexternalhit/1.1";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const NO_TITLE: &str = "(no title)";

/// Bluesky rejects blobs over ~1 MB; anything bigger is dropped rather
/// than re-encoded (the upstream image pipeline is not worth carrying for
/// a thumbnail).
const MAX_IMAGE_BYTES: usize = 976 * 1024;

// ---------------------------------------------------------------------------
// PagePreview
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct PagePreview {
    pub title: String,
    pub description: String,
    pub image: Option<PreviewImage>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PreviewImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

/// Metadata pulled out of the HTML before any image fetch.
#[derive(Debug, Default, PartialEq)]
struct PageMeta {
    title: Option<String>,
    description: Option<String>,
    image_url: Option<String>,
}

// ---------------------------------------------------------------------------
// PreviewFetcher
// ---------------------------------------------------------------------------

pub struct PreviewFetcher {
    http: reqwest::Client,
}

impl PreviewFetcher {
    pub fn new() -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { http })
    }

    /// Fetch `url` and build its preview. Returns `None` when the page is
    /// unreachable or isn't HTML; the caller posts without a card.
    pub async fn fetch(&self, url: &str) -> Result<Option<PagePreview>> {
        let response = match self.http.get(url).send().await {
            Ok(r) => r,
            Err(err) => {
                warn!(url, error = %err, "preview fetch failed");
                return Ok(None);
            }
        };
        if !response.status().is_success() {
            warn!(url, status = %response.status(), "preview fetch returned non-success");
            return Ok(None);
        }
        let content_type = header_str(&response, reqwest::header::CONTENT_TYPE);
        if !content_type.contains("text/html") && !content_type.contains("application/xhtml+xml") {
            warn!(url, content_type = %content_type, "preview target is not HTML");
            return Ok(None);
        }

        let body = response.text().await?;
        let meta = extract_meta(&body);

        let image = match &meta.image_url {
            Some(image_url) => self.fetch_image(image_url).await,
            None => None,
        };

        Ok(Some(PagePreview {
            title: meta
                .title
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| NO_TITLE.to_string()),
            description: meta.description.unwrap_or_default(),
            image,
        }))
    }

    /// Download the preview image, or `None` if it can't be fetched or is
    /// too large to upload.
    async fn fetch_image(&self, url: &str) -> Option<PreviewImage> {
        let response = match self.http.get(url).send().await {
            Ok(r) if r.status().is_success() => r,
            Ok(r) => {
                warn!(url, status = %r.status(), "preview image fetch returned non-success");
                return None;
            }
            Err(err) => {
                warn!(url, error = %err, "preview image fetch failed");
                return None;
            }
        };
        let mime_type = {
            let raw = header_str(&response, reqwest::header::CONTENT_TYPE);
            let raw = raw.split(';').next().unwrap_or("").trim();
            if raw.starts_with("image/") {
                raw.to_string()
            } else {
                "image/jpeg".to_string()
            }
        };
        let bytes = match response.bytes().await {
            Ok(b) => b,
            Err(err) => {
                warn!(url, error = %err, "preview image body read failed");
                return None;
            }
        };
        if bytes.len() > MAX_IMAGE_BYTES {
            warn!(url, size = bytes.len(), "preview image too large; dropping");
            return None;
        }
        Some(PreviewImage {
            bytes: bytes.to_vec(),
            mime_type,
        })
    }
}

fn header_str(response: &reqwest::Response, name: reqwest::header::HeaderName) -> String {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_ascii_lowercase()
}

// ---------------------------------------------------------------------------
// Metadata extraction
// ---------------------------------------------------------------------------

/// og: → twitter: → document fallbacks, matching what share crawlers do.
fn extract_meta(html: &str) -> PageMeta {
    let doc = Html::parse_document(html);

    PageMeta {
        title: meta_content(&doc, "meta[property=\"og:title\"]")
            .or_else(|| meta_content(&doc, "meta[name=\"twitter:title\"]"))
            .or_else(|| document_title(&doc)),
        description: meta_content(&doc, "meta[property=\"og:description\"]")
            .or_else(|| meta_content(&doc, "meta[name=\"twitter:description\"]"))
            .or_else(|| meta_content(&doc, "meta[name=\"description\"]")),
        image_url: meta_content(&doc, "meta[property=\"og:image\"]")
            .or_else(|| meta_content(&doc, "meta[name=\"twitter:image\"]")),
    }
}

fn meta_content(doc: &Html, selector: &str) -> Option<String> {
    let sel = Selector::parse(selector).ok()?;
    doc.select(&sel)
        .find_map(|el| el.value().attr("content"))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn document_title(doc: &Html) -> Option<String> {
    let sel = Selector::parse("title").ok()?;
    doc.select(&sel)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_og_over_twitter_and_title() {
        let html = r#"<html><head>
            <title>Fallback Title</title>
            <meta property="og:title" content="OG Title">
            <meta name="twitter:title" content="TW Title">
            <meta property="og:description" content="OG Desc">
            <meta property="og:image" content="https://example.com/og.jpg">
        </head><body></body></html>"#;
        let meta = extract_meta(html);
        assert_eq!(meta.title.as_deref(), Some("OG Title"));
        assert_eq!(meta.description.as_deref(), Some("OG Desc"));
        assert_eq!(meta.image_url.as_deref(), Some("https://example.com/og.jpg"));
    }

    #[test]
    fn falls_back_to_twitter_then_document_title() {
        let html = r#"<html><head>
            <title>Doc Title</title>
            <meta name="twitter:description" content="TW Desc">
        </head><body></body></html>"#;
        let meta = extract_meta(html);
        assert_eq!(meta.title.as_deref(), Some("Doc Title"));
        assert_eq!(meta.description.as_deref(), Some("TW Desc"));
        assert_eq!(meta.image_url, None);
    }

    #[test]
    fn empty_head_yields_empty_meta() {
        assert_eq!(extract_meta("<html><body>hi</body></html>"), PageMeta::default());
    }

    #[tokio::test]
    async fn fetch_builds_preview_with_image() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/article")
            .with_status(200)
            .with_header("content-type", "text/html; charset=utf-8")
            .with_body(format!(
                r#"<html><head>
                    <meta property="og:title" content="An Article">
                    <meta property="og:image" content="{}/thumb.png">
                </head></html>"#,
                server.url()
            ))
            .create_async()
            .await;
        server
            .mock("GET", "/thumb.png")
            .with_status(200)
            .with_header("content-type", "image/png")
            .with_body(vec![0x89, 0x50, 0x4e, 0x47])
            .create_async()
            .await;

        let fetcher = PreviewFetcher::new().unwrap();
        let preview = fetcher
            .fetch(&format!("{}/article", server.url()))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(preview.title, "An Article");
        let image = preview.image.unwrap();
        assert_eq!(image.mime_type, "image/png");
        assert_eq!(image.bytes, vec![0x89, 0x50, 0x4e, 0x47]);
    }

    #[tokio::test]
    async fn non_html_page_yields_no_preview() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/data.json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("{}")
            .create_async()
            .await;

        let fetcher = PreviewFetcher::new().unwrap();
        let preview = fetcher
            .fetch(&format!("{}/data.json", server.url()))
            .await
            .unwrap();
        assert!(preview.is_none());
    }

    #[tokio::test]
    async fn oversized_image_is_dropped_but_preview_survives() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/big")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body(format!(
                r#"<html><head>
                    <meta property="og:title" content="Big">
                    <meta property="og:image" content="{}/huge.jpg">
                </head></html>"#,
                server.url()
            ))
            .create_async()
            .await;
        server
            .mock("GET", "/huge.jpg")
            .with_status(200)
            .with_header("content-type", "image/jpeg")
            .with_body(vec![0u8; MAX_IMAGE_BYTES + 1])
            .create_async()
            .await;

        let fetcher = PreviewFetcher::new().unwrap();
        let preview = fetcher
            .fetch(&format!("{}/big", server.url()))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(preview.title, "Big");
        assert!(preview.image.is_none());
    }

    #[tokio::test]
    async fn untitled_page_gets_placeholder_title() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/bare")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body("<html><body>no head to speak of</body></html>")
            .create_async()
            .await;

        let fetcher = PreviewFetcher::new().unwrap();
        let preview = fetcher
            .fetch(&format!("{}/bare", server.url()))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(preview.title, "(no title)");
        assert_eq!(preview.description, "");
    }
}
