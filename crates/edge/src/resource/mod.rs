// ABOUTME: Resource handling module for fetching the upstream page.
// ABOUTME: Issues a single uncached GET, keeps the body whatever the status, and decodes it to text.

use bytes::Bytes;
use tracing::debug;

use crate::error::EdgeError;

/// Result of a completed upstream fetch.
///
/// The upstream status is recorded but never acted upon: a 404 page is
/// still a page and gets the same treatment as a 200.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl FetchResult {
    /// Decode the body as UTF-8 text, using charset hints from content-type header.
    pub fn text_utf8(&self) -> String {
        decode_body(&self.body, self.content_type.as_deref())
    }
}

/// Decode body bytes to a String using charset from content-type header or detection.
fn decode_body(body: &[u8], content_type: Option<&str>) -> String {
    if let Some(ct) = content_type {
        if let Some(charset) = extract_charset(ct) {
            if let Some(encoding) = encoding_rs::Encoding::for_label(charset.as_bytes()) {
                let (decoded, _, _) = encoding.decode(body);
                return decoded.into_owned();
            }
        }
    }

    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(body, true);
    let encoding = detector.guess(None, true);
    let (decoded, _, _) = encoding.decode(body);
    decoded.into_owned()
}

/// Extract charset value from Content-Type header.
fn extract_charset(content_type: &str) -> Option<String> {
    let lower = content_type.to_lowercase();
    for part in lower.split(';') {
        if let Some(charset) = part.trim().strip_prefix("charset=") {
            let charset = charset.trim_matches('"').trim_matches('\'');
            return Some(charset.to_string());
        }
    }
    None
}

/// Validate the target URL: it must parse and use http or https.
pub fn validate_target(url: &str) -> Result<url::Url, EdgeError> {
    if url.is_empty() {
        return Err(EdgeError::missing_url("Fetch"));
    }

    let parsed = url::Url::parse(url).map_err(|e| {
        EdgeError::invalid_url(url, "Fetch", Some(anyhow::anyhow!("invalid URL: {}", e)))
    })?;

    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        _ => Err(EdgeError::invalid_url(
            url,
            "Fetch",
            Some(anyhow::anyhow!("scheme must be http or https")),
        )),
    }
}

/// Fetch the resource at `url` with a plain GET.
pub async fn fetch(client: &reqwest::Client, url: &str) -> Result<FetchResult, EdgeError> {
    let target = validate_target(url)?;

    let response = client.get(target).send().await.map_err(|e| {
        EdgeError::fetch(url, "Fetch", Some(anyhow::anyhow!("request failed: {}", e)))
    })?;

    let status = response.status().as_u16();
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_lowercase());

    let body = response.bytes().await.map_err(|e| {
        EdgeError::fetch(
            url,
            "Fetch",
            Some(anyhow::anyhow!("failed to read body: {}", e)),
        )
    })?;

    debug!(url, status, bytes = body.len(), "upstream fetched");

    Ok(FetchResult {
        status,
        content_type,
        body,
    })
}
