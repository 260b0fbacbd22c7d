// ABOUTME: Query parameter parsing for incoming price requests and extraction mode selection.
// ABOUTME: Mode precedence is a single ordered match: raw flags first, then script selectors, then patterns.

use crate::error::EdgeError;

/// Selector value that forces raw passthrough.
pub const RAW_SELECTOR: &str = "__raw";

/// Selector prefix that selects the JSON-LD scan.
pub const SCRIPT_SELECTOR_PREFIX: &str = "script";

/// The query parameters of an incoming request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PriceRequest {
    pub url: Option<String>,
    pub selector: String,
    pub raw: Option<String>,
}

impl PriceRequest {
    /// Parse a raw query string (without the leading `?`).
    ///
    /// Repeated keys keep their first value. Unknown keys are ignored.
    pub fn from_query(query: Option<&str>) -> Self {
        let mut req = PriceRequest::default();
        let mut selector: Option<String> = None;

        let Some(query) = query else {
            return req;
        };

        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "url" if req.url.is_none() => req.url = Some(value.into_owned()),
                "selector" if selector.is_none() => selector = Some(value.into_owned()),
                "raw" if req.raw.is_none() => req.raw = Some(value.into_owned()),
                _ => {}
            }
        }

        req.selector = selector.unwrap_or_default();
        req
    }

    /// The target URL, or a MissingUrl error when absent or empty.
    pub fn target(&self) -> Result<&str, EdgeError> {
        match self.url.as_deref() {
            Some(url) if !url.is_empty() => Ok(url),
            _ => Err(EdgeError::missing_url("Handle")),
        }
    }

    /// The extraction mode this request asks for.
    pub fn mode(&self) -> Mode<'_> {
        Mode::select(&self.selector, self.raw.as_deref())
    }
}

/// Which extraction strategy runs over the fetched page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode<'a> {
    /// Return the upstream HTML unchanged.
    Raw,
    /// Scan `application/ld+json` blocks for a Product offer price.
    JsonLd,
    /// Match the price span or a CHF amount; carries the selector for the not-found message.
    Pattern(&'a str),
}

impl<'a> Mode<'a> {
    /// Pick the mode for a selector and raw flag.
    ///
    /// An empty selector always means raw, even when it would otherwise fall through.
    pub fn select(selector: &'a str, raw: Option<&str>) -> Mode<'a> {
        match (raw, selector) {
            (Some("1"), _) | (_, RAW_SELECTOR) | (_, "") => Mode::Raw,
            (_, s) if s.starts_with(SCRIPT_SELECTOR_PREFIX) => Mode::JsonLd,
            (_, s) => Mode::Pattern(s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_encoded_parameters() {
        let req = PriceRequest::from_query(Some(
            "url=https%3A%2F%2Fshop.example%2Fp%3Fid%3D7&selector=script%5Btype%3D%22application%2Fld%2Bjson%22%5D",
        ));
        assert_eq!(req.url.as_deref(), Some("https://shop.example/p?id=7"));
        assert_eq!(req.selector, r#"script[type="application/ld+json"]"#);
        assert_eq!(req.raw, None);
    }

    #[test]
    fn first_occurrence_wins() {
        let req = PriceRequest::from_query(Some("url=a&url=b&selector=x&selector=y&raw=0&raw=1"));
        assert_eq!(req.url.as_deref(), Some("a"));
        assert_eq!(req.selector, "x");
        assert_eq!(req.raw.as_deref(), Some("0"));
    }

    #[test]
    fn missing_or_empty_url_is_rejected() {
        assert!(PriceRequest::from_query(None).target().unwrap_err().is_missing_url());
        assert!(PriceRequest::from_query(Some("url=&raw=1"))
            .target()
            .unwrap_err()
            .is_missing_url());
        assert_eq!(
            PriceRequest::from_query(Some("url=https://a.example")).target().unwrap(),
            "https://a.example"
        );
    }

    #[test]
    fn mode_precedence() {
        assert_eq!(Mode::select("", None), Mode::Raw);
        assert_eq!(Mode::select("__raw", None), Mode::Raw);
        assert_eq!(Mode::select("script", Some("1")), Mode::Raw);
        assert_eq!(Mode::select(".price", Some("1")), Mode::Raw);
        assert_eq!(Mode::select("", Some("0")), Mode::Raw);
        assert_eq!(Mode::select("script[type=x]", None), Mode::JsonLd);
        assert_eq!(Mode::select("script", Some("true")), Mode::JsonLd);
        assert_eq!(Mode::select(".price", None), Mode::Pattern(".price"));
        assert_eq!(Mode::select("Script", None), Mode::Pattern("Script"));
    }

    #[test]
    fn default_selector_is_empty_and_means_raw() {
        let req = PriceRequest::from_query(Some("url=https%3A%2F%2Fa.example"));
        assert_eq!(req.selector, "");
        assert_eq!(req.mode(), Mode::Raw);
    }
}
