// ABOUTME: Regex price fallback for pages without structured data.
// ABOUTME: Tries the hashed price span class first, then a CHF-prefixed amount, and cleans the capture.

use once_cell::sync::Lazy;
use regex::Regex;

/// Price span as rendered by the MediaMarkt storefront (CSS-module hash plus companion class).
static PRICE_SPAN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<span[^>]*class="[^"]*sc-e0c7d9f7-0 bPkjPs[^"]*"[^>]*>([^<]+)</span>"#).unwrap()
});
static CHF_AMOUNT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"CHF\s*([0-9]+(?:[.,][0-9]+)?)").unwrap());
static NON_PRICE_CHARS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^0-9.,]").unwrap());

/// Raw captured price text: the span's inner text, else the CHF amount.
pub fn find_price_text(html: &str) -> Option<&str> {
    PRICE_SPAN_RE
        .captures(html)
        .or_else(|| CHF_AMOUNT_RE.captures(html))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Strip everything except ASCII digits, `.` and `,`.
pub fn clean_price(text: &str) -> String {
    NON_PRICE_CHARS_RE.replace_all(text, "").into_owned()
}

/// Find and clean a price. Always a string, never a number.
pub fn find_price(html: &str) -> Option<String> {
    find_price_text(html).map(clean_price)
}
