// ABOUTME: Price extraction strategies applied to a fetched page.
// ABOUTME: Routes a page through raw passthrough, the JSON-LD scan or the regex fallback.

//! Price extraction module.
//!
//! Submodules:
//! - `jsonld`: scan of `application/ld+json` script blocks for Product offers.
//! - `pattern`: regex fallback for storefronts without structured data.

pub mod jsonld;
pub mod pattern;

use serde_json::Value;

use crate::request::Mode;
use crate::result::{Extraction, PricePayload};

/// Not-found body for the JSON-LD scan.
pub const JSONLD_NOT_FOUND: &str = "Price not found in JSON-LD";

/// Run the strategy for `mode` over an already fetched page.
pub fn extract(html: String, mode: Mode<'_>) -> Extraction {
    match mode {
        Mode::Raw => Extraction::Raw(html),
        Mode::JsonLd => match jsonld::find_price(&html) {
            Some(price) => Extraction::Price(PricePayload { price }),
            None => Extraction::NotFound(JSONLD_NOT_FOUND.to_string()),
        },
        Mode::Pattern(selector) => match pattern::find_price(&html) {
            Some(price) => Extraction::Price(PricePayload {
                price: Value::String(price),
            }),
            None => Extraction::NotFound(format!("No match for selector {}", selector)),
        },
    }
}
