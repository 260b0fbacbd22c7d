// ABOUTME: Extraction outcome types returned by the dispatcher.
// ABOUTME: A request ends in raw HTML, a single-key price payload, or a not-found message.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON body of a successful extraction: exactly one key, `price`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePayload {
    pub price: Value,
}

/// The terminal outcome of one request once the page has been fetched.
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    /// Upstream HTML, unchanged.
    Raw(String),
    /// A price was found.
    Price(PricePayload),
    /// No price; the message is returned to the caller as-is.
    NotFound(String),
}

impl Extraction {
    /// Returns true if this outcome carries a price.
    pub fn is_price(&self) -> bool {
        matches!(self, Extraction::Price(_))
    }

    /// Returns true if no price was found.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Extraction::NotFound(_))
    }

    /// Short label for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Extraction::Raw(_) => "raw",
            Extraction::Price(_) => "price",
            Extraction::NotFound(_) => "not_found",
        }
    }
}
