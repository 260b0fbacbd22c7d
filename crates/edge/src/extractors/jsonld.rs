// ABOUTME: JSON-LD price extraction scanning every application/ld+json script block in document order.
// ABOUTME: Malformed blocks are skipped; the first Product offer carrying a price key wins.

//! JSON-LD price scan.
//!
//! Key behaviors:
//! - Every `<script type="application/ld+json">` block is considered, not just the first.
//! - A block that fails to parse is skipped and the scan moves on.
//! - A top-level array is a list of nodes; any other value is a single node.
//! - Only nodes whose `@type` is exactly the string `"Product"` with a truthy `offers` qualify.
//! - `offers` may be a single offer or a list; the first offer with a `price` key wins,
//!   and a `null` price is a price.
//! - A `null` node or a `null` offer abandons the rest of its block.
//! - Unpaired UTF-16 surrogate escapes (`"\ud83d"`) are accepted and read as U+FFFD.
//! - Integral floats come back as integers (`1299.0` is reported as `1299`).

use std::slice;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::debug;

static LD_JSON_BLOCK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<script[^>]*type="application/ld\+json"[^>]*>(.*?)</script>"#).unwrap()
});

/// Outcome of parsing one script block.
#[derive(Debug)]
pub enum BlockParse {
    Parsed(Value),
    Failed(serde_json::Error),
}

impl BlockParse {
    fn from_text(text: &str) -> Self {
        let text = text.trim();
        match serde_json::from_str(text) {
            Ok(value) => BlockParse::Parsed(value),
            Err(err) => match replace_lone_surrogates(text) {
                Some(repaired) => match serde_json::from_str(&repaired) {
                    Ok(value) => BlockParse::Parsed(value),
                    Err(_) => BlockParse::Failed(err),
                },
                None => BlockParse::Failed(err),
            },
        }
    }
}

/// Rewrite unpaired `\uD800`-`\uDFFF` escapes as `\uFFFD`.
///
/// Returns None when the text has no unpaired surrogate escape.
fn replace_lone_surrogates(text: &str) -> Option<String> {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    let mut changed = false;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'\\' {
            i += 1;
            continue;
        }
        let Some(unit) = hex_escape_at(bytes, i) else {
            // Any other escape, including `\\`, is two bytes long.
            i += 2;
            continue;
        };
        match unit {
            0xD800..=0xDBFF => {
                if matches!(hex_escape_at(bytes, i + 6), Some(0xDC00..=0xDFFF)) {
                    i += 12;
                    continue;
                }
            }
            0xDC00..=0xDFFF => {}
            _ => {
                i += 6;
                continue;
            }
        }
        out.push_str(&text[last..i]);
        out.push_str("\\uFFFD");
        i += 6;
        last = i;
        changed = true;
    }

    if !changed {
        return None;
    }
    out.push_str(&text[last..]);
    Some(out)
}

/// The code unit of a `\uXXXX` escape starting at `at`.
fn hex_escape_at(bytes: &[u8], at: usize) -> Option<u16> {
    let escape = bytes.get(at..at + 6)?;
    if escape[0] != b'\\' || escape[1] != b'u' {
        return None;
    }
    let hex = std::str::from_utf8(&escape[2..]).ok()?;
    u16::from_str_radix(hex, 16).ok()
}

/// Parse every JSON-LD block in the document, in document order.
pub fn parse_blocks(html: &str) -> impl Iterator<Item = BlockParse> + '_ {
    LD_JSON_BLOCK_RE
        .captures_iter(html)
        .filter_map(|caps| caps.get(1))
        .map(|m| BlockParse::from_text(m.as_str()))
}

/// The `offers` field of a Product node.
#[derive(Debug, Clone, Copy)]
pub enum Offers<'a> {
    Single(&'a Value),
    List(&'a [Value]),
}

impl<'a> Offers<'a> {
    /// Read `offers` from a node; absent or falsy values yield None.
    pub fn from_node(node: &'a Value) -> Option<Self> {
        let offers = node.get("offers")?;
        if !is_truthy(offers) {
            return None;
        }
        Some(match offers {
            Value::Array(list) => Offers::List(list.as_slice()),
            other => Offers::Single(other),
        })
    }

    /// The offers as a sequence.
    pub fn as_slice(&self) -> &'a [Value] {
        match *self {
            Offers::Single(offer) => slice::from_ref(offer),
            Offers::List(list) => list,
        }
    }

    /// The first offer price, where a present `null` counts.
    ///
    /// A `null` offer ends the search with `NullAccess`.
    pub fn first_price(&self) -> Result<Option<&'a Value>, NullAccess> {
        for offer in self.as_slice() {
            if offer.is_null() {
                return Err(NullAccess);
            }
            if let Some(price) = offer.get("price") {
                return Ok(Some(price));
            }
        }
        Ok(None)
    }
}

/// A field was read from a `null` node or offer; the rest of the block is abandoned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NullAccess;

/// Mirrors JavaScript truthiness for the `offers` presence check.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Normalize a parsed block into its nodes.
fn nodes(value: &Value) -> &[Value] {
    match value {
        Value::Array(list) => list.as_slice(),
        other => slice::from_ref(other),
    }
}

fn is_product(node: &Value) -> bool {
    matches!(node.get("@type"), Some(Value::String(t)) if t == "Product")
}

/// Price of a single node when it is a Product with a priced offer.
fn node_price(node: &Value) -> Result<Option<&Value>, NullAccess> {
    if node.is_null() {
        return Err(NullAccess);
    }
    if !is_product(node) {
        return Ok(None);
    }
    match Offers::from_node(node) {
        Some(offers) => offers.first_price(),
        None => Ok(None),
    }
}

/// First price among a block's nodes.
fn block_price(value: &Value) -> Result<Option<&Value>, NullAccess> {
    for node in nodes(value) {
        if let Some(price) = node_price(node)? {
            return Ok(Some(price));
        }
    }
    Ok(None)
}

/// Report integral floats as integers, the way `JSON.stringify` prints them.
fn integral_floats_as_ints(value: Value) -> Value {
    // Beyond 2^53 a float no longer maps to one integer.
    const MAX_SAFE: f64 = 9_007_199_254_740_991.0;
    match value {
        Value::Number(n) if n.is_f64() => match n.as_f64() {
            Some(f) if f.fract() == 0.0 && f.abs() <= MAX_SAFE => Value::from(f as i64),
            _ => Value::Number(n),
        },
        Value::Array(list) => Value::Array(list.into_iter().map(integral_floats_as_ints).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, integral_floats_as_ints(v)))
                .collect(),
        ),
        other => other,
    }
}

/// Find the first Product offer price across all JSON-LD blocks.
pub fn find_price(html: &str) -> Option<Value> {
    for (index, block) in parse_blocks(html).enumerate() {
        let value = match block {
            BlockParse::Parsed(value) => value,
            BlockParse::Failed(err) => {
                debug!(block = index, error = %err, "skipping malformed JSON-LD block");
                continue;
            }
        };

        match block_price(&value) {
            Ok(Some(price)) => return Some(integral_floats_as_ints(price.clone())),
            Ok(None) => {}
            Err(NullAccess) => {
                debug!(block = index, "abandoning JSON-LD block at null entry");
            }
        }
    }
    None
}
