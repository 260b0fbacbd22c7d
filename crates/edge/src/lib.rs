// ABOUTME: Main library entry point for the pricewatch edge extractor.
// ABOUTME: Re-exports the public API: Client, ClientBuilder, PriceRequest, Mode, Extraction, EdgeError, router.

//! Pricewatch edge - fetch a product page and pull out its price.
//!
//! A request names a target `url` and a `selector`. The page is fetched once
//! and then either returned raw, scanned for JSON-LD Product offers, or
//! matched against storefront price patterns.
//!
//! # Example
//!
//! ```no_run
//! use pricewatch_edge::{Client, EdgeError, Extraction, PriceRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), EdgeError> {
//!     let client = Client::builder().build().expect("http client");
//!     let req = PriceRequest::from_query(Some(
//!         "url=https%3A%2F%2Fwww.interdiscount.ch%2Fde%2Fp%2F1&selector=script",
//!     ));
//!     if let Extraction::Price(payload) = client.handle(&req).await? {
//!         println!("{}", payload.price);
//!     }
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod extractors;
pub mod options;
pub mod request;
pub mod resource;
pub mod result;
pub mod server;

pub use crate::client::Client;
pub use crate::error::{EdgeError, ErrorCode};
pub use crate::options::{ClientBuilder, Options};
pub use crate::request::{Mode, PriceRequest};
pub use crate::result::{Extraction, PricePayload};
pub use crate::server::{router, serve};
