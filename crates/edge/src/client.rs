// ABOUTME: The main Client struct that fetches the target page and dispatches extraction.
// ABOUTME: Provides async handle() for full requests and a sync extract_html() for pages already in hand.

use tracing::debug;

use crate::error::EdgeError;
use crate::extractors::extract;
use crate::options::{ClientBuilder, Options};
use crate::request::{Mode, PriceRequest};
use crate::resource::fetch;
use crate::result::Extraction;

/// The edge client: one shared HTTP client, no other state.
#[derive(Debug, Clone)]
pub struct Client {
    http_client: reqwest::Client,
}

impl Client {
    /// Create a new ClientBuilder for configuring the client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Create a new Client with the given options.
    pub fn new(opts: Options) -> Result<Self, reqwest::Error> {
        let http_client = match opts.http_client {
            Some(client) => client,
            None => {
                let mut builder = reqwest::Client::builder();
                if let Some(timeout) = opts.timeout {
                    builder = builder.timeout(timeout);
                }
                if let Some(ref ua) = opts.user_agent {
                    builder = builder.user_agent(ua);
                }
                builder.build()?
            }
        };

        Ok(Self { http_client })
    }

    /// Handle one request: validate, fetch the target, run the selected strategy.
    ///
    /// Fails only before extraction (missing or invalid URL, upstream fetch).
    /// A page without a price is an `Extraction::NotFound`, not an error.
    pub async fn handle(&self, req: &PriceRequest) -> Result<Extraction, EdgeError> {
        let target = req.target()?;
        let mode = req.mode();
        debug!(url = target, ?mode, "dispatching");

        let page = fetch(&self.http_client, target).await?;
        Ok(extract(page.text_utf8(), mode))
    }

    /// Run the strategy for `selector`/`raw` over HTML that was already fetched.
    pub fn extract_html(&self, html: &str, selector: &str, raw: Option<&str>) -> Extraction {
        extract(html.to_string(), Mode::select(selector, raw))
    }
}
