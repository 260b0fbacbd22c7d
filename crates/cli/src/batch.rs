// ABOUTME: Batch polling of the edge proxy for every SKU in a sites file.
// ABOUTME: Produces one price record per SKU; edge failures are recorded on the SKU, not fatal.

use anyhow::{bail, Context, Result};
use pricewatch_edge::PricePayload;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::sites::{SiteEntry, SiteMap};

/// One polled price.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceRecord {
    pub shop: String,
    pub code: String,
    pub ean: Option<String>,
    pub price: Value,
    pub ts: i64,
    pub error: Option<String>,
}

/// Thin HTTP client for a deployed edge proxy.
pub struct EdgeClient {
    base: Url,
    http: reqwest::Client,
}

impl EdgeClient {
    pub fn new(base: &str) -> Result<Self> {
        let base = Url::parse(base).with_context(|| format!("invalid edge URL {}", base))?;
        Ok(Self {
            base,
            http: reqwest::Client::new(),
        })
    }

    /// Ask the edge for one SKU's price.
    pub async fn price(&self, entry: &SiteEntry) -> Result<Value> {
        let resp = self
            .http
            .get(self.base.clone())
            .query(&[("url", entry.url.as_str()), ("selector", entry.selector.as_str())])
            .send()
            .await
            .context("edge request failed")?;

        let status = resp.status();
        let body = resp.text().await.context("failed to read edge response")?;
        if !status.is_success() {
            bail!("edge returned {}: {}", status.as_u16(), body.trim());
        }

        let payload: PricePayload =
            serde_json::from_str(&body).context("edge response is not a price payload")?;
        Ok(payload.price)
    }
}

/// Poll every SKU in order, one at a time.
pub async fn run(edge: &EdgeClient, sites: &SiteMap, shop: Option<&str>) -> Vec<PriceRecord> {
    let mut records = Vec::new();

    for (shop_name, code, entry) in sites.entries(shop) {
        let (price, error) = match edge.price(entry).await {
            Ok(price) => {
                debug!(shop = shop_name, code, %price, "price polled");
                (price, None)
            }
            Err(err) => {
                let message = format!("{:#}", err);
                warn!(shop = shop_name, code, error = %message, "price poll failed");
                (Value::Null, Some(message))
            }
        };

        records.push(PriceRecord {
            shop: shop_name.to_string(),
            code: code.to_string(),
            ean: entry.ean.clone(),
            price,
            ts: chrono::Utc::now().timestamp(),
            error,
        });
    }

    records
}
