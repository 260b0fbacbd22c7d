// ABOUTME: Sites file loading: per-shop SKU maps with the page URL and selector to poll.
// ABOUTME: TOML tables keyed [shop.code], importable from a code,url,selector,ean CSV export.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// One SKU to poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteEntry {
    pub url: String,
    #[serde(default)]
    pub selector: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ean: Option<String>,
}

/// A row of a product CSV export. Columns other than these are ignored.
#[derive(Debug, Deserialize)]
struct CsvRow {
    code: String,
    url: String,
    #[serde(default)]
    selector: String,
    #[serde(default)]
    ean: Option<String>,
}

/// All SKUs, grouped by shop.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SiteMap {
    shops: BTreeMap<String, BTreeMap<String, SiteEntry>>,
}

impl SiteMap {
    /// Parse a sites file from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).context("invalid sites file")
    }

    /// Read and parse a sites file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read sites file {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    /// Build a sites map from CSV with a `code,url,selector,ean` header, every
    /// row filed under `shop`. A repeated code keeps its last row.
    pub fn from_csv<R: io::Read>(reader: R, shop: &str) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut skus = BTreeMap::new();
        for (index, row) in rdr.deserialize::<CsvRow>().enumerate() {
            // Line 1 is the header.
            let row = row.with_context(|| format!("invalid CSV row {}", index + 2))?;
            let ean = row.ean.filter(|e| !e.is_empty());
            skus.insert(
                row.code,
                SiteEntry {
                    url: row.url,
                    selector: row.selector,
                    ean,
                },
            );
        }

        let mut shops = BTreeMap::new();
        if !skus.is_empty() {
            shops.insert(shop.to_string(), skus);
        }
        Ok(Self { shops })
    }

    /// Render as a sites file.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).context("failed to serialize sites file")
    }

    /// Every `(shop, code, entry)` triple, optionally restricted to one shop.
    pub fn entries<'a>(
        &'a self,
        shop: Option<&'a str>,
    ) -> impl Iterator<Item = (&'a str, &'a str, &'a SiteEntry)> + 'a {
        self.shops
            .iter()
            .filter(move |(name, _)| shop.map_or(true, |s| s == name.as_str()))
            .flat_map(|(name, skus)| {
                skus.iter()
                    .map(move |(code, entry)| (name.as_str(), code.as_str(), entry))
            })
    }

    /// Number of SKUs across all shops.
    pub fn len(&self) -> usize {
        self.shops.values().map(BTreeMap::len).sum()
    }
}
