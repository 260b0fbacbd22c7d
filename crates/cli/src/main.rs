// ABOUTME: CLI for pricewatch: extract one page locally or poll the edge proxy for a sites file.
// ABOUTME: Prints raw HTML or price JSON for extract, JSON price records for batch, TOML for sites import.

mod batch;
mod sites;

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pricewatch_edge::{Client, Extraction, PriceRequest};
use tracing_subscriber::EnvFilter;

use crate::batch::EdgeClient;
use crate::sites::SiteMap;

/// Extract product prices from shop pages.
#[derive(Parser, Debug)]
#[command(name = "pricewatch")]
#[command(about = "Extract product prices locally or through the edge proxy", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch one page (or read a saved one) and run the extractor locally.
    Extract {
        /// Product page URL (not needed with --html)
        #[arg(required_unless_present = "html")]
        url: Option<String>,

        /// Selector: empty or "__raw" for raw HTML, "script..." for JSON-LD, anything else for patterns
        #[arg(short, long, default_value = "")]
        selector: String,

        /// Force raw HTML output
        #[arg(long)]
        raw: bool,

        /// Saved HTML file to extract from instead of fetching
        #[arg(long)]
        html: Option<PathBuf>,

        /// Upstream request timeout in seconds
        #[arg(long)]
        timeout_secs: Option<u64>,
    },

    /// Poll the edge proxy for every SKU in a sites file.
    Batch {
        /// Sites file (TOML, [shop.code] tables with url, selector, ean)
        #[arg(long)]
        sites: PathBuf,

        /// Edge proxy base URL
        #[arg(long, env = "CF_EDGE_URL")]
        edge: String,

        /// Only poll this shop
        #[arg(long)]
        shop: Option<String>,

        /// One JSON record per line instead of a pretty array
        #[arg(long, default_value_t = false)]
        compact: bool,
    },

    /// Maintain sites files.
    Sites {
        #[command(subcommand)]
        command: SitesCommand,
    },
}

#[derive(Subcommand, Debug)]
enum SitesCommand {
    /// Convert a product CSV export (code,url,selector,ean columns) into a sites file.
    Import {
        /// CSV file to convert
        csv: PathBuf,

        /// Shop the rows belong to
        #[arg(long, default_value = "interdiscount")]
        shop: String,

        /// Write the sites file here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let args = Args::parse();

    let result = match args.command {
        Command::Extract {
            url,
            selector,
            raw,
            html,
            timeout_secs,
        } => extract(url, selector, raw, html, timeout_secs).await,
        Command::Batch {
            sites,
            edge,
            shop,
            compact,
        } => run_batch(&sites, &edge, shop.as_deref(), compact).await,
        Command::Sites {
            command: SitesCommand::Import { csv, shop, out },
        } => import_sites(&csv, &shop, out.as_deref()),
    };

    match result {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::from(1)
        }
    }
}

async fn extract(
    url: Option<String>,
    selector: String,
    raw: bool,
    html: Option<PathBuf>,
    timeout_secs: Option<u64>,
) -> Result<ExitCode> {
    let mut builder = Client::builder();
    if let Some(secs) = timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    let client = builder.build().context("failed to build HTTP client")?;
    let raw_flag = raw.then_some("1");

    let extraction = match html {
        Some(path) => {
            let page = fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            client.extract_html(&page, &selector, raw_flag)
        }
        None => {
            let req = PriceRequest {
                url,
                selector,
                raw: raw_flag.map(str::to_string),
            };
            client.handle(&req).await?
        }
    };

    Ok(match extraction {
        Extraction::Raw(page) => {
            print!("{}", page);
            ExitCode::SUCCESS
        }
        Extraction::Price(payload) => {
            println!("{}", serde_json::to_string(&payload)?);
            ExitCode::SUCCESS
        }
        Extraction::NotFound(message) => {
            eprintln!("{}", message);
            ExitCode::from(1)
        }
    })
}

async fn run_batch(
    sites_path: &Path,
    edge: &str,
    shop: Option<&str>,
    compact: bool,
) -> Result<ExitCode> {
    let sites = SiteMap::load(sites_path)?;
    let edge = EdgeClient::new(edge)?;
    tracing::info!(skus = sites.len(), "polling edge");

    let records = batch::run(&edge, &sites, shop).await;
    let failed = records.iter().filter(|r| r.error.is_some()).count();
    tracing::info!(total = records.len(), failed, "batch finished");

    if compact {
        for record in &records {
            println!("{}", serde_json::to_string(record)?);
        }
    } else {
        println!("{}", serde_json::to_string_pretty(&records)?);
    }

    Ok(ExitCode::SUCCESS)
}

fn import_sites(csv_path: &Path, shop: &str, out: Option<&Path>) -> Result<ExitCode> {
    let file = fs::File::open(csv_path)
        .with_context(|| format!("failed to read CSV file {}", csv_path.display()))?;
    let sites = SiteMap::from_csv(file, shop)?;
    let rendered = sites.to_toml_string()?;

    match out {
        Some(path) => {
            fs::write(path, rendered)
                .with_context(|| format!("failed to write sites file {}", path.display()))?;
            tracing::info!(skus = sites.len(), path = %path.display(), "sites file written");
        }
        None => print!("{}", rendered),
    }

    Ok(ExitCode::SUCCESS)
}
