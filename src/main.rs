//! scholar-metrics CLI - build the `metrics.json` snapshot for one OpenAlex author.
//!
//! ```bash
//! scholar-metrics --author-id A5042578790                # fetch and write data/metrics.json
//! scholar-metrics --author-id A5042578790 -o out.json    # custom output path
//! scholar-metrics --author-id A5042578790 -i works.json  # offline, from saved API results
//! ```
//!
//! Every flag can also come from the environment (or a `.env` file).

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use scholar_metrics::config::{DEFAULT_BASE_URL, DEFAULT_PER_PAGE};
use scholar_metrics::openalex::OpenAlexClient;
use scholar_metrics::report::load_raw_works;
use scholar_metrics::{AuthorId, FetchConfig, Report};

#[derive(Parser)]
#[command(name = "scholar-metrics")]
#[command(about = "Build a citation metrics snapshot for an OpenAlex author", long_about = None)]
struct Cli {
    /// OpenAlex author id (A…, bare digits, or https://openalex.org/A…)
    #[arg(long, env = "OPENALEX_AUTHOR_ID")]
    author_id: Option<String>,

    /// Contact email sent to OpenAlex (polite pool)
    #[arg(long, env = "OPENALEX_EMAIL")]
    email: Option<String>,

    /// Output file
    #[arg(short, long, default_value = "data/metrics.json")]
    output: PathBuf,

    /// Read raw works from a JSON file instead of calling the API
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Works per API page
    #[arg(long, default_value_t = DEFAULT_PER_PAGE)]
    per_page: u32,

    /// OpenAlex API root
    #[arg(long, env = "OPENALEX_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("scholar_metrics=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    let author = AuthorId::parse(cli.author_id.as_deref().unwrap_or_default())?;

    let works = match &cli.input {
        Some(path) => load_raw_works(path)
            .with_context(|| format!("reading works from {}", path.display()))?,
        None => {
            let config = FetchConfig::default()
                .with_email(cli.email)
                .with_base_url(&cli.base_url)
                .with_per_page(cli.per_page);
            OpenAlexClient::new(config)?
                .fetch_author_works(&author)
                .await
                .context("fetching works from OpenAlex")?
        }
    };

    let report = Report::build(&author, works, chrono::Utc::now());
    report
        .write_to(&cli.output)
        .with_context(|| format!("writing {}", cli.output.display()))?;

    info!(
        output = %cli.output.display(),
        "Fetched {} works for {}, total citations={}",
        report.papers_tracked,
        author,
        report.total_citations
    );
    Ok(())
}
