//! Build a static citation-metrics snapshot for one OpenAlex author.
//!
//! `scholar_metrics` takes the (noisy, duplicated) list of works OpenAlex returns for an
//! author and turns it into a single report that a static site can read directly.
//!
//! # Pipeline
//!
//! 1. **Fetch** every work for the author through cursor pagination
//!    ([`openalex::OpenAlexClient`], `fetch` feature).
//! 2. **Deduplicate** records that denote the same work. Records are grouped by an
//!    [`IdentityKey`](dedupe::IdentityKey) (DOI, then HAL repository id, then a fuzzy
//!    title/year/first-author key) and one winner is kept per group.
//! 3. **Normalize** each winner into a [`CanonicalWork`] with a fixed schema and
//!    documented defaults for every missing field.
//! 4. **Aggregate** total citations and citations per publication year.
//! 5. **Write** the [`Report`] as pretty-printed JSON.
//!
//! Steps 2–4 are pure functions over already fetched records and never fail.
//!
//! # Basic Usage
//!
//! ```rust
//! use scholar_metrics::{AuthorId, RawWork, Report};
//! use serde_json::json;
//!
//! let author = AuthorId::parse("https://openalex.org/A5042578790").unwrap();
//! let works = vec![
//!     RawWork::new(json!({
//!         "id": "https://openalex.org/W1",
//!         "doi": "https://doi.org/10.1/example",
//!         "title": "Example Article",
//!         "publication_year": 2021,
//!         "cited_by_count": 12
//!     })),
//!     RawWork::new(json!({
//!         "id": "https://openalex.org/W2",
//!         "doi": "10.1/EXAMPLE",
//!         "title": "Example Article",
//!         "publication_year": 2021,
//!         "cited_by_count": 3
//!     })),
//! ];
//!
//! let report = Report::build(&author, works, chrono::Utc::now());
//! assert_eq!(report.papers_tracked, 1);
//! assert_eq!(report.total_citations, 12);
//! ```
//!
//! # Error Handling
//!
//! Malformed upstream fields are never errors: they degrade to placeholder values.
//! The crate-level [`Result`] wraps [`MetricsError`] for the few operations that can
//! fail (configuration, network, and file I/O):
//!
//! ```rust
//! use scholar_metrics::{AuthorId, MetricsError};
//!
//! match AuthorId::parse("   ") {
//!     Err(MetricsError::MissingAuthorId) => eprintln!("set OPENALEX_AUTHOR_ID"),
//!     Err(e) => eprintln!("Other error: {}", e),
//!     Ok(id) => println!("author {}", id),
//! }
//! ```

use thiserror::Error;

pub mod aggregate;
pub mod config;
pub mod dedupe;
pub mod normalize;
#[cfg(feature = "fetch")]
pub mod openalex;
pub mod raw;
mod regex;
pub mod report;
mod utils;

// Reexports
pub use aggregate::{YearCitations, YearlyCitations, aggregate};
pub use config::{AuthorId, FetchConfig};
pub use dedupe::{DuplicateGroup, IdentityKey, dedupe, derive_key, find_duplicates};
pub use normalize::{CanonicalWork, OaStatus, normalize};
pub use raw::RawWork;
pub use report::Report;

/// A specialized Result type for metrics operations.
pub type Result<T> = std::result::Result<T, MetricsError>;

/// Errors that can abort a metrics run.
///
/// None of these originate inside deduplication, normalization, or aggregation.
#[derive(Error, Debug)]
pub enum MetricsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Missing OpenAlex author id (set OPENALEX_AUTHOR_ID or pass --author-id)")]
    MissingAuthorId,

    #[cfg(feature = "fetch")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("OpenAlex API error: status {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
