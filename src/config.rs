//! Run configuration.
//!
//! Nothing in the library reads the process environment: the binary resolves flags and
//! environment variables once and passes an [`AuthorId`] and a [`FetchConfig`] down.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::utils::OPENALEX_URL_PREFIX;
use crate::{MetricsError, Result};

/// Default OpenAlex API root.
pub const DEFAULT_BASE_URL: &str = "https://api.openalex.org";

/// Default number of works requested per page (the API maximum).
pub const DEFAULT_PER_PAGE: u32 = 200;

/// A normalized OpenAlex author identifier such as `A5042578790`.
///
/// # Examples
///
/// ```
/// use scholar_metrics::AuthorId;
///
/// let id = AuthorId::parse("https://openalex.org/a5042578790").unwrap();
/// assert_eq!(id.as_str(), "A5042578790");
///
/// let id = AuthorId::parse("5042578790").unwrap();
/// assert_eq!(id.as_str(), "A5042578790");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthorId(String);

impl AuthorId {
    /// Normalizes a user-supplied author id.
    ///
    /// Accepts bare ids, OpenAlex URLs, any casing, and ids missing the leading `A`.
    ///
    /// # Errors
    ///
    /// Returns [`MetricsError::MissingAuthorId`] when the input is blank.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let id = trimmed
            .strip_prefix(OPENALEX_URL_PREFIX)
            .unwrap_or(trimmed)
            .trim()
            .to_uppercase();

        if id.is_empty() {
            return Err(MetricsError::MissingAuthorId);
        }
        if id.starts_with('A') {
            Ok(Self(id))
        } else {
            Ok(Self(format!("A{id}")))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether an OpenAlex author reference (URL or bare id) points at this author.
    pub fn matches(&self, other: &str) -> bool {
        other.strip_prefix(OPENALEX_URL_PREFIX).unwrap_or(other) == self.0
    }
}

impl fmt::Display for AuthorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for AuthorId {
    type Err = MetricsError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Settings for talking to the OpenAlex API.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// API root, without a trailing slash.
    pub base_url: String,
    /// Contact address sent as `mailto` to join the polite pool.
    pub email: Option<String>,
    /// Works per page.
    pub per_page: u32,
    /// Pause between consecutive page requests.
    pub page_delay: Duration,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            email: None,
            per_page: DEFAULT_PER_PAGE,
            page_delay: Duration::from_millis(150),
            timeout: Duration::from_secs(30),
        }
    }
}

impl FetchConfig {
    /// Sets the contact email. Blank values are ignored.
    #[must_use]
    pub fn with_email(mut self, email: Option<String>) -> Self {
        self.email = email
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty());
        self
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Sets the page size, clamped to the API's accepted range of 1..=200.
    #[must_use]
    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page.clamp(1, DEFAULT_PER_PAGE);
        self
    }
}
