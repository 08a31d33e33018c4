//! Mapping raw records into the stable output schema.
//!
//! [`normalize`] is total: any field that is missing or has an unexpected type is
//! replaced by a documented default.
//!
//! | Field        | Source                                                     | Default     |
//! |--------------|------------------------------------------------------------|-------------|
//! | `title`      | `title`                                                    | `"Untitled"`|
//! | `year`       | `publication_year`                                         | `null`      |
//! | `venue`      | `primary_location.source`, `best_oa_location.source`       | `"—"`       |
//! | `citations`  | `cited_by_count`                                           | `0`         |
//! | `url`        | `ids.doi`, landing page, OpenAlex id                       | `"#"`       |
//! | `type`       | `type`, `type_crossref`                                    | `"—"`       |
//! | `oa_status`  | `open_access.oa_status`                                    | `unknown`   |

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::AuthorId;
use crate::raw::{RawWork, coerce_float, coerce_int, lookup, str_in};
use crate::utils::{
    OPENALEX_URL_PREFIX, contains_hal_host, display_doi, normalize_person_name,
    strip_openalex_prefix,
};

/// Placeholder for unknown venue and type.
pub const UNKNOWN: &str = "—";

/// Fallback title.
pub const UNTITLED: &str = "Untitled";

/// Fallback URL when a record links nowhere.
pub const NO_URL: &str = "#";

pub const MAX_TOPICS: usize = 3;
pub const MAX_KEYWORDS: usize = 10;

/// Open-access category as reported by OpenAlex.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OaStatus {
    Gold,
    Green,
    Hybrid,
    Bronze,
    Diamond,
    Closed,
    #[default]
    Unknown,
    /// Any status this crate does not know about, kept verbatim (lower-cased).
    Other(String),
}

impl OaStatus {
    pub fn as_str(&self) -> &str {
        match self {
            OaStatus::Gold => "gold",
            OaStatus::Green => "green",
            OaStatus::Hybrid => "hybrid",
            OaStatus::Bronze => "bronze",
            OaStatus::Diamond => "diamond",
            OaStatus::Closed => "closed",
            OaStatus::Unknown => "unknown",
            OaStatus::Other(s) => s.as_str(),
        }
    }

    fn parse(raw: &str) -> Self {
        let status = raw.trim().to_lowercase();
        match status.as_str() {
            "" | "unknown" => OaStatus::Unknown,
            "gold" => OaStatus::Gold,
            "green" => OaStatus::Green,
            "hybrid" => OaStatus::Hybrid,
            "bronze" => OaStatus::Bronze,
            "diamond" => OaStatus::Diamond,
            "closed" => OaStatus::Closed,
            _ => OaStatus::Other(status),
        }
    }
}

impl From<String> for OaStatus {
    fn from(s: String) -> Self {
        OaStatus::parse(&s)
    }
}

impl From<OaStatus> for String {
    fn from(status: OaStatus) -> Self {
        status.as_str().to_string()
    }
}

/// The normalized record of one work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalWork {
    /// OpenAlex work id without the URL prefix.
    pub id: Option<String>,
    pub title: String,
    pub year: Option<i32>,
    pub venue: String,
    pub citations: u64,
    /// DOI without the resolver prefix.
    pub doi: Option<String>,
    /// Best link to the work. Never empty.
    pub url: String,
    /// Link to a HAL deposit of the work, when one was found.
    pub hal_url: Option<String>,
    #[serde(rename = "type")]
    pub work_type: String,
    pub is_oa: bool,
    pub oa_status: OaStatus,
    /// Field-weighted citation impact.
    pub fwci: Option<f64>,
    pub citation_norm_percentile: Option<f64>,
    pub topics: Vec<String>,
    pub keywords: Vec<String>,
    pub coauthors: Vec<String>,
    pub source: String,
}

/// Normalizes one raw record. `author` is the subject of the report and is left out
/// of `coauthors`.
///
/// # Examples
///
/// ```
/// use scholar_metrics::{AuthorId, RawWork, normalize};
/// use serde_json::json;
///
/// let author = AuthorId::parse("A1").unwrap();
/// let work = normalize(&RawWork::new(json!({})), &author);
/// assert_eq!(work.title, "Untitled");
/// assert_eq!(work.url, "#");
/// ```
pub fn normalize(work: &RawWork, author: &AuthorId) -> CanonicalWork {
    CanonicalWork {
        id: work.str_at(&["id"]).map(|id| strip_openalex_prefix(id).to_string()),
        title: title(work),
        year: work
            .at(&["publication_year"])
            .and_then(coerce_int)
            .and_then(|y| i32::try_from(y).ok()),
        venue: venue(work),
        citations: work
            .at(&["cited_by_count"])
            .and_then(coerce_int)
            .and_then(|n| u64::try_from(n).ok())
            .unwrap_or(0),
        doi: doi(work),
        url: best_url(work),
        hal_url: hal_url(work),
        work_type: work_type(work),
        is_oa: work
            .at(&["open_access", "is_oa"])
            .and_then(Value::as_bool)
            .unwrap_or(false),
        oa_status: work
            .str_at(&["open_access", "oa_status"])
            .map(OaStatus::parse)
            .unwrap_or_default(),
        fwci: work.at(&["fwci"]).and_then(coerce_float),
        citation_norm_percentile: work
            .at(&["citation_normalized_percentile", "value"])
            .and_then(Value::as_f64),
        topics: ranked_names(work.array_at(&["topics"]), MAX_TOPICS),
        keywords: ranked_names(work.array_at(&["keywords"]), MAX_KEYWORDS),
        coauthors: coauthors(work, author),
        source: "OpenAlex".to_string(),
    }
}

fn title(work: &RawWork) -> String {
    work.str_at(&["title"])
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(UNTITLED)
        .to_string()
}

fn doi(work: &RawWork) -> Option<String> {
    work.str_at(&["doi"])
        .filter(|d| !d.is_empty())
        .or_else(|| work.str_at(&["ids", "doi"]))
        .and_then(display_doi)
}

fn non_blank(s: &str) -> Option<&str> {
    let s = s.trim();
    (!s.is_empty()).then_some(s)
}

fn venue(work: &RawWork) -> String {
    work.str_at(&["primary_location", "source", "display_name"])
        .and_then(non_blank)
        .or_else(|| {
            work.str_at(&["best_oa_location", "source", "display_name"])
                .and_then(non_blank)
        })
        .unwrap_or(UNKNOWN)
        .to_string()
}

/// DOI link, else landing page, else the OpenAlex page of the work.
fn best_url(work: &RawWork) -> String {
    let is_link = |s: &&str| s.starts_with("http");

    if let Some(url) = work.str_at(&["ids", "doi"]).filter(is_link) {
        return url.to_string();
    }
    if let Some(url) = work
        .str_at(&["primary_location", "landing_page_url"])
        .filter(is_link)
    {
        return url.to_string();
    }
    match work.str_at(&["id"]) {
        Some(id) if id.starts_with("http") => id.to_string(),
        Some(id) => format!("{}{}", OPENALEX_URL_PREFIX, strip_openalex_prefix(id)),
        None => NO_URL.to_string(),
    }
}

const HAL_ID_FIELDS: [&str; 5] = ["openalex", "doi", "pmid", "pmcid", "mag"];

fn hal_url(work: &RawWork) -> Option<String> {
    let ids = HAL_ID_FIELDS.iter().map(|k| work.str_at(&["ids", *k]));
    let primary = ["landing_page_url", "pdf_url"]
        .iter()
        .map(|k| work.str_at(&["primary_location", *k]));
    let legacy = std::iter::once(work.str_at(&["host_venue", "url"]));

    ids.chain(primary)
        .chain(legacy)
        .flatten()
        .find(|candidate| contains_hal_host(candidate))
        .map(str::to_string)
}

fn work_type(work: &RawWork) -> String {
    work.str_at(&["type"])
        .filter(|t| !t.is_empty())
        .or_else(|| work.str_at(&["type_crossref"]))
        .and_then(non_blank)
        .unwrap_or(UNKNOWN)
        .to_string()
}

/// Display names of the `top_k` highest-scored entries. Missing scores count as 0.
fn ranked_names(entries: &[Value], top_k: usize) -> Vec<String> {
    entries
        .iter()
        .sorted_by(|a, b| score(b).total_cmp(&score(a)))
        .take(top_k)
        .filter_map(|entry| str_in(entry, &["display_name"]).and_then(non_blank))
        .map(str::to_string)
        .collect()
}

fn score(entry: &Value) -> f64 {
    lookup(entry, &["score"]).and_then(Value::as_f64).unwrap_or(0.0)
}

fn coauthors(work: &RawWork, author: &AuthorId) -> Vec<String> {
    work.array_at(&["authorships"])
        .iter()
        .filter(|a| !str_in(a, &["author", "id"]).is_some_and(|id| author.matches(id)))
        .filter_map(|a| str_in(a, &["author", "display_name"]).and_then(non_blank))
        .map(normalize_person_name)
        .collect()
}
