//! The metrics report and its JSON file.
//!
//! # Example
//!
//! ```no_run
//! use scholar_metrics::{AuthorId, Report, report::load_raw_works};
//!
//! let author = AuthorId::parse("A5042578790").unwrap();
//! let works = load_raw_works("fixtures/works.json").unwrap();
//! let report = Report::build(&author, works, chrono::Utc::now());
//! report.write_to("data/metrics.json").unwrap();
//! ```

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::fs;
use std::path::Path;

use crate::aggregate::{YearlyCitations, aggregate, sort_works};
use crate::{AuthorId, CanonicalWork, MetricsError, RawWork, Result, dedupe, normalize};

/// Snapshot of one author's publication metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    #[serde(serialize_with = "serialize_timestamp")]
    pub updated_at: DateTime<Utc>,
    pub author_openalex_id: AuthorId,
    pub papers_tracked: usize,
    pub total_citations: u64,
    pub citations_by_year: YearlyCitations,
    /// Newest first, then most cited first.
    pub works: Vec<CanonicalWork>,
}

impl Report {
    /// Runs deduplication, normalization, and aggregation over fetched records.
    pub fn build(author: &AuthorId, works: Vec<RawWork>, updated_at: DateTime<Utc>) -> Self {
        let fetched = works.len();
        let mut works: Vec<CanonicalWork> = dedupe(works)
            .iter()
            .map(|work| normalize(work, author))
            .collect();
        sort_works(&mut works);

        let (total_citations, citations_by_year) = aggregate(&works);
        tracing::info!(
            author = author.as_str(),
            fetched,
            tracked = works.len(),
            total_citations,
            "built metrics report"
        );

        Self {
            updated_at,
            author_openalex_id: author.clone(),
            papers_tracked: works.len(),
            total_citations,
            citations_by_year,
            works,
        }
    }

    /// Pretty-printed JSON, non-ASCII characters kept as-is.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Writes the report to `path`, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns `MetricsError::Io` if the directory or file cannot be written.
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut json = self.to_json()?;
        json.push('\n');
        fs::write(path, json)?;
        tracing::debug!(path = %path.display(), "wrote metrics report");
        Ok(())
    }
}

fn serialize_timestamp<S: Serializer>(
    timestamp: &DateTime<Utc>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&timestamp.to_rfc3339_opts(SecondsFormat::Secs, false))
}

/// Reads raw works from a JSON file.
///
/// Accepts a bare array of works or an API page object with a `results` array.
///
/// # Errors
///
/// Returns `MetricsError::Io` if the file cannot be read, `MetricsError::Json` if it is not
/// JSON, and `MetricsError::InvalidInput` if it has neither shape.
pub fn load_raw_works(path: impl AsRef<Path>) -> Result<Vec<RawWork>> {
    let text = fs::read_to_string(path)?;
    parse_raw_works(&text)
}

/// Parses raw works from JSON text. See [`load_raw_works`].
pub fn parse_raw_works(text: &str) -> Result<Vec<RawWork>> {
    match serde_json::from_str::<Value>(text)? {
        Value::Array(items) => Ok(items.into_iter().map(RawWork::new).collect()),
        Value::Object(mut page) => match page.remove("results") {
            Some(Value::Array(items)) => Ok(items.into_iter().map(RawWork::new).collect()),
            _ => Err(MetricsError::InvalidInput(
                "expected a \"results\" array".to_string(),
            )),
        },
        _ => Err(MetricsError::InvalidInput(
            "expected an array of works or an object with \"results\"".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 17, 8, 30, 0).unwrap()
    }

    fn sample_works() -> Vec<RawWork> {
        [
            json!({
                "id": "https://openalex.org/W1",
                "doi": "https://doi.org/10.1/example",
                "title": "Shared Work (repository copy)",
                "publication_year": 2020,
                "cited_by_count": 10,
                "primary_location": { "source": { "display_name": "HAL", "type": "repository" } }
            }),
            json!({
                "id": "https://openalex.org/W2",
                "doi": "https://doi.org/10.1/EXAMPLE",
                "title": "Shared Work",
                "publication_year": 2020,
                "cited_by_count": 4,
                "primary_location": { "source": { "display_name": "Journal", "type": "journal" } }
            }),
            json!({
                "id": "https://openalex.org/W3",
                "title": "Later Work",
                "publication_year": 2022,
                "cited_by_count": 2,
                "authorships": [
                    { "author": { "id": "https://openalex.org/A1", "display_name": "Self" } },
                    { "author": { "id": "https://openalex.org/A2", "display_name": "éva kovács" } }
                ]
            }),
            json!({ "id": "https://openalex.org/W4", "title": "Undated", "cited_by_count": 1 }),
        ]
        .into_iter()
        .map(RawWork::new)
        .collect()
    }

    #[test]
    fn test_build_report() {
        let author = AuthorId::parse("A1").unwrap();
        let report = Report::build(&author, sample_works(), fixed_time());

        assert_eq!(report.papers_tracked, 3);
        assert_eq!(report.total_citations, 13);
        assert_eq!(report.citations_by_year.pairs(), vec![(2020, 10), (2022, 2)]);

        let ids: Vec<_> = report.works.iter().map(|w| w.id.as_deref().unwrap()).collect();
        assert_eq!(ids, vec!["W3", "W1", "W4"]);
        assert_eq!(report.works[0].coauthors, vec!["Eva Kovacs"]);
        assert_eq!(report.works[1].venue, "HAL");
    }

    #[test]
    fn test_report_json_shape() {
        let author = AuthorId::parse("A1").unwrap();
        let report = Report::build(&author, sample_works(), fixed_time());
        let value: Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();

        assert_eq!(value["updated_at"], json!("2024-05-17T08:30:00+00:00"));
        assert_eq!(value["author_openalex_id"], json!("A1"));
        assert_eq!(value["papers_tracked"], json!(3));
        assert_eq!(value["total_citations"], json!(13));
        assert_eq!(
            value["citations_by_year"],
            json!([{ "year": 2020, "citations": 10 }, { "year": 2022, "citations": 2 }])
        );
        let keys: Vec<_> = value["works"][0]
            .as_object()
            .unwrap()
            .keys()
            .cloned()
            .collect();
        for key in [
            "id", "title", "year", "venue", "citations", "doi", "url", "hal_url", "type",
            "is_oa", "oa_status", "fwci", "citation_norm_percentile", "topics", "keywords",
            "coauthors", "source",
        ] {
            assert!(keys.iter().any(|k| k == key), "missing key {key}");
        }
    }

    #[test]
    fn test_build_report_with_out_of_range_citation_counts() {
        let author = AuthorId::parse("A1").unwrap();
        let works: Vec<RawWork> = ["First", "Second", "Third"]
            .into_iter()
            .map(|title| {
                RawWork::new(json!({
                    "title": title,
                    "publication_year": 2021,
                    "cited_by_count": 1e19
                }))
            })
            .collect();

        let report = Report::build(&author, works, fixed_time());
        assert_eq!(report.papers_tracked, 3);
        assert_eq!(report.total_citations, u64::MAX);
        assert_eq!(report.citations_by_year.pairs(), vec![(2021, u64::MAX)]);
    }

    #[test]
    fn test_write_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("metrics.json");

        let author = AuthorId::parse("A1").unwrap();
        let report = Report::build(&author, sample_works(), fixed_time());
        report.write_to(&path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("Eva Kovacs"));
        assert!(text.contains("\"venue\": \"—\""));
        let back: Report = serde_json::from_str(&text).unwrap();
        assert_eq!(back, report);
    }

    #[test]
    fn test_parse_raw_works_shapes() {
        let works = parse_raw_works(r#"[{"id": "W1"}, {"id": "W2"}]"#).unwrap();
        assert_eq!(works.len(), 2);

        let works =
            parse_raw_works(r#"{"meta": {"next_cursor": null}, "results": [{"id": "W1"}]}"#)
                .unwrap();
        assert_eq!(works.len(), 1);

        assert!(matches!(
            parse_raw_works(r#"{"meta": {}}"#),
            Err(MetricsError::InvalidInput(_))
        ));
        assert!(matches!(
            parse_raw_works("42"),
            Err(MetricsError::InvalidInput(_))
        ));
        assert!(matches!(parse_raw_works("{"), Err(MetricsError::Json(_))));
    }

    #[test]
    fn test_load_raw_works_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load_raw_works(dir.path().join("absent.json")),
            Err(MetricsError::Io(_))
        ));
    }
}
