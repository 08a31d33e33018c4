//! Identity keys: the value two raw records must share to count as the same work.

use compact_str::CompactString;
use serde::Serialize;
use serde_json::Value;

use crate::raw::{RawWork, str_in};
use crate::utils::{normalize_doi, normalize_title};

/// Location ids in this namespace are HAL OAI-PMH records.
pub const HAL_PMH_PREFIX: &str = "pmh:oai:HAL:";

/// Grouping key for raw records, in priority order.
///
/// Exactly one key is derived per record. Two records with different DOIs always get
/// different keys, no matter how similar their titles are.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum IdentityKey {
    /// Normalized DOI.
    Doi(CompactString),
    /// HAL repository record id, used when there is no DOI.
    RepositoryId(CompactString),
    /// Last resort: normalized title, publication year as written, first author.
    Fuzzy {
        title: CompactString,
        year: CompactString,
        first_author: CompactString,
    },
}

/// Derives the identity key of a raw record. Never fails.
///
/// # Examples
///
/// ```
/// use scholar_metrics::{RawWork, IdentityKey, derive_key};
/// use serde_json::json;
///
/// let work = RawWork::new(json!({ "doi": "https://doi.org/10.1/ABC" }));
/// assert_eq!(derive_key(&work), IdentityKey::Doi("10.1/abc".into()));
/// ```
pub fn derive_key(work: &RawWork) -> IdentityKey {
    if let Some(doi) = work_doi(work) {
        return IdentityKey::Doi(doi.into());
    }
    if let Some(id) = repository_id(work) {
        return IdentityKey::RepositoryId(id.into());
    }
    IdentityKey::Fuzzy {
        title: fuzzy_title(work).into(),
        year: fuzzy_year(work).into(),
        first_author: first_author(work).into(),
    }
}

/// Normalized DOI from the top-level `doi` field, else `ids.doi`.
pub(crate) fn work_doi(work: &RawWork) -> Option<String> {
    work.str_at(&["doi"])
        .and_then(normalize_doi)
        .or_else(|| work.str_at(&["ids", "doi"]).and_then(normalize_doi))
}

/// First HAL record id among `locations`, then `primary_location`.
fn repository_id(work: &RawWork) -> Option<&str> {
    work.array_at(&["locations"])
        .iter()
        .find_map(hal_location_id)
        .or_else(|| work.at(&["primary_location"]).and_then(hal_location_id))
}

fn hal_location_id(location: &Value) -> Option<&str> {
    str_in(location, &["id"]).filter(|id| id.starts_with(HAL_PMH_PREFIX))
}

/// `publication_year` as text: strings verbatim, other values in their JSON form,
/// empty when absent. `2020` and `"2020"` agree; `2020.0` does not.
fn fuzzy_year(work: &RawWork) -> String {
    match work.at(&["publication_year"]) {
        None => String::new(),
        Some(Value::String(year)) => year.clone(),
        Some(year) => year.to_string(),
    }
}

fn fuzzy_title(work: &RawWork) -> String {
    let title = work
        .str_at(&["title"])
        .filter(|t| !t.is_empty())
        .or_else(|| work.str_at(&["display_name"]))
        .unwrap_or_default();
    normalize_title(title)
}

fn first_author(work: &RawWork) -> String {
    work.array_at(&["authorships"])
        .first()
        .and_then(|a| str_in(a, &["author", "display_name"]))
        .map(|name| name.trim().to_lowercase())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;
    use serde_json::json;

    #[rstest]
    #[case(json!({ "doi": "https://doi.org/10.1/Example" }))]
    #[case(json!({ "doi": "10.1/EXAMPLE" }))]
    #[case(json!({ "doi": "doi:10.1/example " }))]
    #[case(json!({ "ids": { "doi": "http://doi.org/10.1/example" } }))]
    #[case(json!({ "doi": "", "ids": { "doi": "https://doi.org/10.1/example" } }))]
    #[case(json!({ "title": "Something else", "doi": "10.1/example" }))]
    fn test_doi_keys_are_stable(#[case] value: Value) {
        let work = RawWork::new(value);
        assert_eq!(derive_key(&work), IdentityKey::Doi("10.1/example".into()));
    }

    #[test]
    fn test_different_dois_never_share_a_key() {
        let a = RawWork::new(json!({
            "doi": "10.1/a",
            "title": "Same Title",
            "publication_year": 2020
        }));
        let b = RawWork::new(json!({
            "doi": "10.1/b",
            "title": "Same Title",
            "publication_year": 2020
        }));
        assert_ne!(derive_key(&a), derive_key(&b));
    }

    #[test]
    fn test_repository_id_from_locations() {
        let work = RawWork::new(json!({
            "doi": null,
            "primary_location": { "id": "pmh:oai:HAL:hal-00000002v1" },
            "locations": [
                { "id": "mag:123" },
                { "id": "pmh:oai:HAL:hal-00000001v1" },
                { "id": "pmh:oai:HAL:hal-00000003v1" }
            ]
        }));
        assert_eq!(
            derive_key(&work),
            IdentityKey::RepositoryId("pmh:oai:HAL:hal-00000001v1".into())
        );
    }

    #[test]
    fn test_repository_id_from_primary_location() {
        let work = RawWork::new(json!({
            "locations": [{ "id": "pmh:oai:arXiv.org:2101.00001" }, "garbage"],
            "primary_location": { "id": "pmh:oai:HAL:hal-42" }
        }));
        assert_eq!(
            derive_key(&work),
            IdentityKey::RepositoryId("pmh:oai:HAL:hal-42".into())
        );
    }

    #[test]
    fn test_fuzzy_key() {
        let work = RawWork::new(json!({
            "title": "12. On the   Origin, of Species!",
            "publication_year": 1859,
            "authorships": [
                { "author": { "display_name": "  Charles DARWIN " } },
                { "author": { "display_name": "Someone Else" } }
            ]
        }));
        assert_eq!(
            derive_key(&work),
            IdentityKey::Fuzzy {
                title: "on the origin of species".into(),
                year: "1859".into(),
                first_author: "charles darwin".into(),
            }
        );
    }

    #[rstest]
    #[case(json!(2020), "2020")]
    #[case(json!("2020"), "2020")]
    #[case(json!(2020.0), "2020.0")]
    #[case(json!(" 2020"), " 2020")]
    #[case(json!("n/a"), "n/a")]
    #[case(json!(null), "")]
    fn test_fuzzy_key_uses_year_as_written(#[case] year: Value, #[case] expected: &str) {
        let work = RawWork::new(json!({ "title": "T", "publication_year": year }));
        let IdentityKey::Fuzzy { year, .. } = derive_key(&work) else {
            panic!("expected a fuzzy key");
        };
        assert_eq!(year, expected);
    }

    #[test]
    fn test_fuzzy_year_text_decides_grouping() {
        let key = |year: Value| {
            derive_key(&RawWork::new(json!({ "title": "T", "publication_year": year })))
        };
        assert_eq!(key(json!(2020)), key(json!("2020")));
        assert_ne!(key(json!(2020)), key(json!(2020.0)));
        assert_ne!(key(json!(2020)), key(json!("n/a")));
        assert_ne!(key(json!(2020)), derive_key(&RawWork::new(json!({ "title": "T" }))));
    }

    #[test]
    fn test_fuzzy_key_falls_back_to_display_name() {
        let work = RawWork::new(json!({ "display_name": "Hello World" }));
        assert_eq!(
            derive_key(&work),
            IdentityKey::Fuzzy {
                title: "hello world".into(),
                year: "".into(),
                first_author: "".into(),
            }
        );
    }

    #[test]
    fn test_empty_record_gets_a_fuzzy_key() {
        let key = derive_key(&RawWork::default());
        assert_eq!(
            key,
            IdentityKey::Fuzzy {
                title: "".into(),
                year: "".into(),
                first_author: "".into(),
            }
        );
        assert_eq!(key, derive_key(&RawWork::new(json!({}))));
    }
}
