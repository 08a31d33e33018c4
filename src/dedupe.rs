//! Works deduplicator implementation.
//!
//! OpenAlex frequently indexes the same manuscript more than once: a publisher record
//! with a DOI, a HAL or other repository mirror, a preprint. This module groups raw
//! records that denote the same work and keeps one winner per group.
//!
//! ## Grouping
//!
//! Every record gets exactly one [`IdentityKey`], tried in this order:
//!
//! 1. Normalized DOI (`doi`, else `ids.doi`)
//! 2. HAL repository record id (`locations[*].id`, then `primary_location.id`)
//! 3. Normalized title + publication year + first author
//!
//! DOI equality is authoritative: records with different DOIs are never merged.
//!
//! ## Winner Selection
//!
//! Inside a group the record with the highest [`Ranking`] wins. Rankings compare
//! lexicographically:
//!
//! 1. has a DOI
//! 2. citation count
//! 3. best-available location is not a repository
//!
//! Ties keep the record that came first in the input. Citation counts of losing
//! records are not merged into the winner.
//!
//! ## Usage
//!
//! ```rust
//! use scholar_metrics::{RawWork, dedupe::{dedupe, find_duplicates}};
//! use serde_json::json;
//!
//! let works = vec![
//!     RawWork::new(json!({ "id": "W1", "doi": "10.1/x", "cited_by_count": 10 })),
//!     RawWork::new(json!({ "id": "W2", "doi": "https://doi.org/10.1/X", "cited_by_count": 4 })),
//!     RawWork::new(json!({ "id": "W3", "title": "Unrelated" })),
//! ];
//!
//! let groups = find_duplicates(works.clone());
//! assert_eq!(groups.len(), 2);
//! assert_eq!(groups[0].duplicates.len(), 1);
//!
//! let unique = dedupe(works);
//! assert_eq!(unique.len(), 2);
//! ```

mod key;

pub use key::{HAL_PMH_PREFIX, IdentityKey, derive_key};

use serde::Serialize;
use std::cmp::Reverse;
use std::collections::HashMap;

use crate::RawWork;
use crate::raw::coerce_int;
use key::work_doi;

/// A group of raw records sharing one identity key.
#[derive(Debug, Clone, Serialize)]
pub struct DuplicateGroup {
    /// The key every member of the group derived.
    pub key: IdentityKey,
    /// The winning record.
    pub unique: RawWork,
    /// The losing records, in input order.
    pub duplicates: Vec<RawWork>,
}

/// Composite ranking used to pick the winner of a duplicate group.
///
/// Field order is comparison order, so the derived `Ord` is the tie-break rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ranking {
    pub has_doi: bool,
    pub citations: u64,
    /// Set when the best-available location's source is not a repository.
    pub publisher_bonus: bool,
}

impl Ranking {
    pub fn of(work: &RawWork) -> Self {
        Self {
            has_doi: work_doi(work).is_some(),
            citations: citation_count(work),
            publisher_bonus: !is_repository_source(work),
        }
    }
}

/// Groups records by identity key and returns one group per key.
///
/// Groups are ordered by the first appearance of their key in `works`.
pub fn find_duplicates(works: Vec<RawWork>) -> Vec<DuplicateGroup> {
    let buckets = group_by_key(&works);
    let winners: Vec<usize> = buckets
        .iter()
        .map(|(_, members)| {
            let candidates: Vec<&RawWork> = members.iter().map(|&i| &works[i]).collect();
            members[select_winner(&candidates).unwrap_or(0)]
        })
        .collect();

    let mut slots: Vec<Option<RawWork>> = works.into_iter().map(Some).collect();

    buckets
        .into_iter()
        .zip(winners)
        .map(|((key, members), winner)| {
            let unique = slots[winner].take().unwrap_or_default();
            let duplicates = members
                .iter()
                .filter(|&&i| i != winner)
                .filter_map(|&i| slots[i].take())
                .collect();
            DuplicateGroup {
                key,
                unique,
                duplicates,
            }
        })
        .collect()
}

/// Keeps one record per identity key.
///
/// Running it on its own output returns the output unchanged.
pub fn dedupe(works: Vec<RawWork>) -> Vec<RawWork> {
    let total = works.len();
    let unique: Vec<RawWork> = find_duplicates(works)
        .into_iter()
        .map(|group| group.unique)
        .collect();
    tracing::debug!(total, unique = unique.len(), "deduplicated works");
    unique
}

/// Position of the highest-ranked candidate. The earliest candidate wins ties.
pub fn select_winner(candidates: &[&RawWork]) -> Option<usize> {
    candidates
        .iter()
        .enumerate()
        .min_by_key(|(_, work)| Reverse(Ranking::of(work)))
        .map(|(position, _)| position)
}

fn group_by_key(works: &[RawWork]) -> Vec<(IdentityKey, Vec<usize>)> {
    let mut positions: HashMap<IdentityKey, usize> = HashMap::new();
    let mut buckets: Vec<(IdentityKey, Vec<usize>)> = Vec::new();

    for (index, work) in works.iter().enumerate() {
        let key = derive_key(work);
        match positions.get(&key) {
            Some(&bucket) => buckets[bucket].1.push(index),
            None => {
                positions.insert(key.clone(), buckets.len());
                buckets.push((key, vec![index]));
            }
        }
    }

    buckets
}

fn citation_count(work: &RawWork) -> u64 {
    work.at(&["cited_by_count"])
        .and_then(coerce_int)
        .and_then(|n| u64::try_from(n).ok())
        .unwrap_or(0)
}

/// Source type of `best_oa_location`, else `primary_location`, is `"repository"`.
fn is_repository_source(work: &RawWork) -> bool {
    work.non_empty_object_at(&["best_oa_location"])
        .or_else(|| work.non_empty_object_at(&["primary_location"]))
        .and_then(|location| crate::raw::str_in(location, &["source", "type"]))
        .is_some_and(|source_type| source_type.eq_ignore_ascii_case("repository"))
}
