//! Citation totals over normalized works.

use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::BTreeMap;

use crate::CanonicalWork;

/// Citations summed over the works published in one year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearCitations {
    pub year: i32,
    pub citations: u64,
}

/// Per-year citation totals, ascending by year. Works without a year are left out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct YearlyCitations(Vec<YearCitations>);

impl YearlyCitations {
    pub fn from_works(works: &[CanonicalWork]) -> Self {
        let mut by_year: BTreeMap<i32, u64> = BTreeMap::new();
        for work in works {
            if let Some(year) = work.year {
                let total = by_year.entry(year).or_default();
                *total = total.saturating_add(work.citations);
            }
        }
        Self(
            by_year
                .into_iter()
                .map(|(year, citations)| YearCitations { year, citations })
                .collect(),
        )
    }

    pub fn as_slice(&self) -> &[YearCitations] {
        &self.0
    }

    /// `(year, citations)` pairs in ascending year order.
    pub fn pairs(&self) -> Vec<(i32, u64)> {
        self.0.iter().map(|y| (y.year, y.citations)).collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Total citations and citations per year. Sums saturate at `u64::MAX`.
///
/// # Examples
///
/// ```
/// use scholar_metrics::{aggregate, AuthorId, RawWork, normalize};
/// use serde_json::json;
///
/// let author = AuthorId::parse("A1").unwrap();
/// let works: Vec<_> = [(2020, 5), (2020, 3), (2021, 7)]
///     .into_iter()
///     .map(|(year, n)| {
///         normalize(
///             &RawWork::new(json!({ "publication_year": year, "cited_by_count": n })),
///             &author,
///         )
///     })
///     .collect();
///
/// let (total, by_year) = aggregate(&works);
/// assert_eq!(total, 15);
/// assert_eq!(by_year.pairs(), vec![(2020, 8), (2021, 7)]);
/// ```
pub fn aggregate(works: &[CanonicalWork]) -> (u64, YearlyCitations) {
    let total = works
        .iter()
        .map(|w| w.citations)
        .fold(0u64, u64::saturating_add);
    (total, YearlyCitations::from_works(works))
}

/// Orders works newest first, then most cited first. Works without a year sort as
/// year 0; remaining ties keep their order.
pub fn sort_works(works: &mut [CanonicalWork]) {
    works.sort_by_key(|w| (Reverse(w.year.unwrap_or(0)), Reverse(w.citations)));
}
