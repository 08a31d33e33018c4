use crate::regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::canonical_combining_class;

/// Prefix OpenAlex puts in front of every entity id.
pub(crate) const OPENALEX_URL_PREFIX: &str = "https://openalex.org/";

static LEADING_ENUMERATOR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\d+\s*[.\-:)]\s*").unwrap());

const DOI_PREFIXES: [&str; 3] = ["https://doi.org/", "http://doi.org/", "doi:"];

/// Formats a DOI into its comparison form: lower-cased, resolver and scheme prefixes
/// removed, trimmed. Returns `None` when nothing is left.
///
/// # Arguments
///
/// * `doi_str` - The DOI string to format
pub(crate) fn normalize_doi(doi_str: &str) -> Option<String> {
    let mut doi = doi_str.trim().to_lowercase();
    for prefix in DOI_PREFIXES {
        doi = doi.replace(prefix, "");
    }
    let doi = doi.trim();
    (!doi.is_empty()).then(|| doi.to_string())
}

/// Formats a DOI for display: trimmed, resolver prefix removed, case kept.
pub(crate) fn display_doi(doi_str: &str) -> Option<String> {
    let doi = doi_str.trim();
    let doi = doi
        .strip_prefix("https://doi.org/")
        .or_else(|| doi.strip_prefix("http://doi.org/"))
        .unwrap_or(doi)
        .trim();
    (!doi.is_empty()).then(|| doi.to_string())
}

/// Removes the OpenAlex URL prefix from an entity id.
pub(crate) fn strip_openalex_prefix(id: &str) -> &str {
    id.strip_prefix(OPENALEX_URL_PREFIX).unwrap_or(id)
}

/// Normalizes a title for fuzzy identity comparison.
///
/// Lower-cases, drops a leading chapter number such as `"17. "` or `"3) "`, collapses
/// whitespace and strips punctuation. Letters and digits of any script are kept.
pub(crate) fn normalize_title(title: &str) -> String {
    let lowered = title.trim().to_lowercase();
    let without_enumerator = LEADING_ENUMERATOR_REGEX.replace(&lowered, "");
    collapse_whitespace(&without_enumerator)
        .chars()
        .filter(|c| is_word_char(*c) || c.is_whitespace())
        .collect::<String>()
        .trim()
        .to_string()
}

/// Whether `s` contains a `hal.<something>` host label, such as `hal.science` or
/// `inria.hal.science`, matched case-insensitively on a word boundary.
pub(crate) fn contains_hal_host(s: &str) -> bool {
    s.char_indices().any(|(start, _)| {
        let rest = &s[start..];
        rest.get(..4).is_some_and(|head| head.eq_ignore_ascii_case("hal."))
            && !s[..start].chars().next_back().is_some_and(is_word_char)
            && rest[4..].chars().next().is_some_and(is_word_char)
    })
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Canonicalizes a person name for display.
///
/// Folds compatibility characters, strips accents, collapses whitespace and applies
/// title case, so `"  josé   GARCÍA "` becomes `"Jose Garcia"`.
pub(crate) fn normalize_person_name(name: &str) -> String {
    if name.is_empty() {
        return String::new();
    }
    let folded: String = name
        .nfkd()
        .filter(|c| canonical_combining_class(*c) == 0)
        .collect();
    title_case(&collapse_whitespace(&folded))
}

pub(crate) fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Upper-cases the first cased character of every word and lower-cases the rest.
/// A word starts after any character that has no case (space, hyphen, apostrophe, digit).
fn title_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut previous_cased = false;
    for c in s.chars() {
        let cased = c.is_lowercase() || c.is_uppercase();
        if cased && !previous_cased {
            result.extend(c.to_uppercase());
        } else if cased {
            result.extend(c.to_lowercase());
        } else {
            result.push(c);
        }
        previous_cased = cased;
    }
    result
}
