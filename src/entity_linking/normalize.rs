//! Text normalization for person-name matching
//!
//! Canonicalizes free-text person names before comparison:
//! - Unicode NFKC normalization
//! - Lowercase conversion and trimming
//! - Professional/generational suffix removal (Jr, Sr, II-IV, PhD, MD, Esq)
//! - Embedded middle initial removal ("reid g. hoffman" -> "reid hoffman")
//! - Whitespace collapsing
//!
//! The rewrite steps run to a fixpoint, so `normalize_person_name` is idempotent.

use regex::Regex;
use smallvec::SmallVec;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

/// Trailing suffix, optionally comma-separated and optionally followed by a period
static SUFFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[\s,]+(?:jr|sr|ii|iii|iv|phd|md|esq)\.?$").unwrap()
});

/// "first m. last" with a single embedded middle initial
static MIDDLE_INITIAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\S+) \p{L}\. (\S.*)$").unwrap());

/// Normalize a person (or company) name for comparison.
///
/// Total: the worst case is the trimmed, lowercased input.
///
/// # Examples
///
/// ```
/// use company_graph::entity_linking::normalize::normalize_person_name;
///
/// assert_eq!(normalize_person_name("Reid G. Hoffman"), "reid hoffman");
/// assert_eq!(normalize_person_name("  Martin  Luther King, Jr. "), "martin luther king");
/// ```
pub fn normalize_person_name(name: &str) -> String {
    let folded: String = name.nfkc().collect();
    let mut current = collapse_whitespace(&folded.to_lowercase());

    loop {
        let next = rewrite_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn rewrite_once(s: &str) -> String {
    let without_suffix = SUFFIX_RE.replace(s, "");
    let without_initial = MIDDLE_INITIAL_RE.replacen(&without_suffix, 1, "$1 $2");
    collapse_whitespace(without_initial.trim_end_matches(','))
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Tokens of a normalized name that carry identity (length > 1).
///
/// Punctuation separates tokens; single-character tokens are initials and are
/// ignored for overlap matching.
pub fn name_tokens(normalized: &str) -> SmallVec<[&str; 4]> {
    normalized
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() > 1)
        .collect()
}
