//! Visibility of option rows for the current filter text.

use std::fmt;
use std::sync::Arc;

use nucleo_matcher::pattern::{CaseMatching, Normalization, Pattern};
use nucleo_matcher::{Config, Matcher, Utf32Str};
use serde::Deserialize;

use crate::option::SelectOption;
use crate::store::OptionStore;

/// Caller-supplied match predicate: `(filter_text, option) -> visible`.
#[derive(Clone)]
pub struct FilterFn(Arc<dyn Fn(&str, &SelectOption) -> bool + Send + Sync>);

impl FilterFn {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&str, &SelectOption) -> bool + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn matches(&self, text: &str, option: &SelectOption) -> bool {
        (self.0)(text, option)
    }
}

impl fmt::Debug for FilterFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FilterFn(..)")
    }
}

/// Built-in label matching strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchMode {
    /// Label contains the text.
    #[default]
    Substring,
    /// Characters of the text appear in order in the label (smart case).
    Fuzzy,
}

/// How one option is tested against the filter text.
#[derive(Debug, Clone)]
pub enum Matching<'a> {
    Predicate(&'a FilterFn),
    Substring { ignore_case: bool },
    Fuzzy,
}

/// Recompute `hidden` on every row for `text`.
///
/// Empty text shows everything. Otherwise every row is hidden, then each
/// selectable row is shown if it matches, and every shown row reveals its
/// ancestors up to the first one already visible. Group headers are never
/// matched directly.
pub fn apply_filter(store: &mut OptionStore, text: &str, matching: &Matching<'_>) {
    if text.is_empty() {
        for row in store.iter_mut() {
            row.hidden = false;
        }
        return;
    }

    let mut matcher = Matcher::new(Config::DEFAULT);
    let lowered = text.to_lowercase();
    let test = |row: &SelectOption, matcher: &mut Matcher| match matching {
        Matching::Predicate(f) => f.matches(text, row),
        Matching::Substring { ignore_case: true } => row.label.to_lowercase().contains(&lowered),
        Matching::Substring { ignore_case: false } => row.label.contains(text),
        Matching::Fuzzy => fuzzy_match_score(&row.label, text, matcher) > 0,
    };

    let (user, base) = store.rows_mut();
    for row in user.iter_mut().chain(base.iter_mut()) {
        row.hidden = row.group || !test(&*row, &mut matcher);
    }

    for slot in 0..base.len() {
        if base[slot].group || base[slot].hidden {
            continue;
        }
        let mut parent = base[slot].parent;
        while let Some(p) = parent {
            if !base[p].hidden {
                break;
            }
            base[p].hidden = false;
            parent = base[p].parent;
        }
    }
}

/// Fuzzy match using a nucleo-matcher `Pattern`, returns 0 for no match.
pub fn fuzzy_match_score(text: &str, pattern: &str, matcher: &mut Matcher) -> u32 {
    let pattern = Pattern::parse(pattern, CaseMatching::Smart, Normalization::Smart);
    let mut haystack_buf = Vec::new();
    let haystack = Utf32Str::new(text, &mut haystack_buf);
    pattern.score(haystack, matcher).unwrap_or(0)
}

/// Fuzzy match returning the sorted, de-duplicated char indices of the match.
pub fn fuzzy_match_indices(text: &str, pattern: &str, matcher: &mut Matcher) -> (u32, Vec<u32>) {
    let pattern = Pattern::parse(pattern, CaseMatching::Smart, Normalization::Smart);
    let mut haystack_buf = Vec::new();
    let haystack = Utf32Str::new(text, &mut haystack_buf);

    let mut indices = Vec::new();
    match pattern.indices(haystack, matcher, &mut indices) {
        Some(score) => {
            indices.sort_unstable();
            indices.dedup();
            (score, indices)
        }
        None => (0, Vec::new()),
    }
}
