//! Fallback records for selected values that the live options cannot resolve.

use std::collections::{HashMap, HashSet};

use crate::option::SelectOption;
use crate::value::OptionValue;

/// Snapshot of every currently selected option, keyed by value.
///
/// Lookups always prefer the live option index; the cache only answers for
/// values that left the index (remote mode, or options replaced while
/// selected). Entries are evicted once their value leaves the selection.
#[derive(Debug, Clone, Default)]
pub struct RemoteCache {
    entries: HashMap<OptionValue, SelectOption>,
}

impl RemoteCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, value: &OptionValue) -> Option<&SelectOption> {
        self.entries.get(value)
    }

    pub fn contains(&self, value: &OptionValue) -> bool {
        self.entries.contains_key(value)
    }

    /// Insert or refresh the record for `option`.
    pub fn insert(&mut self, option: &SelectOption) {
        if let Some(value) = &option.value {
            self.entries.insert(value.clone(), option.clone());
        }
    }

    /// Record `option` only if its value has no entry yet.
    pub fn insert_missing(&mut self, option: &SelectOption) {
        if let Some(value) = &option.value {
            self.entries
                .entry(value.clone())
                .or_insert_with(|| option.clone());
        }
    }

    /// Synthesize, record and return a placeholder for an unresolved value.
    pub fn placeholder(&mut self, value: &OptionValue) -> &SelectOption {
        self.entries
            .entry(value.clone())
            .or_insert_with(|| SelectOption::placeholder(value.clone()))
    }

    pub fn remove(&mut self, value: &OptionValue) {
        self.entries.remove(value);
    }

    /// Evict every entry whose value is not in `keep`.
    pub fn retain_values(&mut self, keep: &HashSet<OptionValue>) {
        self.entries.retain(|value, _| {
            let kept = keep.contains(value);
            if !kept {
                tracing::trace!(%value, "evicting cached selection record");
            }
            kept
        });
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn values(&self) -> impl Iterator<Item = &OptionValue> {
        self.entries.keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_is_cached() {
        let mut cache = RemoteCache::new();
        let label = cache.placeholder(&"x".into()).label.clone();
        assert_eq!(label, "x");
        assert!(cache.contains(&"x".into()));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_insert_missing_keeps_existing() {
        let mut cache = RemoteCache::new();
        cache.insert(&SelectOption::new("a", "first"));
        cache.insert_missing(&SelectOption::new("a", "second"));
        assert_eq!(cache.get(&"a".into()).unwrap().label, "first");
        cache.insert(&SelectOption::new("a", "third"));
        assert_eq!(cache.get(&"a".into()).unwrap().label, "third");
    }

    #[test]
    fn test_retain_values_evicts() {
        let mut cache = RemoteCache::new();
        cache.placeholder(&"a".into());
        cache.placeholder(&"b".into());
        let keep: HashSet<OptionValue> = [OptionValue::from("b")].into_iter().collect();
        cache.retain_values(&keep);
        assert!(!cache.contains(&"a".into()));
        assert!(cache.contains(&"b".into()));
    }
}
