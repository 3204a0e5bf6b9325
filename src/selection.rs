//! Ordered current values and their labels.

use std::collections::HashSet;

use crate::cache::RemoteCache;
use crate::store::OptionStore;
use crate::value::{OptionValue, SelectValue};

/// Current values in selection order, with a parallel list of labels.
///
/// Both lists always have the same length and values are never repeated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    values: Vec<OptionValue>,
    labels: Vec<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn values(&self) -> &[OptionValue] {
        &self.values
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn first(&self) -> Option<&OptionValue> {
        self.values.first()
    }

    pub fn last(&self) -> Option<&OptionValue> {
        self.values.last()
    }

    pub fn contains(&self, value: &OptionValue) -> bool {
        self.values.contains(value)
    }

    /// Append a value. Already-present values are left where they are.
    pub fn push(&mut self, value: OptionValue, label: String) {
        if self.contains(&value) {
            return;
        }
        self.values.push(value);
        self.labels.push(label);
    }

    /// Remove a value and its label. Returns whether it was present.
    pub fn remove(&mut self, value: &OptionValue) -> bool {
        match self.values.iter().position(|v| v == value) {
            Some(index) => {
                self.values.remove(index);
                self.labels.remove(index);
                true
            }
            None => false,
        }
    }

    /// Replace the whole selection with exactly one value.
    pub fn replace(&mut self, value: OptionValue, label: String) {
        self.values.clear();
        self.labels.clear();
        self.values.push(value);
        self.labels.push(label);
    }

    pub fn clear(&mut self) {
        self.values.clear();
        self.labels.clear();
    }

    /// The selection as it is emitted to the host.
    pub fn to_value(&self, multiple: bool) -> SelectValue {
        if multiple {
            SelectValue::Multiple(self.values.clone())
        } else {
            self.values
                .first()
                .cloned()
                .map(SelectValue::Single)
                .unwrap_or(SelectValue::None)
        }
    }
}

/// Resolve an externally bound value against the live options.
///
/// Values are de-duplicated in first-seen order. Each is looked up in the
/// option index, then in the cache. Unknown values become cached placeholders
/// in remote mode and are dropped otherwise. Cache entries for values absent
/// from `bound` are evicted.
pub fn resolve(
    bound: &SelectValue,
    store: &OptionStore,
    cache: &mut RemoteCache,
    remote: bool,
    multiple: bool,
) -> Selection {
    let requested = bound.to_vec();
    let mut seen: HashSet<OptionValue> = HashSet::with_capacity(requested.len());
    let mut selection = Selection::new();

    for value in requested {
        if !seen.insert(value.clone()) {
            continue;
        }
        if !multiple && !selection.is_empty() {
            continue;
        }

        if let Some(option) = store.get(&value) {
            cache.insert_missing(option);
            selection.push(value, option.label.clone());
        } else if let Some(option) = cache.get(&value) {
            let label = option.label.clone();
            selection.push(value, label);
        } else if remote {
            tracing::debug!(%value, "caching placeholder for unresolved remote value");
            let label = cache.placeholder(&value).label.clone();
            selection.push(value, label);
        } else {
            tracing::debug!(%value, "dropping value missing from options");
        }
    }

    cache.retain_values(&seen);
    selection
}
