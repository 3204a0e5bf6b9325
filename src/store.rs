//! The live option list: user-created options followed by tree-built options,
//! plus the value index over both.

use std::collections::{HashMap, HashSet};

use serde_json::Value;

use crate::option::{KeyConfig, SelectOption};
use crate::tree::{build_options, CarriedFlags};
use crate::value::OptionValue;

/// Position of a row in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    User(usize),
    Base(usize),
}

#[derive(Debug, Clone, Default)]
pub struct OptionStore {
    /// Options committed through the creatable flow, in creation order.
    user: Vec<SelectOption>,
    /// Options flattened from the raw descriptors.
    base: Vec<SelectOption>,
    index: HashMap<OptionValue, Slot>,
    /// Stringified values of every indexed option, for creatable matching.
    known: HashSet<String>,
}

impl OptionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the tree-built options, carrying transient flags over by value.
    pub fn rebuild(&mut self, raw: &[Value], keys: &KeyConfig) {
        let base = build_options(raw, keys, |value| {
            self.get(value).map(|row| CarriedFlags {
                hidden: row.hidden,
                hitting: row.hitting,
            })
        });
        self.base = base;
        self.reindex();
    }

    fn reindex(&mut self) {
        self.index.clear();
        self.known.clear();
        let user = self.user.iter().enumerate().map(|(i, r)| (Slot::User(i), r));
        let base = self.base.iter().enumerate().map(|(i, r)| (Slot::Base(i), r));
        for (slot, row) in user.chain(base) {
            if row.group {
                continue;
            }
            if let Some(value) = &row.value {
                self.index.entry(value.clone()).or_insert(slot);
                self.known.insert(value.to_string());
            }
        }
    }

    fn row(&self, slot: Slot) -> &SelectOption {
        match slot {
            Slot::User(i) => &self.user[i],
            Slot::Base(i) => &self.base[i],
        }
    }

    /// Look up the live option carrying `value`.
    pub fn get(&self, value: &OptionValue) -> Option<&SelectOption> {
        self.index.get(value).map(|slot| self.row(*slot))
    }

    pub fn contains(&self, value: &OptionValue) -> bool {
        self.index.contains_key(value)
    }

    /// Whether any indexed option stringifies to `text`.
    pub fn is_known(&self, text: &str) -> bool {
        self.known.contains(text)
    }

    /// All rows in display order: user options first.
    pub fn iter(&self) -> impl Iterator<Item = &SelectOption> {
        self.user.iter().chain(self.base.iter())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut SelectOption> {
        self.user.iter_mut().chain(self.base.iter_mut())
    }

    pub fn len(&self) -> usize {
        self.user.len() + self.base.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn user_options(&self) -> &[SelectOption] {
        &self.user
    }

    pub fn is_user_option(&self, value: &OptionValue) -> bool {
        self.user.iter().any(|row| row.has_value(value))
    }

    pub fn push_user(&mut self, option: SelectOption) {
        self.user.push(option);
        self.reindex();
    }

    /// Remove a user-created option. Returns whether one was removed.
    pub fn remove_user(&mut self, value: &OptionValue) -> bool {
        let before = self.user.len();
        self.user.retain(|row| !row.has_value(value));
        let removed = self.user.len() != before;
        if removed {
            self.reindex();
        }
        removed
    }

    pub fn clear_user(&mut self) {
        if !self.user.is_empty() {
            self.user.clear();
            self.reindex();
        }
    }

    /// Tree-built rows in traversal order. `parent` slots index into this slice.
    pub fn base_rows(&self) -> &[SelectOption] {
        &self.base
    }

    /// Split borrow used by the filter: user rows and base rows separately.
    pub fn rows_mut(&mut self) -> (&mut [SelectOption], &mut [SelectOption]) {
        (&mut self.user, &mut self.base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store(raw: Vec<Value>) -> OptionStore {
        let mut store = OptionStore::new();
        store.rebuild(&raw, &KeyConfig::default());
        store
    }

    #[test]
    fn test_index_skips_groups() {
        let s = store(vec![json!({ "group": true, "value": "g", "children": ["a"] })]);
        assert!(!s.contains(&"g".into()));
        assert!(s.contains(&"a".into()));
        assert_eq!(s.len(), 2);
    }

    #[test]
    fn test_known_values_are_stringified() {
        let s = store(vec![json!({ "value": 5 })]);
        assert!(s.is_known("5"));
        assert!(!s.contains(&"5".into()));
        assert!(s.contains(&5.into()));
    }

    #[test]
    fn test_user_options_come_first() {
        let mut s = store(vec![json!("a")]);
        s.push_user(SelectOption::new("new", "new"));
        let labels: Vec<&str> = s.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["new", "a"]);
        assert!(s.is_user_option(&"new".into()));
        assert!(s.is_known("new"));

        assert!(s.remove_user(&"new".into()));
        assert!(!s.contains(&"new".into()));
        assert!(!s.remove_user(&"new".into()));
    }

    #[test]
    fn test_user_options_survive_rebuild() {
        let mut s = store(vec![json!("a")]);
        s.push_user(SelectOption::new("u", "u"));
        s.rebuild(&[json!("b")], &KeyConfig::default());
        assert!(s.contains(&"u".into()));
        assert!(s.contains(&"b".into()));
        assert!(!s.contains(&"a".into()));
    }

    #[test]
    fn test_rebuild_carries_hidden_and_hitting() {
        let mut s = store(vec![json!("a"), json!("b")]);
        for row in s.iter_mut() {
            if row.has_value(&"b".into()) {
                row.hidden = true;
                row.hitting = true;
            }
        }
        s.rebuild(&[json!("c"), json!("b")], &KeyConfig::default());
        let b = s.get(&"b".into()).unwrap();
        assert!(b.hidden && b.hitting);
        let c = s.get(&"c".into()).unwrap();
        assert!(!c.hidden && !c.hitting);
    }
}
