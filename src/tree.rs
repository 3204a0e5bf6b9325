//! Flattening of raw, possibly nested option descriptors into option rows.

use serde_json::{Map, Value};

use crate::option::{KeyConfig, SelectOption};
use crate::value::OptionValue;

/// Transient flags carried over from a previous build, looked up by value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CarriedFlags {
    pub hidden: bool,
    pub hitting: bool,
}

/// A descriptor waiting on the traversal stack.
struct Pending<'a> {
    raw: &'a Value,
    depth: i32,
    parent: Option<usize>,
}

/// Flatten raw descriptors depth-first, preserving declaration order.
///
/// Group headers and their children are emitted header first. Entries that
/// are neither group headers nor carry a scalar value are dropped. `carry`
/// supplies the `hidden`/`hitting` flags of the previous row with the same
/// value so filter and cursor state survive unrelated option updates.
pub fn build_options<F>(raw: &[Value], keys: &KeyConfig, carry: F) -> Vec<SelectOption>
where
    F: Fn(&OptionValue) -> Option<CarriedFlags>,
{
    let mut rows: Vec<SelectOption> = Vec::new();
    let mut stack: Vec<Pending<'_>> = raw
        .iter()
        .rev()
        .map(|raw| Pending {
            raw,
            depth: 0,
            parent: None,
        })
        .collect();

    while let Some(Pending { raw, depth, parent }) = stack.pop() {
        let Some(mut row) = read_descriptor(raw, keys) else {
            tracing::trace!(?raw, "dropping option descriptor without a value");
            continue;
        };

        row.depth = depth;
        row.parent = parent;
        if let Some(flags) = row.value.as_ref().and_then(&carry) {
            row.hidden = flags.hidden;
            row.hitting = flags.hitting;
        }

        let slot = rows.len();
        if let Some(Value::Array(children)) = children_of(raw, keys) {
            stack.extend(children.iter().rev().map(|child| Pending {
                raw: child,
                depth: depth + 1,
                parent: Some(slot),
            }));
        }
        rows.push(row);
    }

    rows
}

fn children_of<'a>(raw: &'a Value, keys: &KeyConfig) -> Option<&'a Value> {
    raw.as_object().and_then(|map| map.get(&keys.children))
}

/// Read one descriptor. Strings are shorthand for `{ value: entry }`.
fn read_descriptor(raw: &Value, keys: &KeyConfig) -> Option<SelectOption> {
    match raw {
        Value::String(s) => {
            let mut row = SelectOption::new(s.as_str(), s.as_str());
            row.data = raw.clone();
            Some(row)
        }
        Value::Object(map) => read_object(map, raw, keys),
        _ => None,
    }
}

fn read_object(map: &Map<String, Value>, raw: &Value, keys: &KeyConfig) -> Option<SelectOption> {
    let group = map.get(&keys.group).is_some_and(is_truthy);
    let value = map.get(&keys.value).and_then(OptionValue::from_json);

    if !group && value.is_none() {
        return None;
    }

    let label = match map.get(&keys.label) {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Number(n)) if n.as_f64() != Some(0.0) => n.to_string(),
        _ => value.as_ref().map(ToString::to_string).unwrap_or_default(),
    };
    let title = match map.get(&keys.title) {
        Some(Value::String(s)) => s.clone(),
        _ => String::new(),
    };

    Some(SelectOption {
        value,
        label,
        disabled: map.get(&keys.disabled).is_some_and(is_truthy),
        divided: map.get(&keys.divided).is_some_and(is_truthy),
        title,
        group,
        depth: 0,
        parent: None,
        hidden: false,
        hitting: false,
        data: raw.clone(),
    })
}

/// JSON truthiness for descriptor flags.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn no_carry(_: &OptionValue) -> Option<CarriedFlags> {
        None
    }

    fn labels(rows: &[SelectOption]) -> Vec<&str> {
        rows.iter().map(|r| r.label.as_str()).collect()
    }

    #[test]
    fn test_string_shorthand() {
        let raw = vec![json!("Apple"), json!("Banana")];
        let rows = build_options(&raw, &KeyConfig::default(), no_carry);
        assert_eq!(labels(&rows), vec!["Apple", "Banana"]);
        assert_eq!(rows[0].value, Some("Apple".into()));
        assert_eq!(rows[0].data, json!("Apple"));
    }

    #[test]
    fn test_depth_first_order_with_groups() {
        let raw = vec![
            json!({ "group": true, "label": "Fruit", "children": [
                { "value": "apple", "label": "Apple" },
                { "group": true, "label": "Citrus", "children": ["Lemon", "Lime"] },
            ]}),
            json!({ "value": "carrot", "label": "Carrot" }),
        ];
        let rows = build_options(&raw, &KeyConfig::default(), no_carry);
        assert_eq!(
            labels(&rows),
            vec!["Fruit", "Apple", "Citrus", "Lemon", "Lime", "Carrot"]
        );
        let depths: Vec<i32> = rows.iter().map(|r| r.depth).collect();
        assert_eq!(depths, vec![0, 1, 1, 2, 2, 0]);
        assert_eq!(rows[1].parent, Some(0));
        assert_eq!(rows[3].parent, Some(2));
        assert_eq!(rows[5].parent, None);
        assert!(rows[0].group);
        assert_eq!(rows[0].value, None);
    }

    #[test]
    fn test_malformed_entries_dropped() {
        let raw = vec![
            json!({ "label": "no value" }),
            json!({ "value": null }),
            json!(7),
            json!({ "value": { "nested": true } }),
            json!({ "value": 1 }),
        ];
        let rows = build_options(&raw, &KeyConfig::default(), no_carry);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].label, "1");
        assert_eq!(rows[0].value, Some(1.into()));
    }

    #[test]
    fn test_key_config_mapping() {
        let keys: KeyConfig =
            serde_json::from_value(json!({ "value": "id", "label": "name", "disabled": "off", "children": "items" }))
                .unwrap();
        let raw = vec![json!({ "id": 1, "name": "One", "off": 1, "items": [{ "id": 2, "name": "Two" }] })];
        let rows = build_options(&raw, &keys, no_carry);
        assert_eq!(labels(&rows), vec!["One", "Two"]);
        assert!(rows[0].disabled);
        assert!(!rows[1].disabled);
        assert_eq!(rows[1].depth, 1);
    }

    #[test]
    fn test_empty_label_falls_back_to_value() {
        let raw = vec![json!({ "value": "v", "label": "" }), json!({ "value": 3, "label": 0 })];
        let rows = build_options(&raw, &KeyConfig::default(), no_carry);
        assert_eq!(labels(&rows), vec!["v", "3"]);
    }

    #[test]
    fn test_flags_carried_by_value() {
        let raw = vec![json!("a"), json!("b")];
        let rows = build_options(&raw, &KeyConfig::default(), |v| {
            (v == &OptionValue::from("b")).then_some(CarriedFlags {
                hidden: true,
                hitting: true,
            })
        });
        assert!(!rows[0].hidden);
        assert!(rows[1].hidden && rows[1].hitting);
    }

    #[test]
    fn test_rebuild_is_idempotent() {
        let raw = vec![
            json!({ "group": true, "label": "G", "children": ["x", "y"] }),
            json!("z"),
        ];
        let keys = KeyConfig::default();
        let first = build_options(&raw, &keys, no_carry);
        let second = build_options(&raw, &keys, |v| {
            first
                .iter()
                .find(|r| r.has_value(v))
                .map(|r| CarriedFlags {
                    hidden: r.hidden,
                    hitting: r.hitting,
                })
        });
        assert_eq!(first, second);
    }
}
