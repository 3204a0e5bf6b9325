//! Scalar option values and the externally bound selection value.

use std::fmt;

use serde_json::{Number, Value};

/// Identity of a selectable option: a string or a number.
///
/// Values compare by type and content, so `1` and `"1"` are different values.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OptionValue {
    Text(String),
    Number(Number),
}

impl OptionValue {
    /// Convert a raw JSON scalar into a value. Null, booleans, arrays and
    /// objects are not valid option values.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(OptionValue::Text(s.clone())),
            Value::Number(n) => Some(OptionValue::Number(n.clone())),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            OptionValue::Text(s) => Value::String(s.clone()),
            OptionValue::Number(n) => Value::Number(n.clone()),
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Text(s) => f.write_str(s),
            OptionValue::Number(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for OptionValue {
    fn from(s: &str) -> Self {
        OptionValue::Text(s.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(s: String) -> Self {
        OptionValue::Text(s)
    }
}

impl From<i64> for OptionValue {
    fn from(n: i64) -> Self {
        OptionValue::Number(n.into())
    }
}

/// The value bound to the control from outside: absent, one scalar, or a list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SelectValue {
    #[default]
    None,
    Single(OptionValue),
    Multiple(Vec<OptionValue>),
}

impl SelectValue {
    /// Interpret a JSON value as a bound value. Non-scalar array elements are skipped.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Array(items) => {
                SelectValue::Multiple(items.iter().filter_map(OptionValue::from_json).collect())
            }
            other => OptionValue::from_json(other)
                .map(SelectValue::Single)
                .unwrap_or(SelectValue::None),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            SelectValue::None => Value::Null,
            SelectValue::Single(v) => v.to_json(),
            SelectValue::Multiple(values) => {
                Value::Array(values.iter().map(OptionValue::to_json).collect())
            }
        }
    }

    /// Normalize into a sequence: absent is empty, a scalar is a singleton.
    pub fn to_vec(&self) -> Vec<OptionValue> {
        match self {
            SelectValue::None => Vec::new(),
            SelectValue::Single(v) => vec![v.clone()],
            SelectValue::Multiple(values) => values.clone(),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, SelectValue::None)
    }

    /// Same-value check used to suppress echoes of values the control emitted
    /// itself. Scalars never equal lists, lists compare element-wise in order.
    pub fn is_same(&self, other: &SelectValue) -> bool {
        self == other
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_scalars() {
        assert_eq!(
            OptionValue::from_json(&json!("a")),
            Some(OptionValue::Text("a".into()))
        );
        assert_eq!(OptionValue::from_json(&json!(3)), Some(OptionValue::from(3)));
        assert_eq!(OptionValue::from_json(&json!(null)), None);
        assert_eq!(OptionValue::from_json(&json!(true)), None);
        assert_eq!(OptionValue::from_json(&json!({"a": 1})), None);
    }

    #[test]
    fn test_number_and_text_are_distinct() {
        assert_ne!(OptionValue::from(1), OptionValue::from("1"));
        assert_eq!(OptionValue::from(1).to_string(), "1");
    }

    #[test]
    fn test_select_value_from_json() {
        assert_eq!(SelectValue::from_json(&json!(null)), SelectValue::None);
        assert_eq!(
            SelectValue::from_json(&json!("x")),
            SelectValue::Single("x".into())
        );
        assert_eq!(
            SelectValue::from_json(&json!(["x", 2, null, {}])),
            SelectValue::Multiple(vec!["x".into(), 2.into()])
        );
    }

    #[test]
    fn test_is_same() {
        let a = SelectValue::Multiple(vec!["a".into(), "b".into()]);
        let b = SelectValue::Multiple(vec!["a".into(), "b".into()]);
        let c = SelectValue::Multiple(vec!["b".into(), "a".into()]);
        assert!(a.is_same(&b));
        assert!(!a.is_same(&c));
        assert!(!SelectValue::Single("a".into()).is_same(&SelectValue::Multiple(vec!["a".into()])));
        assert!(SelectValue::None.is_same(&SelectValue::None));
    }

    #[test]
    fn test_to_json_round_shape() {
        let v = SelectValue::Multiple(vec!["a".into(), 1.into()]);
        assert_eq!(v.to_json(), json!(["a", 1]));
        assert_eq!(SelectValue::None.to_json(), json!(null));
    }
}
