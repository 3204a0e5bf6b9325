//! Loading option documents from JSON.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::config::SelectConfig;
use crate::option::KeyConfig;
use crate::value::SelectValue;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read options file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid options JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unexpected document shape: {0}")]
    Shape(String),
}

/// Raw options plus the optional settings that may accompany them.
#[derive(Debug, Clone, Default)]
pub struct OptionsDocument {
    pub options: Vec<Value>,
    pub key_config: Option<KeyConfig>,
    pub value: SelectValue,
    pub config: Option<SelectConfig>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DocumentObject {
    #[serde(default)]
    options: Vec<Value>,
    key_config: Option<KeyConfig>,
    #[serde(default)]
    value: Value,
    config: Option<SelectConfig>,
}

impl OptionsDocument {
    /// Parse a document: either a bare array of descriptors or an object
    /// with `options`, `keyConfig`, `value` and `config`.
    pub fn from_json_str(input: &str) -> Result<Self, LoadError> {
        let root: Value = serde_json::from_str(input)?;
        match root {
            Value::Array(options) => Ok(Self {
                options,
                ..Self::default()
            }),
            Value::Object(_) => {
                let doc: DocumentObject = serde_json::from_value(root)?;
                Ok(Self {
                    options: doc.options,
                    key_config: doc.key_config,
                    value: SelectValue::from_json(&doc.value),
                    config: doc.config,
                })
            }
            other => Err(LoadError::Shape(format!(
                "expected an array or object, found {}",
                json_kind(&other)
            ))),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, LoadError> {
        let input = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&input)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_array() {
        let doc = OptionsDocument::from_json_str(r#"["a", "b"]"#).unwrap();
        assert_eq!(doc.options.len(), 2);
        assert!(doc.value.is_none());
        assert!(doc.config.is_none());
    }

    #[test]
    fn test_object_document() {
        let doc = OptionsDocument::from_json_str(
            r#"{ "options": [{ "id": 1 }], "keyConfig": { "value": "id" }, "value": [1], "config": { "multiple": true } }"#,
        )
        .unwrap();
        assert_eq!(doc.key_config.unwrap().value, "id");
        assert_eq!(doc.value, SelectValue::Multiple(vec![1.into()]));
        assert!(doc.config.unwrap().multiple);
    }

    #[test]
    fn test_fixture_parses() {
        let doc = OptionsDocument::from_json_str(include_str!("../fixtures/produce.json")).unwrap();
        assert!(!doc.options.is_empty());
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            OptionsDocument::from_json_str("42"),
            Err(LoadError::Shape(_))
        ));
        assert!(matches!(
            OptionsDocument::from_json_str("{ nope"),
            Err(LoadError::Json(_))
        ));
        let err = OptionsDocument::from_path(Path::new("/definitely/missing.json")).unwrap_err();
        assert!(err.to_string().contains("/definitely/missing.json"));
    }
}
