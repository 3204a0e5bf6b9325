//! Option rows and the key mapping used to read raw descriptors.

use serde::Deserialize;
use serde_json::Value;

use crate::value::OptionValue;

/// Attribute names used to read each logical field from a raw descriptor.
///
/// Missing entries fall back to the field's own name, so a partial mapping
/// such as `{ "label": "name" }` only renames the label.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct KeyConfig {
    pub value: String,
    pub label: String,
    pub disabled: String,
    pub divided: String,
    pub title: String,
    pub group: String,
    pub children: String,
}

impl Default for KeyConfig {
    fn default() -> Self {
        Self {
            value: "value".to_string(),
            label: "label".to_string(),
            disabled: "disabled".to_string(),
            divided: "divided".to_string(),
            title: "title".to_string(),
            group: "group".to_string(),
            children: "children".to_string(),
        }
    }
}

/// One row of the flattened option list: a selectable option or a group header.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectOption {
    /// Identity. Always present for selectable rows; group headers may omit it.
    pub value: Option<OptionValue>,
    pub label: String,
    pub disabled: bool,
    pub divided: bool,
    pub title: String,
    /// Non-selectable section header.
    pub group: bool,
    /// Nesting level, 0 for top-level rows and -1 for remote placeholders.
    pub depth: i32,
    /// Slot of the enclosing row in the tree-built list. Not an owning edge.
    pub parent: Option<usize>,
    /// Set by the filter. Hidden rows are neither selectable nor counted.
    pub hidden: bool,
    /// Current navigation target.
    pub hitting: bool,
    /// The raw descriptor this row was built from.
    pub data: Value,
}

impl SelectOption {
    /// A plain top-level option with the given value and label.
    pub fn new(value: impl Into<OptionValue>, label: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            data: value.to_json(),
            value: Some(value),
            label: label.into(),
            disabled: false,
            divided: false,
            title: String::new(),
            group: false,
            depth: 0,
            parent: None,
            hidden: false,
            hitting: false,
        }
    }

    /// Stand-in for a selected value that is not present in the loaded options.
    pub fn placeholder(value: OptionValue) -> Self {
        Self {
            label: value.to_string(),
            data: value.to_json(),
            value: Some(value),
            disabled: false,
            divided: false,
            title: String::new(),
            group: false,
            depth: -1,
            parent: None,
            hidden: true,
            hitting: false,
        }
    }

    /// Whether this row carries the given value.
    pub fn has_value(&self, value: &OptionValue) -> bool {
        self.value.as_ref() == Some(value)
    }

    /// Rows the cursor may rest on: not a group header and not disabled.
    pub fn is_selectable(&self) -> bool {
        !self.group && !self.disabled
    }
}
