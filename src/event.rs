//! Notifications emitted by the select control, in the order they occur.

use serde_json::Value;

use crate::value::{OptionValue, SelectValue};

#[derive(Debug, Clone, PartialEq)]
pub enum SelectEvent {
    /// The popup opened or closed.
    VisibleChange(bool),
    /// The emitted value changed. `data` holds the raw descriptor of every
    /// selected value, or the value itself where no descriptor is known.
    ValueChange { value: SelectValue, data: Vec<Value> },
    LabelChange(Vec<String>),
    /// An option was selected (or re-selected in single mode).
    Select { value: OptionValue, data: Value },
    /// An option was deselected in multi-select mode.
    Cancel { value: OptionValue, data: Value },
    FilterInput(String),
    Clear,
    ClickOutside,
    /// The popup closed because of an outside click.
    OutsideClose,
    Focus,
    Blur,
}
