//! Boundary to the form field that stores the control's value.

use crate::value::SelectValue;

/// Form-binding collaborator consulted on every committed change.
pub trait FieldStore {
    /// Value the field currently holds; used as the initial bound value.
    fn value(&self) -> SelectValue;

    fn set_value(&mut self, value: &SelectValue);

    /// Ask the field to run its validation rules.
    fn validate(&mut self);

    /// Reset the field to `value` without validating.
    fn clear(&mut self, value: &SelectValue);
}
