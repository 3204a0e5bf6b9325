//! Selection-state engine for dropdown select controls.
//!
//! Raw option descriptors (any JSON shape, mapped through a [`KeyConfig`])
//! are flattened into a live option list. A [`Select`] tracks which values
//! are chosen, filters the list by typed text, offers the typed text as a new
//! option when configured to, and drives a keyboard cursor over the rows a
//! popup would render. Rendering is left to the host: it draws
//! [`Select::total_options`], forwards key and pointer events, and lends a
//! [`Viewport`] to [`Select::run_frame`] after each draw.
//!
//! ```no_run
//! use tuiselect::{Select, SelectConfig, SelectValue};
//! use serde_json::json;
//!
//! let mut select = Select::new(SelectConfig::default().multiple(true).filter(true));
//! select.set_options(vec![json!("Apple"), json!("Banana")]);
//! select.set_value(SelectValue::Multiple(vec!["Banana".into()]));
//! select.open();
//! select.input_filter("app");
//! assert_eq!(select.visible_options().len(), 1);
//! ```

pub mod cache;
pub mod config;
pub mod cursor;
pub mod document;
pub mod event;
pub mod field;
pub mod filter;
pub mod frame;
pub mod option;
pub mod select;
pub mod selection;
pub mod store;
pub mod tree;
pub mod value;
pub mod viewport;

pub use config::{FilterPosition, SelectConfig};
pub use document::{LoadError, OptionsDocument};
pub use event::SelectEvent;
pub use field::FieldStore;
pub use filter::{FilterFn, MatchMode};
pub use option::{KeyConfig, SelectOption};
pub use select::Select;
pub use value::{OptionValue, SelectValue};
pub use viewport::{NoViewport, PopperFit, Viewport};
