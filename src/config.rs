//! Behavioral switches of a select control.

use serde::Deserialize;

use crate::filter::MatchMode;
use crate::option::KeyConfig;
use crate::viewport::PopperFit;

/// Where the filter text field lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilterPosition {
    /// Inside the control itself; cleared after every multi-select change.
    #[default]
    InControl,
    /// At the top of the popup list.
    InList,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SelectConfig {
    pub multiple: bool,
    /// Enable filtering by typed text.
    pub filter: bool,
    pub ignore_case: bool,
    pub match_mode: MatchMode,
    /// Offer the filter text as a new option when it matches no value.
    pub creatable: bool,
    /// Options are filtered elsewhere; unknown selected values get placeholders.
    pub remote: bool,
    /// Maximum number of values in multi-select mode, 0 for no limit.
    pub count_limit: usize,
    pub filter_position: FilterPosition,
    pub clearable: bool,
    /// Close the popup on clicks outside the control.
    pub outside_close: bool,
    pub disabled: bool,
    pub loading: bool,
    /// Make the control read-only while loading.
    pub loading_lock: bool,
    pub fit_popper: PopperFit,
    /// Rows shown by the popup list before it scrolls.
    pub max_list_rows: u16,
    pub key_config: KeyConfig,
}

impl Default for SelectConfig {
    fn default() -> Self {
        Self {
            multiple: false,
            filter: false,
            ignore_case: false,
            match_mode: MatchMode::default(),
            creatable: false,
            remote: false,
            count_limit: 0,
            filter_position: FilterPosition::default(),
            clearable: false,
            outside_close: true,
            disabled: false,
            loading: false,
            loading_lock: false,
            fit_popper: PopperFit::default(),
            max_list_rows: 8,
            key_config: KeyConfig::default(),
        }
    }
}

impl SelectConfig {
    pub fn multiple(mut self, multiple: bool) -> Self {
        self.multiple = multiple;
        self
    }

    pub fn filter(mut self, filter: bool) -> Self {
        self.filter = filter;
        self
    }

    pub fn ignore_case(mut self, ignore_case: bool) -> Self {
        self.ignore_case = ignore_case;
        self
    }

    pub fn creatable(mut self, creatable: bool) -> Self {
        self.creatable = creatable;
        self
    }

    pub fn remote(mut self, remote: bool) -> Self {
        self.remote = remote;
        self
    }

    pub fn count_limit(mut self, limit: usize) -> Self {
        self.count_limit = limit;
        self
    }

    pub fn clearable(mut self, clearable: bool) -> Self {
        self.clearable = clearable;
        self
    }

    pub fn filter_position(mut self, position: FilterPosition) -> Self {
        self.filter_position = position;
        self
    }

    pub fn match_mode(mut self, mode: MatchMode) -> Self {
        self.match_mode = mode;
        self
    }

    /// Read-only: loading while the loading lock is on.
    pub fn is_readonly(&self) -> bool {
        self.loading && self.loading_lock
    }
}
