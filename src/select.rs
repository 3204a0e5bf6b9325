//! The select control state machine.
//!
//! `Select` owns the option store, the selection, the remote cache and the
//! filter text field. Every public operation is one discrete event: it runs
//! to completion, queues notifications for [`Select::take_events`] and may
//! schedule work for the next frame, which the host performs by calling
//! [`Select::run_frame`] after drawing.

use std::collections::HashSet;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui_interact::components::InputState;
use serde_json::Value;

use crate::cache::RemoteCache;
use crate::config::{FilterPosition, SelectConfig};
use crate::cursor::{self, Direction};
use crate::event::SelectEvent;
use crate::field::FieldStore;
use crate::filter::{apply_filter, FilterFn, MatchMode, Matching};
use crate::frame::{FrameScheduler, FrameTask, TaskKind};
use crate::option::{KeyConfig, SelectOption};
use crate::selection::{resolve, Selection};
use crate::store::OptionStore;
use crate::value::{OptionValue, SelectValue};
use crate::viewport::Viewport;

/// What a commit acts on.
enum SelectTarget {
    /// The option synthesized from the filter text.
    Dynamic,
    Option(SelectOption),
}

pub struct Select {
    config: SelectConfig,
    raw_options: Vec<Value>,
    store: OptionStore,
    selection: Selection,
    cache: RemoteCache,
    /// Mirrors the filter text; only offered while `show_dynamic()`.
    dynamic: SelectOption,
    filter_input: InputState,
    current_filter: String,
    /// Index into `total_options()`.
    cursor: Option<usize>,
    visible: bool,
    composing: bool,
    focused: bool,
    rest_tip: bool,
    /// Last value emitted to (or bound by) the host.
    emitted: SelectValue,
    field: Option<Box<dyn FieldStore>>,
    scheduler: FrameScheduler,
    events: Vec<SelectEvent>,
    filter_fn: Option<FilterFn>,
}

impl Select {
    pub fn new(config: SelectConfig) -> Self {
        Self {
            config,
            raw_options: Vec::new(),
            store: OptionStore::new(),
            selection: Selection::new(),
            cache: RemoteCache::new(),
            dynamic: SelectOption::new("", ""),
            filter_input: InputState::empty(),
            current_filter: String::new(),
            cursor: None,
            visible: false,
            composing: false,
            focused: false,
            rest_tip: false,
            emitted: SelectValue::None,
            field: None,
            scheduler: FrameScheduler::new(),
            events: Vec::new(),
            filter_fn: None,
        }
    }

    /// Attach a form field; its current value becomes the bound value.
    pub fn with_field(mut self, field: impl FieldStore + 'static) -> Self {
        let value = field.value();
        self.field = Some(Box::new(field));
        self.set_value(value);
        self
    }

    // ------------------------------------------------------------------
    // Inputs from the host
    // ------------------------------------------------------------------

    /// Replace the raw option descriptors and rebuild the live list.
    pub fn set_options(&mut self, raw: Vec<Value>) {
        self.raw_options = raw;
        self.rebuild();
    }

    pub fn set_key_config(&mut self, keys: KeyConfig) {
        self.config.key_config = keys;
        self.rebuild();
    }

    pub fn set_config(&mut self, config: SelectConfig) {
        let keys_changed = config.key_config != self.config.key_config;
        self.config = config;
        if keys_changed {
            self.store
                .rebuild(&self.raw_options, &self.config.key_config);
        }
        self.init_value_and_label();
        if self.is_locked() {
            self.set_visible(false);
        }
    }

    /// Install a custom match predicate, replacing the built-in matching.
    pub fn set_filter_fn(&mut self, filter_fn: Option<FilterFn>) {
        self.filter_fn = filter_fn;
        self.refilter();
    }

    /// Bind an external value. A value equal to the last emitted one is ignored.
    pub fn set_value(&mut self, value: SelectValue) {
        if !self.emitted.is_none() && value.is_same(&self.emitted) {
            return;
        }
        self.emitted = value;
        self.init_value_and_label();
        self.sync_input();
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.config.disabled = disabled;
        if disabled {
            self.set_visible(false);
        }
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.config.loading = loading;
        if self.config.is_readonly() {
            self.set_visible(false);
        }
    }

    fn rebuild(&mut self) {
        self.store
            .rebuild(&self.raw_options, &self.config.key_config);
        self.init_value_and_label();
    }

    fn init_value_and_label(&mut self) {
        self.selection = resolve(
            &self.emitted,
            &self.store,
            &mut self.cache,
            self.config.remote,
            self.config.multiple,
        );
        self.init_cursor();
        self.refilter();
    }

    // ------------------------------------------------------------------
    // Derived views
    // ------------------------------------------------------------------

    pub fn config(&self) -> &SelectConfig {
        &self.config
    }

    /// Every live row, hidden or not: user options first.
    pub fn option_states(&self) -> impl Iterator<Item = &SelectOption> {
        self.store.iter()
    }

    pub fn visible_options(&self) -> Vec<&SelectOption> {
        self.store.iter().filter(|row| !row.hidden).collect()
    }

    /// The rows the popup renders: the dynamic option when shown, then the
    /// visible options.
    pub fn total_options(&self) -> Vec<&SelectOption> {
        let mut rows = Vec::with_capacity(self.store.len() + 1);
        if self.show_dynamic() {
            rows.push(&self.dynamic);
        }
        rows.extend(self.store.iter().filter(|row| !row.hidden));
        rows
    }

    pub fn show_dynamic(&self) -> bool {
        self.config.filter
            && self.config.creatable
            && !self.current_filter.is_empty()
            && !self.store.is_known(&self.current_filter)
    }

    pub fn current_values(&self) -> &[OptionValue] {
        self.selection.values()
    }

    pub fn current_labels(&self) -> &[String] {
        self.selection.labels()
    }

    /// The selection in the shape it is emitted.
    pub fn value(&self) -> SelectValue {
        self.selection.to_value(self.config.multiple)
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn filter(&self) -> &str {
        &self.current_filter
    }

    pub fn input_text(&self) -> &str {
        self.filter_input.text()
    }

    pub fn filter_input(&self) -> &InputState {
        &self.filter_input
    }

    pub fn is_composing(&self) -> bool {
        self.composing
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn is_rest_tip_shown(&self) -> bool {
        self.rest_tip
    }

    pub fn is_readonly(&self) -> bool {
        self.config.is_readonly()
    }

    fn is_locked(&self) -> bool {
        self.config.disabled || self.config.is_readonly()
    }

    pub fn is_selected(&self, value: &OptionValue) -> bool {
        self.selection.contains(value)
    }

    /// Multi-select has reached its count limit.
    pub fn is_limited(&self) -> bool {
        self.config.multiple
            && self.config.count_limit > 0
            && self.selection.len() >= self.config.count_limit
    }

    /// Whether `option` can neither take the cursor nor be selected right now.
    pub fn is_row_disabled(&self, option: &SelectOption) -> bool {
        if !option.is_selectable() {
            return true;
        }
        self.is_limited()
            && !option
                .value
                .as_ref()
                .is_some_and(|value| self.is_selected(value))
    }

    /// The row under the cursor while the popup is open.
    pub fn hitting_option(&self) -> Option<&SelectOption> {
        if !self.visible {
            return None;
        }
        self.cursor
            .and_then(|index| self.total_options().get(index).copied())
    }

    /// Resolve a value the way tags do: live option first, then the cache.
    pub fn option_for(&self, value: &OptionValue) -> Option<&SelectOption> {
        self.store.get(value).or_else(|| self.cache.get(value))
    }

    pub fn cached_values(&self) -> Vec<&OptionValue> {
        self.cache.values().collect()
    }

    /// Drain the notifications queued since the last call.
    pub fn take_events(&mut self) -> Vec<SelectEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn has_pending_frame(&self) -> bool {
        self.scheduler.has_pending()
    }

    // ------------------------------------------------------------------
    // Cursor
    // ------------------------------------------------------------------

    fn init_cursor(&mut self) {
        let target = self.selection.values().iter().find_map(|value| {
            self.total_options()
                .iter()
                .position(|row| row.has_value(value))
        });
        self.update_hitting(target, true);
    }

    /// Move the cursor to `cursor` and mark exactly that row as hitting.
    fn update_hitting(&mut self, cursor: Option<usize>, ensure_in_view: bool) {
        let show_dynamic = self.show_dynamic();
        let offset = usize::from(show_dynamic);
        let total = offset + self.store.iter().filter(|row| !row.hidden).count();
        let cursor = cursor.filter(|index| *index < total);

        self.cursor = cursor;
        self.dynamic.hitting = show_dynamic && cursor == Some(0);

        let mut index = offset;
        for row in self.store.iter_mut() {
            if row.hidden {
                row.hitting = false;
                continue;
            }
            row.hitting = cursor == Some(index);
            index += 1;
        }

        if ensure_in_view && self.visible {
            if let Some(index) = cursor {
                self.scheduler.schedule(FrameTask::ScrollIntoView { index });
            }
        }
    }

    fn selectable_rows(&self) -> Vec<bool> {
        let limited = self.is_limited();
        let mut rows = Vec::with_capacity(self.store.len() + 1);
        if self.show_dynamic() {
            rows.push(!limited);
        }
        rows.extend(
            self.store
                .iter()
                .filter(|row| !row.hidden)
                .map(|row| !self.is_row_disabled(row)),
        );
        rows
    }

    fn step_cursor(&mut self, direction: Direction) {
        let rows = self.selectable_rows();
        if let Some(index) = cursor::step(self.cursor, direction, &rows) {
            self.update_hitting(Some(index), true);
        }
    }

    /// Pointer hover over row `index`; never steals the scroll position.
    pub fn hover_row(&mut self, index: usize) {
        if self.selectable_rows().get(index).copied().unwrap_or(false) {
            self.update_hitting(Some(index), false);
        }
    }

    // ------------------------------------------------------------------
    // Filtering
    // ------------------------------------------------------------------

    fn set_filter_text(&mut self, text: String) {
        self.dynamic.value = Some(OptionValue::Text(text.clone()));
        self.dynamic.label = text.clone();
        self.dynamic.data = Value::String(text.clone());
        self.current_filter = text;
        self.refilter();
    }

    fn refilter(&mut self) {
        if self.config.filter && !self.config.remote {
            let matching = match (&self.filter_fn, self.config.match_mode) {
                (Some(f), _) => Matching::Predicate(f),
                (None, MatchMode::Fuzzy) => Matching::Fuzzy,
                (None, MatchMode::Substring) => Matching::Substring {
                    ignore_case: self.config.ignore_case,
                },
            };
            apply_filter(&mut self.store, &self.current_filter, &matching);
        }
        self.update_hitting(self.cursor, true);
    }

    /// The filter text field changed.
    fn handle_filter_input(&mut self) {
        if self.composing {
            return;
        }

        let text = self.filter_input.text().to_string();
        self.set_filter_text(text.clone());

        let target = if text.is_empty() {
            None
        } else if self.show_dynamic() || self.cursor.is_some() {
            Some(0)
        } else {
            Some(
                self.total_options()
                    .iter()
                    .position(|row| row.label == text)
                    .unwrap_or(0),
            )
        };

        self.scheduler.schedule(FrameTask::FilterCursor {
            target,
            filter: text.clone(),
        });
        self.events.push(SelectEvent::FilterInput(text));
    }

    /// Replace the filter text as if the user had typed it.
    pub fn input_filter(&mut self, text: &str) {
        self.filter_input.set_text(text.to_string());
        self.handle_filter_input();
    }

    pub fn composition_start(&mut self) {
        self.composing = true;
    }

    /// End text composition and evaluate the composed text once.
    pub fn composition_end(&mut self) {
        if !self.composing {
            return;
        }
        self.composing = false;
        self.handle_filter_input();
    }

    /// Put the text field in line with the selection and popup state.
    fn sync_input(&mut self) {
        let text = if self.visible {
            self.current_filter.clone()
        } else if self.config.multiple {
            String::new()
        } else {
            self.selection.labels().first().cloned().unwrap_or_default()
        };
        self.filter_input.set_text(text);
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    /// Commit row `index` of `total_options()`. Returns whether anything changed.
    pub fn select_row(&mut self, index: usize) -> bool {
        if self.show_dynamic() && index == 0 {
            return self.handle_select(SelectTarget::Dynamic);
        }
        let option = match self.total_options().get(index) {
            Some(row) if row.is_selectable() => (*row).clone(),
            _ => return false,
        };
        self.handle_select(SelectTarget::Option(option))
    }

    /// Toggle the option carrying `value`.
    pub fn select_value(&mut self, value: &OptionValue) -> bool {
        match self.option_for(value) {
            Some(option) => {
                let option = option.clone();
                self.handle_select(SelectTarget::Option(option))
            }
            None => false,
        }
    }

    /// Commit the option synthesized from the filter text.
    pub fn select_dynamic(&mut self) -> bool {
        if !self.show_dynamic() {
            return false;
        }
        self.handle_select(SelectTarget::Dynamic)
    }

    /// Deselect `value` from its tag.
    pub fn remove_value(&mut self, value: &OptionValue) -> bool {
        if self.is_locked() || !self.is_selected(value) {
            return false;
        }
        self.select_value(value)
    }

    fn handle_select(&mut self, target: SelectTarget) -> bool {
        let option = match &target {
            SelectTarget::Dynamic => self.dynamic.clone(),
            SelectTarget::Option(option) => option.clone(),
        };
        let Some(value) = option.value.clone() else {
            return false;
        };

        let selected = self.is_selected(&value);
        if selected {
            self.store.remove_user(&value);
            self.cache.remove(&value);
        } else {
            if !self.config.multiple {
                self.store.clear_user();
            }
            if self.is_limited() {
                tracing::debug!(%value, limit = self.config.count_limit, "selection rejected at count limit");
                return false;
            }
            let committed = match target {
                SelectTarget::Dynamic => {
                    let mut created = option.clone();
                    created.hitting = false;
                    created.hidden = false;
                    self.store.push_user(created.clone());
                    created
                }
                SelectTarget::Option(_) => option.clone(),
            };
            self.cache.insert(&committed);
        }

        tracing::trace!(%value, selected, "commit");
        // Deselecting in single mode is reported as a selection.
        self.events.push(if selected && self.config.multiple {
            SelectEvent::Cancel {
                value: value.clone(),
                data: option.data.clone(),
            }
        } else {
            SelectEvent::Select {
                value: value.clone(),
                data: option.data.clone(),
            }
        });
        self.handle_change(&option, value, selected);

        if self.config.multiple {
            if self.config.filter_position == FilterPosition::InControl {
                self.set_filter_text(String::new());
                self.sync_input();
            }
            self.scheduler.schedule(FrameTask::FitPopper);
        } else {
            self.set_visible(false);
        }
        true
    }

    fn handle_change(&mut self, option: &SelectOption, value: OptionValue, selected: bool) {
        if selected {
            self.selection.remove(&value);
        } else if self.config.multiple {
            self.selection.push(value, option.label.clone());
        } else {
            self.selection.replace(value, option.label.clone());
        }

        let keep: HashSet<OptionValue> = self.selection.values().iter().cloned().collect();
        self.cache.retain_values(&keep);

        self.emit_change(self.selection.to_value(self.config.multiple));
        self.update_hitting(self.cursor, false);
    }

    fn emit_change(&mut self, value: SelectValue) {
        if value.is_same(&self.emitted) {
            return;
        }
        self.emitted = value.clone();

        let data = self
            .selection
            .values()
            .iter()
            .map(|v| {
                self.option_for(v)
                    .map(|option| option.data.clone())
                    .unwrap_or_else(|| v.to_json())
            })
            .collect();
        self.events.push(SelectEvent::ValueChange {
            value: value.clone(),
            data,
        });
        self.events
            .push(SelectEvent::LabelChange(self.selection.labels().to_vec()));

        if let Some(field) = self.field.as_mut() {
            field.set_value(&value);
            field.validate();
        }
    }

    /// Empty the selection. Only for clearable, unlocked controls.
    pub fn clear(&mut self) -> bool {
        if self.is_locked() || !self.config.clearable {
            return false;
        }

        self.store.clear_user();
        self.cache.clear();
        self.selection.clear();
        self.rest_tip = false;

        let value = if self.config.multiple {
            SelectValue::Multiple(Vec::new())
        } else {
            SelectValue::None
        };
        self.emitted = value.clone();

        self.sync_input();
        self.events.push(SelectEvent::ValueChange {
            value: value.clone(),
            data: Vec::new(),
        });
        self.events.push(SelectEvent::Clear);
        if let Some(field) = self.field.as_mut() {
            field.clear(&value);
        }
        self.update_hitting(self.cursor, false);
        self.scheduler.schedule(FrameTask::FitPopper);
        true
    }

    // ------------------------------------------------------------------
    // Popup and focus
    // ------------------------------------------------------------------

    fn set_visible(&mut self, visible: bool) {
        if self.visible == visible {
            return;
        }
        self.visible = visible;
        tracing::debug!(visible, "popup visibility changed");
        self.events.push(SelectEvent::VisibleChange(visible));

        if visible {
            self.rest_tip = false;
            self.scheduler.cancel(TaskKind::AfterLeave);
            self.init_cursor();
            self.scheduler.schedule(FrameTask::FitPopper);
        } else {
            self.scheduler.cancel_all();
            self.scheduler.schedule(FrameTask::AfterLeave);
        }
        self.sync_input();
    }

    pub fn open(&mut self) {
        if !self.is_locked() {
            self.set_visible(true);
        }
    }

    pub fn close(&mut self) {
        self.set_visible(false);
    }

    pub fn toggle_visible(&mut self) {
        if !self.is_locked() {
            self.set_visible(!self.visible);
        }
    }

    pub fn click_outside(&mut self) {
        self.rest_tip = false;
        self.events.push(SelectEvent::ClickOutside);

        if self.config.outside_close && self.visible {
            self.set_visible(false);
            self.events.push(SelectEvent::OutsideClose);
        }
    }

    /// Toggle the popover listing tags that did not fit the control.
    pub fn toggle_rest_tip(&mut self) {
        if self.visible {
            self.set_visible(false);
            self.rest_tip = false;
        } else {
            self.rest_tip = !self.rest_tip;
        }
    }

    pub fn focus(&mut self) {
        if !self.focused {
            self.focused = true;
            self.events.push(SelectEvent::Focus);
        }
    }

    pub fn blur(&mut self) {
        if self.focused {
            self.focused = false;
            self.events.push(SelectEvent::Blur);
        }
    }

    // ------------------------------------------------------------------
    // Keyboard
    // ------------------------------------------------------------------

    /// Handle a key press. Returns whether the control consumed it.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if self.composing {
            match key.code {
                KeyCode::Char(c) => {
                    self.filter_input.insert_char(c);
                }
                KeyCode::Backspace => {
                    self.filter_input.delete_char_backward();
                }
                _ => {}
            }
            return true;
        }

        if self.is_locked() {
            return false;
        }

        if !self.visible {
            if matches!(key.code, KeyCode::Enter | KeyCode::Char(' ')) {
                self.toggle_visible();
                return true;
            }
            return false;
        }

        match key.code {
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Esc => self.close(),
            KeyCode::Up => self.step_cursor(Direction::Up),
            KeyCode::Down => self.step_cursor(Direction::Down),
            KeyCode::Enter => self.commit(),
            KeyCode::Char(' ') if !self.config.filter => self.commit(),
            KeyCode::Backspace if self.config.filter => {
                if self.filter_input.text().is_empty() {
                    if let Some(last) = self.selection.last().cloned() {
                        self.remove_value(&last);
                    }
                } else {
                    self.filter_input.delete_char_backward();
                    self.handle_filter_input();
                }
            }
            KeyCode::Delete if self.config.filter => {
                self.filter_input.delete_char_forward();
                self.handle_filter_input();
            }
            KeyCode::Left => {
                self.filter_input.move_left();
            }
            KeyCode::Right => {
                self.filter_input.move_right();
            }
            KeyCode::Home => {
                self.filter_input.move_home();
            }
            KeyCode::End => {
                self.filter_input.move_end();
            }
            KeyCode::Char(c)
                if self.config.filter && !key.modifiers.contains(KeyModifiers::CONTROL) =>
            {
                self.filter_input.insert_char(c);
                self.handle_filter_input();
            }
            _ => return false,
        }
        true
    }

    fn commit(&mut self) {
        if let Some(index) = self.cursor {
            self.select_row(index);
        } else if self.show_dynamic() {
            self.handle_select(SelectTarget::Dynamic);
        } else {
            self.close();
        }
    }

    // ------------------------------------------------------------------
    // Deferred work
    // ------------------------------------------------------------------

    /// Run the work scheduled for this frame. Tasks scheduled while running
    /// wait for the next frame.
    pub fn run_frame(&mut self, viewport: &mut dyn Viewport) {
        let tasks: Vec<FrameTask> = std::iter::from_fn(|| self.scheduler.next_current()).collect();
        for task in tasks {
            self.run_task(task, viewport);
        }
    }

    fn run_task(&mut self, task: FrameTask, viewport: &mut dyn Viewport) {
        match task {
            FrameTask::ScrollIntoView { index } => {
                if self.visible && self.cursor == Some(index) {
                    viewport.ensure_index_in_view(index);
                }
            }
            FrameTask::FitPopper => {
                if self.visible {
                    viewport.fit_popper(self.config.fit_popper);
                }
            }
            FrameTask::FilterCursor { target, filter } => {
                if filter != self.current_filter {
                    tracing::trace!(%filter, "filter changed before cursor settled");
                    return;
                }
                let mut target = target;
                if target == Some(0) && !self.show_dynamic() {
                    target = self.first_unselected_row();
                }
                if target != self.cursor {
                    self.update_hitting(target, true);
                }
                if self.visible {
                    viewport.fit_popper(self.config.fit_popper);
                }
            }
            FrameTask::AfterLeave => {
                if !self.visible {
                    self.set_filter_text(String::new());
                    self.sync_input();
                }
            }
        }
    }

    fn first_unselected_row(&self) -> Option<usize> {
        let offset = usize::from(self.show_dynamic());
        self.store
            .iter()
            .filter(|row| !row.hidden)
            .position(|row| {
                !self.is_row_disabled(row)
                    && !row
                        .value
                        .as_ref()
                        .is_some_and(|value| self.is_selected(value))
            })
            .map(|index| index + offset)
    }
}
