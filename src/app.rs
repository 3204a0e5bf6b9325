use ratatui::layout::{Position, Rect};
use ratatui_interact::components::ListPickerState;
use ratatui_interact::traits::ClickRegionRegistry;
use ratatui_themes::{ThemeName, ThemePalette};
use tuiselect::{PopperFit, Select, SelectEvent, Viewport};

/// Actions that the event loop should take after handling an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    None,
    Quit,
    Accept,
}

/// Clickable parts of the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    /// The `×` of the tag at this position in the selection.
    Tag(usize),
    /// The `+N` marker of tags that did not fit.
    RestTip,
    ClearButton,
    Control,
    /// Option rows of the popup.
    List,
}

/// Popup list state: the windowed renderer of the total-options sequence.
pub struct ListView {
    pub state: ListPickerState,
    /// Rows the popup can show at once.
    pub height: usize,
    /// Width of the control the popup hangs from.
    pub anchor_width: u16,
    /// Widest row label, including markers.
    pub content_width: u16,
    /// Width chosen by the last fit; zero until the first fit.
    pub popup_width: u16,
}

impl ListView {
    pub fn new() -> Self {
        Self {
            state: ListPickerState::new(0),
            height: 0,
            anchor_width: 0,
            content_width: 0,
            popup_width: 0,
        }
    }

    pub fn scroll(&self) -> usize {
        self.state.scroll as usize
    }
}

impl Viewport for ListView {
    fn ensure_index_in_view(&mut self, index: usize) {
        self.state.select(index);
        if self.height > 0 {
            self.state.ensure_visible(self.height);
        }
    }

    fn fit_popper(&mut self, fit: PopperFit) {
        self.popup_width = match fit {
            PopperFit::MinWidth => self.anchor_width.max(self.content_width),
            PopperFit::Anchor => self.anchor_width,
            PopperFit::Fixed(width) => width,
        };
        tracing::trace!(width = self.popup_width, ?fit, "fitted popup");
    }
}

/// Main application state.
pub struct App {
    pub select: Select,
    pub list: ListView,

    /// Name shown in the title bar.
    pub title: String,

    /// Current color theme.
    pub theme_name: ThemeName,

    /// Hit-test regions registered by the last render, first match wins.
    pub click_regions: ClickRegionRegistry<Region>,

    /// The most recent notification, shown in the status bar.
    pub last_event: Option<String>,
}

impl App {
    pub fn new(select: Select, title: impl Into<String>) -> Self {
        let mut app = Self {
            select,
            list: ListView::new(),
            title: title.into(),
            theme_name: ThemeName::default(),
            click_regions: ClickRegionRegistry::new(),
            last_event: None,
        };
        app.select.focus();
        app.drain_events();
        app
    }

    /// Get the current theme palette.
    pub fn palette(&self) -> ThemePalette {
        self.theme_name.palette()
    }

    pub fn next_theme(&mut self) {
        self.theme_name = self.theme_name.next();
    }

    pub fn prev_theme(&mut self) {
        self.theme_name = self.theme_name.prev();
    }

    /// Perform the select's deferred work against the popup list.
    pub fn run_frame(&mut self) {
        self.select.run_frame(&mut self.list);
        self.drain_events();
    }

    fn drain_events(&mut self) {
        for event in self.select.take_events() {
            tracing::debug!(?event, "select event");
            self.last_event = Some(describe_event(&event));
        }
    }

    pub fn handle_key(&mut self, key: crossterm::event::KeyEvent) -> Action {
        use crossterm::event::{KeyCode, KeyModifiers};

        let consumed = self.select.handle_key(key);
        self.drain_events();
        if consumed {
            return Action::None;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
            KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => Action::Accept,
            KeyCode::Char('a') => Action::Accept,
            KeyCode::Char('c') | KeyCode::Delete => {
                self.select.clear();
                self.drain_events();
                Action::None
            }
            KeyCode::Backspace if !self.select.is_visible() => {
                if let Some(last) = self.select.current_values().last().cloned() {
                    self.select.remove_value(&last);
                    self.drain_events();
                }
                Action::None
            }
            KeyCode::Char('+') => {
                self.select.toggle_rest_tip();
                self.drain_events();
                Action::None
            }
            KeyCode::Char('T') | KeyCode::Char(']') => {
                self.next_theme();
                Action::None
            }
            KeyCode::Char('[') => {
                self.prev_theme();
                Action::None
            }
            _ => Action::None,
        }
    }

    /// Handle a mouse event and return the resulting Action.
    pub fn handle_mouse(&mut self, event: crossterm::event::MouseEvent) -> Action {
        use crossterm::event::{MouseButton, MouseEventKind};

        let col = event.column;
        let row = event.row;

        match event.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                match self.region_at(col, row) {
                    Some(Region::Tag(index)) => {
                        self.select.focus();
                        if let Some(value) = self.select.current_values().get(index).cloned() {
                            self.select.remove_value(&value);
                        }
                    }
                    Some(Region::RestTip) => {
                        self.select.focus();
                        self.select.toggle_rest_tip();
                    }
                    Some(Region::ClearButton) => {
                        self.select.focus();
                        self.select.clear();
                    }
                    Some(Region::Control) => {
                        self.select.focus();
                        self.select.toggle_visible();
                    }
                    Some(Region::List) => {
                        if let Some(index) = self.list_row_at(row) {
                            self.select.select_row(index);
                        }
                    }
                    None => {
                        self.select.click_outside();
                        self.select.blur();
                    }
                }
                self.drain_events();
                Action::None
            }
            MouseEventKind::Moved => {
                if self.region_at(col, row) == Some(Region::List) {
                    if let Some(index) = self.list_row_at(row) {
                        self.select.hover_row(index);
                    }
                }
                Action::None
            }
            MouseEventKind::ScrollUp => {
                self.list.state.scroll = self.list.state.scroll.saturating_sub(1);
                Action::None
            }
            MouseEventKind::ScrollDown => {
                let total = self.select.total_options().len();
                let max_scroll = total.saturating_sub(self.list.height);
                if self.list.scroll() < max_scroll {
                    self.list.state.scroll += 1;
                }
                Action::None
            }
            _ => Action::None,
        }
    }

    /// The first registered region containing the position.
    fn region_at(&self, col: u16, row: u16) -> Option<Region> {
        self.click_regions
            .regions()
            .iter()
            .find(|r| r.area.contains(Position::new(col, row)))
            .map(|r| r.data)
    }

    /// Get the stored area of a region.
    fn region_area(&self, region: Region) -> Option<Rect> {
        self.click_regions
            .regions()
            .iter()
            .find(|r| r.data == region)
            .map(|r| r.area)
    }

    /// Row of the total-options sequence under screen row `row`.
    fn list_row_at(&self, row: u16) -> Option<usize> {
        let area = self.region_area(Region::List)?;
        if row < area.y {
            return None;
        }
        let index = self.list.scroll() + (row - area.y) as usize;
        (index < self.select.total_options().len()).then_some(index)
    }
}

/// One-line description of a notification for the status bar.
fn describe_event(event: &SelectEvent) -> String {
    match event {
        SelectEvent::VisibleChange(true) => "opened".to_string(),
        SelectEvent::VisibleChange(false) => "closed".to_string(),
        SelectEvent::ValueChange { value, .. } => format!("value {}", value.to_json()),
        SelectEvent::LabelChange(labels) => format!("labels {}", labels.join(", ")),
        SelectEvent::Select { value, .. } => format!("selected {value}"),
        SelectEvent::Cancel { value, .. } => format!("deselected {value}"),
        SelectEvent::FilterInput(text) => format!("filter \"{text}\""),
        SelectEvent::Clear => "cleared".to_string(),
        SelectEvent::ClickOutside => "clicked outside".to_string(),
        SelectEvent::OutsideClose => "closed by outside click".to_string(),
        SelectEvent::Focus => "focused".to_string(),
        SelectEvent::Blur => "blurred".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tuiselect::{OptionValue, SelectConfig, SelectValue};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn click(column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    fn app(config: SelectConfig) -> App {
        let mut select = Select::new(config);
        select.set_options(vec![json!("Apple"), json!("Banana"), json!("Grape")]);
        App::new(select, "test")
    }

    #[test]
    fn test_focus_on_start() {
        let app = app(SelectConfig::default());
        assert!(app.select.is_focused());
        assert_eq!(app.last_event.as_deref(), Some("focused"));
    }

    #[test]
    fn test_quit_and_accept_when_closed() {
        let mut app = app(SelectConfig::default());
        assert_eq!(app.handle_key(key(KeyCode::Char('q'))), Action::Quit);
        assert_eq!(app.handle_key(key(KeyCode::Char('a'))), Action::Accept);
    }

    #[test]
    fn test_keys_go_to_open_select() {
        let mut app = app(SelectConfig::default());
        assert_eq!(app.handle_key(key(KeyCode::Enter)), Action::None);
        assert!(app.select.is_visible());
        // Esc closes the popup instead of quitting.
        assert_eq!(app.handle_key(key(KeyCode::Esc)), Action::None);
        assert!(!app.select.is_visible());
    }

    #[test]
    fn test_backspace_when_closed_removes_last_tag() {
        let mut app = app(SelectConfig::default().multiple(true));
        app.select
            .set_value(SelectValue::Multiple(vec!["Apple".into(), "Grape".into()]));
        app.handle_key(key(KeyCode::Backspace));
        assert_eq!(app.select.current_values(), [OptionValue::from("Apple")]);
        assert_eq!(app.last_event.as_deref(), Some("labels Apple"));
    }

    #[test]
    fn test_backspace_in_open_popup_without_filter_is_ignored() {
        let mut app = app(SelectConfig::default());
        app.select.set_value(SelectValue::Single("Banana".into()));
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.handle_key(key(KeyCode::Backspace)), Action::None);
        assert_eq!(app.select.value(), SelectValue::Single("Banana".into()));
        assert!(app.select.is_visible());
    }

    #[test]
    fn test_theme_cycling() {
        let mut app = app(SelectConfig::default());
        let initial = app.theme_name;
        app.handle_key(key(KeyCode::Char(']')));
        assert_ne!(app.theme_name, initial);
        app.handle_key(key(KeyCode::Char('[')));
        assert_eq!(app.theme_name, initial);
    }

    #[test]
    fn test_click_regions() {
        let mut app = app(SelectConfig::default().multiple(true));
        app.click_regions.clear();
        app.click_regions.register(Rect::new(1, 1, 8, 1), Region::Tag(0));
        app.click_regions.register(Rect::new(0, 0, 30, 3), Region::Control);
        app.click_regions.register(Rect::new(1, 4, 28, 3), Region::List);

        app.handle_mouse(click(20, 1));
        assert!(app.select.is_visible());

        // Third row of the list.
        app.handle_mouse(click(3, 6));
        assert_eq!(app.select.current_values(), [OptionValue::from("Grape")]);

        // The tag wins over the control it sits on.
        app.handle_mouse(click(2, 1));
        assert!(app.select.current_values().is_empty());

        app.handle_mouse(click(50, 20));
        assert!(!app.select.is_visible());
        assert!(!app.select.is_focused());
        assert_eq!(app.last_event.as_deref(), Some("blurred"));
    }

    #[test]
    fn test_list_view_fits_popup() {
        let mut list = ListView::new();
        list.anchor_width = 20;
        list.content_width = 32;
        list.fit_popper(PopperFit::MinWidth);
        assert_eq!(list.popup_width, 32);
        list.fit_popper(PopperFit::Anchor);
        assert_eq!(list.popup_width, 20);
        list.fit_popper(PopperFit::Fixed(12));
        assert_eq!(list.popup_width, 12);
    }

    #[test]
    fn test_list_view_scrolls_to_index() {
        let mut list = ListView::new();
        list.state.set_total(20);
        list.height = 5;
        list.ensure_index_in_view(12);
        assert!(list.scroll() <= 12);
        assert!(list.scroll() + 5 > 12);
    }
}
