use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Clear, Paragraph},
    Frame,
};

use tuiselect::{FilterPosition, SelectOption};

use crate::app::{App, Region};
use crate::widgets::{
    build_highlighted_text, control_block, fit_tags, highlight_styles, push_cursor_marker,
    push_input_with_caret, span_rect, tag_text, UiColors,
};

/// Widest the control gets, in columns.
const CONTROL_WIDTH: u16 = 48;

/// Main render function called from the event loop. Registers the click
/// regions of everything it draws.
pub fn render(frame: &mut Frame, app: &mut App) {
    let colors = UiColors::from_palette(&app.palette());
    let area = frame.area();

    frame.render_widget(Block::default().style(Style::default().bg(colors.bg)), area);

    // [title bar]
    // [control + popup]
    // [status bar]
    // [help bar]
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);

    app.click_regions.clear();

    render_title_bar(frame, app, outer[0], &colors);

    let body = outer[1];
    let control = Rect::new(
        body.x.saturating_add(1),
        body.y,
        body.width.saturating_sub(2).min(CONTROL_WIDTH),
        3.min(body.height),
    );
    let rest_from = render_control(frame, app, control, &colors);

    if app.select.is_visible() {
        render_popup(frame, app, control, body, &colors);
    } else if app.select.is_rest_tip_shown() && rest_from < app.select.current_labels().len() {
        render_rest_tip(frame, app, control, body, rest_from, &colors);
    }

    render_status_bar(frame, app, outer[2], &colors);
    render_help_bar(frame, app, outer[3], &colors);
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect, colors: &UiColors) {
    let config = app.select.config();
    let mut modes = vec![if config.multiple { "multiple" } else { "single" }];
    if config.filter {
        modes.push("filter");
    }
    if config.creatable {
        modes.push("creatable");
    }
    if config.remote {
        modes.push("remote");
    }

    let line = Line::from(vec![
        Span::styled(
            format!(" {} ", app.title),
            Style::default()
                .fg(colors.active_border)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("[{}]", modes.join(" ")), Style::default().fg(colors.muted)),
    ]);
    frame.render_widget(
        Paragraph::new(line).style(Style::default().bg(colors.bar_bg)),
        area,
    );
}

/// Draw the control. Returns the index of the first tag that did not fit.
fn render_control(frame: &mut Frame, app: &mut App, area: Rect, colors: &UiColors) -> usize {
    let select = &app.select;
    let config = select.config();
    let visible = select.is_visible();

    let title = if config.loading {
        " Select (loading…) ".to_string()
    } else {
        " Select ".to_string()
    };
    let block = control_block(title, visible, colors);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let show_clear = config.clearable
        && !config.disabled
        && !select.is_readonly()
        && !select.current_values().is_empty();
    let content = Rect::new(
        inner.x,
        inner.y,
        inner.width.saturating_sub(if show_clear { 2 } else { 0 }),
        inner.height.min(1),
    );

    let input_here = visible && config.filter && config.filter_position == FilterPosition::InControl;
    let input_style = Style::default().fg(colors.label);
    let placeholder_style = Style::default().fg(colors.muted);
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut regions: Vec<(Rect, Region)> = Vec::new();
    let labels = select.current_labels();
    let mut rest_from = labels.len();

    if config.multiple {
        let reserve = if input_here { 8 } else { 0 };
        let layout = fit_tags(labels, content.width, reserve);
        let tag_style = if config.disabled {
            Style::default().fg(colors.muted)
        } else {
            Style::default().fg(colors.tag).add_modifier(Modifier::BOLD)
        };
        let mut x = 0;
        for (i, (offset, width)) in layout.shown.iter().enumerate() {
            spans.push(Span::styled(tag_text(&labels[i]), tag_style));
            spans.push(Span::raw(" "));
            regions.push((span_rect(content, *offset, *width), Region::Tag(i)));
            x = offset + width + 1;
        }
        rest_from = layout.shown.len();
        if layout.rest > 0 {
            let marker = format!("+{}", layout.rest);
            let width = marker.chars().count() as u16;
            spans.push(Span::styled(marker, Style::default().fg(colors.muted)));
            spans.push(Span::raw(" "));
            regions.push((span_rect(content, x, width), Region::RestTip));
        }
        if input_here {
            let input = select.filter_input();
            push_input_with_caret(&mut spans, select.input_text(), input.cursor_pos as usize, input_style);
        } else if labels.is_empty() {
            spans.push(Span::styled("Select…", placeholder_style));
        }
    } else if input_here {
        let input = select.filter_input();
        push_input_with_caret(&mut spans, select.input_text(), input.cursor_pos as usize, input_style);
        if select.input_text().is_empty() {
            let preview = select
                .hitting_option()
                .map(|option| option.label.clone())
                .or_else(|| labels.first().cloned());
            if let Some(preview) = preview {
                spans.push(Span::styled(preview, placeholder_style));
            }
        }
    } else {
        let shown = if visible {
            select
                .hitting_option()
                .map(|option| option.label.clone())
                .or_else(|| labels.first().cloned())
        } else {
            labels.first().cloned()
        };
        match shown {
            Some(label) => spans.push(Span::styled(label, input_style)),
            None => spans.push(Span::styled("Select…", placeholder_style)),
        }
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), content);

    if show_clear {
        let clear = Rect::new(inner.right().saturating_sub(1), inner.y, 1, 1);
        frame.render_widget(
            Paragraph::new(Span::styled("×", Style::default().fg(colors.error))),
            clear,
        );
        regions.push((clear, Region::ClearButton));
    }

    regions.push((area, Region::Control));
    for (rect, region) in regions {
        app.click_regions.register(rect, region);
    }
    app.list.anchor_width = area.width;
    rest_from
}

/// One rendered row of the popup list.
struct RowView {
    spans: Vec<Span<'static>>,
    hitting: bool,
}

fn row_view(app: &App, index: usize, row: &SelectOption, colors: &UiColors) -> RowView {
    let select = &app.select;
    let mut spans = Vec::new();
    push_cursor_marker(&mut spans, row.hitting, colors);

    if select.show_dynamic() && index == 0 {
        spans.push(Span::styled(
            format!("+ Create \"{}\"", row.label),
            Style::default().fg(colors.dynamic).add_modifier(Modifier::ITALIC),
        ));
        return RowView {
            spans,
            hitting: row.hitting,
        };
    }

    if row.depth > 0 {
        spans.push(Span::raw("  ".repeat(row.depth as usize)));
    }
    if row.divided {
        spans.push(Span::styled("─ ", Style::default().fg(colors.muted)));
    }

    if row.group {
        spans.push(Span::styled(
            row.label.clone(),
            Style::default()
                .fg(colors.group)
                .add_modifier(Modifier::BOLD),
        ));
    } else {
        let base = if select.is_row_disabled(row) {
            colors.muted
        } else {
            colors.label
        };
        let (normal, highlight) = highlight_styles(base, colors.bg, row.hitting);
        spans.extend(build_highlighted_text(
            &row.label,
            select.filter(),
            normal,
            highlight,
        ));
        if row.value.as_ref().is_some_and(|v| select.is_selected(v)) {
            spans.push(Span::styled(
                " ✓",
                Style::default()
                    .fg(colors.checked)
                    .add_modifier(Modifier::BOLD),
            ));
        }
    }

    if !row.title.is_empty() {
        spans.push(Span::styled(
            format!("  {}", row.title),
            Style::default().fg(colors.muted),
        ));
    }

    RowView {
        spans,
        hitting: row.hitting,
    }
}

fn render_popup(frame: &mut Frame, app: &mut App, control: Rect, body: Rect, colors: &UiColors) {
    let view: &App = app;
    let rows: Vec<RowView> = view
        .select
        .total_options()
        .into_iter()
        .enumerate()
        .map(|(i, row)| row_view(view, i, row, colors))
        .collect();

    let config = app.select.config();
    let filter_line = u16::from(config.filter && config.filter_position == FilterPosition::InList);
    let max_rows = config.max_list_rows.max(1) as usize;

    let content_width = rows
        .iter()
        .map(|row| {
            row.spans
                .iter()
                .map(|s| s.content.chars().count())
                .sum::<usize>()
        })
        .max()
        .unwrap_or(0) as u16;
    app.list.content_width = content_width.saturating_add(2);

    let row_count = rows.len().clamp(1, max_rows) as u16;
    let space = body.bottom().saturating_sub(control.bottom());
    let height = (row_count + 2 + filter_line).min(space);
    if height < 3 {
        return;
    }
    let width = if app.list.popup_width > 0 {
        app.list.popup_width
    } else {
        control.width
    }
    .min(body.right().saturating_sub(control.x));
    let popup = Rect::new(control.x, control.bottom(), width, height);

    frame.render_widget(Clear, popup);
    let block = control_block(String::new(), true, colors).style(Style::default().bg(colors.bg));
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let mut list_area = inner;
    if filter_line > 0 {
        let input = app.select.filter_input();
        let mut spans = vec![Span::styled("/ ", Style::default().fg(colors.muted))];
        push_input_with_caret(
            &mut spans,
            app.select.input_text(),
            input.cursor_pos as usize,
            Style::default().fg(colors.label),
        );
        frame.render_widget(
            Paragraph::new(Line::from(spans)),
            Rect::new(inner.x, inner.y, inner.width, 1),
        );
        list_area = Rect::new(
            inner.x,
            inner.y.saturating_add(1),
            inner.width,
            inner.height.saturating_sub(1),
        );
    }

    let visible_rows = list_area.height as usize;
    app.list.height = visible_rows;
    app.list.state.set_total(rows.len());
    let scroll = app
        .list
        .scroll()
        .min(rows.len().saturating_sub(visible_rows));

    let lines: Vec<Line<'static>> = if rows.is_empty() {
        vec![Line::from(Span::styled(
            "  No options",
            Style::default().fg(colors.muted),
        ))]
    } else {
        rows.into_iter()
            .skip(scroll)
            .take(visible_rows)
            .map(|row| {
                let line = Line::from(row.spans);
                if row.hitting {
                    line.style(Style::default().bg(colors.hitting_bg))
                } else {
                    line
                }
            })
            .collect()
    };
    frame.render_widget(Paragraph::new(lines), list_area);
    app.click_regions.register(list_area, Region::List);
}

fn render_rest_tip(
    frame: &mut Frame,
    app: &App,
    control: Rect,
    body: Rect,
    rest_from: usize,
    colors: &UiColors,
) {
    let labels = &app.select.current_labels()[rest_from..];
    let width = labels
        .iter()
        .map(|label| tag_text(label).chars().count() as u16)
        .max()
        .unwrap_or(0)
        .saturating_add(4)
        .min(body.right().saturating_sub(control.x));
    let height = (labels.len() as u16 + 2).min(body.bottom().saturating_sub(control.bottom()));
    if height < 3 {
        return;
    }
    let popup = Rect::new(control.x, control.bottom(), width, height);

    let lines: Vec<Line<'static>> = labels
        .iter()
        .map(|label| {
            Line::from(Span::styled(
                format!(" {}", tag_text(label)),
                Style::default().fg(colors.tag),
            ))
        })
        .collect();

    frame.render_widget(Clear, popup);
    let block = control_block(String::new(), false, colors).style(Style::default().bg(colors.bg));
    frame.render_widget(Paragraph::new(lines).block(block), popup);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect, colors: &UiColors) {
    let mut spans = vec![
        Span::styled(" value: ", Style::default().fg(colors.muted)),
        Span::styled(
            app.select.value().to_json().to_string(),
            Style::default().fg(colors.checked),
        ),
    ];
    if let Some(event) = &app.last_event {
        spans.push(Span::styled(
            format!("  ({event})"),
            Style::default().fg(colors.muted),
        ));
    }
    frame.render_widget(
        Paragraph::new(Line::from(spans)).style(Style::default().bg(colors.bar_bg)),
        area,
    );
}

fn render_help_bar(frame: &mut Frame, app: &App, area: Rect, colors: &UiColors) {
    let help = if app.select.is_visible() {
        if app.select.config().filter {
            " ↑↓ move  Enter select  Esc close  type to filter"
        } else {
            " ↑↓ move  Enter/Space select  Esc close"
        }
    } else {
        " Enter open  Bksp remove  c clear  a accept  q quit  ] theme"
    };
    frame.render_widget(
        Paragraph::new(Span::styled(help, Style::default().fg(colors.muted))),
        area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::{backend::TestBackend, Terminal};
    use serde_json::json;
    use tuiselect::{OptionsDocument, Select, SelectConfig, SelectValue};

    fn fruits_app(config: SelectConfig) -> App {
        let mut select = Select::new(config);
        select.set_options(vec![json!("Apple"), json!("Banana"), json!("Grape")]);
        App::new(select, "fruits")
    }

    fn produce_app() -> App {
        let doc = OptionsDocument::from_json_str(include_str!("../fixtures/produce.json"))
            .expect("fixture parses");
        let mut config = doc.config.unwrap_or_default();
        if let Some(keys) = doc.key_config {
            config.key_config = keys;
        }
        let mut select = Select::new(config);
        select.set_options(doc.options);
        select.set_value(doc.value);
        App::new(select, "produce")
    }

    fn render_to_string(app: &mut App, width: u16, height: u16) -> String {
        let backend = TestBackend::new(width, height);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        let mut output = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                let cell = &buffer[(x, y)];
                output.push_str(cell.symbol());
            }
            // Trim trailing whitespace per line for cleaner snapshots
            let trimmed = output.trim_end();
            output = trimmed.to_string();
            output.push('\n');
        }
        output
    }

    /// Screen rows in `rows`, without the margin column left of the control.
    fn screen_rows(output: &str, rows: std::ops::Range<usize>) -> String {
        output
            .lines()
            .skip(rows.start)
            .take(rows.len())
            .map(|line| line.chars().skip(1).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn snapshot_closed_single() {
        let mut app = fruits_app(SelectConfig::default());
        app.select.set_value(SelectValue::Single("Banana".into()));
        let output = render_to_string(&mut app, 30, 6);
        insta::assert_snapshot!(screen_rows(&output, 1..4), @r"
        ┌ Select ──────────────────┐
        │Banana                    │
        └──────────────────────────┘
        ");
        assert!(output.starts_with(" fruits [single]"));
        assert!(output.contains("value: \"Banana\""));
    }

    #[test]
    fn snapshot_open_popup_marks_hitting_row() {
        let mut app = fruits_app(SelectConfig::default());
        app.select.set_value(SelectValue::Single("Banana".into()));
        app.select.open();
        let output = render_to_string(&mut app, 40, 12);
        insta::assert_snapshot!(screen_rows(&output, 1..9), @r"
        ┌ Select ────────────────────────────┐
        │Banana                              │
        └────────────────────────────────────┘
        ┌────────────────────────────────────┐
        │  Apple                             │
        │▶ Banana ✓                          │
        │  Grape                             │
        └────────────────────────────────────┘
        ");
        assert!(output.contains("Esc close"));
    }

    #[test]
    fn test_dynamic_row_first() {
        let mut app = fruits_app(SelectConfig::default().filter(true).creatable(true));
        app.select.open();
        for c in "Kiwi".chars() {
            app.handle_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE));
        }
        let output = render_to_string(&mut app, 40, 12);
        assert!(output.contains("+ Create \"Kiwi\""));
        assert!(output.contains("Kiwi▎"));
        assert!(!output.contains("Apple"));
    }

    #[test]
    fn snapshot_grouped_produce() {
        let mut app = produce_app();
        app.select.open();
        let output = render_to_string(&mut app, 60, 20);
        insta::assert_snapshot!(screen_rows(&output, 1..14), @r"
        ┌ Select ──────────────────────────────────────┐
        │Banana × ▎                                   ×│
        └──────────────────────────────────────────────┘
        ┌──────────────────────────────────────────────┐
        │  Fruit                                       │
        │    Apple                                     │
        │▶   Banana ✓                                  │
        │    Durian                                    │
        │    Grape                                     │
        │  Vegetables                                  │
        │    ─ Carrot                                  │
        │    Leek                                      │
        └──────────────────────────────────────────────┘
        ");
        assert!(output.contains("[multiple filter creatable]"));
    }

    #[test]
    fn test_tags_overflow_into_rest_marker() {
        let mut app = fruits_app(SelectConfig::default().multiple(true));
        app.select.set_value(SelectValue::Multiple(vec![
            "Apple".into(),
            "Banana".into(),
            "Grape".into(),
        ]));
        let output = render_to_string(&mut app, 22, 12);
        assert!(output.contains("Apple ×"));
        assert!(output.contains("+2"));
        assert!(!output.contains("Grape ×"));

        app.select.toggle_rest_tip();
        let output = render_to_string(&mut app, 22, 12);
        assert!(output.contains("Grape ×"));
    }

    #[test]
    fn test_rendered_regions_drive_clicks() {
        use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};

        let mut app = fruits_app(SelectConfig::default().multiple(true).clearable(true));
        app.select.open();
        render_to_string(&mut app, 40, 12);

        // The control spans rows 1 to 3; the list starts inside the popup border at row 5.
        let click = |row| MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 4,
            row,
            modifiers: KeyModifiers::NONE,
        };
        app.handle_mouse(click(6));
        assert_eq!(app.select.value(), SelectValue::Multiple(vec!["Banana".into()]));

        render_to_string(&mut app, 40, 12);
        let clear = app
            .click_regions
            .regions()
            .iter()
            .find(|r| r.data == Region::ClearButton)
            .map(|r| r.area);
        assert!(clear.is_some());
    }

    #[test]
    fn snapshot_in_list_filter_line() {
        let mut app = fruits_app(
            SelectConfig::default()
                .filter(true)
                .filter_position(FilterPosition::InList),
        );
        app.select.open();
        for c in "ap".chars() {
            app.handle_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE));
        }
        let output = render_to_string(&mut app, 40, 12);
        insta::assert_snapshot!(screen_rows(&output, 1..8), @r"
        ┌ Select ────────────────────────────┐
        │Select…                             │
        └────────────────────────────────────┘
        ┌────────────────────────────────────┐
        │/ ap▎                               │
        │  Grape                             │
        └────────────────────────────────────┘
        ");
    }
}
