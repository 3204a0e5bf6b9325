//! Reusable UI widget helpers for the select control and its popup.

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::Span,
    widgets::{Block, Borders},
};

use nucleo_matcher::{Config, Matcher};
use ratatui_themes::ThemePalette;
use tuiselect::filter::fuzzy_match_indices;

/// Semantic color palette derived from the active theme.
pub struct UiColors {
    pub label: Color,
    pub tag: Color,
    pub group: Color,
    pub dynamic: Color,
    pub checked: Color,
    pub muted: Color,
    pub active_border: Color,
    pub inactive_border: Color,
    pub hitting_bg: Color,
    pub error: Color,
    pub bg: Color,
    pub bar_bg: Color,
}

impl UiColors {
    pub fn from_palette(p: &ThemePalette) -> Self {
        let bar_bg = match p.bg {
            Color::Rgb(r, g, b) => Color::Rgb(
                r.saturating_add(10),
                g.saturating_add(10),
                b.saturating_add(15),
            ),
            _ => Color::Rgb(30, 30, 40),
        };

        let hitting_bg = match p.selection {
            Color::Rgb(r, g, b) => Color::Rgb(r, g, b),
            _ => Color::Rgb(40, 40, 60),
        };

        Self {
            label: p.fg,
            tag: p.info,
            group: p.warning,
            dynamic: p.success,
            checked: p.accent,
            muted: p.muted,
            active_border: p.accent,
            inactive_border: p.muted,
            hitting_bg,
            error: p.error,
            bg: p.bg,
            bar_bg,
        }
    }
}

/// Bordered block for the control or popup, highlighted while active.
pub fn control_block(title: String, active: bool, colors: &UiColors) -> Block<'static> {
    let border = if active {
        colors.active_border
    } else {
        colors.inactive_border
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(title)
        .title_style(Style::default().fg(border).bold())
}

/// Push the cursor marker (`▶ ` or `  `) onto spans.
pub fn push_cursor_marker(spans: &mut Vec<Span<'static>>, is_hitting: bool, colors: &UiColors) {
    if is_hitting {
        spans.push(Span::styled(
            "▶ ",
            Style::default()
                .fg(colors.active_border)
                .add_modifier(Modifier::BOLD),
        ));
    } else {
        spans.push(Span::raw("  "));
    }
}

/// Push the filter text with a caret at `cursor_pos` (in chars).
pub fn push_input_with_caret(
    spans: &mut Vec<Span<'static>>,
    text: &str,
    cursor_pos: usize,
    style: Style,
) {
    let before: String = text.chars().take(cursor_pos).collect();
    let after: String = text.chars().skip(cursor_pos).collect();
    spans.push(Span::styled(before, style));
    spans.push(Span::styled(
        "▎",
        style.add_modifier(Modifier::SLOW_BLINK),
    ));
    spans.push(Span::styled(after, style));
}

/// Normal and highlight styles for a row label.
pub fn highlight_styles(base_color: Color, bg_color: Color, is_hitting: bool) -> (Style, Style) {
    if is_hitting {
        (
            Style::default()
                .fg(base_color)
                .add_modifier(Modifier::BOLD),
            Style::default()
                .fg(bg_color)
                .bg(base_color)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        (
            Style::default().fg(base_color),
            Style::default()
                .fg(base_color)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        )
    }
}

/// Build spans with highlighted characters based on fuzzy match indices.
pub fn build_highlighted_text(
    text: &str,
    pattern: &str,
    normal_style: Style,
    highlight_style: Style,
) -> Vec<Span<'static>> {
    if pattern.is_empty() {
        return vec![Span::styled(text.to_string(), normal_style)];
    }

    let mut matcher = Matcher::new(Config::DEFAULT);
    let (_score, indices) = fuzzy_match_indices(text, pattern, &mut matcher);

    if indices.is_empty() {
        return vec![Span::styled(text.to_string(), normal_style)];
    }

    let mut spans = Vec::new();
    let chars: Vec<char> = text.chars().collect();
    let mut last_idx = 0;

    for &match_idx in &indices {
        let idx = match_idx as usize;
        if idx >= chars.len() {
            continue;
        }

        if last_idx < idx {
            let before: String = chars[last_idx..idx].iter().collect();
            spans.push(Span::styled(before, normal_style));
        }

        spans.push(Span::styled(chars[idx].to_string(), highlight_style));
        last_idx = idx + 1;
    }

    if last_idx < chars.len() {
        let after: String = chars[last_idx..].iter().collect();
        spans.push(Span::styled(after, normal_style));
    }

    spans
}

/// Text of one tag in the control.
pub fn tag_text(label: &str) -> String {
    format!("{label} ×")
}

/// How the tags of a multi-select control are laid out on one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagLayout {
    /// Column offset and width of each shown tag, in selection order.
    pub shown: Vec<(u16, u16)>,
    /// Tags that did not fit and are summarized as `+N`.
    pub rest: usize,
}

/// Fit as many tags as possible into `width` columns, keeping `reserve`
/// columns free for the filter input. Tags are separated by one space; a
/// `+N` marker takes the room of the tags that do not fit.
pub fn fit_tags(labels: &[String], width: u16, reserve: u16) -> TagLayout {
    let widths: Vec<u16> = labels
        .iter()
        .map(|label| tag_text(label).chars().count() as u16)
        .collect();

    let mut shown = Vec::new();
    let mut x: u16 = 0;
    for (i, w) in widths.iter().enumerate() {
        let remaining = labels.len() - i - 1;
        let marker = if remaining > 0 {
            format!(" +{remaining}").chars().count() as u16
        } else {
            0
        };
        let end = x.saturating_add(*w);
        if end.saturating_add(marker).saturating_add(reserve) > width {
            break;
        }
        shown.push((x, *w));
        x = end.saturating_add(1);
    }

    let rest = labels.len() - shown.len();
    TagLayout { shown, rest }
}

/// The sub-rectangle of `area` starting at column offset `x` with `width`.
pub fn span_rect(area: Rect, x: u16, width: u16) -> Rect {
    let x = area.x.saturating_add(x).min(area.right());
    let width = width.min(area.right().saturating_sub(x));
    Rect::new(x, area.y, width, 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn labels(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_fit_tags_all() {
        let layout = fit_tags(&labels(&["ab", "cde"]), 20, 0);
        assert_eq!(
            layout,
            TagLayout {
                shown: vec![(0, 4), (5, 5)],
                rest: 0,
            }
        );
    }

    #[test]
    fn test_fit_tags_overflow_reserves_marker() {
        // "ab ×" = 4, " +2" = 3, next tag would not leave room for " +1".
        let layout = fit_tags(&labels(&["ab", "cde", "f"]), 9, 0);
        assert_eq!(layout.shown, vec![(0, 4)]);
        assert_eq!(layout.rest, 2);
    }

    #[test]
    fn test_fit_tags_nothing_fits() {
        let layout = fit_tags(&labels(&["a long label"]), 5, 0);
        assert!(layout.shown.is_empty());
        assert_eq!(layout.rest, 1);
    }

    #[test]
    fn test_highlighted_text_splits_matches() {
        let normal = Style::default();
        let highlight = Style::default().add_modifier(Modifier::BOLD);
        let spans = build_highlighted_text("Banana", "nan", normal, highlight);
        let text: String = spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(text, "Banana");
        assert!(spans.len() > 1);
        assert!(spans.iter().any(|s| s.style == highlight));
    }

    #[test]
    fn test_highlighted_text_without_pattern() {
        let spans = build_highlighted_text("Apple", "", Style::default(), Style::default());
        assert_eq!(spans.len(), 1);
    }

    #[test]
    fn test_span_rect_clamps() {
        let area = Rect::new(2, 1, 10, 1);
        assert_eq!(span_rect(area, 3, 4), Rect::new(5, 1, 4, 1));
        assert_eq!(span_rect(area, 8, 10), Rect::new(10, 1, 2, 1));
    }
}
