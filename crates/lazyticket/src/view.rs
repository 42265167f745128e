//! Pure rendering of a [`FormState`].
//!
//! Output is newline-separated; the runtime hands the lines to the inline renderer.

use ticket_tui::core::text::width::grapheme_width;
use ticket_tui::{place_horizontal, wrap_plain};
use unicode_segmentation::UnicodeSegmentation;

use crate::form::{FieldKind, FieldSpec, FormState};

pub const TITLE: &str = "Create a JIRA Ticket";
/// Width of the field column, borders included.
pub const FORM_WIDTH: usize = 45;
/// Visible rows of a multi-line field.
pub const TEXT_AREA_ROWS: usize = 5;

const BOUNDARY_FILL: char = '/';
const LEFT_MARGIN: &str = " ";
const HELP_SEPARATOR: &str = " • ";

fn ansi_wrap(text: &str, prefix: &str, suffix: &str) -> String {
    format!("{prefix}{text}{suffix}")
}

fn bold(text: &str) -> String {
    ansi_wrap(text, "\x1b[1m", "\x1b[22m")
}

fn indigo(text: &str) -> String {
    ansi_wrap(text, "\x1b[38;2;117;113;249m", "\x1b[39m")
}

fn red(text: &str) -> String {
    ansi_wrap(text, "\x1b[38;2;254;95;134m", "\x1b[39m")
}

fn highlight(text: &str) -> String {
    ansi_wrap(text, "\x1b[38;5;212m", "\x1b[39m")
}

fn gray(text: &str) -> String {
    ansi_wrap(text, "\x1b[38;5;240m", "\x1b[39m")
}

fn inverse(text: &str) -> String {
    ansi_wrap(text, "\x1b[7m", "\x1b[27m")
}

fn header_text(text: &str) -> String {
    bold(&indigo(&format!("  {text} ")))
}

fn error_header_text(text: &str) -> String {
    bold(&red(&format!("  {text} ")))
}

fn boundary(width: usize, text: &str) -> String {
    place_horizontal(width, &header_text(text), BOUNDARY_FILL, indigo)
}

fn error_boundary(width: usize, text: &str) -> String {
    place_horizontal(width, &error_header_text(text), BOUNDARY_FILL, red)
}

/// Render the whole form for the state's viewport width.
pub fn render(state: &FormState) -> String {
    let width = state.width();
    let mut lines = vec![String::new()];

    if state.has_errors() {
        lines.push(error_boundary(width, &error_summary(state)));
    } else {
        lines.push(boundary(width, TITLE));
    }

    for (idx, field) in state.fields().iter().enumerate() {
        lines.push(String::new());
        lines.extend(render_field(field, idx == state.focus(), width));
    }
    lines.push(String::new());

    if state.has_errors() {
        lines.push(error_boundary(width, ""));
    } else {
        lines.push(boundary(width, &gray(&help_line(state))));
    }

    lines
        .iter()
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{LEFT_MARGIN}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn error_summary(state: &FormState) -> String {
    let errors: Vec<&str> = state.errors().collect();
    let joined = errors.join("; ");
    if state.show_error_summary() {
        format!("Cannot submit: {joined}")
    } else {
        joined
    }
}

fn help_line(state: &FormState) -> String {
    let is_last = state.focus() + 1 >= state.fields().len();
    let mut entries = vec![if is_last { "enter submit" } else { "enter next" }];
    if state.focus() > 0 {
        entries.push("shift+tab back");
    }
    if state
        .focused()
        .is_some_and(|field| field.kind == FieldKind::MultiLine)
    {
        entries.push("alt+enter new line");
    }
    entries.push("esc cancel");
    entries.join(HELP_SEPARATOR)
}

fn render_field(field: &FieldSpec, focused: bool, width: usize) -> Vec<String> {
    let content_width = FORM_WIDTH.min(width).saturating_sub(2).max(1);
    let (border, label) = if focused {
        (indigo("┃ "), highlight(&bold(&format!("{}:", field.label))))
    } else {
        ("  ".to_string(), format!("{}:", field.label))
    };
    let marker = if field.error().is_some() {
        red(" *")
    } else {
        String::new()
    };

    let mut lines = vec![format!("{border}{label}{marker}")];
    let rows = match field.kind {
        FieldKind::SingleLine => {
            let prompt = if focused { highlight("> ") } else { "> ".to_string() };
            let value_width = content_width.saturating_sub(2).max(1);
            text_rows(field, focused, value_width)
                .into_iter()
                .enumerate()
                .map(|(idx, row)| {
                    if idx == 0 {
                        format!("{prompt}{row}")
                    } else {
                        format!("  {row}")
                    }
                })
                .collect::<Vec<_>>()
        }
        FieldKind::MultiLine => {
            let rows = text_rows(field, focused, content_width);
            let mut rows = text_area_window(rows, field, content_width);
            rows.resize(TEXT_AREA_ROWS.max(rows.len()), String::new());
            rows
        }
    };
    lines.extend(rows.into_iter().map(|row| format!("{border}{row}")));
    lines
}

/// Keep at most [`TEXT_AREA_ROWS`] rows, scrolled so the cursor row stays visible.
fn text_area_window(rows: Vec<String>, field: &FieldSpec, width: usize) -> Vec<String> {
    if rows.len() <= TEXT_AREA_ROWS {
        return rows;
    }
    let buffer = field.buffer();
    let cursor_row = wrap_plain(&buffer.text()[..buffer.cursor()], width)
        .len()
        .saturating_sub(1);
    let start = cursor_row
        .saturating_sub(TEXT_AREA_ROWS - 1)
        .min(rows.len() - TEXT_AREA_ROWS);
    rows.into_iter().skip(start).take(TEXT_AREA_ROWS).collect()
}

/// Wrap the field value to `width`; a focused field shows its cursor in inverse video.
fn text_rows(field: &FieldSpec, focused: bool, width: usize) -> Vec<String> {
    let buffer = field.buffer();
    if !focused {
        return wrap_plain(buffer.text(), width);
    }

    let text = buffer.text();
    let cursor = buffer.cursor();
    let mut rows = Vec::new();
    let mut offset = 0;
    for line in text.split('\n') {
        let mut row = String::new();
        let mut row_width = 0;
        // Rows break exactly where `wrap_plain` breaks them; `text_area_window` depends on it.
        let mut row_has_text = false;
        for (idx, grapheme) in line.grapheme_indices(true) {
            let g_width = grapheme_width(grapheme);
            if row_width + g_width > width && row_has_text {
                rows.push(std::mem::take(&mut row));
                row_width = 0;
            }
            row_has_text = true;
            if offset + idx == cursor {
                row.push_str(&inverse(grapheme));
            } else {
                row.push_str(grapheme);
            }
            row_width += g_width;
        }
        if offset + line.len() == cursor {
            row.push_str(&inverse(" "));
        }
        rows.push(row);
        offset += line.len() + 1;
    }
    rows
}

#[cfg(test)]
mod tests {
    use crate::form::{handle_event, EditOp, FormEvent, FormState};

    use ticket_tui::core::text::ansi::strip_ansi;
    use ticket_tui::wrap_plain;

    use super::{help_line, render, text_rows};

    #[test]
    fn help_mentions_new_line_only_on_multi_line_fields() {
        let state = FormState::ticket();
        assert_eq!(help_line(&state), "enter next • esc cancel");

        let state = handle_event(state, FormEvent::Edit(EditOp::Insert("t".into()))).0;
        let (state, _) = handle_event(state, FormEvent::Advance);
        assert_eq!(
            help_line(&state),
            "enter submit • shift+tab back • alt+enter new line • esc cancel"
        );
    }

    #[test]
    fn cursor_is_drawn_only_on_the_focused_field() {
        let state = handle_event(
            FormState::ticket(),
            FormEvent::Edit(EditOp::Insert("ab".into())),
        )
        .0;
        let frame = render(&state);
        assert!(frame.contains("ab\x1b[7m \x1b[27m"));
        assert_eq!(frame.matches("\x1b[7m").count(), 1);
    }

    #[test]
    fn long_bodies_scroll_to_the_cursor() {
        let state = handle_event(
            FormState::ticket(),
            FormEvent::Edit(EditOp::Insert("t".into())),
        )
        .0;
        let (state, _) = handle_event(state, FormEvent::Advance);
        let body = (1..=8).map(|n| format!("line{n}")).collect::<Vec<_>>().join("\n");
        let (state, _) = handle_event(state, FormEvent::Edit(EditOp::Paste(body)));

        let frame = render(&state);
        assert!(!frame.contains("line3"));
        assert!(frame.contains("line4"));
        assert!(frame.contains("line8\x1b[7m \x1b[27m"));
    }

    #[test]
    fn cursor_rows_break_where_plain_wrapping_does() {
        let state = handle_event(
            FormState::ticket(),
            FormEvent::Edit(EditOp::Insert("t".into())),
        )
        .0;
        let (state, _) = handle_event(state, FormEvent::Advance);
        let body = format!("{}{}b", "a".repeat(10), "\u{200b}".repeat(3));
        let (state, _) = handle_event(state, FormEvent::Edit(EditOp::Paste(body.clone())));
        let (state, _) = handle_event(state, FormEvent::Edit(EditOp::Home));

        let field = &state.fields()[1];
        let drawn: Vec<String> = text_rows(field, true, 10)
            .iter()
            .map(|row| strip_ansi(row))
            .collect();
        assert_eq!(drawn, wrap_plain(&body, 10));
        assert_eq!(drawn.len(), 2);
    }
}
