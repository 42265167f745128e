//! Horizontal placement and wrapping for styled single-frame layouts.

use unicode_segmentation::UnicodeSegmentation;

use super::ansi::extract_ansi_code;
use super::width::{grapheme_width, visible_width};

const RESET: &str = "\x1b[0m";

/// Left-align `content` in a row of `width` columns, filling the rest with `fill`.
///
/// `style_fill` wraps the filler run (for example to color it); content wider than `width` is
/// returned unchanged.
pub fn place_horizontal(
    width: usize,
    content: &str,
    fill: char,
    style_fill: impl Fn(&str) -> String,
) -> String {
    let used = visible_width(content);
    if used >= width {
        return content.to_string();
    }

    let fill_width = grapheme_width(fill.encode_utf8(&mut [0; 4])).max(1);
    let count = (width - used) / fill_width;
    if count == 0 {
        return content.to_string();
    }
    let filler: String = std::iter::repeat(fill).take(count).collect();
    format!("{content}{}", style_fill(&filler))
}

/// Hard-wrap unstyled `text` into rows of at most `width` columns.
///
/// Explicit newlines always start a new row; an empty input yields one empty row.
pub fn wrap_plain(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut rows = Vec::new();

    for line in text.split('\n') {
        let mut row = String::new();
        let mut row_width = 0;
        for grapheme in line.graphemes(true) {
            let g_width = grapheme_width(grapheme);
            if row_width + g_width > width && !row.is_empty() {
                rows.push(std::mem::take(&mut row));
                row_width = 0;
            }
            row.push_str(grapheme);
            row_width += g_width;
        }
        rows.push(row);
    }

    rows
}

/// Cut `line` to at most `width` visible columns, keeping escape codes intact.
///
/// A reset is appended when anything was cut so styles never bleed into the next row.
pub fn truncate_to_width(line: &str, width: usize) -> String {
    if visible_width(line) <= width {
        return line.to_string();
    }

    let mut out = String::with_capacity(line.len());
    let mut used = 0;
    let mut idx = 0;
    while idx < line.len() {
        if let Some(code) = extract_ansi_code(line, idx) {
            out.push_str(&code.code);
            idx += code.length;
            continue;
        }
        let next_escape = line[idx..]
            .find('\x1b')
            .map(|offset| idx + offset)
            .unwrap_or(line.len());
        // A bare ESC that isn't a recognized code is copied as-is.
        let end = if next_escape == idx { idx + 1 } else { next_escape };
        for grapheme in line[idx..end].graphemes(true) {
            let g_width = grapheme_width(grapheme);
            if used + g_width > width {
                out.push_str(RESET);
                return out;
            }
            out.push_str(grapheme);
            used += g_width;
        }
        idx = end;
    }
    out.push_str(RESET);
    out
}
