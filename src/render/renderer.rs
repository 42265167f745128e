//! In-place frame renderer.
//!
//! Each frame replaces the previous one: the cursor moves back to the frame's first row, the
//! screen is cleared below it and the new lines are written. Lines are joined with `\r\n`
//! because raw mode disables output post-processing.

use crate::core::text::layout::truncate_to_width;

const SYNC_START: &str = "\x1b[?2026h";
const SYNC_END: &str = "\x1b[?2026l";
const CLEAR_ALL: &str = "\x1b[3J\x1b[2J\x1b[H";
const CLEAR_BELOW: &str = "\x1b[J";

#[derive(Debug, Default)]
pub struct InlineRenderer {
    previous_lines: Vec<String>,
    previous_width: usize,
    /// Row of the cursor relative to the first frame row.
    cursor_row: usize,
}

impl InlineRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn previous_lines(&self) -> &[String] {
        &self.previous_lines
    }

    /// Build the bytes that replace the previous frame with `lines`.
    ///
    /// Returns `None` when nothing changed. Lines are clipped to `width` columns and only the
    /// last `height` lines are shown so the cursor never has to leave the visible screen.
    pub fn render(&mut self, lines: &[String], width: usize, height: usize) -> Option<String> {
        let width = width.max(1);
        let height = height.max(1);
        let first_visible = lines.len().saturating_sub(height);
        let lines: Vec<String> = lines[first_visible..]
            .iter()
            .map(|line| truncate_to_width(line, width))
            .collect();

        let width_changed = self.previous_width != 0 && self.previous_width != width;
        if !width_changed && lines == self.previous_lines {
            return None;
        }

        let mut buffer = String::from(SYNC_START);
        if width_changed {
            // Rows may have re-wrapped at the new width; relative moves are unreliable.
            tracing::trace!(
                from = self.previous_width,
                to = width,
                "width changed, full redraw"
            );
            buffer.push_str(CLEAR_ALL);
        } else {
            if self.cursor_row > 0 {
                buffer.push_str(&format!("\x1b[{}A", self.cursor_row));
            }
            buffer.push('\r');
            buffer.push_str(CLEAR_BELOW);
        }

        for (i, line) in lines.iter().enumerate() {
            if i > 0 {
                buffer.push_str("\r\n");
            }
            buffer.push_str(line);
        }
        buffer.push_str(SYNC_END);

        self.cursor_row = lines.len().saturating_sub(1);
        self.previous_lines = lines;
        self.previous_width = width;
        Some(buffer)
    }

    /// Bytes that park the cursor on a fresh line below the last frame.
    ///
    /// The renderer forgets the frame afterwards, so a later `render` starts a new region.
    pub fn finish(&mut self) -> String {
        let had_frame = !self.previous_lines.is_empty();
        self.previous_lines.clear();
        self.previous_width = 0;
        self.cursor_row = 0;
        if had_frame {
            "\r\n".to_string()
        } else {
            String::new()
        }
    }
}
