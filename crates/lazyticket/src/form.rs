//! Form state machine.
//!
//! [`handle_event`] is the only way a [`FormState`] changes. It consumes the state and returns
//! the next one together with a [`Command`] for the runtime. Once the form reaches a terminal
//! state every further event is absorbed and answered with the same `Terminate` command.

use unicode_segmentation::UnicodeSegmentation;

/// Widest viewport the form renders into, before frame padding.
pub const MAX_WIDTH: usize = 160;
/// Columns taken by the frame around the form (1 left, 4 right).
pub const FRAME_PADDING: usize = 5;
/// Jira rejects summaries longer than this.
pub const TITLE_MAX_CHARS: usize = 255;
const TAB_SPACES: &str = "    ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    SingleLine,
    MultiLine,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Constraints {
    /// Value must contain something other than whitespace.
    pub required: bool,
    /// Upper bound on the number of characters (not bytes).
    pub max_chars: Option<usize>,
}

impl Constraints {
    pub fn required() -> Self {
        Self {
            required: true,
            max_chars: None,
        }
    }

    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = Some(max_chars);
        self
    }

    /// Error message for `value`, or `None` when it satisfies every constraint.
    pub fn check(&self, label: &str, value: &str) -> Option<String> {
        if self.required && value.trim().is_empty() {
            return Some(format!("{label} is required"));
        }
        if let Some(max) = self.max_chars {
            let count = value.chars().count();
            if count > max {
                return Some(format!("{label} must be at most {max} characters ({count})"));
            }
        }
        None
    }
}

/// Text with a cursor stored as a byte offset on a grapheme boundary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextBuffer {
    text: String,
    cursor: usize,
}

impl TextBuffer {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    fn insert(&mut self, text: &str) {
        self.text.insert_str(self.cursor, text);
        self.cursor += text.len();
    }

    fn backspace(&mut self) {
        if let Some(start) = self.prev_boundary() {
            self.text.replace_range(start..self.cursor, "");
            self.cursor = start;
        }
    }

    fn delete(&mut self) {
        if let Some(end) = self.next_boundary() {
            self.text.replace_range(self.cursor..end, "");
        }
    }

    fn left(&mut self) {
        if let Some(start) = self.prev_boundary() {
            self.cursor = start;
        }
    }

    fn right(&mut self) {
        if let Some(end) = self.next_boundary() {
            self.cursor = end;
        }
    }

    fn home(&mut self) {
        self.cursor = self.line_start(self.cursor);
    }

    fn end(&mut self) {
        self.cursor = self.line_end(self.cursor);
    }

    fn up(&mut self) {
        let start = self.line_start(self.cursor);
        if start == 0 {
            return;
        }
        let column = self.text[start..self.cursor].graphemes(true).count();
        let prev_start = self.line_start(start - 1);
        self.cursor = self.offset_at_column(prev_start, column);
    }

    fn down(&mut self) {
        let end = self.line_end(self.cursor);
        if end == self.text.len() {
            return;
        }
        let column = self.text[self.line_start(self.cursor)..self.cursor]
            .graphemes(true)
            .count();
        self.cursor = self.offset_at_column(end + 1, column);
    }

    fn prev_boundary(&self) -> Option<usize> {
        self.text[..self.cursor]
            .grapheme_indices(true)
            .next_back()
            .map(|(idx, _)| idx)
    }

    fn next_boundary(&self) -> Option<usize> {
        self.text[self.cursor..]
            .graphemes(true)
            .next()
            .map(|grapheme| self.cursor + grapheme.len())
    }

    fn line_start(&self, offset: usize) -> usize {
        self.text[..offset].rfind('\n').map_or(0, |idx| idx + 1)
    }

    fn line_end(&self, offset: usize) -> usize {
        self.text[offset..]
            .find('\n')
            .map_or(self.text.len(), |idx| offset + idx)
    }

    fn offset_at_column(&self, line_start: usize, column: usize) -> usize {
        let line_end = self.line_end(line_start);
        self.text[line_start..line_end]
            .grapheme_indices(true)
            .nth(column)
            .map_or(line_end, |(idx, _)| line_start + idx)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub label: String,
    pub kind: FieldKind,
    pub constraints: Constraints,
    buffer: TextBuffer,
    error: Option<String>,
}

impl FieldSpec {
    pub fn new(label: impl Into<String>, kind: FieldKind, constraints: Constraints) -> Self {
        Self {
            label: label.into(),
            kind,
            constraints,
            buffer: TextBuffer::default(),
            error: None,
        }
    }

    pub fn single_line(label: impl Into<String>, constraints: Constraints) -> Self {
        Self::new(label, FieldKind::SingleLine, constraints)
    }

    pub fn multi_line(label: impl Into<String>, constraints: Constraints) -> Self {
        Self::new(label, FieldKind::MultiLine, constraints)
    }

    pub fn value(&self) -> &str {
        self.buffer.text()
    }

    pub fn buffer(&self) -> &TextBuffer {
        &self.buffer
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Re-check the constraints and store the outcome; true when valid.
    fn validate(&mut self) -> bool {
        self.error = self.constraints.check(&self.label, self.buffer.text());
        self.error.is_none()
    }

    fn apply(&mut self, op: EditOp) {
        let buffer = &mut self.buffer;
        match op {
            EditOp::Insert(text) | EditOp::Paste(text) => {
                buffer.insert(&sanitize(&text, self.kind));
            }
            EditOp::NewLine => {
                if self.kind == FieldKind::MultiLine {
                    buffer.insert("\n");
                }
            }
            EditOp::Backspace => buffer.backspace(),
            EditOp::Delete => buffer.delete(),
            EditOp::Left => buffer.left(),
            EditOp::Right => buffer.right(),
            EditOp::Home => buffer.home(),
            EditOp::End => buffer.end(),
            EditOp::Up => buffer.up(),
            EditOp::Down => buffer.down(),
        }
    }
}

/// Normalize line breaks for `kind`, expand tabs, and drop other control characters.
fn sanitize(text: &str, kind: FieldKind) -> String {
    let text = text.replace("\r\n", "\n");
    let mut clean = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\r' | '\n' if kind == FieldKind::MultiLine => clean.push('\n'),
            '\r' | '\n' => clean.push(' '),
            '\t' => clean.push_str(TAB_SPACES),
            ch if ch.is_control() => {}
            ch => clean.push(ch),
        }
    }
    clean
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOp {
    Insert(String),
    /// Bracketed paste; applied as one edit.
    Paste(String),
    NewLine,
    Backspace,
    Delete,
    Left,
    Right,
    Home,
    End,
    Up,
    Down,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
    Resize { width: u16 },
    Cancel,
    Edit(EditOp),
    Advance,
    Retreat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormOutcome {
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Active,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Render,
    Terminate(FormOutcome),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormState {
    fields: Vec<FieldSpec>,
    focus: usize,
    width: usize,
    show_error_summary: bool,
    phase: Phase,
}

/// Build an active form over `fields`, focused on the first one.
pub fn initialize(fields: Vec<FieldSpec>) -> FormState {
    FormState {
        fields,
        focus: 0,
        width: MAX_WIDTH - FRAME_PADDING,
        show_error_summary: false,
        phase: Phase::Active,
    }
}

impl FormState {
    /// The title/body form used to file a ticket.
    pub fn ticket() -> Self {
        initialize(vec![
            FieldSpec::single_line(
                "Summary",
                Constraints::required().with_max_chars(TITLE_MAX_CHARS),
            ),
            FieldSpec::multi_line("Description", Constraints::default()),
        ])
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn focus(&self) -> usize {
        self.focus
    }

    pub fn focused(&self) -> Option<&FieldSpec> {
        self.fields.get(self.focus)
    }

    /// Viewport width available to the form.
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn show_error_summary(&self) -> bool {
        self.show_error_summary
    }

    pub fn has_errors(&self) -> bool {
        self.fields.iter().any(|field| field.error.is_some())
    }

    pub fn errors(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().filter_map(FieldSpec::error)
    }

    pub fn outcome(&self) -> Option<FormOutcome> {
        match self.phase {
            Phase::Active => None,
            Phase::Completed => Some(FormOutcome::Completed),
            Phase::Cancelled => Some(FormOutcome::Cancelled),
        }
    }

    pub fn values(&self) -> Vec<&str> {
        self.fields.iter().map(FieldSpec::value).collect()
    }

    /// `(title, body)` from the first two fields; missing fields read as empty.
    pub fn into_ticket(self) -> (String, String) {
        let mut values = self
            .fields
            .into_iter()
            .map(|field| field.buffer.text);
        let title = values.next().unwrap_or_default();
        let body = values.next().unwrap_or_default();
        (title, body)
    }

    fn terminate(mut self, outcome: FormOutcome) -> (Self, Command) {
        self.phase = match outcome {
            FormOutcome::Completed => Phase::Completed,
            FormOutcome::Cancelled => Phase::Cancelled,
        };
        (self, Command::Terminate(outcome))
    }

    fn advance(mut self) -> (Self, Command) {
        let Some(field) = self.fields.get_mut(self.focus) else {
            // An empty form has nothing to collect.
            return self.terminate(FormOutcome::Completed);
        };
        if !field.validate() {
            return (self, Command::Render);
        }

        if self.focus + 1 < self.fields.len() {
            self.focus += 1;
            return (self, Command::Render);
        }

        let mut first_invalid = None;
        for (idx, field) in self.fields.iter_mut().enumerate() {
            if !field.validate() && first_invalid.is_none() {
                first_invalid = Some(idx);
            }
        }
        match first_invalid {
            None => self.terminate(FormOutcome::Completed),
            Some(idx) => {
                tracing::debug!(field = idx, "final advance rejected");
                self.focus = idx;
                self.show_error_summary = true;
                (self, Command::Render)
            }
        }
    }
}

/// Apply `event` to `state`.
pub fn handle_event(mut state: FormState, event: FormEvent) -> (FormState, Command) {
    if let Some(outcome) = state.outcome() {
        return (state, Command::Terminate(outcome));
    }

    match event {
        FormEvent::Resize { width } => {
            state.width = usize::from(width)
                .min(MAX_WIDTH)
                .saturating_sub(FRAME_PADDING);
            (state, Command::Render)
        }
        FormEvent::Cancel => state.terminate(FormOutcome::Cancelled),
        FormEvent::Edit(op) => {
            if let Some(field) = state.fields.get_mut(state.focus) {
                field.apply(op);
                field.validate();
            }
            if !state.has_errors() {
                state.show_error_summary = false;
            }
            (state, Command::Render)
        }
        FormEvent::Advance => state.advance(),
        FormEvent::Retreat => {
            state.focus = state.focus.saturating_sub(1);
            (state, Command::Render)
        }
    }
}
