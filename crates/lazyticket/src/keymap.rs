//! Terminal input to form events.

use ticket_tui::core::input::key_matches;
use ticket_tui::InputEvent;

use crate::form::{EditOp, FormEvent};

const CANCEL_KEYS: [&str; 2] = ["escape", "ctrl+c"];
const ADVANCE_KEYS: [&str; 2] = ["enter", "tab"];

/// Translate one input event; `None` means the event has no effect on the form.
///
/// Printable characters are always text, so a field can contain any letter.
pub fn map_input(event: &InputEvent) -> Option<FormEvent> {
    match event {
        InputEvent::Resize { columns, .. } => Some(FormEvent::Resize { width: *columns }),
        InputEvent::Interrupt => Some(FormEvent::Cancel),
        InputEvent::Text { text, .. } => Some(FormEvent::Edit(EditOp::Insert(text.clone()))),
        InputEvent::Paste { text, .. } => Some(FormEvent::Edit(EditOp::Paste(text.clone()))),
        InputEvent::Key { key_id, .. } => map_key(key_id),
        InputEvent::UnknownRaw { raw } => {
            tracing::trace!(raw = ?raw, "ignoring unrecognized input");
            None
        }
    }
}

fn map_key(key_id: &str) -> Option<FormEvent> {
    let matches_any = |keys: &[&str]| keys.iter().any(|key| key_matches(key_id, key));

    if matches_any(&CANCEL_KEYS) {
        return Some(FormEvent::Cancel);
    }
    if matches_any(&ADVANCE_KEYS) {
        return Some(FormEvent::Advance);
    }

    let op = match key_id {
        "shift+tab" => return Some(FormEvent::Retreat),
        "alt+enter" => EditOp::NewLine,
        "backspace" => EditOp::Backspace,
        "delete" | "ctrl+d" => EditOp::Delete,
        "left" | "ctrl+b" => EditOp::Left,
        "right" | "ctrl+f" => EditOp::Right,
        "up" => EditOp::Up,
        "down" => EditOp::Down,
        "home" | "ctrl+a" => EditOp::Home,
        "end" | "ctrl+e" => EditOp::End,
        _ => return None,
    };
    Some(FormEvent::Edit(op))
}

#[cfg(test)]
mod tests {
    use ticket_tui::{parse_input_events, InputEvent};

    use super::map_input;
    use crate::form::{EditOp, FormEvent};

    fn map_raw(raw: &str) -> Vec<Option<FormEvent>> {
        parse_input_events(raw).iter().map(map_input).collect()
    }

    #[test]
    fn cancel_keys_and_signals_cancel() {
        assert_eq!(map_raw("\x1b"), vec![Some(FormEvent::Cancel)]);
        assert_eq!(map_raw("\x03"), vec![Some(FormEvent::Cancel)]);
        assert_eq!(map_input(&InputEvent::Interrupt), Some(FormEvent::Cancel));
    }

    #[test]
    fn q_is_text_not_cancel() {
        assert_eq!(
            map_raw("q"),
            vec![Some(FormEvent::Edit(EditOp::Insert("q".into())))]
        );
    }

    #[test]
    fn navigation_keys() {
        assert_eq!(map_raw("\r"), vec![Some(FormEvent::Advance)]);
        assert_eq!(map_raw("\t"), vec![Some(FormEvent::Advance)]);
        assert_eq!(map_raw("\x1b[Z"), vec![Some(FormEvent::Retreat)]);
        assert_eq!(
            map_raw("\x1b\r"),
            vec![Some(FormEvent::Edit(EditOp::NewLine))]
        );
        assert_eq!(
            map_raw("\x7f"),
            vec![Some(FormEvent::Edit(EditOp::Backspace))]
        );
        assert_eq!(map_raw("\x1b[D"), vec![Some(FormEvent::Edit(EditOp::Left))]);
    }

    #[test]
    fn paste_and_resize_pass_through() {
        assert_eq!(
            map_raw("\x1b[200~a\nb\x1b[201~"),
            vec![Some(FormEvent::Edit(EditOp::Paste("a\nb".into())))]
        );
        assert_eq!(
            map_input(&InputEvent::Resize {
                columns: 90,
                rows: 30
            }),
            Some(FormEvent::Resize { width: 90 })
        );
    }

    #[test]
    fn unbound_keys_are_ignored() {
        assert_eq!(map_raw("\x1b[5~"), vec![None]);
    }
}
