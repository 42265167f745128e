//! Key parsing for legacy (non-kitty) terminal input.
//!
//! Key ids are lowercase, modifier-prefixed strings such as `enter`, `shift+tab`,
//! `ctrl+c`, or `alt+enter`. Only the raw-mode sequences emitted by common xterm-compatible
//! terminals are recognized; anything else is left to the caller as unknown input.

const ESC: char = '\x1b';

/// Returns the decoded text when `data` is printable input rather than a key.
///
/// Space is text. A sequence containing any control character (including escape) is not.
pub fn parse_text(data: &str) -> Option<String> {
    if data.is_empty() {
        return None;
    }
    if data.chars().any(|ch| ch.is_control()) {
        return None;
    }
    Some(data.to_string())
}

/// Normalize a raw sequence into a key id.
pub fn parse_key(data: &str) -> Option<String> {
    if let Some(key_id) = legacy_sequence_key_id(data) {
        return Some(key_id.to_string());
    }

    match data {
        "\x1b" => return Some("escape".to_string()),
        "\t" => return Some("tab".to_string()),
        "\r" | "\n" | "\x1bOM" => return Some("enter".to_string()),
        "\x00" => return Some("ctrl+space".to_string()),
        " " => return Some("space".to_string()),
        "\x7f" | "\x08" => return Some("backspace".to_string()),
        "\x1b[Z" => return Some("shift+tab".to_string()),
        "\x1b\r" | "\x1b\n" => return Some("alt+enter".to_string()),
        "\x1b\x7f" | "\x1b\x08" => return Some("alt+backspace".to_string()),
        _ => {}
    }

    if let Some(key_id) = modified_csi_key_id(data) {
        return Some(key_id);
    }

    let bytes = data.as_bytes();
    if bytes.len() == 2 && data.starts_with(ESC) {
        let code = bytes[1];
        if (97..=122).contains(&code) {
            return Some(format!("alt+{}", code as char));
        }
    }

    if bytes.len() == 1 {
        let code = bytes[0];
        if (1..=26).contains(&code) {
            return Some(format!("ctrl+{}", (code + 96) as char));
        }
        if (33..=126).contains(&code) {
            return Some(data.to_string());
        }
    }

    None
}

/// Returns whether `key_id` names `expected` exactly (case-sensitive, `esc` aliases `escape`).
pub fn key_matches(key_id: &str, expected: &str) -> bool {
    let normalize = |value: &str| -> String {
        match value {
            "esc" => "escape".to_string(),
            "return" => "enter".to_string(),
            other => other.to_string(),
        }
    };
    normalize(key_id) == normalize(expected)
}

fn legacy_sequence_key_id(data: &str) -> Option<&'static str> {
    match data {
        "\x1b[A" | "\x1bOA" => Some("up"),
        "\x1b[B" | "\x1bOB" => Some("down"),
        "\x1b[C" | "\x1bOC" => Some("right"),
        "\x1b[D" | "\x1bOD" => Some("left"),
        "\x1b[H" | "\x1bOH" | "\x1b[1~" | "\x1b[7~" => Some("home"),
        "\x1b[F" | "\x1bOF" | "\x1b[4~" | "\x1b[8~" => Some("end"),
        "\x1b[2~" => Some("insert"),
        "\x1b[3~" => Some("delete"),
        "\x1b[5~" => Some("pageUp"),
        "\x1b[6~" => Some("pageDown"),
        "\x1bb" | "\x1bB" => Some("alt+left"),
        "\x1bf" | "\x1bF" => Some("alt+right"),
        _ => None,
    }
}

/// `CSI 1 ; <mod> <final>`, `CSI <code> ; <mod> ~`, and modifyOtherKeys
/// `CSI 27 ; <mod> ; <keycode> ~` forms.
fn modified_csi_key_id(data: &str) -> Option<String> {
    let payload = data.strip_prefix("\x1b[")?;
    let final_byte = payload.chars().last()?;
    let params: Vec<&str> = payload[..payload.len() - final_byte.len_utf8()]
        .split(';')
        .collect();
    if params.len() < 2 {
        return None;
    }
    let modifier: u8 = params[1].parse().ok()?;
    let mask = modifier.checked_sub(1)?;

    let key = match (params[0], final_byte, params.get(2)) {
        ("1", 'A', None) => "up",
        ("1", 'B', None) => "down",
        ("1", 'C', None) => "right",
        ("1", 'D', None) => "left",
        ("1", 'H', None) => "home",
        ("1", 'F', None) => "end",
        ("3", '~', None) => "delete",
        ("5", '~', None) => "pageUp",
        ("6", '~', None) => "pageDown",
        ("27", '~', Some(&"13")) => "enter",
        _ => return None,
    };

    Some(with_modifiers(mask, key))
}

fn with_modifiers(mask: u8, key: &str) -> String {
    let mut mods = Vec::new();
    if mask & 1 != 0 {
        mods.push("shift");
    }
    if mask & 4 != 0 {
        mods.push("ctrl");
    }
    if mask & 2 != 0 {
        mods.push("alt");
    }
    if mods.is_empty() {
        return key.to_string();
    }
    format!("{}+{key}", mods.join("+"))
}
