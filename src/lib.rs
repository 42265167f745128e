//! Inline terminal primitives for single-pass interactive forms.
//!
//! Invariant: only a [`Terminal`] implementation writes to the terminal, and only the
//! [`InlineRenderer`] decides what a frame write looks like.
//!
//! # Public API Overview
//! - Drive raw-mode input with [`ProcessTerminal`] (or any [`Terminal`] in tests).
//! - Parse raw sequences into [`InputEvent`]s and normalized key ids.
//! - Lay out ANSI-styled text with [`visible_width`] and [`place_horizontal`].
//! - Redraw a frame in place with [`InlineRenderer`].

pub mod config;
pub mod logging;

pub mod core;
pub mod platform;
pub mod render;

/// Keyboard input parsing helpers.
pub use crate::core::input::{parse_key, parse_text};
pub use crate::core::input_event::{parse_input_events, InputEvent};

/// Input buffering for chunked terminal streams.
pub use crate::platform::stdin_buffer::{StdinBuffer, StdinEvent};

/// Terminal interfaces and process-backed implementation.
pub use crate::core::terminal::{Terminal, TerminalGuard};
pub use crate::platform::process_terminal::ProcessTerminal;

/// In-place frame renderer.
pub use crate::render::renderer::InlineRenderer;

/// ANSI-aware layout helpers.
pub use crate::core::text::layout::{place_horizontal, truncate_to_width, wrap_plain};
/// Visible width helper that ignores ANSI control sequences.
pub use crate::core::text::width::visible_width;
