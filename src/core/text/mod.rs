//! Text helpers (ANSI parsing, width calculations, placement and wrapping).
//!
//! These helpers are pure (string in/string out) so view code can depend on them without
//! touching the terminal.

pub mod ansi;
pub mod layout;
pub mod width;
