//! Event loop tying a [`Terminal`] to the form state machine.
//!
//! Single-threaded: render, block on the terminal for input, translate, update, repeat.
//! The loop ends on the first `Terminate` command.

use std::io;

use ticket_tui::{InlineRenderer, Terminal, TerminalGuard};

use crate::form::{handle_event, Command, FormEvent, FormState};
use crate::keymap::map_input;
use crate::view;

/// Start `terminal`, run the form to a terminal state and restore the terminal.
///
/// `on_start` runs once raw mode is active (used to install a panic hook). If the loop fails
/// the guard's drop path still restores the terminal.
pub fn run_form<T, F>(terminal: T, state: FormState, on_start: F) -> io::Result<FormState>
where
    T: Terminal,
    F: FnOnce(&mut T),
{
    let mut guard = TerminalGuard::start(terminal)?;
    on_start(guard.terminal_mut());
    let state = drive(guard.terminal_mut(), state)?;
    guard.finish()?;
    Ok(state)
}

/// Run the loop on an already started terminal.
pub fn drive<T: Terminal>(terminal: &mut T, mut state: FormState) -> io::Result<FormState> {
    let mut renderer = InlineRenderer::new();
    draw(terminal, &mut renderer, &state)?;

    loop {
        let events = terminal.read_events()?;
        if events.is_empty() {
            tracing::info!("input closed, cancelling form");
            let (next, _) = handle_event(state, FormEvent::Cancel);
            return close(terminal, &mut renderer, next);
        }

        for event in &events {
            let Some(form_event) = map_input(event) else {
                continue;
            };
            tracing::trace!(event = ?form_event, "form event");
            let (next, command) = handle_event(state, form_event);
            state = next;
            if let Command::Terminate(outcome) = command {
                tracing::info!(?outcome, "form finished");
                return close(terminal, &mut renderer, state);
            }
        }

        draw(terminal, &mut renderer, &state)?;
    }
}

fn draw<T: Terminal>(
    terminal: &mut T,
    renderer: &mut InlineRenderer,
    state: &FormState,
) -> io::Result<()> {
    let frame = view::render(state);
    let lines: Vec<String> = frame.split('\n').map(str::to_string).collect();
    let width = usize::from(terminal.columns());
    let height = usize::from(terminal.rows());
    if let Some(bytes) = renderer.render(&lines, width, height) {
        terminal.write(&bytes)?;
    }
    Ok(())
}

/// Draw the final frame and leave the cursor below it.
fn close<T: Terminal>(
    terminal: &mut T,
    renderer: &mut InlineRenderer,
    state: FormState,
) -> io::Result<FormState> {
    draw(terminal, renderer, &state)?;
    terminal.write(&renderer.finish())?;
    Ok(state)
}
