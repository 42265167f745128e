use std::path::Path;
use std::process::ExitCode;

use lazyticket::form::FormState;
use lazyticket::runtime::run_form;
use lazyticket::settings;
use lazyticket::submit::{submit_if_completed, JiraSubmitter, SubmitError, SubmitOutcome};
use ticket_tui::config::EnvConfig;
use ticket_tui::{logging, ProcessTerminal};

const EXIT_CONFIG: u8 = 1;
const EXIT_SUBMIT: u8 = 2;
const EXIT_INTERNAL: u8 = 3;
const EXIT_CANCELLED: u8 = 130;

fn main() -> ExitCode {
    let env = EnvConfig::from_env();
    if let Some(path) = env.log_file.as_deref() {
        if let Err(err) = logging::init(Path::new(path), env.debug) {
            eprintln!("lazyticket: logging disabled: {err}");
        }
    }

    let settings = match settings::load() {
        Ok(settings) => settings,
        Err(err) => {
            tracing::error!(error = %err, "failed to load settings");
            eprintln!("lazyticket: {err}");
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    let state = match run_form(ProcessTerminal::new(), FormState::ticket(), install_restore_hook) {
        Ok(state) => state,
        Err(err) => {
            tracing::error!(error = %err, "terminal failure");
            eprintln!("lazyticket: terminal error: {err}");
            return ExitCode::from(EXIT_INTERNAL);
        }
    };

    match submit_if_completed(state, &settings, &JiraSubmitter::default()) {
        SubmitOutcome::Submitted(result) => {
            println!("{}: {}", result.issue_key, result.issue_url);
            ExitCode::SUCCESS
        }
        SubmitOutcome::Cancelled => {
            tracing::info!("cancelled by operator");
            eprintln!("cancelled");
            ExitCode::from(EXIT_CANCELLED)
        }
        SubmitOutcome::Failed { error, title, body } => {
            eprintln!("lazyticket: {error}");
            if !title.is_empty() || !body.is_empty() {
                eprintln!("--- summary ---\n{title}\n--- description ---\n{body}");
            }
            match error {
                SubmitError::Internal { .. } => ExitCode::from(EXIT_INTERNAL),
                _ => ExitCode::from(EXIT_SUBMIT),
            }
        }
    }
}

#[cfg(unix)]
fn install_restore_hook(terminal: &mut ProcessTerminal) {
    if let Some(handle) = terminal.restore_handle() {
        ticket_tui::platform::install_panic_hook(handle);
    }
}

#[cfg(not(unix))]
fn install_restore_hook(_terminal: &mut ProcessTerminal) {}
