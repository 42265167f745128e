//! Interactive terminal form that files a Jira ticket.
//!
//! ## Flow
//!
//! 1. [`settings::load`] reads the YAML settings file once.
//! 2. [`runtime::run_form`] drives the [`form`] state machine over a raw-mode terminal until
//!    the operator completes or cancels it.
//! 3. On completion only, a [`submit::TicketSubmitter`] files the ticket once.
//!
//! ## Settings file
//!
//! `$LAZYTICKET_CONFIG`, or `~/.config/lazyjira/config.yaml`:
//!
//! ```yaml
//! jira_url: https://example.atlassian.net
//! username: me@example.com
//! api_key: secret
//! create_issue:
//!   project: OPS
//!   issue_type: Bug        # optional, defaults to Bug
//!   custom_fields:         # optional, sent verbatim
//!     customfield_10010: { value: "Platform" }
//! ```

pub mod form;
pub mod keymap;
pub mod runtime;
pub mod settings;
pub mod submit;
pub mod view;
