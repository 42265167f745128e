#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io;
use std::rc::Rc;

use lazyticket::settings::Settings;
use lazyticket::submit::{SubmissionResult, SubmitError, TicketSubmitter};
use ticket_tui::{parse_input_events, InputEvent, Terminal};

#[derive(Default)]
pub struct TerminalTrace {
    pub writes: Vec<String>,
    pub start_calls: usize,
    pub stop_calls: usize,
    pub drain_calls: Vec<(u64, u64)>,
    pub reads: usize,
}

impl TerminalTrace {
    pub fn output(&self) -> String {
        self.writes.concat()
    }
}

/// Terminal that replays scripted input batches; an exhausted script reads as closed input.
pub struct ScriptedTerminal {
    script: VecDeque<Vec<InputEvent>>,
    trace: Rc<RefCell<TerminalTrace>>,
    columns: u16,
    rows: u16,
    fail_reads: bool,
}

impl ScriptedTerminal {
    pub fn new(columns: u16, rows: u16) -> (Self, Rc<RefCell<TerminalTrace>>) {
        let trace = Rc::new(RefCell::new(TerminalTrace::default()));
        (
            Self {
                script: VecDeque::new(),
                trace: Rc::clone(&trace),
                columns,
                rows,
                fail_reads: false,
            },
            trace,
        )
    }

    /// Queue one read worth of raw terminal bytes.
    pub fn push_raw(mut self, raw: &str) -> Self {
        self.script.push_back(parse_input_events(raw));
        self
    }

    pub fn push_events(mut self, events: Vec<InputEvent>) -> Self {
        self.script.push_back(events);
        self
    }

    pub fn failing_reads(mut self) -> Self {
        self.fail_reads = true;
        self
    }
}

impl Terminal for ScriptedTerminal {
    fn start(&mut self) -> io::Result<()> {
        self.trace.borrow_mut().start_calls += 1;
        Ok(())
    }

    fn stop(&mut self) -> io::Result<()> {
        self.trace.borrow_mut().stop_calls += 1;
        Ok(())
    }

    fn read_events(&mut self) -> io::Result<Vec<InputEvent>> {
        self.trace.borrow_mut().reads += 1;
        if self.fail_reads {
            return Err(io::Error::other("scripted read failure"));
        }
        Ok(self.script.pop_front().unwrap_or_default())
    }

    fn drain_input(&mut self, max_ms: u64, idle_ms: u64) {
        self.trace.borrow_mut().drain_calls.push((max_ms, idle_ms));
    }

    fn write(&mut self, data: &str) -> io::Result<()> {
        self.trace.borrow_mut().writes.push(data.to_string());
        Ok(())
    }

    fn columns(&self) -> u16 {
        self.columns
    }

    fn rows(&self) -> u16 {
        self.rows
    }
}

/// Records every submission and answers with a canned result.
pub struct SubmitterSpy {
    pub calls: RefCell<Vec<(String, String)>>,
    respond: Box<dyn Fn() -> Result<SubmissionResult, SubmitError>>,
}

impl SubmitterSpy {
    pub fn succeeding(key: &str) -> Self {
        let key = key.to_string();
        Self {
            calls: RefCell::new(Vec::new()),
            respond: Box::new(move || {
                Ok(SubmissionResult {
                    issue_key: key.clone(),
                    issue_url: format!("https://jira.example/rest/api/2/issue/{key}"),
                })
            }),
        }
    }

    pub fn failing(make_error: impl Fn() -> SubmitError + 'static) -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            respond: Box::new(move || Err(make_error())),
        }
    }
}

impl TicketSubmitter for SubmitterSpy {
    fn submit(
        &self,
        _settings: &Settings,
        title: &str,
        body: &str,
    ) -> Result<SubmissionResult, SubmitError> {
        self.calls
            .borrow_mut()
            .push((title.to_string(), body.to_string()));
        (self.respond)()
    }
}

pub fn sample_settings() -> Settings {
    lazyticket::settings::parse(
        "jira_url: https://jira.example\nusername: me\napi_key: tok\ncreate_issue:\n  project: OPS\n",
        std::path::Path::new("test.yaml"),
    )
    .expect("sample settings parse")
}
