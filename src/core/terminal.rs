//! Terminal trait and lifecycle guard.

use std::io;

use crate::core::input_event::InputEvent;

/// Minimal pull-based terminal interface.
///
/// Every method is called from the thread that owns the terminal; implementations must not
/// deliver input from other threads.
pub trait Terminal {
    /// Enter raw mode and enable the input features the form needs.
    fn start(&mut self) -> io::Result<()>;

    /// Leave raw mode and restore the terminal.
    fn stop(&mut self) -> io::Result<()>;

    /// Block until at least one input or resize event is available.
    ///
    /// An empty vector means the input source is closed.
    fn read_events(&mut self) -> io::Result<Vec<InputEvent>>;

    /// Discard pending input for up to `max_ms`, stopping early after `idle_ms` of silence.
    fn drain_input(&mut self, max_ms: u64, idle_ms: u64);

    /// Write output to the terminal.
    fn write(&mut self, data: &str) -> io::Result<()>;

    /// Terminal dimensions.
    fn columns(&self) -> u16;
    fn rows(&self) -> u16;
}

/// RAII guard that drains input and stops the terminal on drop.
///
/// Use [`TerminalGuard::finish`] on the normal path so stop errors are reported; the drop path
/// is best-effort.
pub struct TerminalGuard<T: Terminal> {
    terminal: T,
    active: bool,
    max_drain_ms: u64,
    idle_drain_ms: u64,
}

impl<T: Terminal> TerminalGuard<T> {
    /// Start `terminal` with default drain timings (max 1000ms, idle 50ms).
    pub fn start(mut terminal: T) -> io::Result<Self> {
        terminal.start()?;
        Ok(Self {
            terminal,
            active: true,
            max_drain_ms: 1000,
            idle_drain_ms: 50,
        })
    }

    /// Adjust drain timings.
    pub fn set_drain_timings(&mut self, max_ms: u64, idle_ms: u64) {
        self.max_drain_ms = max_ms;
        self.idle_drain_ms = idle_ms;
    }

    pub fn terminal_mut(&mut self) -> &mut T {
        &mut self.terminal
    }

    /// Drain and stop the terminal, reporting a stop failure.
    pub fn finish(mut self) -> io::Result<()> {
        self.active = false;
        self.terminal
            .drain_input(self.max_drain_ms, self.idle_drain_ms);
        self.terminal.stop()
    }
}

impl<T: Terminal> Drop for TerminalGuard<T> {
    fn drop(&mut self) {
        if self.active {
            self.active = false;
            self.terminal
                .drain_input(self.max_drain_ms, self.idle_drain_ms);
            let _ = self.terminal.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Terminal, TerminalGuard};
    use crate::core::input_event::InputEvent;
    use std::cell::RefCell;
    use std::io;
    use std::rc::Rc;

    #[derive(Default)]
    struct Calls {
        start: usize,
        stop: usize,
        drains: Vec<(u64, u64)>,
    }

    struct CountingTerminal(Rc<RefCell<Calls>>);

    impl Terminal for CountingTerminal {
        fn start(&mut self) -> io::Result<()> {
            self.0.borrow_mut().start += 1;
            Ok(())
        }

        fn stop(&mut self) -> io::Result<()> {
            self.0.borrow_mut().stop += 1;
            Ok(())
        }

        fn read_events(&mut self) -> io::Result<Vec<InputEvent>> {
            Ok(Vec::new())
        }

        fn drain_input(&mut self, max_ms: u64, idle_ms: u64) {
            self.0.borrow_mut().drains.push((max_ms, idle_ms));
        }

        fn write(&mut self, _data: &str) -> io::Result<()> {
            Ok(())
        }

        fn columns(&self) -> u16 {
            80
        }

        fn rows(&self) -> u16 {
            24
        }
    }

    #[test]
    fn drop_drains_and_stops_once() {
        let calls = Rc::new(RefCell::new(Calls::default()));
        {
            let mut guard = TerminalGuard::start(CountingTerminal(Rc::clone(&calls))).unwrap();
            guard.set_drain_timings(10, 2);
        }
        let calls = calls.borrow();
        assert_eq!(calls.start, 1);
        assert_eq!(calls.stop, 1);
        assert_eq!(calls.drains, vec![(10, 2)]);
    }

    #[test]
    fn finish_disarms_drop() {
        let calls = Rc::new(RefCell::new(Calls::default()));
        let guard = TerminalGuard::start(CountingTerminal(Rc::clone(&calls))).unwrap();
        guard.finish().unwrap();
        let calls = calls.borrow();
        assert_eq!(calls.stop, 1);
        assert_eq!(calls.drains, vec![(1000, 50)]);
    }
}
