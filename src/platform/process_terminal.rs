//! Process-based terminal implementation.
//!
//! Everything runs on the caller's thread: stdin is read with `poll(2)`, and SIGWINCH/SIGTERM
//! are observed through `signal-hook` flags that the read loop checks between polls.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::EnvConfig;
use crate::core::input_event::{parse_input_events, InputEvent};
use crate::core::terminal::Terminal;
use crate::platform::stdin_buffer::StdinBuffer;

#[cfg(unix)]
use libc::{self, c_int};
#[cfg(unix)]
use signal_hook::SigId;

const BRACKETED_PASTE_ON: &str = "\x1b[?2004h";
const BRACKETED_PASTE_OFF: &str = "\x1b[?2004l";
const CURSOR_HIDE: &str = "\x1b[?25l";
const CURSOR_SHOW: &str = "\x1b[?25h";

/// Poll slice while waiting for input; bounds how late a signal flag is noticed.
const IDLE_POLL_MS: i32 = 50;
/// Escape disambiguation window for [`StdinBuffer`].
const ESCAPE_TIMEOUT_MS: u64 = 10;

#[cfg(unix)]
fn write_all_fd_with<FWrite, FWait>(
    fd: c_int,
    bytes: &[u8],
    mut write_once: FWrite,
    mut wait_writable: FWait,
) -> io::Result<()>
where
    FWrite: FnMut(c_int, &[u8]) -> io::Result<usize>,
    FWait: FnMut(c_int) -> io::Result<()>,
{
    let mut written = 0;
    while written < bytes.len() {
        match write_once(fd, &bytes[written..]) {
            Ok(0) => {
                return Err(io::Error::new(io::ErrorKind::WriteZero, "write returned 0"));
            }
            Ok(count) => {
                if count > bytes.len() - written {
                    return Err(io::Error::other(
                        "write returned more bytes than requested",
                    ));
                }
                written += count;
            }
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) if err.kind() == io::ErrorKind::WouldBlock => wait_writable(fd)?,
            Err(err) => return Err(err),
        }
    }
    Ok(())
}

#[cfg(unix)]
fn wait_writable(fd: c_int) -> io::Result<()> {
    let mut fds = libc::pollfd {
        fd,
        events: libc::POLLOUT,
        revents: 0,
    };
    loop {
        let result = unsafe { libc::poll(&mut fds, 1, -1) };
        if result < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                continue;
            }
            return Err(err);
        }
        if result > 0 && (fds.revents & libc::POLLOUT) != 0 {
            return Ok(());
        }
        if result > 0 {
            return Err(io::Error::other(format!(
                "poll(POLLOUT) returned revents=0x{:x}",
                fds.revents
            )));
        }
    }
}

#[cfg(unix)]
fn write_fd(fd: c_int, data: &str) -> io::Result<()> {
    if data.is_empty() {
        return Ok(());
    }
    write_all_fd_with(
        fd,
        data.as_bytes(),
        |fd, buf| {
            let result = unsafe { libc::write(fd, buf.as_ptr() as *const libc::c_void, buf.len()) };
            if result < 0 {
                Err(io::Error::last_os_error())
            } else {
                Ok(result as usize)
            }
        },
        wait_writable,
    )
}

#[cfg(unix)]
fn read_winsize(fd: c_int) -> Option<(u16, u16)> {
    let mut size = libc::winsize {
        ws_row: 0,
        ws_col: 0,
        ws_xpixel: 0,
        ws_ypixel: 0,
    };
    let result = unsafe { libc::ioctl(fd, libc::TIOCGWINSZ, &mut size) };
    if result == 0 && size.ws_col > 0 && size.ws_row > 0 {
        Some((size.ws_col, size.ws_row))
    } else {
        None
    }
}

/// Returns `Ok(true)` when `fd` has input, `Ok(false)` on timeout or signal interruption.
#[cfg(unix)]
fn poll_readable(fd: c_int, timeout_ms: i32) -> io::Result<bool> {
    let mut fds = libc::pollfd {
        fd,
        events: libc::POLLIN,
        revents: 0,
    };
    let result = unsafe { libc::poll(&mut fds, 1, timeout_ms) };
    if result < 0 {
        let err = io::Error::last_os_error();
        if err.kind() == io::ErrorKind::Interrupted {
            return Ok(false);
        }
        return Err(err);
    }
    Ok(result > 0 && (fds.revents & (libc::POLLIN | libc::POLLHUP)) != 0)
}

#[cfg(unix)]
fn get_termios(fd: c_int) -> io::Result<libc::termios> {
    let mut termios = unsafe { std::mem::zeroed::<libc::termios>() };
    let result = unsafe { libc::tcgetattr(fd, &mut termios) };
    if result != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(termios)
}

#[cfg(unix)]
fn set_termios(fd: c_int, termios: &libc::termios) -> io::Result<()> {
    let result = unsafe { libc::tcsetattr(fd, libc::TCSANOW, termios) };
    if result != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

/// Best-effort terminal restore that can run from a panic hook.
///
/// Never panics and never blocks: it only resets termios and re-enables the cursor.
#[cfg(unix)]
#[derive(Clone, Copy)]
pub struct RestoreHandle {
    stdin_fd: c_int,
    stdout_fd: c_int,
    original: libc::termios,
}

#[cfg(unix)]
impl RestoreHandle {
    pub fn restore(&self) {
        let suffix = format!("{BRACKETED_PASTE_OFF}{CURSOR_SHOW}\r\n");
        let _ = unsafe {
            libc::write(
                self.stdout_fd,
                suffix.as_ptr() as *const libc::c_void,
                suffix.len(),
            )
        };
        let _ = set_termios(self.stdin_fd, &self.original);
    }
}

/// Install a panic hook that restores the terminal, then delegates to the previous hook.
#[cfg(unix)]
pub fn install_panic_hook(handle: RestoreHandle) {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        handle.restore();
        previous(info);
    }));
}

#[cfg(unix)]
pub struct ProcessTerminal {
    stdin_fd: c_int,
    stdout_fd: c_int,
    original_termios: Option<libc::termios>,
    stdin_buffer: StdinBuffer,
    resized: Arc<AtomicBool>,
    terminate: Arc<AtomicBool>,
    signal_ids: Vec<SigId>,
    input_closed: bool,
    write_log_path: Option<PathBuf>,
    write_log_failed: bool,
}

#[cfg(unix)]
impl ProcessTerminal {
    pub fn new() -> Self {
        let write_log_path = EnvConfig::from_env().write_log.map(PathBuf::from);

        Self {
            stdin_fd: libc::STDIN_FILENO,
            stdout_fd: libc::STDOUT_FILENO,
            original_termios: None,
            stdin_buffer: StdinBuffer::new(ESCAPE_TIMEOUT_MS),
            resized: Arc::new(AtomicBool::new(false)),
            terminate: Arc::new(AtomicBool::new(false)),
            signal_ids: Vec::new(),
            input_closed: false,
            write_log_path,
            write_log_failed: false,
        }
    }

    /// Panic-safe restore handle; available once the terminal has started.
    pub fn restore_handle(&self) -> Option<RestoreHandle> {
        self.original_termios.map(|original| RestoreHandle {
            stdin_fd: self.stdin_fd,
            stdout_fd: self.stdout_fd,
            original,
        })
    }

    fn enable_raw_mode(&mut self) -> io::Result<()> {
        let original = match self.original_termios {
            Some(original) => original,
            None => {
                let original = get_termios(self.stdin_fd)?;
                self.original_termios = Some(original);
                original
            }
        };
        let mut raw = original;
        unsafe {
            libc::cfmakeraw(&mut raw);
        }
        set_termios(self.stdin_fd, &raw)
    }

    fn restore_raw_mode(&mut self) -> io::Result<()> {
        if let Some(original) = self.original_termios.as_ref() {
            set_termios(self.stdin_fd, original)?;
        }
        Ok(())
    }

    fn register_signals(&mut self) -> io::Result<()> {
        use signal_hook::consts::{SIGHUP, SIGTERM, SIGWINCH};

        self.signal_ids
            .push(signal_hook::flag::register(SIGWINCH, Arc::clone(&self.resized))?);
        for signal in [SIGTERM, SIGHUP] {
            self.signal_ids
                .push(signal_hook::flag::register(signal, Arc::clone(&self.terminate))?);
        }
        Ok(())
    }

    fn unregister_signals(&mut self) {
        for id in self.signal_ids.drain(..) {
            signal_hook::low_level::unregister(id);
        }
    }

    fn pending_signal_events(&self) -> Vec<InputEvent> {
        let mut events = Vec::new();
        if self.resized.swap(false, Ordering::SeqCst) {
            events.push(InputEvent::Resize {
                columns: self.columns(),
                rows: self.rows(),
            });
        }
        if self.terminate.swap(false, Ordering::SeqCst) {
            events.push(InputEvent::Interrupt);
        }
        events
    }

    /// Read whatever is available; `Ok(None)` means stdin reached end of file.
    fn read_chunk(&mut self, buffer: &mut [u8]) -> io::Result<Option<usize>> {
        loop {
            let read_len =
                unsafe { libc::read(self.stdin_fd, buffer.as_mut_ptr() as *mut _, buffer.len()) };
            if read_len > 0 {
                return Ok(Some(read_len as usize));
            }
            if read_len == 0 {
                return Ok(None);
            }
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                continue;
            }
            return Err(err);
        }
    }

    fn tee_write_log(&mut self, data: &str) {
        if self.write_log_failed {
            return;
        }
        if let Some(path) = self.write_log_path.as_ref() {
            let result = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .and_then(|mut file| file.write_all(data.as_bytes()));
            if let Err(err) = result {
                tracing::warn!(path = %path.display(), error = %err, "disabling terminal write log");
                self.write_log_failed = true;
            }
        }
    }
}

#[cfg(unix)]
impl Default for ProcessTerminal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(unix)]
impl Terminal for ProcessTerminal {
    fn start(&mut self) -> io::Result<()> {
        self.enable_raw_mode()?;
        if let Err(err) = self.register_signals() {
            self.unregister_signals();
            let _ = self.restore_raw_mode();
            return Err(err);
        }

        self.stdin_buffer.clear();
        self.input_closed = false;
        // Report the starting size as the first event.
        self.resized.store(true, Ordering::SeqCst);
        self.write(&format!("{BRACKETED_PASTE_ON}{CURSOR_HIDE}"))?;
        tracing::debug!(
            columns = self.columns(),
            rows = self.rows(),
            "terminal started in raw mode"
        );
        Ok(())
    }

    fn stop(&mut self) -> io::Result<()> {
        self.unregister_signals();
        let write_result = self.write(&format!("{BRACKETED_PASTE_OFF}{CURSOR_SHOW}"));

        // Flush input before leaving raw mode so buffered bytes don't leak to the shell.
        let _ = unsafe { libc::tcflush(self.stdin_fd, libc::TCIFLUSH) };

        self.restore_raw_mode()?;
        tracing::debug!("terminal restored");
        write_result
    }

    fn read_events(&mut self) -> io::Result<Vec<InputEvent>> {
        let mut buffer = [0u8; 4096];

        loop {
            let mut events = self.pending_signal_events();
            if !events.is_empty() {
                return Ok(events);
            }
            if self.input_closed {
                return Ok(events);
            }

            let timeout_ms = self
                .stdin_buffer
                .next_timeout_ms(Instant::now(), IDLE_POLL_MS);
            let stdin_events = if poll_readable(self.stdin_fd, timeout_ms)? {
                match self.read_chunk(&mut buffer)? {
                    Some(len) => self.stdin_buffer.process(&buffer[..len]),
                    None => {
                        self.input_closed = true;
                        self.stdin_buffer.flush()
                    }
                }
            } else {
                self.stdin_buffer.flush_due(Instant::now())
            };

            for event in stdin_events {
                events.extend(parse_input_events(&event.into_wire()));
            }
            events.extend(self.pending_signal_events());

            if !events.is_empty() || self.input_closed {
                return Ok(events);
            }
        }
    }

    fn drain_input(&mut self, max_ms: u64, idle_ms: u64) {
        let mut buffer = [0u8; 1024];
        let deadline = Instant::now() + Duration::from_millis(max_ms);
        let idle_ms = idle_ms.min(i32::MAX as u64) as i32;

        while Instant::now() < deadline && !self.input_closed {
            match poll_readable(self.stdin_fd, idle_ms) {
                Ok(true) => match self.read_chunk(&mut buffer) {
                    Ok(Some(_)) => continue,
                    _ => break,
                },
                _ => break,
            }
        }
        self.stdin_buffer.clear();
    }

    fn write(&mut self, data: &str) -> io::Result<()> {
        write_fd(self.stdout_fd, data)?;
        self.tee_write_log(data);
        Ok(())
    }

    fn columns(&self) -> u16 {
        read_winsize(self.stdout_fd)
            .map(|(cols, _)| cols)
            .unwrap_or(80)
    }

    fn rows(&self) -> u16 {
        read_winsize(self.stdout_fd)
            .map(|(_, rows)| rows)
            .unwrap_or(24)
    }
}

#[cfg(unix)]
impl Drop for ProcessTerminal {
    fn drop(&mut self) {
        self.unregister_signals();
    }
}

#[cfg(not(unix))]
pub struct ProcessTerminal;

#[cfg(not(unix))]
impl ProcessTerminal {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(not(unix))]
fn unsupported() -> io::Error {
    io::Error::new(
        io::ErrorKind::Unsupported,
        "ProcessTerminal is only supported on Unix platforms",
    )
}

#[cfg(not(unix))]
impl Terminal for ProcessTerminal {
    fn start(&mut self) -> io::Result<()> {
        Err(unsupported())
    }

    fn stop(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn read_events(&mut self) -> io::Result<Vec<InputEvent>> {
        Err(unsupported())
    }

    fn drain_input(&mut self, _max_ms: u64, _idle_ms: u64) {}

    fn write(&mut self, _data: &str) -> io::Result<()> {
        Err(unsupported())
    }

    fn columns(&self) -> u16 {
        80
    }

    fn rows(&self) -> u16 {
        24
    }
}
