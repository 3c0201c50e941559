// SPDX-License-Identifier: MIT
//
// Devices — where bytes come from and go to.
//
// Safety: the tty device necessarily uses `unsafe` for termios (tcgetattr,
// tcsetattr), ioctl (TIOCGWINSZ), sigaction, and raw fd reads and writes.
// These are the POSIX terminal interfaces; there is no safe alternative.
#![allow(unsafe_code)]
//
// A `Device` is a byte stream (`Read` + `Write`) plus the three terminal
// extras the session needs: a line-discipline mode it can read and set, a
// window size, and an asynchronous resize flag.
//
// `TtyDevice` is the process's own stdin/stdout. Resize notification comes
// from a SIGWINCH handler whose only action is storing `true` into a static
// atomic; everything else happens when the session polls `take_resize`.
//
// `MemoryDevice` scripts all of that in memory for tests and for rendering
// without a terminal.

use std::collections::VecDeque;
use std::io::{self, Read, Write};
#[cfg(unix)]
use std::sync::Mutex;
use std::sync::Once;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{Error, Result};
use crate::mode::Mode;
#[cfg(unix)]
use crate::mode::{CharSize, InputModes, LocalModes, OutputModes};

// ─── Size ───────────────────────────────────────────────────────────────────

/// Terminal dimensions in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    /// Number of columns.
    pub cols: u16,
    /// Number of rows.
    pub rows: u16,
}

impl Size {
    /// Assumed when the real size cannot be queried.
    pub const FALLBACK: Self = Self { cols: 80, rows: 24 };
}

// ─── Device ─────────────────────────────────────────────────────────────────

/// A terminal-like character device.
///
/// `read` must not block: it returns `Ok(0)` when nothing is available.
/// Every `flush` call on the `Write` side marks the end of one output unit.
pub trait Device: Read + Write {
    /// Current window size in character cells.
    ///
    /// # Errors
    ///
    /// Returns an error if the size cannot be determined.
    fn window_size(&mut self) -> io::Result<Size>;

    /// Current line-discipline mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the device has no mode (not a terminal).
    fn get_mode(&mut self) -> io::Result<Mode>;

    /// Apply a line-discipline mode, discarding unread input.
    ///
    /// # Errors
    ///
    /// Returns an error if the mode cannot be applied.
    fn set_mode(&mut self, mode: &Mode) -> io::Result<()>;

    /// Start delivering resize notifications to [`take_resize`](Self::take_resize).
    ///
    /// # Errors
    ///
    /// Returns an error if the notification cannot be installed.
    fn watch_resize(&mut self) -> io::Result<()>;

    /// Whether a resize happened since the last call. Clears the flag.
    fn take_resize(&mut self) -> bool;
}

impl<D: Device + ?Sized> Device for &mut D {
    fn window_size(&mut self) -> io::Result<Size> {
        (**self).window_size()
    }

    fn get_mode(&mut self) -> io::Result<Mode> {
        (**self).get_mode()
    }

    fn set_mode(&mut self, mode: &Mode) -> io::Result<()> {
        (**self).set_mode(mode)
    }

    fn watch_resize(&mut self) -> io::Result<()> {
        (**self).watch_resize()
    }

    fn take_resize(&mut self) -> bool {
        (**self).take_resize()
    }
}

// ─── SIGWINCH ───────────────────────────────────────────────────────────────

/// Set by the SIGWINCH handler, cleared by [`TtyDevice::take_resize`].
static RESIZED: AtomicBool = AtomicBool::new(false);

#[cfg(unix)]
extern "C" fn sigwinch_handler(_sig: libc::c_int) {
    RESIZED.store(true, Ordering::Relaxed);
}

#[cfg(unix)]
fn install_sigwinch_handler() -> io::Result<()> {
    unsafe {
        let mut sa: libc::sigaction = std::mem::zeroed();
        sa.sa_sigaction = sigwinch_handler as *const () as usize;
        sa.sa_flags = libc::SA_RESTART;
        libc::sigemptyset(&raw mut sa.sa_mask);
        if libc::sigaction(libc::SIGWINCH, &raw const sa, std::ptr::null_mut()) != 0 {
            return Err(io::Error::last_os_error());
        }
    }
    Ok(())
}

#[cfg(not(unix))]
fn install_sigwinch_handler() -> io::Result<()> {
    Err(io::Error::from(io::ErrorKind::Unsupported))
}

// ─── Panic-Safe Restore ─────────────────────────────────────────────────────

/// The mode captured by the first successful [`TtyDevice::get_mode`].
///
/// The panic hook can't reach the session, so it restores from here.
#[cfg(unix)]
static TERMIOS_BACKUP: Mutex<Option<libc::termios>> = Mutex::new(None);

/// Written straight to fd 1 by the panic hook: reset style, show the
/// cursor, start a fresh line.
const EMERGENCY_RESTORE: &[u8] = b"\x1b[m\x1b[?25h\n";

static PANIC_HOOK_INSTALLED: Once = Once::new();

/// Install a panic hook that restores the terminal before printing.
///
/// Bypasses Rust's stdout lock so a panic mid-flush cannot deadlock.
fn install_panic_hook() {
    PANIC_HOOK_INSTALLED.call_once(|| {
        let original = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            emergency_restore();
            original(info);
        }));
    });
}

fn emergency_restore() {
    #[cfg(unix)]
    unsafe {
        let _ = libc::write(
            libc::STDOUT_FILENO,
            EMERGENCY_RESTORE.as_ptr().cast::<libc::c_void>(),
            EMERGENCY_RESTORE.len(),
        );
        if let Ok(guard) = TERMIOS_BACKUP.lock() {
            if let Some(ref original) = *guard {
                let _ = libc::tcsetattr(libc::STDIN_FILENO, libc::TCSAFLUSH, original);
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = io::stdout().write_all(EMERGENCY_RESTORE);
        let _ = io::stdout().flush();
    }
}

// ─── TtyDevice ──────────────────────────────────────────────────────────────

/// Set while a [`TtyDevice`] is alive.
static TTY_CLAIMED: AtomicBool = AtomicBool::new(false);

/// The process's controlling terminal on stdin/stdout.
///
/// At most one exists at a time, which is what makes a session on it the
/// only session in the process.
pub struct TtyDevice {
    #[cfg(unix)]
    input: libc::c_int,
    #[cfg(unix)]
    output: libc::c_int,
    /// Last termios read from the device. Fields `Mode` doesn't cover are
    /// written back from here untouched.
    #[cfg(unix)]
    termios: Option<libc::termios>,
}

impl TtyDevice {
    /// Claim stdin/stdout.
    ///
    /// Also installs (once per process) a panic hook that resets the style
    /// and restores the original mode, so a panicking host still leaves
    /// the shell usable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TerminalInUse`] if another `TtyDevice` is alive.
    pub fn open() -> Result<Self> {
        if TTY_CLAIMED.swap(true, Ordering::AcqRel) {
            return Err(Error::TerminalInUse);
        }
        install_panic_hook();

        let dev = Self {
            #[cfg(unix)]
            input: libc::STDIN_FILENO,
            #[cfg(unix)]
            output: libc::STDOUT_FILENO,
            #[cfg(unix)]
            termios: None,
        };
        tracing::debug!(tty = dev.is_tty(), "claimed process terminal");
        Ok(dev)
    }

    /// Whether stdin is a terminal.
    #[cfg(unix)]
    #[must_use]
    pub fn is_tty(&self) -> bool {
        unsafe { libc::isatty(self.input) != 0 }
    }

    #[cfg(not(unix))]
    #[must_use]
    pub const fn is_tty(&self) -> bool {
        false
    }
}

impl Drop for TtyDevice {
    fn drop(&mut self) {
        #[cfg(unix)]
        if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
            *guard = None;
        }
        TTY_CLAIMED.store(false, Ordering::Release);
    }
}

#[cfg(unix)]
impl Read for TtyDevice {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = unsafe { libc::read(self.input, buf.as_mut_ptr().cast(), buf.len()) };
        if n < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(n.unsigned_abs())
    }
}

#[cfg(unix)]
impl Write for TtyDevice {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = unsafe { libc::write(self.output, buf.as_ptr().cast(), buf.len()) };
        if n < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(n.unsigned_abs())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(unix)]
fn set_bit(field: &mut libc::tcflag_t, bit: libc::tcflag_t, on: bool) {
    if on {
        *field |= bit;
    } else {
        *field &= !bit;
    }
}

#[cfg(unix)]
const INPUT_BITS: [(InputModes, libc::tcflag_t); 7] = [
    (InputModes::IGNORE_BREAK, libc::IGNBRK),
    (InputModes::BREAK_INTERRUPT, libc::BRKINT),
    (InputModes::STRIP, libc::ISTRIP),
    (InputModes::NL_TO_CR, libc::INLCR),
    (InputModes::IGNORE_CR, libc::IGNCR),
    (InputModes::CR_TO_NL, libc::ICRNL),
    (InputModes::FLOW_CONTROL, libc::IXON),
];

#[cfg(unix)]
const LOCAL_BITS: [(LocalModes, libc::tcflag_t); 4] = [
    (LocalModes::ECHO, libc::ECHO),
    (LocalModes::CANONICAL, libc::ICANON),
    (LocalModes::SIGNALS, libc::ISIG),
    (LocalModes::EXTENDED, libc::IEXTEN),
];

#[cfg(unix)]
fn mode_from_termios(t: &libc::termios) -> Mode {
    let mut mode = Mode::default();
    for (ours, theirs) in INPUT_BITS {
        mode.input.set(ours, t.c_iflag & theirs != 0);
    }
    for (ours, theirs) in LOCAL_BITS {
        mode.local.set(ours, t.c_lflag & theirs != 0);
    }
    mode.output
        .set(OutputModes::POST_PROCESS, t.c_oflag & libc::OPOST != 0);
    mode.char_size = match t.c_cflag & libc::CSIZE {
        libc::CS5 => CharSize::Five,
        libc::CS6 => CharSize::Six,
        libc::CS7 => CharSize::Seven,
        _ => CharSize::Eight,
    };
    mode.read_min = t.c_cc[libc::VMIN];
    mode.read_timeout = t.c_cc[libc::VTIME];
    mode
}

#[cfg(unix)]
fn apply_to_termios(mode: &Mode, t: &mut libc::termios) {
    for (ours, theirs) in INPUT_BITS {
        set_bit(&mut t.c_iflag, theirs, mode.input.contains(ours));
    }
    for (ours, theirs) in LOCAL_BITS {
        set_bit(&mut t.c_lflag, theirs, mode.local.contains(ours));
    }
    set_bit(
        &mut t.c_oflag,
        libc::OPOST,
        mode.output.contains(OutputModes::POST_PROCESS),
    );
    t.c_cflag &= !libc::CSIZE;
    t.c_cflag |= match mode.char_size {
        CharSize::Five => libc::CS5,
        CharSize::Six => libc::CS6,
        CharSize::Seven => libc::CS7,
        CharSize::Eight => libc::CS8,
    };
    t.c_cc[libc::VMIN] = mode.read_min;
    t.c_cc[libc::VTIME] = mode.read_timeout;
}

#[cfg(unix)]
impl TtyDevice {
    fn read_termios(&self) -> io::Result<libc::termios> {
        unsafe {
            let mut t: libc::termios = std::mem::zeroed();
            if libc::tcgetattr(self.input, &raw mut t) != 0 {
                return Err(io::Error::last_os_error());
            }
            Ok(t)
        }
    }

    fn query_size(fd: libc::c_int) -> Option<Size> {
        let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
        let result = unsafe { libc::ioctl(fd, libc::TIOCGWINSZ, &mut ws) };
        (result == 0 && ws.ws_col > 0 && ws.ws_row > 0).then_some(Size {
            cols: ws.ws_col,
            rows: ws.ws_row,
        })
    }
}

#[cfg(unix)]
impl Device for TtyDevice {
    fn window_size(&mut self) -> io::Result<Size> {
        Self::query_size(self.output)
            .or_else(|| Self::query_size(self.input))
            .ok_or_else(io::Error::last_os_error)
    }

    fn get_mode(&mut self) -> io::Result<Mode> {
        let t = self.read_termios()?;
        if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
            guard.get_or_insert(t);
        }
        self.termios = Some(t);
        Ok(mode_from_termios(&t))
    }

    fn set_mode(&mut self, mode: &Mode) -> io::Result<()> {
        let mut t = match self.termios {
            Some(t) => t,
            None => self.read_termios()?,
        };
        apply_to_termios(mode, &mut t);
        unsafe {
            if libc::tcsetattr(self.input, libc::TCSAFLUSH, &raw const t) != 0 {
                return Err(io::Error::last_os_error());
            }
        }
        self.termios = Some(t);
        Ok(())
    }

    fn watch_resize(&mut self) -> io::Result<()> {
        install_sigwinch_handler()
    }

    fn take_resize(&mut self) -> bool {
        RESIZED.swap(false, Ordering::Relaxed)
    }
}

#[cfg(not(unix))]
impl Read for TtyDevice {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::from(io::ErrorKind::Unsupported))
    }
}

#[cfg(not(unix))]
impl Write for TtyDevice {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stdout().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stdout().flush()
    }
}

#[cfg(not(unix))]
impl Device for TtyDevice {
    fn window_size(&mut self) -> io::Result<Size> {
        Err(io::Error::from(io::ErrorKind::Unsupported))
    }

    fn get_mode(&mut self) -> io::Result<Mode> {
        Err(io::Error::from(io::ErrorKind::Unsupported))
    }

    fn set_mode(&mut self, _mode: &Mode) -> io::Result<()> {
        Err(io::Error::from(io::ErrorKind::Unsupported))
    }

    fn watch_resize(&mut self) -> io::Result<()> {
        install_sigwinch_handler()
    }

    fn take_resize(&mut self) -> bool {
        RESIZED.swap(false, Ordering::Relaxed)
    }
}

// ─── MemoryDevice ───────────────────────────────────────────────────────────

/// An in-memory device.
///
/// Input is a queue of chunks, each returned by one `read` (split if the
/// caller's buffer is smaller). Output is recorded as one entry per
/// `flush`. Size and mode can be made unavailable to exercise degraded
/// paths.
///
/// ```
/// use ep_term::device::{MemoryDevice, Size};
/// use ep_term::{Config, Key, Session};
///
/// let dev = MemoryDevice::new(Size { cols: 40, rows: 10 });
/// let mut session = Session::init(dev, Config::default());
/// session.device_mut().push_input(b"q");
/// assert_eq!(session.get_key().unwrap(), Key::from_byte(b'q'));
/// ```
#[derive(Debug, Default)]
pub struct MemoryDevice {
    input: VecDeque<Vec<u8>>,
    pending: Vec<u8>,
    writes: Vec<Vec<u8>>,
    size: Option<Size>,
    mode: Option<Mode>,
    mode_history: Vec<Mode>,
    resized: bool,
    watching: bool,
    fail_writes: bool,
    fail_watch: bool,
}

impl MemoryDevice {
    /// A device of the given size in cooked mode.
    #[must_use]
    pub fn new(size: Size) -> Self {
        Self {
            size: Some(size),
            mode: Some(Mode::cooked()),
            ..Self::default()
        }
    }

    /// A device with no size and no mode, like redirected stdio.
    #[must_use]
    pub fn headless() -> Self {
        Self::default()
    }

    /// Queue bytes to be returned by one read.
    pub fn push_input(&mut self, bytes: impl AsRef<[u8]>) {
        let bytes = bytes.as_ref();
        if !bytes.is_empty() {
            self.input.push_back(bytes.to_vec());
        }
    }

    /// Whether queued input remains unread.
    #[must_use]
    pub fn has_input(&self) -> bool {
        !self.input.is_empty()
    }

    /// Change the size and raise the resize flag.
    ///
    /// The flag is only observed once [`watch_resize`](Device::watch_resize)
    /// has been called.
    pub fn resize(&mut self, size: Size) {
        self.size = Some(size);
        self.resized = true;
    }

    /// Output units, one per flush.
    #[must_use]
    pub fn writes(&self) -> &[Vec<u8>] {
        &self.writes
    }

    /// All flushed output concatenated.
    #[must_use]
    pub fn output(&self) -> Vec<u8> {
        self.writes.concat()
    }

    /// All flushed output, clearing the record.
    pub fn take_output(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.writes).concat()
    }

    /// The mode last applied (or the initial one).
    #[must_use]
    pub const fn mode(&self) -> Option<Mode> {
        self.mode
    }

    /// Every mode applied through `set_mode`, oldest first.
    #[must_use]
    pub fn mode_history(&self) -> &[Mode] {
        &self.mode_history
    }

    /// Make every subsequent write fail with `BrokenPipe`.
    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// Make `watch_resize` fail, so resizes go unnoticed.
    pub fn set_fail_watch_resize(&mut self, fail: bool) {
        self.fail_watch = fail;
    }
}

impl Read for MemoryDevice {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let Some(mut chunk) = self.input.pop_front() else {
            return Ok(0);
        };
        let n = chunk.len().min(buf.len());
        buf[..n].copy_from_slice(&chunk[..n]);
        if n < chunk.len() {
            self.input.push_front(chunk.split_off(n));
        }
        Ok(n)
    }
}

impl Write for MemoryDevice {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.fail_writes {
            return Err(io::Error::from(io::ErrorKind::BrokenPipe));
        }
        self.pending.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if !self.pending.is_empty() {
            self.writes.push(std::mem::take(&mut self.pending));
        }
        Ok(())
    }
}

impl Device for MemoryDevice {
    fn window_size(&mut self) -> io::Result<Size> {
        self.size
            .ok_or_else(|| io::Error::from(io::ErrorKind::Unsupported))
    }

    fn get_mode(&mut self) -> io::Result<Mode> {
        self.mode
            .ok_or_else(|| io::Error::from(io::ErrorKind::Unsupported))
    }

    fn set_mode(&mut self, mode: &Mode) -> io::Result<()> {
        if self.mode.is_none() {
            return Err(io::Error::from(io::ErrorKind::Unsupported));
        }
        self.mode = Some(*mode);
        self.mode_history.push(*mode);
        self.input.clear();
        Ok(())
    }

    fn watch_resize(&mut self) -> io::Result<()> {
        if self.fail_watch {
            return Err(io::Error::from(io::ErrorKind::Unsupported));
        }
        self.watching = true;
        Ok(())
    }

    fn take_resize(&mut self) -> bool {
        self.watching && std::mem::take(&mut self.resized)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    // ── Size ──────────────────────────────────────────────────────────

    #[test]
    fn fallback_is_classic_vt100() {
        assert_eq!(Size::FALLBACK, Size { cols: 80, rows: 24 });
    }

    // ── Emergency restore ─────────────────────────────────────────────

    #[test]
    fn emergency_restore_resets_and_shows_cursor() {
        let s = std::str::from_utf8(EMERGENCY_RESTORE).unwrap();
        assert!(s.starts_with("\x1b[m"));
        assert!(s.contains("\x1b[?25h"));
        assert!(s.ends_with('\n'));
    }

    // ── MemoryDevice: input ───────────────────────────────────────────

    #[test]
    fn reads_return_one_chunk_each() {
        let mut dev = MemoryDevice::new(Size::FALLBACK);
        dev.push_input(b"ab");
        dev.push_input(b"c");
        let mut buf = [0u8; 16];
        assert_eq!(dev.read(&mut buf).unwrap(), 2);
        assert_eq!(&buf[..2], b"ab");
        assert_eq!(dev.read(&mut buf).unwrap(), 1);
        assert_eq!(dev.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn oversized_chunk_is_split() {
        let mut dev = MemoryDevice::new(Size::FALLBACK);
        dev.push_input(b"abcdef");
        let mut buf = [0u8; 4];
        assert_eq!(dev.read(&mut buf).unwrap(), 4);
        assert_eq!(dev.read(&mut buf).unwrap(), 2);
        assert_eq!(&buf[..2], b"ef");
    }

    #[test]
    fn empty_input_is_ignored() {
        let mut dev = MemoryDevice::new(Size::FALLBACK);
        dev.push_input(b"");
        assert!(!dev.has_input());
    }

    // ── MemoryDevice: output ──────────────────────────────────────────

    #[test]
    fn each_flush_is_one_unit() {
        let mut dev = MemoryDevice::new(Size::FALLBACK);
        dev.write_all(b"one").unwrap();
        dev.flush().unwrap();
        dev.write_all(b"two").unwrap();
        dev.write_all(b"!").unwrap();
        dev.flush().unwrap();
        dev.flush().unwrap();
        assert_eq!(dev.writes(), &[b"one".to_vec(), b"two!".to_vec()]);
        assert_eq!(dev.take_output(), b"onetwo!".to_vec());
        assert!(dev.writes().is_empty());
    }

    #[test]
    fn failing_writes() {
        let mut dev = MemoryDevice::new(Size::FALLBACK);
        dev.set_fail_writes(true);
        assert_eq!(
            dev.write(b"x").unwrap_err().kind(),
            io::ErrorKind::BrokenPipe
        );
    }

    // ── MemoryDevice: terminal extras ─────────────────────────────────

    #[test]
    fn resize_is_seen_only_while_watching() {
        let mut dev = MemoryDevice::new(Size::FALLBACK);
        dev.resize(Size { cols: 100, rows: 30 });
        assert!(!dev.take_resize());
        dev.watch_resize().unwrap();
        assert!(dev.take_resize());
        assert!(!dev.take_resize());
        assert_eq!(dev.window_size().unwrap(), Size { cols: 100, rows: 30 });
    }

    #[test]
    fn failed_watch_never_reports_resize() {
        let mut dev = MemoryDevice::new(Size::FALLBACK);
        dev.set_fail_watch_resize(true);
        assert!(dev.watch_resize().is_err());
        dev.resize(Size { cols: 100, rows: 30 });
        assert!(!dev.take_resize());
    }

    #[test]
    fn headless_has_no_size_or_mode() {
        let mut dev = MemoryDevice::headless();
        assert!(dev.window_size().is_err());
        assert!(dev.get_mode().is_err());
        assert!(dev.set_mode(&Mode::cooked()).is_err());
    }

    #[test]
    fn set_mode_records_history_and_discards_input() {
        let mut dev = MemoryDevice::new(Size::FALLBACK);
        dev.push_input(b"typed ahead");
        let mut raw = Mode::cooked();
        raw.read_min = 0;
        dev.set_mode(&raw).unwrap();
        assert_eq!(dev.mode(), Some(raw));
        assert_eq!(dev.mode_history(), &[raw]);
        assert!(!dev.has_input());
    }

    // ── TtyDevice ─────────────────────────────────────────────────────

    #[test]
    fn only_one_tty_device_at_a_time() {
        // Other tests never open the tty, so this one owns the claim.
        let first = TtyDevice::open().unwrap();
        assert!(matches!(TtyDevice::open(), Err(Error::TerminalInUse)));
        drop(first);
        let again = TtyDevice::open().unwrap();
        drop(again);
    }

    #[cfg(unix)]
    #[test]
    fn termios_mapping_round_trips() {
        let mut t: libc::termios = unsafe { std::mem::zeroed() };
        t.c_cflag = libc::CS7 | libc::CREAD;
        t.c_oflag = libc::ONLCR;
        let mode = Mode::configured(&Mode::cooked(), crate::mode::Flags::RAW);
        apply_to_termios(&mode, &mut t);

        assert_eq!(mode_from_termios(&t), mode);
        assert_eq!(t.c_cflag & libc::CSIZE, libc::CS8);
        assert_ne!(t.c_cflag & libc::CREAD, 0, "unmapped bits survive");
        assert_ne!(t.c_oflag & libc::ONLCR, 0, "unmapped bits survive");
        assert_eq!(t.c_lflag & libc::ICANON, 0);
    }
}
