// SPDX-License-Identifier: MIT
//
// Session — the one object that owns a terminal while a program uses it.
//
// A session owns the device, the mode it found the device in, the output
// buffer, the viewport, and the key input state. `init` captures the
// original mode and applies the configured flags; `deinit` (or dropping the
// session) resets the style and puts the original mode back.
//
// Failures never stop a session. Each OS call that fails is logged at
// `warn` when it happens and the session carries on degraded: without a mode
// it still draws, without a size it assumes 80×24. Operations that can fail
// also return the error so the host can decide whether it cares.
//
// Key input is a poll loop. Device reads never block (VMIN = VTIME = 0);
// `get_key` waits by sleeping `poll_interval` between reads unless
// `NON_BLOCKING_READ` is set. A resize noticed by the device beats any
// buffered input.

use std::io;
use std::thread;
use std::time::Duration;

use crate::ansi;
use crate::config::Config;
use crate::device::{Device, Size, TtyDevice};
use crate::error::{Error, Result};
use crate::input::{self, Decoded, Key};
use crate::mode::{Flags, Mode};
use crate::output::OutputBuffer;
use crate::viewport::Viewport;

/// Most bytes taken from the device per read.
const READ_CHUNK: usize = 16;

/// A terminal session.
///
/// # Example
///
/// ```no_run
/// use ep_term::{Attr, Config, Flags, Key, Session};
///
/// let mut term = Session::open(Config::with_flags(Flags::NO_ECHO | Flags::NO_LINE_BUFFERING))?;
/// term.clear()?;
/// term.draw_str(0, 0, Attr::NONE, "Press any key")?;
/// term.flush()?;
/// while term.get_key()? == Key::RESIZE {}
/// term.deinit()?;
/// # Ok::<(), ep_term::Error>(())
/// ```
pub struct Session<D: Device> {
    device: D,
    config: Config,
    /// Mode found at init; restored on deinit.
    original: Option<Mode>,
    /// Mode last applied.
    current: Option<Mode>,
    flags: Flags,
    /// Key handed back by the next `get_key`.
    injected: Option<Key>,
    /// Bytes read but not yet decoded.
    pending: Vec<u8>,
    size: Size,
    out: OutputBuffer,
    viewport: Viewport,
    /// Relative to the viewport origin.
    cursor: (u32, u32),
    /// Reused by `draw_fmt`.
    pub(crate) scratch: Vec<u8>,
    /// What `init` had to do without.
    init_errors: Vec<Error>,
    finished: bool,
}

impl Session<TtyDevice> {
    /// Start a session on the process terminal.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TerminalInUse`] if a session on the process terminal
    /// is already running. Everything else degrades (see [`Session::init`]).
    pub fn open(config: Config) -> Result<Self> {
        Ok(Self::init(TtyDevice::open()?, config))
    }
}

impl<D: Device> Session<D> {
    // ── Lifecycle ───────────────────────────────────────────────────

    /// Start a session on `device`.
    ///
    /// Captures the device's mode as the restore target, starts watching
    /// for resizes, caches the window size, and applies `config.flags`.
    /// None of these are fatal: each failure is logged and the session
    /// starts without that capability.
    ///
    /// The failures are kept in [`init_errors`](Self::init_errors).
    pub fn init(mut device: D, config: Config) -> Self {
        let mut init_errors = Vec::new();

        let original = match device.get_mode() {
            Ok(mode) => Some(mode),
            Err(e) => {
                tracing::warn!(error = %e, "failed to get terminal mode");
                init_errors.push(Error::ModeQuery(e));
                None
            }
        };

        if let Err(e) = device.watch_resize() {
            tracing::warn!(error = %e, "failed to install resize handler");
            init_errors.push(Error::ResizeWatch(e));
        }

        let size = match device.window_size() {
            Ok(size) => size,
            Err(e) => {
                tracing::warn!(error = %e, "failed to get window size, assuming 80x24");
                init_errors.push(Error::WindowSize(e));
                Size::FALLBACK
            }
        };

        let mut session = Self {
            device,
            config,
            original,
            current: original,
            flags: Flags::empty(),
            injected: None,
            pending: Vec::with_capacity(READ_CHUNK),
            size,
            out: OutputBuffer::with_capacity(config.buffer_capacity),
            viewport: Viewport::full(size),
            cursor: (0, 0),
            scratch: Vec::with_capacity(config.format_capacity),
            init_errors,
            finished: false,
        };

        // Without an original mode the query failure already covers this.
        if let Err(e) = session.set_flags(config.flags) {
            if original.is_some() {
                session.init_errors.push(e);
            }
        }

        tracing::debug!(
            cols = size.cols,
            rows = size.rows,
            has_mode = original.is_some(),
            "session started"
        );
        session
    }

    /// Failures `init` carried on past, in the order they happened.
    ///
    /// Empty when the device supported everything. A
    /// [`ResizeWatch`](Error::ResizeWatch) entry means [`Key::RESIZE`] will
    /// never be reported.
    #[inline]
    #[must_use]
    pub fn init_errors(&self) -> &[Error] {
        &self.init_errors
    }

    /// End the session: reset the style, move to a fresh line, flush, and
    /// restore the original mode.
    ///
    /// Dropping a session does the same thing, ignoring errors.
    ///
    /// # Errors
    ///
    /// Returns the first failure. Restoring the mode is attempted even if
    /// the final write fails.
    pub fn deinit(mut self) -> Result<()> {
        self.finish()
    }

    fn finish(&mut self) -> Result<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;

        let written = self
            .push_sequence(ansi::DEINIT)
            .and_then(|()| self.flush());

        let restored = match self.original {
            Some(original) => self.device.set_mode(&original).map_err(|e| {
                tracing::warn!(error = %e, "failed to restore terminal mode");
                Error::ModeSet(e)
            }),
            None => Ok(()),
        };
        if restored.is_ok() {
            self.current = self.original;
        }

        tracing::debug!("session ended");
        written.and(restored)
    }

    // ── Flags ───────────────────────────────────────────────────────

    /// Change how input is delivered.
    ///
    /// The device mode is recomputed from the original mode, so flags don't
    /// accumulate. `NON_BLOCKING_READ` takes effect even if the mode can't
    /// be applied.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ModeUnavailable`] if no mode was captured at init,
    /// or [`Error::ModeSet`] if the device rejects the mode.
    pub fn set_flags(&mut self, flags: Flags) -> Result<()> {
        self.flags = flags;

        let Some(original) = self.original else {
            tracing::debug!(?flags, "no terminal mode to configure");
            return Err(Error::ModeUnavailable);
        };

        let mode = Mode::configured(&original, flags);
        self.device.set_mode(&mode).map_err(|e| {
            tracing::warn!(error = %e, ?flags, "failed to set terminal mode");
            Error::ModeSet(e)
        })?;
        self.current = Some(mode);

        tracing::debug!(?flags, "flags applied");
        Ok(())
    }

    /// The flags last requested.
    #[inline]
    #[must_use]
    pub const fn flags(&self) -> Flags {
        self.flags
    }

    /// The mode the device is in, if known.
    #[inline]
    #[must_use]
    pub const fn mode(&self) -> Option<Mode> {
        self.current
    }

    /// The mode captured at init, if any.
    #[inline]
    #[must_use]
    pub const fn original_mode(&self) -> Option<Mode> {
        self.original
    }

    /// Change how long `get_key` sleeps between polls.
    pub fn set_poll_interval(&mut self, interval: Duration) {
        self.config.poll_interval = interval;
    }

    #[inline]
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    // ── Size ────────────────────────────────────────────────────────

    /// Query the window size, updating the cached size.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WindowSize`] if the query fails; the cached size is
    /// kept.
    pub fn get_size(&mut self) -> Result<Size> {
        match self.device.window_size() {
            Ok(size) => {
                self.size = size;
                Ok(size)
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to get window size");
                Err(Error::WindowSize(e))
            }
        }
    }

    /// The window size as of the last query.
    #[inline]
    #[must_use]
    pub const fn size(&self) -> Size {
        self.size
    }

    // ── Output ──────────────────────────────────────────────────────

    /// Write everything buffered.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Write`] if the device write fails. Buffered bytes
    /// are dropped either way.
    pub fn flush(&mut self) -> Result<()> {
        self.out
            .flush(&mut self.device, true)
            .map(|_| ())
            .map_err(write_failed)
    }

    /// Reset the style, home the cursor, and erase the screen, then flush.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Write`] if the device write fails.
    pub fn clear(&mut self) -> Result<()> {
        self.push_sequence(ansi::CLEAR_HOME)?;
        self.flush()
    }

    /// Show or hide the cursor.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Write`] if flushing the buffer fails.
    pub fn set_cursor_visibility(&mut self, visible: bool) -> Result<()> {
        self.push_sequence(ansi::cursor_visibility(visible))?;
        self.auto_flush()
    }

    /// Move the cursor to `(x, y)` relative to the viewport.
    ///
    /// With clipping on, the position is clamped to the last viewport
    /// cell.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Write`] if flushing the buffer fails.
    pub fn set_cursor_pos(&mut self, x: u32, y: u32) -> Result<()> {
        self.place_cursor(x, y)?;
        self.auto_flush()
    }

    /// Buffer a cursor move without the trailing threshold check.
    pub(crate) fn place_cursor(&mut self, x: u32, y: u32) -> Result<()> {
        self.cursor = self.viewport.clamp(x, y);
        let (col, row) = self.viewport.to_screen(self.cursor.0, self.cursor.1);
        self.push_sequence(ansi::cursor_to(col, row).as_bytes())
    }

    /// Where the cursor was last placed, relative to the viewport.
    #[inline]
    #[must_use]
    pub const fn cursor(&self) -> (u32, u32) {
        self.cursor
    }

    /// Bytes buffered and not yet written.
    #[inline]
    #[must_use]
    pub fn buffered(&self) -> &[u8] {
        self.out.as_bytes()
    }

    pub(crate) fn push_sequence(&mut self, seq: &[u8]) -> Result<()> {
        self.out
            .push_sequence(seq, &mut self.device)
            .map_err(write_failed)
    }

    pub(crate) fn push_glyph(&mut self, b: u8) -> Result<()> {
        self.out.push_glyph(b, &mut self.device).map_err(write_failed)
    }

    /// Flush if the buffer has passed its threshold.
    pub(crate) fn auto_flush(&mut self) -> Result<()> {
        self.out
            .flush(&mut self.device, false)
            .map(|_| ())
            .map_err(write_failed)
    }

    // ── Viewport ────────────────────────────────────────────────────

    /// Set the rectangle drawing coordinates are relative to.
    ///
    /// The window size is re-queried first. The rectangle is shrunk to fit
    /// the screen; an origin off the screen gives a zero-area viewport on
    /// which every draw does nothing. The cursor is clamped into the new
    /// viewport when clipping is on.
    ///
    /// The viewport is not adjusted on resize. Set it again after
    /// receiving [`Key::RESIZE`].
    pub fn set_viewport(&mut self, x: u32, y: u32, w: u32, h: u32, clip: bool) {
        let _ = self.get_size();
        self.viewport = Viewport::fitted(x, y, w, h, clip, self.size);
        self.cursor = self.viewport.clamp(self.cursor.0, self.cursor.1);
        tracing::trace!(viewport = ?self.viewport, "viewport set");
    }

    #[inline]
    #[must_use]
    pub const fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Whether relative column `x` lies in the viewport.
    #[inline]
    #[must_use]
    pub const fn pos_in_viewport_x(&self, x: u32) -> bool {
        self.viewport.contains_x(x)
    }

    /// Whether relative row `y` lies in the viewport.
    #[inline]
    #[must_use]
    pub const fn pos_in_viewport_y(&self, y: u32) -> bool {
        self.viewport.contains_y(y)
    }

    /// Whether relative `(x, y)` lies in the viewport.
    #[inline]
    #[must_use]
    pub const fn pos_in_viewport_xy(&self, x: u32, y: u32) -> bool {
        self.viewport.contains(x, y)
    }

    // ── Input ───────────────────────────────────────────────────────

    /// Make the next [`get_key`](Self::get_key) return `key`.
    ///
    /// Only one key is held; a second call replaces the first.
    pub fn set_key(&mut self, key: Key) {
        self.injected = Some(key);
    }

    /// Wait for the next key or event.
    ///
    /// Returns an injected key first, then [`Key::RESIZE`] if the window
    /// changed size (the cached size is refreshed), then the next decoded
    /// key. With `NON_BLOCKING_READ` set, returns [`Key::NONE`] when nothing
    /// is ready instead of waiting. An unrecognised escape sequence is
    /// also reported as [`Key::NONE`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Read`] if reading the device fails. Interrupted
    /// and would-block reads are retried.
    pub fn get_key(&mut self) -> Result<Key> {
        if let Some(key) = self.injected.take() {
            tracing::trace!(?key, "injected key");
            return Ok(key);
        }

        loop {
            if self.device.take_resize() {
                let _ = self.get_size();
                tracing::debug!(cols = self.size.cols, rows = self.size.rows, "terminal resized");
                return Ok(Key::RESIZE);
            }

            if let Some(key) = self.decode_pending() {
                return Ok(key);
            }

            let n = self.read_input()?;
            if n > 0 {
                if let Some(key) = self.decode_pending() {
                    return Ok(key);
                }
            }

            if self.flags.contains(Flags::NON_BLOCKING_READ) {
                return Ok(Key::NONE);
            }

            if n == 0 {
                thread::sleep(self.config.poll_interval);
            }
        }
    }

    /// Decode one key from the pending input, if a whole one is there.
    fn decode_pending(&mut self) -> Option<Key> {
        if self.pending.is_empty() {
            return None;
        }
        match input::decode(&self.pending) {
            Decoded::Key(key, used) => {
                self.pending.drain(..used);
                tracing::trace!(?key, "key");
                Some(key)
            }
            Decoded::Incomplete => None,
        }
    }

    /// Read one chunk into the pending input. Returns the byte count.
    fn read_input(&mut self) -> Result<usize> {
        let mut buf = [0u8; READ_CHUNK];
        loop {
            match self.device.read(&mut buf) {
                Ok(n) => {
                    self.pending.extend_from_slice(&buf[..n]);
                    return Ok(n);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => return Ok(0),
                Err(e) => {
                    tracing::warn!(error = %e, "failed to read input");
                    return Err(Error::Read(e));
                }
            }
        }
    }

    // ── Device access ───────────────────────────────────────────────

    #[inline]
    #[must_use]
    pub const fn device(&self) -> &D {
        &self.device
    }

    /// The device, for things the session doesn't wrap.
    ///
    /// Bytes written here bypass the output buffer.
    #[inline]
    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }
}

impl<D: Device> Drop for Session<D> {
    fn drop(&mut self) {
        let _ = self.finish();
    }
}

fn write_failed(e: io::Error) -> Error {
    tracing::warn!(error = %e, "failed to write output");
    Error::Write(e)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
