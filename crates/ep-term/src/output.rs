// SPDX-License-Identifier: MIT
//
// Output buffering.
//
// Everything destined for the terminal accumulates here and leaves in one
// write() per flush. The buffer has a fixed logical capacity and a flush
// threshold sitting `FLUSH_MARGIN` bytes below it:
//
//   0 ─────────────────────────── threshold ──── capacity
//   |  normal accumulation           | auto-flush | escape room
//
// Two rules keep escape sequences whole:
//
//   - Sequences are pushed as complete units. If one would not fit in the
//     remaining room, the buffer is flushed *before* it is copied in.
//   - Glyph bytes are pushed one at a time and may trigger a flush only at
//     capacity, which by construction falls between two glyphs.
//
// Drawing operations call `flush(sink, false)` when they finish, which writes
// only when the length has reached the threshold. The margin is larger than
// the longest sequence we ever build, so an operation that starts below the
// threshold can emit its attribute and cursor sequences without forcing an
// early flush.

use std::io::{self, Write};

use crate::ansi::MAX_SEQUENCE_LEN;

/// Default buffer capacity in bytes.
pub const DEFAULT_CAPACITY: usize = 4096;

/// Distance between the flush threshold and capacity.
pub const FLUSH_MARGIN: usize = 64;

const _: () = assert!(FLUSH_MARGIN >= 2 * MAX_SEQUENCE_LEN);

/// A fixed-capacity byte buffer flushed to a writer in single writes.
///
/// The length never exceeds [`capacity`](Self::capacity).
pub struct OutputBuffer {
    buf: Vec<u8>,
    capacity: usize,
}

impl OutputBuffer {
    /// Create an empty buffer with [`DEFAULT_CAPACITY`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create an empty buffer holding up to `capacity` bytes.
    ///
    /// Capacities smaller than twice [`FLUSH_MARGIN`] are raised to that, so
    /// the threshold always leaves room for a whole sequence.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(2 * FLUSH_MARGIN);
        Self {
            buf: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Number of bytes accumulated.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether the buffer is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Maximum number of bytes held before a flush is forced.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Length at which [`flush`](Self::flush) writes without being forced.
    #[inline]
    #[must_use]
    pub const fn threshold(&self) -> usize {
        self.capacity - FLUSH_MARGIN
    }

    /// The accumulated bytes.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Append one glyph byte, flushing first if the buffer is full.
    ///
    /// # Errors
    ///
    /// Returns an error if the forced flush fails. The byte is still
    /// appended; the failed bytes are dropped.
    pub fn push_glyph(&mut self, b: u8, sink: &mut impl Write) -> io::Result<()> {
        let result = if self.buf.len() >= self.capacity {
            self.write_out(sink)
        } else {
            Ok(())
        };
        self.buf.push(b);
        result
    }

    /// Append a complete escape sequence (or any run that must not be split).
    ///
    /// If the run does not fit in the remaining room the buffer is flushed
    /// first, so the run always lands in a single write.
    ///
    /// # Errors
    ///
    /// Returns an error if the forced flush fails. The run is still
    /// appended; the failed bytes are dropped.
    pub fn push_sequence(&mut self, seq: &[u8], sink: &mut impl Write) -> io::Result<()> {
        debug_assert!(seq.len() <= self.capacity);
        let result = if self.buf.len() + seq.len() > self.capacity {
            self.write_out(sink)
        } else {
            Ok(())
        };
        self.buf.extend_from_slice(seq);
        result
    }

    /// Write the buffer to `sink` if forced or past the threshold.
    ///
    /// Returns whether a write happened. An empty buffer is never written.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `sink` fails. The buffer is reset
    /// either way so the capacity bound holds.
    pub fn flush(&mut self, sink: &mut impl Write, force: bool) -> io::Result<bool> {
        if self.buf.is_empty() || !(force || self.buf.len() >= self.threshold()) {
            return Ok(false);
        }
        self.write_out(sink).map(|()| true)
    }

    fn write_out(&mut self, sink: &mut impl Write) -> io::Result<()> {
        tracing::trace!(bytes = self.buf.len(), "flushing output buffer");
        let result = sink.write_all(&self.buf).and_then(|()| sink.flush());
        self.buf.clear();
        result
    }
}

impl Default for OutputBuffer {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
