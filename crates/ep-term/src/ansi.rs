// SPDX-License-Identifier: MIT
//
// ANSI escape sequence encoding.
//
// Every parameterised sequence is built in a small fixed-size `Sequence` on
// the stack and handed to the output buffer as one unit. The buffer only ever
// sees complete sequences, which is what lets it flush without splitting one.
//
// Parameters are written as decimal digits, most significant first, each
// followed by a `;`. The trailing delimiter is trimmed when the final byte is
// appended, so `ESC [ 1 ; 4 ; 31 ;` becomes `ESC [ 1 ; 4 ; 31 m`.
//
// Cursor positions are 0-indexed in our API and 1-indexed on the wire.

use crate::attr::{Attr, Style};

/// Escape character.
pub const ESC: u8 = 0x1b;

/// Longest sequence [`Sequence`] can hold.
///
/// The largest we build is a cursor move with two ten-digit coordinates
/// (24 bytes); a full attribute sequence tops out at 21.
pub const MAX_SEQUENCE_LEN: usize = 32;

/// Reset style, home the cursor, erase the display.
pub const CLEAR_HOME: &[u8] = b"\x1b[m\x1b[H\x1b[2J";

/// Show the cursor (DECTCEM set).
pub const CURSOR_SHOW: &[u8] = b"\x1b[?25h";

/// Hide the cursor (DECTCEM reset).
pub const CURSOR_HIDE: &[u8] = b"\x1b[?25l";

/// Written on deinit: style reset, then a newline so the shell prompt starts
/// on a fresh line.
pub const DEINIT: &[u8] = b"\x1b[m\n";

// ─── Sequence ────────────────────────────────────────────────────────────────

/// A CSI sequence under construction.
#[derive(Clone, Copy)]
pub struct Sequence {
    bytes: [u8; MAX_SEQUENCE_LEN],
    len: usize,
}

impl Sequence {
    /// Start a sequence with the Control Sequence Introducer, `ESC [`.
    #[must_use]
    pub const fn csi() -> Self {
        let mut bytes = [0u8; MAX_SEQUENCE_LEN];
        bytes[0] = ESC;
        bytes[1] = b'[';
        Self { bytes, len: 2 }
    }

    #[inline]
    fn push(&mut self, b: u8) {
        debug_assert!(self.len < MAX_SEQUENCE_LEN, "escape sequence overflow");
        if self.len < MAX_SEQUENCE_LEN {
            self.bytes[self.len] = b;
            self.len += 1;
        }
    }

    /// Append a numeric parameter and its delimiter.
    ///
    /// No leading zeros; zero itself is written as `0`.
    pub fn param(&mut self, n: u32) -> &mut Self {
        let mut digits = [0u8; 10];
        let mut count = 0;
        let mut rest = n;
        loop {
            #[allow(clippy::cast_possible_truncation)] // rest % 10 < 10.
            let d = (rest % 10) as u8;
            digits[count] = b'0' + d;
            count += 1;
            rest /= 10;
            if rest == 0 {
                break;
            }
        }
        for &d in digits[..count].iter().rev() {
            self.push(d);
        }
        self.push(b';');
        self
    }

    /// Close the sequence with `final_byte`, dropping a trailing delimiter.
    #[must_use]
    pub fn finish(mut self, final_byte: u8) -> Self {
        if self.bytes[self.len - 1] == b';' {
            self.len -= 1;
        }
        self.push(final_byte);
        self
    }

    /// The encoded bytes.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    /// Encoded length in bytes.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Whether nothing beyond the introducer has been written.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len <= 2
    }
}

impl AsRef<[u8]> for Sequence {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl std::fmt::Debug for Sequence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", String::from_utf8_lossy(self.as_bytes()))
    }
}

// ─── Attributes ──────────────────────────────────────────────────────────────

/// Encode an attribute as a single SGR sequence.
///
/// An empty style writes the reset code `0` first, so any previous style is
/// cleared and the result never depends on what was emitted before. Style
/// codes come in fixed order, then at most one foreground and one background.
///
/// ```
/// use ep_term::ansi;
/// use ep_term::attr::{Attr, Color, Style};
///
/// let attr = Attr::new(Style::BOLD | Style::UNDERLINE, Color::Red, Color::Default);
/// assert_eq!(ansi::sgr(attr).as_bytes(), b"\x1b[1;4;31m");
/// assert_eq!(ansi::sgr(Attr::NONE).as_bytes(), b"\x1b[0m");
/// ```
#[must_use]
pub fn sgr(attr: Attr) -> Sequence {
    let mut seq = Sequence::csi();

    if attr.style.is_empty() {
        seq.param(0);
    } else {
        for &(bit, code) in &Style::SGR_CODES {
            if attr.style.contains(bit) {
                seq.param(code);
            }
        }
    }

    if let Some(code) = attr.fg.fg_code() {
        seq.param(code);
    }
    if let Some(code) = attr.bg.bg_code() {
        seq.param(code);
    }

    seq.finish(b'm')
}

// ─── Cursor ──────────────────────────────────────────────────────────────────

/// Move the cursor to absolute `(col, row)` with CUP.
///
/// ```
/// use ep_term::ansi;
///
/// assert_eq!(ansi::cursor_to(0, 0).as_bytes(), b"\x1b[1;1H");
/// assert_eq!(ansi::cursor_to(9, 4).as_bytes(), b"\x1b[5;10H");
/// ```
#[must_use]
pub fn cursor_to(col: u32, row: u32) -> Sequence {
    let mut seq = Sequence::csi();
    seq.param(row.saturating_add(1)).param(col.saturating_add(1));
    seq.finish(b'H')
}

/// The DECTCEM sequence for the requested cursor visibility.
#[inline]
#[must_use]
pub const fn cursor_visibility(visible: bool) -> &'static [u8] {
    if visible { CURSOR_SHOW } else { CURSOR_HIDE }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
