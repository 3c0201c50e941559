// SPDX-License-Identifier: MIT
//
// Keys and key decoding.
//
// A `Key` is a plain code: 0 means "nothing", literal input bytes and
// Unicode code points keep their own value, and everything from
// `Key::CUSTOM` (2^21, just past the last code point) upward is a synthetic
// event. Resize is the first synthetic key; the named navigation and
// function keys follow it.
//
// `decode` turns the front of the session's pending input into one key and
// says how many bytes that took. It recognises the legacy CSI and SS3
// encodings every terminal sends for arrows, editing keys, and F1-F12;
// modifiers are accepted and dropped. Anything else that starts with
// `ESC [` or `ESC O` is swallowed whole and reported as `Key::NONE`.
//
// A terminal delivers each key in one write, so a sequence cut off at the
// end of a read is treated as complete. The one exception is UTF-8: if at
// least two bytes of a longer character arrived, decoding waits for the
// rest.

use std::fmt;

// ─── Key ────────────────────────────────────────────────────────────────────

/// A key press or synthetic event.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Key(u32);

impl Key {
    /// First synthetic key code. Nothing read from input reaches it.
    pub const CUSTOM: u32 = 1 << 21;

    /// No key.
    pub const NONE: Self = Self(0);
    /// The Escape key, or a lone `ESC` byte.
    pub const ESCAPE: Self = Self(0x1b);

    /// The window size changed. Query the new size with `Session::size`.
    pub const RESIZE: Self = Self(Self::CUSTOM);

    pub const UP: Self = Self(Self::CUSTOM + 1);
    pub const DOWN: Self = Self(Self::CUSTOM + 2);
    pub const RIGHT: Self = Self(Self::CUSTOM + 3);
    pub const LEFT: Self = Self(Self::CUSTOM + 4);
    pub const HOME: Self = Self(Self::CUSTOM + 5);
    pub const END: Self = Self(Self::CUSTOM + 6);
    pub const INSERT: Self = Self(Self::CUSTOM + 7);
    pub const DELETE: Self = Self(Self::CUSTOM + 8);
    pub const PAGE_UP: Self = Self(Self::CUSTOM + 9);
    pub const PAGE_DOWN: Self = Self(Self::CUSTOM + 10);

    pub const F1: Self = Self::function(1);
    pub const F2: Self = Self::function(2);
    pub const F3: Self = Self::function(3);
    pub const F4: Self = Self::function(4);
    pub const F5: Self = Self::function(5);
    pub const F6: Self = Self::function(6);
    pub const F7: Self = Self::function(7);
    pub const F8: Self = Self::function(8);
    pub const F9: Self = Self::function(9);
    pub const F10: Self = Self::function(10);
    pub const F11: Self = Self::function(11);
    pub const F12: Self = Self::function(12);

    const F_BASE: u32 = Self::CUSTOM + 10;

    const fn function(n: u32) -> Self {
        Self(Self::F_BASE + n)
    }

    /// The key for a literal input byte.
    #[inline]
    #[must_use]
    pub const fn from_byte(b: u8) -> Self {
        Self(b as u32)
    }

    /// The key for a typed character.
    #[inline]
    #[must_use]
    pub const fn from_char(c: char) -> Self {
        Self(c as u32)
    }

    /// The raw code.
    #[inline]
    #[must_use]
    pub const fn code(self) -> u32 {
        self.0
    }

    #[inline]
    #[must_use]
    pub const fn is_none(self) -> bool {
        self.0 == 0
    }

    /// Whether this is an event rather than typed input.
    #[inline]
    #[must_use]
    pub const fn is_synthetic(self) -> bool {
        self.0 >= Self::CUSTOM
    }

    /// The typed character, if this is typed input.
    ///
    /// Literal bytes from invalid UTF-8 come back as the Latin-1 character
    /// with the same value.
    #[must_use]
    pub fn as_char(self) -> Option<char> {
        if self.is_none() || self.is_synthetic() {
            return None;
        }
        char::from_u32(self.0)
    }

    /// The function key number (1-12), if this is a function key.
    #[must_use]
    pub const fn function_number(self) -> Option<u32> {
        if self.0 > Self::F_BASE && self.0 <= Self::F_BASE + 12 {
            Some(self.0 - Self::F_BASE)
        } else {
            None
        }
    }

    fn name(self) -> Option<&'static str> {
        Some(match self {
            Self::NONE => "None",
            Self::ESCAPE => "Escape",
            Self::RESIZE => "Resize",
            Self::UP => "Up",
            Self::DOWN => "Down",
            Self::RIGHT => "Right",
            Self::LEFT => "Left",
            Self::HOME => "Home",
            Self::END => "End",
            Self::INSERT => "Insert",
            Self::DELETE => "Delete",
            Self::PAGE_UP => "PageUp",
            Self::PAGE_DOWN => "PageDown",
            _ => match self.0 {
                0x09 => "Tab",
                0x0a | 0x0d => "Enter",
                0x7f => "Backspace",
                _ => return None,
            },
        })
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = self.name() {
            return f.write_str(name);
        }
        if let Some(n) = self.function_number() {
            return write!(f, "F{n}");
        }
        match self.0 {
            #[allow(clippy::cast_possible_truncation)] // c < 0x20.
            c @ 0x01..0x20 => write!(f, "Ctrl-{}", char::from(c as u8 + b'@')),
            c if self.is_synthetic() => write!(f, "Key({c:#x})"),
            c => match char::from_u32(c) {
                Some(ch) if !ch.is_control() => write!(f, "{ch}"),
                _ => write!(f, "U+{c:04X}"),
            },
        }
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key({self}")?;
        if !self.is_synthetic() {
            write!(f, " {:#x}", self.0)?;
        }
        f.write_str(")")
    }
}

// ─── Decoding ───────────────────────────────────────────────────────────────

const ESC: u8 = 0x1b;

/// Result of decoding the front of the pending input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Decoded {
    /// A key (possibly `Key::NONE` for a swallowed sequence) and the number
    /// of bytes it used.
    Key(Key, usize),
    /// A multi-byte character is still arriving.
    Incomplete,
}

/// Decode one key from the front of `buf`.
///
/// A buffer holding a single byte always decodes to that byte.
pub(crate) fn decode(buf: &[u8]) -> Decoded {
    let Some(&first) = buf.first() else {
        return Decoded::Key(Key::NONE, 0);
    };

    if buf.len() == 1 {
        return Decoded::Key(Key::from_byte(first), 1);
    }

    match first {
        ESC => decode_escape(buf),
        0xC2..=0xF4 => decode_utf8(buf),
        b => Decoded::Key(Key::from_byte(b), 1),
    }
}

// ── Escape sequences ────────────────────────────────────────────────────────

fn decode_escape(buf: &[u8]) -> Decoded {
    debug_assert!(buf.len() >= 2 && buf[0] == ESC);

    match buf[1] {
        ESC => Decoded::Key(Key::ESCAPE, 2),
        b'[' => decode_csi(buf),
        b'O' => decode_ss3(buf),
        // Escape pressed, followed by an ordinary key.
        _ => Decoded::Key(Key::ESCAPE, 1),
    }
}

/// Keys named by the final byte of a CSI or SS3 sequence.
const fn letter_key(final_byte: u8) -> Option<Key> {
    Some(match final_byte {
        b'A' => Key::UP,
        b'B' => Key::DOWN,
        b'C' => Key::RIGHT,
        b'D' => Key::LEFT,
        b'H' => Key::HOME,
        b'F' => Key::END,
        b'P' => Key::F1,
        b'Q' => Key::F2,
        b'R' => Key::F3,
        b'S' => Key::F4,
        _ => return None,
    })
}

/// Keys named by the first parameter of a `CSI n ~` sequence.
const fn tilde_key(n: u32) -> Option<Key> {
    Some(match n {
        1 | 7 => Key::HOME,
        2 => Key::INSERT,
        3 => Key::DELETE,
        4 | 8 => Key::END,
        5 => Key::PAGE_UP,
        6 => Key::PAGE_DOWN,
        11 => Key::F1,
        12 => Key::F2,
        13 => Key::F3,
        14 => Key::F4,
        15 => Key::F5,
        17 => Key::F6,
        18 => Key::F7,
        19 => Key::F8,
        20 => Key::F9,
        21 => Key::F10,
        23 => Key::F11,
        24 => Key::F12,
        _ => return None,
    })
}

fn decode_csi(buf: &[u8]) -> Decoded {
    // Parameter bytes are 0x30..=0x3F, intermediates 0x20..=0x2F, and the
    // final byte 0x40..=0x7E.
    let mut end = 2;
    while end < buf.len() {
        let b = buf[end];
        if (0x40..=0x7E).contains(&b) {
            break;
        }
        if !(0x20..=0x3F).contains(&b) {
            return unknown(&buf[..=end]);
        }
        end += 1;
    }

    if end >= buf.len() {
        return unknown(buf);
    }

    let consumed = end + 1;
    let key = match buf[end] {
        b'~' => tilde_key(first_param(&buf[2..end])),
        b => letter_key(b),
    };

    key.map_or_else(|| unknown(&buf[..consumed]), |k| Decoded::Key(k, consumed))
}

fn decode_ss3(buf: &[u8]) -> Decoded {
    if buf.len() < 3 {
        return unknown(buf);
    }
    letter_key(buf[2]).map_or_else(|| unknown(&buf[..3]), |k| Decoded::Key(k, 3))
}

/// Leading decimal parameter, 0 if absent.
fn first_param(params: &[u8]) -> u32 {
    params
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .fold(0u32, |n, &b| n.saturating_mul(10).saturating_add(u32::from(b - b'0')))
}

fn unknown(seq: &[u8]) -> Decoded {
    tracing::trace!(?seq, "ignoring unrecognised escape sequence");
    Decoded::Key(Key::NONE, seq.len())
}

// ── UTF-8 ───────────────────────────────────────────────────────────────────

const fn utf8_len(lead: u8) -> usize {
    match lead {
        0xC2..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF4 => 4,
        _ => 0,
    }
}

fn decode_utf8(buf: &[u8]) -> Decoded {
    let expected = utf8_len(buf[0]);
    let have = buf.len().min(expected);
    let literal = Decoded::Key(Key::from_byte(buf[0]), 1);

    if buf[1..have].iter().any(|&b| b & 0xC0 != 0x80) {
        return literal;
    }
    if have < expected {
        return Decoded::Incomplete;
    }

    std::str::from_utf8(&buf[..expected])
        .ok()
        .and_then(|s| s.chars().next())
        .map_or(literal, |ch| Decoded::Key(Key::from_char(ch), expected))
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Decode and require the whole input to be used.
    fn decode_all(bytes: &[u8]) -> Key {
        match decode(bytes) {
            Decoded::Key(key, n) => {
                assert_eq!(n, bytes.len(), "consumed length for {bytes:?}");
                key
            }
            Decoded::Incomplete => panic!("incomplete: {bytes:?}"),
        }
    }

    // ── Key values ────────────────────────────────────────────────────

    #[test]
    fn synthetic_keys_start_at_custom() {
        assert_eq!(Key::RESIZE.code(), 1 << 21);
        assert!(Key::RESIZE.is_synthetic());
        assert!(Key::F12.is_synthetic());
        assert!(!Key::from_char(char::MAX).is_synthetic());
        assert!(!Key::from_byte(0xff).is_synthetic());
    }

    #[test]
    fn named_keys_are_distinct() {
        let named = [
            Key::RESIZE, Key::UP, Key::DOWN, Key::RIGHT, Key::LEFT, Key::HOME, Key::END,
            Key::INSERT, Key::DELETE, Key::PAGE_UP, Key::PAGE_DOWN, Key::F1, Key::F2,
            Key::F3, Key::F4, Key::F5, Key::F6, Key::F7, Key::F8, Key::F9, Key::F10,
            Key::F11, Key::F12,
        ];
        let mut codes: Vec<u32> = named.iter().map(|k| k.code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), named.len());
    }

    #[test]
    fn as_char() {
        assert_eq!(Key::from_byte(b'q').as_char(), Some('q'));
        assert_eq!(Key::from_char('é').as_char(), Some('é'));
        assert_eq!(Key::NONE.as_char(), None);
        assert_eq!(Key::RESIZE.as_char(), None);
    }

    #[test]
    fn function_number() {
        assert_eq!(Key::F1.function_number(), Some(1));
        assert_eq!(Key::F12.function_number(), Some(12));
        assert_eq!(Key::PAGE_DOWN.function_number(), None);
        assert_eq!(Key::from_byte(b'a').function_number(), None);
    }

    #[test]
    fn display() {
        assert_eq!(Key::from_byte(b'x').to_string(), "x");
        assert_eq!(Key::from_char('ñ').to_string(), "ñ");
        assert_eq!(Key::ESCAPE.to_string(), "Escape");
        assert_eq!(Key::RESIZE.to_string(), "Resize");
        assert_eq!(Key::F7.to_string(), "F7");
        assert_eq!(Key::from_byte(0x03).to_string(), "Ctrl-C");
        assert_eq!(Key::from_byte(b'\r').to_string(), "Enter");
        assert_eq!(Key::from_byte(0x7f).to_string(), "Backspace");
        assert_eq!(Key::from_byte(0x85).to_string(), "U+0085");
    }

    // ── Single bytes ──────────────────────────────────────────────────

    #[test]
    fn one_byte_is_that_byte() {
        for b in 0..=255u8 {
            assert_eq!(decode(&[b]), Decoded::Key(Key::from_byte(b), 1));
        }
    }

    #[test]
    fn lone_escape() {
        assert_eq!(decode_all(b"\x1b"), Key::ESCAPE);
    }

    #[test]
    fn empty_input_is_none() {
        assert_eq!(decode(b""), Decoded::Key(Key::NONE, 0));
    }

    #[test]
    fn plain_bytes_decode_one_at_a_time() {
        assert_eq!(decode(b"ab"), Decoded::Key(Key::from_byte(b'a'), 1));
    }

    // ── Arrows and navigation ─────────────────────────────────────────

    #[test]
    fn csi_arrows() {
        assert_eq!(decode_all(b"\x1b[A"), Key::UP);
        assert_eq!(decode_all(b"\x1b[B"), Key::DOWN);
        assert_eq!(decode_all(b"\x1b[C"), Key::RIGHT);
        assert_eq!(decode_all(b"\x1b[D"), Key::LEFT);
        assert_eq!(decode_all(b"\x1b[H"), Key::HOME);
        assert_eq!(decode_all(b"\x1b[F"), Key::END);
    }

    #[test]
    fn ss3_arrows() {
        assert_eq!(decode_all(b"\x1bOA"), Key::UP);
        assert_eq!(decode_all(b"\x1bOD"), Key::LEFT);
        assert_eq!(decode_all(b"\x1bOH"), Key::HOME);
        assert_eq!(decode_all(b"\x1bOF"), Key::END);
    }

    #[test]
    fn modifiers_are_dropped() {
        assert_eq!(decode_all(b"\x1b[1;5A"), Key::UP);
        assert_eq!(decode_all(b"\x1b[1;2F"), Key::END);
        assert_eq!(decode_all(b"\x1b[3;5~"), Key::DELETE);
    }

    #[test]
    fn tilde_editing_keys() {
        assert_eq!(decode_all(b"\x1b[1~"), Key::HOME);
        assert_eq!(decode_all(b"\x1b[7~"), Key::HOME);
        assert_eq!(decode_all(b"\x1b[2~"), Key::INSERT);
        assert_eq!(decode_all(b"\x1b[3~"), Key::DELETE);
        assert_eq!(decode_all(b"\x1b[4~"), Key::END);
        assert_eq!(decode_all(b"\x1b[8~"), Key::END);
        assert_eq!(decode_all(b"\x1b[5~"), Key::PAGE_UP);
        assert_eq!(decode_all(b"\x1b[6~"), Key::PAGE_DOWN);
    }

    // ── Function keys ─────────────────────────────────────────────────

    #[test]
    fn f1_to_f4_all_encodings() {
        for (ss3, csi, tilde, key) in [
            (b"\x1bOP", b"\x1b[P", b"\x1b[11~", Key::F1),
            (b"\x1bOQ", b"\x1b[Q", b"\x1b[12~", Key::F2),
            (b"\x1bOR", b"\x1b[R", b"\x1b[13~", Key::F3),
            (b"\x1bOS", b"\x1b[S", b"\x1b[14~", Key::F4),
        ] {
            assert_eq!(decode_all(ss3), key);
            assert_eq!(decode_all(csi), key);
            assert_eq!(decode_all(tilde), key);
        }
    }

    #[test]
    fn f5_to_f12() {
        assert_eq!(decode_all(b"\x1b[15~"), Key::F5);
        assert_eq!(decode_all(b"\x1b[17~"), Key::F6);
        assert_eq!(decode_all(b"\x1b[18~"), Key::F7);
        assert_eq!(decode_all(b"\x1b[19~"), Key::F8);
        assert_eq!(decode_all(b"\x1b[20~"), Key::F9);
        assert_eq!(decode_all(b"\x1b[21~"), Key::F10);
        assert_eq!(decode_all(b"\x1b[23~"), Key::F11);
        assert_eq!(decode_all(b"\x1b[24~"), Key::F12);
    }

    #[test]
    fn gaps_in_tilde_table_are_unknown() {
        assert_eq!(decode_all(b"\x1b[16~"), Key::NONE);
        assert_eq!(decode_all(b"\x1b[22~"), Key::NONE);
        assert_eq!(decode_all(b"\x1b[99~"), Key::NONE);
    }

    // ── Escape handling ───────────────────────────────────────────────

    #[test]
    fn double_escape() {
        assert_eq!(decode_all(b"\x1b\x1b"), Key::ESCAPE);
    }

    #[test]
    fn escape_then_letter_leaves_the_letter() {
        assert_eq!(decode(b"\x1bx"), Decoded::Key(Key::ESCAPE, 1));
    }

    #[test]
    fn unknown_sequences_are_swallowed() {
        assert_eq!(decode_all(b"\x1b[200~"), Key::NONE);
        assert_eq!(decode_all(b"\x1b[?1;2c"), Key::NONE);
        assert_eq!(decode_all(b"\x1bOx"), Key::NONE);
    }

    #[test]
    fn truncated_sequences_are_swallowed() {
        assert_eq!(decode_all(b"\x1b["), Key::NONE);
        assert_eq!(decode_all(b"\x1b[1;5"), Key::NONE);
        assert_eq!(decode_all(b"\x1bO"), Key::NONE);
    }

    #[test]
    fn invalid_byte_ends_csi() {
        assert_eq!(decode(b"\x1b[1\x07x"), Decoded::Key(Key::NONE, 4));
    }

    #[test]
    fn sequence_followed_by_more_input() {
        assert_eq!(decode(b"\x1b[Aq"), Decoded::Key(Key::UP, 3));
        assert_eq!(decode(b"\x1bOBq"), Decoded::Key(Key::DOWN, 3));
    }

    // ── UTF-8 ─────────────────────────────────────────────────────────

    #[test]
    fn utf8_code_points() {
        assert_eq!(decode_all("é".as_bytes()), Key::from_char('é'));
        assert_eq!(decode_all("€".as_bytes()), Key::from_char('€'));
        assert_eq!(decode_all("🦀".as_bytes()), Key::from_char('🦀'));
    }

    #[test]
    fn utf8_followed_by_ascii() {
        let mut bytes = "ü".as_bytes().to_vec();
        bytes.push(b'!');
        assert_eq!(decode(&bytes), Decoded::Key(Key::from_char('ü'), 2));
    }

    #[test]
    fn partial_utf8_waits() {
        let crab = "🦀".as_bytes();
        assert_eq!(decode(&crab[..2]), Decoded::Incomplete);
        assert_eq!(decode(&crab[..3]), Decoded::Incomplete);
    }

    #[test]
    fn invalid_lead_is_literal() {
        assert_eq!(decode(b"\xff\xfe"), Decoded::Key(Key::from_byte(0xff), 1));
        assert_eq!(decode(b"\x80a"), Decoded::Key(Key::from_byte(0x80), 1));
        assert_eq!(decode(b"\xc0\x80"), Decoded::Key(Key::from_byte(0xc0), 1));
    }

    #[test]
    fn bad_continuation_is_literal() {
        assert_eq!(decode(b"\xe2a\x82"), Decoded::Key(Key::from_byte(0xe2), 1));
    }

    #[test]
    fn surrogate_encoding_is_literal() {
        // ED A0 80 would be U+D800.
        assert_eq!(decode(b"\xed\xa0\x80"), Decoded::Key(Key::from_byte(0xed), 1));
    }
}
