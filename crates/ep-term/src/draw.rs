// SPDX-License-Identifier: MIT
//
// Drawing primitives.
//
// Every primitive works the same way. It does nothing if the viewport has
// no area, the start cell is outside it, or it has nothing to draw.
// Otherwise it buffers one SGR sequence for the attribute, moves the
// cursor, and streams glyph bytes until the next cell would leave the
// viewport (rows and columns are checked separately, so a rectangle is cut
// per row). It ends with the buffer's threshold check, so at most one
// write happens per call unless a single call produces more than a
// buffer's worth.
//
// Glyphs are bytes. Multi-byte UTF-8 text is written as given; column
// clipping counts bytes, not cells.

use std::ffi::CStr;
use std::fmt::{self, Write as _};

use crate::ansi;
use crate::attr::Attr;
use crate::device::Device;
use crate::error::Result;
use crate::session::Session;

impl<D: Device> Session<D> {
    /// Buffer the attribute and cursor move for a primitive starting at
    /// `(x, y)`. Returns `false` if the primitive must draw nothing.
    fn begin(&mut self, x: u32, y: u32, attr: Attr) -> Result<bool> {
        let vp = self.viewport();
        if vp.is_empty() || !vp.contains(x, y) {
            return Ok(false);
        }
        self.push_sequence(ansi::sgr(attr).as_bytes())?;
        self.place_cursor(x, y)?;
        Ok(true)
    }

    /// Stream `glyphs` rightward from column `x`, stopping at the viewport
    /// edge.
    fn run(&mut self, x: u32, glyphs: impl IntoIterator<Item = u8>) -> Result<()> {
        let vp = self.viewport();
        for (i, b) in (0u32..).zip(glyphs) {
            if !vp.contains_x(x.saturating_add(i)) {
                break;
            }
            self.push_glyph(b)?;
        }
        Ok(())
    }

    /// Draw one byte at `(x, y)`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Write`](crate::Error::Write) if a flush fails.
    pub fn draw_char(&mut self, x: u32, y: u32, attr: Attr, c: u8) -> Result<()> {
        if !self.begin(x, y, attr)? {
            return Ok(());
        }
        self.push_glyph(c)?;
        self.auto_flush()
    }

    /// Draw `bytes` left to right from `(x, y)`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Write`](crate::Error::Write) if a flush fails.
    pub fn draw_bytes(&mut self, x: u32, y: u32, attr: Attr, bytes: &[u8]) -> Result<()> {
        if bytes.is_empty() || !self.begin(x, y, attr)? {
            return Ok(());
        }
        self.run(x, bytes.iter().copied())?;
        self.auto_flush()
    }

    /// Draw a string left to right from `(x, y)`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Write`](crate::Error::Write) if a flush fails.
    #[inline]
    pub fn draw_str(&mut self, x: u32, y: u32, attr: Attr, s: &str) -> Result<()> {
        self.draw_bytes(x, y, attr, s.as_bytes())
    }

    /// Draw a NUL-terminated string left to right from `(x, y)`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Write`](crate::Error::Write) if a flush fails.
    #[inline]
    pub fn draw_cstr(&mut self, x: u32, y: u32, attr: Attr, s: &CStr) -> Result<()> {
        self.draw_bytes(x, y, attr, s.to_bytes())
    }

    /// Format and draw at `(x, y)`.
    ///
    /// Output longer than `Config::format_capacity` bytes is cut at the
    /// last whole character that fits.
    ///
    /// ```
    /// use ep_term::device::{MemoryDevice, Size};
    /// use ep_term::{Attr, Config, Session};
    ///
    /// let mut s = Session::init(MemoryDevice::new(Size { cols: 80, rows: 24 }), Config::default());
    /// s.draw_fmt(0, 0, Attr::NONE, format_args!("{} + {} = {}", 2, 2, 4)).unwrap();
    /// assert!(s.buffered().ends_with(b"2 + 2 = 4"));
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`Error::Write`](crate::Error::Write) if a flush fails.
    pub fn draw_fmt(&mut self, x: u32, y: u32, attr: Attr, args: fmt::Arguments<'_>) -> Result<()> {
        let vp = self.viewport();
        if vp.is_empty() || !vp.contains(x, y) {
            return Ok(());
        }

        let mut scratch = std::mem::take(&mut self.scratch);
        scratch.clear();
        let mut w = Truncating {
            buf: &mut scratch,
            limit: self.config().format_capacity,
        };
        // Truncating never fails; a Display impl returning Err just stops
        // early.
        let _ = w.write_fmt(args);

        let result = self.draw_bytes(x, y, attr, &scratch);
        self.scratch = scratch;
        result
    }

    /// Draw `len` copies of `c` rightward from `(x, y)`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Write`](crate::Error::Write) if a flush fails.
    pub fn draw_hline(&mut self, x: u32, y: u32, len: u32, attr: Attr, c: u8) -> Result<()> {
        if len == 0 || !self.begin(x, y, attr)? {
            return Ok(());
        }
        self.run(x, std::iter::repeat_n(c, len as usize))?;
        self.auto_flush()
    }

    /// Draw `len` copies of `c` downward from `(x, y)`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Write`](crate::Error::Write) if a flush fails.
    pub fn draw_vline(&mut self, x: u32, y: u32, len: u32, attr: Attr, c: u8) -> Result<()> {
        if len == 0 || !self.begin(x, y, attr)? {
            return Ok(());
        }
        let vp = self.viewport();
        self.push_glyph(c)?;
        for i in 1..len {
            let row = y.saturating_add(i);
            if !vp.contains_y(row) {
                break;
            }
            self.place_cursor(x, row)?;
            self.push_glyph(c)?;
        }
        self.auto_flush()
    }

    /// Fill the `w × h` rectangle at `(x, y)` with `c`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Write`](crate::Error::Write) if a flush fails.
    pub fn draw_rect(&mut self, x: u32, y: u32, w: u32, h: u32, attr: Attr, c: u8) -> Result<()> {
        if w == 0 || h == 0 || !self.begin(x, y, attr)? {
            return Ok(());
        }
        let vp = self.viewport();
        for i in 0..h {
            let row = y.saturating_add(i);
            if !vp.contains_y(row) {
                break;
            }
            if i > 0 {
                self.place_cursor(x, row)?;
            }
            self.run(x, std::iter::repeat_n(c, w as usize))?;
        }
        self.auto_flush()
    }
}

/// A `fmt::Write` that keeps the first `limit` bytes and drops the rest.
struct Truncating<'a> {
    buf: &'a mut Vec<u8>,
    limit: usize,
}

impl fmt::Write for Truncating<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let room = self.limit.saturating_sub(self.buf.len());
        let mut take = s.len().min(room);
        while !s.is_char_boundary(take) {
            take -= 1;
        }
        self.buf.extend_from_slice(&s.as_bytes()[..take]);
        Ok(())
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use crate::attr::{Color, Style};
    use crate::device::{MemoryDevice, Size};
    use crate::output::DEFAULT_CAPACITY;
    use crate::{Attr, Config, Session};
    use pretty_assertions::assert_eq;

    const SCREEN: Size = Size { cols: 80, rows: 24 };

    fn session() -> Session<MemoryDevice> {
        Session::init(MemoryDevice::new(SCREEN), Config::default())
    }

    fn text(bytes: &[u8]) -> String {
        String::from_utf8_lossy(bytes).into_owned()
    }

    /// Every escape sequence in `unit` has its final byte.
    fn assert_no_split(unit: &[u8]) {
        if let Some(esc) = unit.iter().rposition(|&b| b == 0x1b) {
            let tail = &unit[esc + 1..];
            assert!(
                tail.len() >= 2 && tail[1..].iter().any(|b| (0x40..=0x7e).contains(b)),
                "unit ends inside an escape sequence: {:?}",
                text(&unit[esc..])
            );
        }
    }

    // ── Characters and strings ────────────────────────────────────────

    #[test]
    fn draw_char_emits_attr_move_glyph() {
        let mut s = session();
        s.draw_char(0, 0, Attr::NONE, b'x').unwrap();
        assert_eq!(text(s.buffered()), "\x1b[0m\x1b[1;1Hx");
    }

    #[test]
    fn draw_str_with_attr() {
        let mut s = session();
        let attr = Attr::new(Style::BOLD | Style::UNDERLINE, Color::Red, Color::Default);
        s.draw_str(3, 2, attr, "hi").unwrap();
        assert_eq!(text(s.buffered()), "\x1b[1;4;31m\x1b[3;4Hhi");
    }

    #[test]
    fn draw_str_is_clipped_at_viewport_edge() {
        let mut s = session();
        s.set_viewport(0, 0, 5, 1, true);
        s.draw_str(2, 0, Attr::NONE, "abcdef").unwrap();
        assert_eq!(text(s.buffered()), "\x1b[0m\x1b[1;3Habc");
    }

    #[test]
    fn unclipped_draw_writes_everything() {
        let mut s = session();
        s.set_viewport(0, 0, 5, 1, false);
        s.draw_str(2, 0, Attr::NONE, "abcdef").unwrap();
        assert!(s.buffered().ends_with(b"abcdef"));
    }

    #[test]
    fn draw_cstr_stops_at_nul() {
        let mut s = session();
        s.draw_cstr(0, 0, Attr::NONE, c"ok").unwrap();
        assert_eq!(text(s.buffered()), "\x1b[0m\x1b[1;1Hok");
    }

    #[test]
    fn empty_string_draws_nothing() {
        let mut s = session();
        s.draw_str(0, 0, Attr::NONE, "").unwrap();
        assert!(s.buffered().is_empty());
    }

    // ── Viewport rejection ────────────────────────────────────────────

    #[test]
    fn zero_area_viewport_draws_nothing() {
        for clip in [true, false] {
            let mut s = session();
            s.set_viewport(90, 0, 5, 5, clip);
            s.draw_char(0, 0, Attr::NONE, b'x').unwrap();
            s.draw_str(0, 0, Attr::NONE, "text").unwrap();
            s.draw_fmt(0, 0, Attr::NONE, format_args!("{}", 1)).unwrap();
            s.draw_hline(0, 0, 3, Attr::NONE, b'-').unwrap();
            s.draw_vline(0, 0, 3, Attr::NONE, b'|').unwrap();
            s.draw_rect(0, 0, 3, 3, Attr::NONE, b'#').unwrap();
            assert_eq!(s.buffered().len(), 0, "clip = {clip}");
        }
    }

    #[test]
    fn start_outside_viewport_draws_nothing() {
        let mut s = session();
        s.set_viewport(0, 0, 10, 5, true);
        s.draw_char(10, 0, Attr::NONE, b'x').unwrap();
        s.draw_str(0, 5, Attr::NONE, "text").unwrap();
        s.draw_vline(0, 5, 3, Attr::NONE, b'|').unwrap();
        assert!(s.buffered().is_empty());
    }

    // ── Lines and rectangles ──────────────────────────────────────────

    #[test]
    fn hline_is_clipped() {
        let mut s = session();
        s.set_viewport(0, 0, 4, 4, true);
        s.draw_hline(1, 1, 10, Attr::NONE, b'-').unwrap();
        assert_eq!(text(s.buffered()), "\x1b[0m\x1b[2;2H---");
    }

    #[test]
    fn vline_moves_per_row_and_clips() {
        let mut s = session();
        s.set_viewport(0, 0, 10, 3, true);
        s.draw_vline(2, 1, 10, Attr::NONE, b'|').unwrap();
        assert_eq!(text(s.buffered()), "\x1b[0m\x1b[2;3H|\x1b[3;3H|");
    }

    #[test]
    fn rect_is_clipped_per_row_and_offset() {
        let mut s = session();
        s.set_viewport(10, 5, 3, 2, true);
        s.draw_rect(0, 0, 10, 10, Attr::NONE, b'#').unwrap();
        assert_eq!(text(s.buffered()), "\x1b[0m\x1b[6;11H###\x1b[7;11H###");
    }

    #[test]
    fn rect_inside_viewport() {
        let mut s = session();
        s.draw_rect(0, 0, 2, 2, Attr::NONE.with_bg(Color::Blue), b' ').unwrap();
        assert_eq!(text(s.buffered()), "\x1b[0;44m\x1b[1;1H  \x1b[2;1H  ");
    }

    #[test]
    fn zero_length_lines_draw_nothing() {
        let mut s = session();
        s.draw_hline(0, 0, 0, Attr::NONE, b'-').unwrap();
        s.draw_vline(0, 0, 0, Attr::NONE, b'|').unwrap();
        s.draw_rect(0, 0, 0, 4, Attr::NONE, b'#').unwrap();
        assert!(s.buffered().is_empty());
    }

    // ── Formatting ────────────────────────────────────────────────────

    #[test]
    fn draw_fmt_formats() {
        let mut s = session();
        s.draw_fmt(0, 0, Attr::NONE, format_args!("{}x{}", 80, 24)).unwrap();
        assert_eq!(text(s.buffered()), "\x1b[0m\x1b[1;1H80x24");
    }

    #[test]
    fn draw_fmt_truncates() {
        let config = Config {
            format_capacity: 4,
            ..Config::default()
        };
        let mut s = Session::init(MemoryDevice::new(SCREEN), config);
        s.draw_fmt(0, 0, Attr::NONE, format_args!("{}", "truncated")).unwrap();
        assert_eq!(text(s.buffered()), "\x1b[0m\x1b[1;1Htrun");
    }

    #[test]
    fn draw_fmt_truncates_on_char_boundary() {
        let config = Config {
            format_capacity: 3,
            ..Config::default()
        };
        let mut s = Session::init(MemoryDevice::new(SCREEN), config);
        s.draw_fmt(0, 0, Attr::NONE, format_args!("aéb")).unwrap();
        assert!(s.buffered().ends_with("aé".as_bytes()));

        s.flush().unwrap();
        s.draw_fmt(0, 0, Attr::NONE, format_args!("ab€")).unwrap();
        assert!(s.buffered().ends_with(b"Hab"));
    }

    // ── Flushing ──────────────────────────────────────────────────────

    #[test]
    fn small_draws_stay_buffered() {
        let mut s = session();
        s.draw_str(0, 0, Attr::NONE, "hello").unwrap();
        assert!(s.device().writes().is_empty());
    }

    #[test]
    fn crossing_threshold_flushes_once_at_the_end() {
        let mut s = session();
        let first = "a".repeat(3000);
        let second = "b".repeat(1050);
        s.draw_str(0, 0, Attr::NONE, &first).unwrap();
        assert!(s.device().writes().is_empty());
        s.draw_str(0, 1, Attr::NONE, &second).unwrap();

        let writes = s.device().writes();
        assert_eq!(writes.len(), 1);
        assert!(writes[0].len() < DEFAULT_CAPACITY);
        assert!(writes[0].ends_with(second.as_bytes()));
        assert!(s.buffered().is_empty());
    }

    #[test]
    fn overfull_draw_never_splits_a_sequence() {
        let mut s = session();
        s.draw_str(0, 0, Attr::NONE, &"c".repeat(4080)).unwrap();
        s.draw_str(0, 1, Attr::NONE.with_fg(Color::BrightCyan), &"d".repeat(5000)).unwrap();
        s.flush().unwrap();

        let writes = s.device().writes();
        assert!(writes.len() >= 2);
        for unit in writes {
            assert!(unit.len() <= DEFAULT_CAPACITY);
            assert_no_split(unit);
        }
        let all = s.device().output();
        assert_eq!(all.iter().filter(|&&b| b == b'd').count(), 5000);
    }
}
