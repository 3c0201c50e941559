// SPDX-License-Identifier: MIT
//
// Viewport — the rectangle draw coordinates are relative to.
//
// Pure geometry, no I/O. A viewport is always fitted to the screen size it
// was created against: the origin is never moved, only the extents shrink.
// An origin that lies off the screen collapses the viewport to zero area.
//
// A viewport is *not* refitted when the terminal resizes. After a resize
// event the caller must set a new viewport; drawing against the stale one
// writes wherever its coordinates land on the new screen.

use crate::device::Size;

/// A screen sub-rectangle with optional clipping.
///
/// # Examples
///
/// ```
/// use ep_term::device::Size;
/// use ep_term::viewport::Viewport;
///
/// let screen = Size { cols: 80, rows: 24 };
/// let vp = Viewport::fitted(5, 5, 100, 100, true, screen);
/// assert_eq!((vp.w, vp.h), (75, 19));
/// assert!(vp.contains(74, 18));
/// assert!(!vp.contains(75, 0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    /// Left edge in screen columns.
    pub x: u32,
    /// Top edge in screen rows.
    pub y: u32,
    /// Width in columns.
    pub w: u32,
    /// Height in rows.
    pub h: u32,
    /// Whether relative coordinates outside `w × h` are rejected.
    pub clip: bool,
}

impl Viewport {
    /// The whole screen, clipping disabled.
    #[must_use]
    pub fn full(screen: Size) -> Self {
        Self {
            x: 0,
            y: 0,
            w: u32::from(screen.cols),
            h: u32::from(screen.rows),
            clip: false,
        }
    }

    /// Fit a requested rectangle to `screen`.
    ///
    /// Extents are shrunk so the rectangle ends at the screen edge. If the
    /// origin is off the screen on either axis the result is a zero-area
    /// rectangle at `(0, 0)`.
    #[must_use]
    pub fn fitted(x: u32, y: u32, w: u32, h: u32, clip: bool, screen: Size) -> Self {
        let cols = u32::from(screen.cols);
        let rows = u32::from(screen.rows);

        if x >= cols || y >= rows {
            return Self {
                x: 0,
                y: 0,
                w: 0,
                h: 0,
                clip,
            };
        }

        Self {
            x,
            y,
            w: w.min(cols - x),
            h: h.min(rows - y),
            clip,
        }
    }

    /// Whether the rectangle covers no cells.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }

    /// Whether relative column `x` is drawable.
    ///
    /// Always true with clipping disabled.
    #[inline]
    #[must_use]
    pub const fn contains_x(&self, x: u32) -> bool {
        !self.clip || x < self.w
    }

    /// Whether relative row `y` is drawable.
    ///
    /// Always true with clipping disabled.
    #[inline]
    #[must_use]
    pub const fn contains_y(&self, y: u32) -> bool {
        !self.clip || y < self.h
    }

    /// Whether relative `(x, y)` is drawable.
    #[inline]
    #[must_use]
    pub const fn contains(&self, x: u32, y: u32) -> bool {
        self.contains_x(x) && self.contains_y(y)
    }

    /// Clamp a relative position into the extents when clipping is on.
    #[must_use]
    pub const fn clamp(&self, x: u32, y: u32) -> (u32, u32) {
        if !self.clip {
            return (x, y);
        }
        let x = if x >= self.w { self.w.saturating_sub(1) } else { x };
        let y = if y >= self.h { self.h.saturating_sub(1) } else { y };
        (x, y)
    }

    /// Translate a relative position to absolute screen coordinates.
    #[inline]
    #[must_use]
    pub const fn to_screen(&self, x: u32, y: u32) -> (u32, u32) {
        (self.x.saturating_add(x), self.y.saturating_add(y))
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
