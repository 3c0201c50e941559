// SPDX-License-Identifier: MIT
//
// Attr — style bits plus a foreground/background color pair.
//
// Colors are ordinals into the 16-color terminal palette, shifted up by one
// so that zero means "leave it to the terminal". The normal palette sits at
// 1..=8, the bright palette at 11..=18, and 9..=10 are a reserved gap. This
// keeps the encoder a couple of additions away from the SGR codes:
//
//   normal fg  30..=37   bright fg  90..=97
//   normal bg  40..=47   bright bg 100..=107

// ─── Style ───────────────────────────────────────────────────────────────────

bitflags::bitflags! {
    /// Text style bits.
    ///
    /// The encoder emits one SGR code per set bit, always in declaration
    /// order regardless of how the bits were combined:
    ///
    /// ```
    /// use ep_term::attr::Style;
    ///
    /// let style = Style::UNDERLINE | Style::BOLD;
    /// assert!(style.contains(Style::BOLD));
    /// assert!(!style.contains(Style::ITALIC));
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Style: u8 {
        /// SGR 1 — increased intensity.
        const BOLD          = 1 << 0;
        /// SGR 3 — italic.
        const ITALIC        = 1 << 1;
        /// SGR 4 — single underline.
        const UNDERLINE     = 1 << 2;
        /// SGR 7 — swap foreground and background.
        const INVERT        = 1 << 3;
        /// SGR 8 — concealed text.
        const INVISIBLE     = 1 << 4;
        /// SGR 9 — crossed-out text.
        const STRIKETHROUGH = 1 << 5;
    }
}

impl Style {
    /// Style bits paired with their SGR code, in emission order.
    pub(crate) const SGR_CODES: [(Self, u32); 6] = [
        (Self::BOLD, 1),
        (Self::ITALIC, 3),
        (Self::UNDERLINE, 4),
        (Self::INVERT, 7),
        (Self::INVISIBLE, 8),
        (Self::STRIKETHROUGH, 9),
    ];
}

// ─── Color ───────────────────────────────────────────────────────────────────

/// A palette color, or the terminal's own default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[repr(u8)]
pub enum Color {
    /// Whatever the terminal uses when nothing is set.
    #[default]
    Default = 0,

    Black = 1,
    Red = 2,
    Green = 3,
    Yellow = 4,
    Blue = 5,
    Magenta = 6,
    Cyan = 7,
    White = 8,

    BrightBlack = 11,
    BrightRed = 12,
    BrightGreen = 13,
    BrightYellow = 14,
    BrightBlue = 15,
    BrightMagenta = 16,
    BrightCyan = 17,
    BrightWhite = 18,
}

impl Color {
    /// First ordinal of the bright palette.
    const BRIGHT_BASE: u8 = 11;

    /// Look up a color by ordinal.
    ///
    /// Returns `None` for the reserved gap (9, 10) and anything above 18.
    ///
    /// ```
    /// use ep_term::attr::Color;
    ///
    /// assert_eq!(Color::from_ordinal(2), Some(Color::Red));
    /// assert_eq!(Color::from_ordinal(9), None);
    /// ```
    #[must_use]
    pub const fn from_ordinal(n: u8) -> Option<Self> {
        Some(match n {
            0 => Self::Default,
            1 => Self::Black,
            2 => Self::Red,
            3 => Self::Green,
            4 => Self::Yellow,
            5 => Self::Blue,
            6 => Self::Magenta,
            7 => Self::Cyan,
            8 => Self::White,
            11 => Self::BrightBlack,
            12 => Self::BrightRed,
            13 => Self::BrightGreen,
            14 => Self::BrightYellow,
            15 => Self::BrightBlue,
            16 => Self::BrightMagenta,
            17 => Self::BrightCyan,
            18 => Self::BrightWhite,
            _ => return None,
        })
    }

    /// The ordinal value (0 for default).
    #[inline]
    #[must_use]
    pub const fn ordinal(self) -> u8 {
        self as u8
    }

    /// Whether this color is from the bright half of the palette.
    #[inline]
    #[must_use]
    pub const fn is_bright(self) -> bool {
        self.ordinal() >= Self::BRIGHT_BASE
    }

    /// SGR code for this color as a foreground, or `None` for the default.
    #[must_use]
    pub(crate) const fn fg_code(self) -> Option<u32> {
        match self {
            Self::Default => None,
            c if c.is_bright() => Some(90 + (c.ordinal() - Self::BRIGHT_BASE) as u32),
            c => Some(30 + (c.ordinal() - 1) as u32),
        }
    }

    /// SGR code for this color as a background, or `None` for the default.
    #[must_use]
    pub(crate) const fn bg_code(self) -> Option<u32> {
        match self {
            Self::Default => None,
            c if c.is_bright() => Some(100 + (c.ordinal() - Self::BRIGHT_BASE) as u32),
            c => Some(40 + (c.ordinal() - 1) as u32),
        }
    }
}

// ─── Attr ────────────────────────────────────────────────────────────────────

/// Everything one attribute sequence carries: style bits and two colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Attr {
    pub style: Style,
    pub fg: Color,
    pub bg: Color,
}

impl Attr {
    /// No style, terminal default colors. Encodes as `ESC[0m`.
    pub const NONE: Self = Self::new(Style::empty(), Color::Default, Color::Default);

    #[inline]
    #[must_use]
    pub const fn new(style: Style, fg: Color, bg: Color) -> Self {
        Self { style, fg, bg }
    }

    /// Same attribute with a different foreground.
    #[inline]
    #[must_use]
    pub const fn with_fg(mut self, fg: Color) -> Self {
        self.fg = fg;
        self
    }

    /// Same attribute with a different background.
    #[inline]
    #[must_use]
    pub const fn with_bg(mut self, bg: Color) -> Self {
        self.bg = bg;
        self
    }

    /// Same attribute with a different style.
    #[inline]
    #[must_use]
    pub const fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
