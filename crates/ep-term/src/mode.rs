// SPDX-License-Identifier: MIT
//
// Line-discipline modes and the flag table that derives them.
//
// `Mode` is a portable snapshot of the handful of termios fields the session
// touches. Devices translate it to and from their native representation; the
// tty device leaves every termios field not listed here exactly as the OS
// reported it, so writing back an unmodified snapshot restores the terminal.
//
// `Mode::configured` is the whole flag table as a pure function of the
// original snapshot and the requested `Flags`. Recomputing from the original
// every time means flag changes never accumulate: setting `RAW` and then
// clearing it gives the same mode as never having set it. Output
// post-processing comes back as the user had it; break-interrupt and flow
// control follow line buffering and are off in a line-buffered mode.

use bitflags::bitflags;

bitflags! {
    /// Session flags selecting how input is delivered.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Flags: u8 {
        /// Don't echo typed keys.
        const NO_ECHO           = 1 << 0;
        /// Deliver bytes as typed instead of a line at a time.
        const NO_LINE_BUFFERING = 1 << 1;
        /// Deliver Ctrl-C, Ctrl-Z, Ctrl-\ as bytes instead of signals.
        const NO_SIGNAL_KEYS    = 1 << 2;
        /// `get_key` returns immediately instead of polling until a key.
        const NON_BLOCKING_READ = 1 << 3;
        /// All of the first three, plus no input/output post-processing.
        const RAW               = 1 << 4;
    }
}

bitflags! {
    /// Input-side termios flags (`c_iflag`).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct InputModes: u16 {
        /// `IGNBRK` — ignore break conditions.
        const IGNORE_BREAK    = 1 << 0;
        /// `BRKINT` — a break flushes queues and signals.
        const BREAK_INTERRUPT = 1 << 1;
        /// `ISTRIP` — strip the eighth bit.
        const STRIP           = 1 << 2;
        /// `INLCR` — translate NL to CR.
        const NL_TO_CR        = 1 << 3;
        /// `IGNCR` — drop CR.
        const IGNORE_CR       = 1 << 4;
        /// `ICRNL` — translate CR to NL.
        const CR_TO_NL        = 1 << 5;
        /// `IXON` — XON/XOFF output flow control.
        const FLOW_CONTROL    = 1 << 6;
    }
}

bitflags! {
    /// Output-side termios flags (`c_oflag`).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct OutputModes: u8 {
        /// `OPOST` — implementation-defined output processing (NL → CRNL).
        const POST_PROCESS = 1 << 0;
    }
}

bitflags! {
    /// Local termios flags (`c_lflag`).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct LocalModes: u8 {
        /// `ECHO`
        const ECHO      = 1 << 0;
        /// `ICANON` — line editing, input delivered per line.
        const CANONICAL = 1 << 1;
        /// `ISIG` — INTR/QUIT/SUSP characters raise signals.
        const SIGNALS   = 1 << 2;
        /// `IEXTEN` — implementation-defined input processing (Ctrl-V).
        const EXTENDED  = 1 << 3;
    }
}

/// Character size (`CSIZE` field of `c_cflag`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum CharSize {
    Five,
    Six,
    Seven,
    #[default]
    Eight,
}

/// A snapshot of the device's line-discipline mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Mode {
    pub input: InputModes,
    pub output: OutputModes,
    pub local: LocalModes,
    pub char_size: CharSize,
    /// `VMIN` — bytes a read waits for.
    pub read_min: u8,
    /// `VTIME` — read timeout in tenths of a second.
    pub read_timeout: u8,
}

impl Mode {
    /// A typical interactive terminal: line editing, echo, signals, CR→NL.
    #[must_use]
    pub const fn cooked() -> Self {
        Self {
            input: InputModes::BREAK_INTERRUPT
                .union(InputModes::CR_TO_NL)
                .union(InputModes::FLOW_CONTROL),
            output: OutputModes::POST_PROCESS,
            local: LocalModes::ECHO
                .union(LocalModes::CANONICAL)
                .union(LocalModes::SIGNALS)
                .union(LocalModes::EXTENDED),
            char_size: CharSize::Eight,
            read_min: 1,
            read_timeout: 0,
        }
    }

    /// Derive the mode for `flags` from the `original` snapshot.
    ///
    /// Reads are always immediate (`VMIN = 0`, `VTIME = 0`) and characters
    /// always eight bits wide. Post-processing bits are taken from
    /// `original` unless `RAW` strips them.
    ///
    /// ```
    /// use ep_term::mode::{Flags, LocalModes, Mode};
    ///
    /// let m = Mode::configured(&Mode::cooked(), Flags::NO_ECHO);
    /// assert!(!m.local.contains(LocalModes::ECHO));
    /// assert!(m.local.contains(LocalModes::CANONICAL));
    /// ```
    #[must_use]
    pub fn configured(original: &Self, flags: Flags) -> Self {
        let mut mode = *original;
        let raw = flags.contains(Flags::RAW);

        mode.char_size = CharSize::Eight;
        mode.read_min = 0;
        mode.read_timeout = 0;

        if raw {
            mode.input.remove(
                InputModes::IGNORE_BREAK
                    | InputModes::STRIP
                    | InputModes::NL_TO_CR
                    | InputModes::IGNORE_CR
                    | InputModes::CR_TO_NL,
            );
            mode.output.remove(OutputModes::POST_PROCESS);
            mode.local.remove(LocalModes::EXTENDED);
        }

        mode.local
            .set(LocalModes::ECHO, !(raw || flags.contains(Flags::NO_ECHO)));

        if raw || flags.contains(Flags::NO_LINE_BUFFERING) {
            mode.local.remove(LocalModes::CANONICAL);
            mode.input
                .insert(InputModes::BREAK_INTERRUPT | InputModes::FLOW_CONTROL);
        } else {
            mode.local.insert(LocalModes::CANONICAL);
            mode.input
                .remove(InputModes::BREAK_INTERRUPT | InputModes::FLOW_CONTROL);
        }

        mode.local.set(
            LocalModes::SIGNALS,
            !(raw || flags.contains(Flags::NO_SIGNAL_KEYS)),
        );

        mode
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
