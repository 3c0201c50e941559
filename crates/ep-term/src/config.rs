// SPDX-License-Identifier: MIT
//
// Session configuration.

use std::time::Duration;

use crate::mode::Flags;
use crate::output::DEFAULT_CAPACITY;

/// Default sleep between polls while `get_key` waits.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Default size of the scratch buffer `draw_fmt` renders into.
pub const DEFAULT_FORMAT_CAPACITY: usize = 512;

/// Settings applied when a session starts.
///
/// Only `flags` and `poll_interval` can be changed afterwards (with
/// `Session::set_flags` and `Session::set_poll_interval`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Input flags applied at init.
    pub flags: Flags,
    /// How long `get_key` sleeps between polls when no key is ready.
    ///
    /// Shorter means lower latency and more wakeups. Default: 1ms.
    pub poll_interval: Duration,
    /// Output buffer capacity in bytes. Default: 4096.
    pub buffer_capacity: usize,
    /// Longest formatted string `draw_fmt` emits. Default: 512.
    pub format_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            flags: Flags::empty(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            buffer_capacity: DEFAULT_CAPACITY,
            format_capacity: DEFAULT_FORMAT_CAPACITY,
        }
    }
}

impl Config {
    /// Default settings with `flags` applied at init.
    #[must_use]
    pub fn with_flags(flags: Flags) -> Self {
        Self {
            flags,
            ..Self::default()
        }
    }
}
