// SPDX-License-Identifier: MIT
//
// Error types.
//
// Every variant is recoverable. The session logs each failure when it
// happens and keeps going in a degraded state; the `Result` just tells the
// host what went wrong so it can decide whether that matters. Piped or
// redirected stdio makes most of these fail harmlessly.

use std::io;

use thiserror::Error;

/// Errors reported by session and device operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Reading the device's line-discipline mode failed.
    #[error("failed to get terminal mode: {0}")]
    ModeQuery(#[source] io::Error),

    /// Applying a line-discipline mode failed.
    #[error("failed to set terminal mode: {0}")]
    ModeSet(#[source] io::Error),

    /// No original mode was captured at init, so there is nothing to derive
    /// a configured mode from.
    #[error("terminal mode is unavailable")]
    ModeUnavailable,

    /// Querying the window size failed.
    #[error("failed to get window size: {0}")]
    WindowSize(#[source] io::Error),

    /// Writing buffered output failed.
    #[error("failed to write output: {0}")]
    Write(#[source] io::Error),

    /// Reading input failed.
    #[error("failed to read input: {0}")]
    Read(#[source] io::Error),

    /// Installing the resize notification failed.
    #[error("failed to watch for resize: {0}")]
    ResizeWatch(#[source] io::Error),

    /// Another handle on the process terminal is still alive.
    #[error("the terminal is already owned by another session")]
    TerminalInUse,
}

/// Result alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_operation() {
        let e = Error::WindowSize(io::Error::from(io::ErrorKind::Unsupported));
        assert!(e.to_string().starts_with("failed to get window size"));
        assert_eq!(
            Error::TerminalInUse.to_string(),
            "the terminal is already owned by another session"
        );
    }

    #[test]
    fn io_source_is_preserved() {
        use std::error::Error as _;
        let e = Error::Read(io::Error::from(io::ErrorKind::BrokenPipe));
        let src = e.source().unwrap().downcast_ref::<io::Error>().unwrap();
        assert_eq!(src.kind(), io::ErrorKind::BrokenPipe);
    }
}
