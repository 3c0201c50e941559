// SPDX-License-Identifier: MIT
//
// ep-term — a minimal terminal-control core.
//
// Puts a terminal into the input mode a program asks for, encodes styled
// text and cursor moves as ANSI escape sequences, batches them into as few
// writes as possible, and reports keys and window resizes. Drawing happens
// inside an optional clipping viewport.
//
// There is no screen model here: nothing remembers what was drawn, and
// nothing is diffed. Each draw call turns directly into bytes.
//
// Everything hangs off a `Session`, which owns a `Device`. `TtyDevice` is
// the process terminal; `MemoryDevice` stands in for it in tests.

pub mod ansi;
pub mod attr;
pub mod config;
pub mod device;
mod draw;
pub mod error;
pub mod input;
pub mod mode;
pub mod output;
pub mod session;
pub mod viewport;

pub use attr::{Attr, Color, Style};
pub use config::Config;
pub use device::{Device, MemoryDevice, Size, TtyDevice};
pub use error::{Error, Result};
pub use input::Key;
pub use mode::Flags;
pub use session::Session;
pub use viewport::Viewport;
