// SPDX-License-Identifier: MIT
//
// epithet — demo host for ep-term.
//
// Clears the screen, asks for a key, redraws on every resize, then shows
// which key was pressed and restores the terminal.
//
// Logging is off unless `EPITHET_LOG_FILE` names a file to append to; the
// terminal itself is the demo's output, so logs never go there.
// `EPITHET_LOG` sets the filter (default `debug`).

use std::fs::OpenOptions;
use std::process::ExitCode;
use std::sync::Mutex;

use ep_term::{Attr, Color, Config, Device, Flags, Key, Session, Style};
use tracing_subscriber::EnvFilter;

fn init_logging() {
    let Some(path) = std::env::var_os("EPITHET_LOG_FILE") else {
        return;
    };
    let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) else {
        return;
    };

    let filter = EnvFilter::try_from_env("EPITHET_LOG").unwrap_or_else(|_| EnvFilter::new("debug"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn draw_prompt<D: Device>(term: &mut Session<D>) -> ep_term::Result<()> {
    term.clear()?;
    term.draw_str(0, 0, Attr::NONE, "Press any key to continue")?;
    term.flush()
}

fn run<D: Device>(term: &mut Session<D>) -> ep_term::Result<Key> {
    draw_prompt(term)?;

    loop {
        let key = term.get_key()?;
        if key != Key::RESIZE {
            return Ok(key);
        }
        draw_prompt(term)?;
        let note = Attr::new(Style::INVERT, Color::Blue, Color::Default);
        term.draw_str(0, 1, note, "Resized!")?;
        term.flush()?;
    }
}

fn main() -> ExitCode {
    init_logging();

    let mut term = match Session::open(Config::with_flags(Flags::NO_ECHO | Flags::NO_LINE_BUFFERING)) {
        Ok(term) => term,
        Err(e) => {
            eprintln!("epithet: {e}");
            return ExitCode::FAILURE;
        }
    };

    let outcome = run(&mut term).and_then(|key| {
        let red = Attr::NONE.with_fg(Color::Red);
        term.draw_fmt(0, 2, red, format_args!("You pressed {key} ({})", key.code()))?;
        term.flush()
    });

    let finished = term.deinit();
    match outcome.and(finished) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("epithet: {e}");
            ExitCode::FAILURE
        }
    }
}
