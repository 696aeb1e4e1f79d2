//! Window title updates while a run is in progress
//!
//! Titles are only written when stdout is a terminal, so piped output stays
//! free of escape sequences.

use std::io::{self, IsTerminal, Write};

const TITLE_PREFIX: &str = "gitfleet";

/// Writes the OSC 0 sequence that sets the window title to `title`
pub fn write_title(out: &mut impl Write, title: &str) -> io::Result<()> {
    write!(out, "\x1b]0;{title}\x07")?;
    out.flush()
}

/// Sets the window title when stdout is a terminal; write errors are ignored
pub fn set_terminal_title(title: &str) {
    let stdout = io::stdout();
    if stdout.is_terminal() {
        let _ = write_title(&mut stdout.lock(), title);
    }
}

/// Title shown while directories are still being published
pub fn progress_title(completed: u64, total: u64) -> String {
    format!("🚀 {TITLE_PREFIX} {completed}/{total}")
}

/// Title shown once the run has ended
pub fn finished_title(failed: u64) -> String {
    if failed == 0 {
        format!("✅ {TITLE_PREFIX}")
    } else {
        format!("⚠️ {TITLE_PREFIX} ({failed} failed)")
    }
}
