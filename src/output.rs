//! User-facing console output.
//! The relocation result goes to stdout unadorned so scripts can compare it to
//! `OK`; everything else is a prefixed, optionally colored line on stderr.

use owo_colors::OwoColorize;

use crate::outcome::RelocationOutcome;

fn stderr_is_tty() -> bool {
    atty::is(atty::Stream::Stderr)
}

pub fn print_info(msg: &str) {
    if stderr_is_tty() {
        eprintln!("{} {}", "info:".cyan().bold(), msg);
    } else {
        eprintln!("info: {msg}");
    }
}

pub fn print_warn(msg: &str) {
    if stderr_is_tty() {
        eprintln!("{} {}", "warn:".yellow().bold(), msg);
    } else {
        eprintln!("warn: {msg}");
    }
}

pub fn print_error(msg: &str) {
    if stderr_is_tty() {
        eprintln!("{} {}", "error:".red().bold(), msg);
    } else {
        eprintln!("error: {msg}");
    }
}

/// Print the result string on stdout, plus a hint on stderr for the partial case.
pub fn print_outcome(outcome: &RelocationOutcome) {
    println!("{}", outcome.message());
    if let RelocationOutcome::LinkMissing(_) = outcome {
        print_warn(
            "the data file was relocated but no symbolic link exists at its old path; \
             create it by hand before the table is opened again",
        );
    }
}
