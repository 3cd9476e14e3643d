//! Console output honoring the quiet levels and stream redirection.
//!
//! Normal messages go to stdout, unless stdout carries payload (the split
//! result with '-o -', or the wrapped track listing with -l); then they move
//! to stderr. Warnings and errors always go to stderr.

use std::io::{self, Write};

pub struct Console {
    to_stderr: bool,
    very_quiet: bool,
}

impl Console {
    pub fn new(to_stderr: bool, very_quiet: bool) -> Self {
        Console {
            to_stderr,
            very_quiet,
        }
    }

    /// A normal message; suppressed entirely in very quiet mode.
    pub fn message(&self, text: impl AsRef<str>) {
        if self.very_quiet {
            return;
        }
        if self.to_stderr {
            eprintln!("{}", text.as_ref());
        } else {
            println!("{}", text.as_ref());
        }
    }

    pub fn warning(&self, text: impl AsRef<str>) {
        eprintln!(" Warning: {}", text.as_ref());
    }

    /// Writer for the interactive prompts, on the same stream as messages.
    pub fn writer(&self) -> Box<dyn Write> {
        if self.to_stderr {
            Box::new(io::stderr())
        } else {
            Box::new(io::stdout())
        }
    }
}

/// Startup banner, kept away from stdout so it never mixes with payload.
pub fn print_banner() {
    eprintln!(
        "{} {} - splitting via the external engine",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );
}
