//! Shell completion scripts.

use std::io;

use clap::CommandFactory;
use clap_complete::{generate, shells::Shell};

/// Writes the completion script for `shell` to `out`.
pub fn write_completion(shell: Shell, out: &mut impl io::Write) {
    let mut app = crate::Cli::command();
    generate(shell, &mut app, "coach", out);
}

/// Prints the completion script for `shell` on stdout.
pub fn generate_completion(shell: Shell) {
    write_completion(shell, &mut io::stdout());
}
