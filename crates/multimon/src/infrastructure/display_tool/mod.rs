//! Display tool infrastructure: runs xrandr as a child process.
//!
//! The process is run synchronously.  Its stdout and stderr are both captured
//! and concatenated; the application layer decides success purely on whether
//! that text is empty.  There is no timeout, so a hung tool blocks the caller.
//!
//! # Testability
//!
//! The [`CommandRunner`] trait allows tests to record commands instead of
//! reconfiguring the real desktop; see [`mock::RecordingCommandRunner`].

use std::io;
use std::process::{self, Stdio};

use multimon_core::Command;
use tracing::debug;

use crate::application::apply_arrangement::CommandRunner;

pub mod mock;

/// Runs commands as real child processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessCommandRunner;

impl ProcessCommandRunner {
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for ProcessCommandRunner {
    fn run(&self, command: &Command) -> io::Result<String> {
        let output = process::Command::new(command.program())
            .args(command.args())
            .stdin(Stdio::null())
            .output()?;

        // Exit status is logged only; callers judge the run by its output.
        debug!(program = command.program(), status = %output.status, "display tool exited");

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));
        Ok(text)
    }
}
