//! Recording command runner for tests.
//!
//! # Why a recording runner?
//!
//! The real runner reconfigures the monitors of whatever machine the tests
//! run on.  [`RecordingCommandRunner`] instead pushes every command it is
//! given into a `Mutex<Vec<...>>` and answers with a canned output, so tests
//! can assert on exactly what would have been sent to xrandr.
//!
//! # Usage in tests
//!
//! ```ignore
//! let runner = Arc::new(RecordingCommandRunner::silent());
//! let use_case = ApplyArrangementUseCase::new(registry, "xrandr", runner.clone());
//!
//! use_case.switch_to(Arrangement::TvOnly).unwrap();
//!
//! assert_eq!(runner.commands()[0], "xrandr --output eDP-1 --off ...");
//! ```

use std::io;
use std::sync::Mutex;

use multimon_core::Command;

use crate::application::apply_arrangement::CommandRunner;

/// A runner that records commands and replies with a fixed output.
#[derive(Default)]
pub struct RecordingCommandRunner {
    /// Every command passed to `run`, rendered as a single line.
    pub recorded: Mutex<Vec<String>>,
    /// Text returned from every `run` call.  Empty means success.
    pub reply: String,
    /// When `true`, `run` fails as if the tool were not installed.
    pub should_fail_to_launch: bool,
}

impl RecordingCommandRunner {
    /// A runner whose tool always succeeds silently.
    pub fn silent() -> Self {
        Self::default()
    }

    /// A runner whose tool always prints `reply`.
    pub fn replying(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            ..Self::default()
        }
    }

    /// A runner whose tool cannot be started.
    pub fn unlaunchable() -> Self {
        Self {
            should_fail_to_launch: true,
            ..Self::default()
        }
    }

    /// Snapshot of the recorded command lines.
    pub fn commands(&self) -> Vec<String> {
        self.recorded.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl CommandRunner for RecordingCommandRunner {
    fn run(&self, command: &Command) -> io::Result<String> {
        if self.should_fail_to_launch {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{}: not found", command.program()),
            ));
        }
        if let Ok(mut recorded) = self.recorded.lock() {
            recorded.push(command.to_string());
        }
        Ok(self.reply.clone())
    }
}
