//! ApplyArrangementUseCase: plans, synthesizes and runs display commands.
//!
//! This use case sits at the application layer and delegates to a
//! [`CommandRunner`] trait object for the actual process invocation.  The
//! process-spawning implementation lives in the infrastructure layer.
//!
//! # Success is "no output" (for beginners)
//!
//! xrandr exits with status 0 even when it prints warnings such as
//! `warning: output HDMI-1 not found; ignoring`.  The only reliable signal is
//! the text it prints: a clean run prints nothing.  This use case therefore
//! treats *any* captured stdout/stderr text as a failure and hands it back to
//! the caller verbatim; the exit status is never consulted.
//!
//! There is no retry and no rollback.  Whatever xrandr managed to change
//! before complaining stays in effect.

use std::io;
use std::sync::Arc;

use multimon_core::{
    available, plan, synthesize, Arrangement, ArrangementRequest, Command, DisplayRegistry,
    PlanError, SynthesisError,
};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Error type for apply operations.
#[derive(Debug, Error)]
pub enum ApplyError {
    /// The named arrangement does not fit the configured displays.
    #[error("cannot plan arrangement: {0}")]
    Plan(#[from] PlanError),

    /// The request could not be turned into a command.  Nothing was run.
    #[error("cannot build display command: {0}")]
    Synthesis(#[from] SynthesisError),

    /// The display tool could not be started at all.
    #[error("failed to run {tool}: {source}")]
    Launch {
        tool: String,
        #[source]
        source: io::Error,
    },

    /// The display tool ran but printed diagnostics.
    #[error("display tool reported: {diagnostics}")]
    Rejected { diagnostics: String },
}

impl ApplyError {
    /// The raw text printed by the display tool, if it ran and complained.
    pub fn diagnostics(&self) -> Option<&str> {
        match self {
            ApplyError::Rejected { diagnostics } => Some(diagnostics),
            _ => None,
        }
    }
}

/// Runs a synthesized command and captures everything it prints.
///
/// Each supported platform provides an implementation in the infrastructure
/// layer; tests substitute a recording or `mockall` double.
#[cfg_attr(test, mockall::automock)]
pub trait CommandRunner: Send + Sync {
    /// Runs `command` to completion and returns its combined stdout and stderr.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the process cannot be started.
    fn run(&self, command: &Command) -> io::Result<String>;
}

/// The Apply Arrangement use case.
///
/// Holds the display registry it was built with; the registry never changes
/// for the lifetime of the use case.
pub struct ApplyArrangementUseCase {
    registry: DisplayRegistry,
    tool: String,
    runner: Arc<dyn CommandRunner>,
}

impl ApplyArrangementUseCase {
    /// Creates a new use case for `registry`, invoking `tool` through `runner`.
    pub fn new(
        registry: DisplayRegistry,
        tool: impl Into<String>,
        runner: Arc<dyn CommandRunner>,
    ) -> Self {
        Self {
            registry,
            tool: tool.into(),
            runner,
        }
    }

    /// Arrangements that can be planned for the configured displays.
    pub fn available(&self) -> Vec<Arrangement> {
        available(&self.registry)
    }

    /// Synthesizes the command for `request` without running it.
    ///
    /// # Errors
    ///
    /// Returns [`SynthesisError`] for length mismatches and unresolvable references.
    pub fn command_for(&self, request: &ArrangementRequest) -> Result<Command, SynthesisError> {
        synthesize(&self.tool, &self.registry, request)
    }

    /// Plans and synthesizes the command for a named arrangement without running it.
    ///
    /// # Errors
    ///
    /// Returns [`ApplyError::Plan`] or [`ApplyError::Synthesis`].
    pub fn command_for_arrangement(&self, arrangement: Arrangement) -> Result<Command, ApplyError> {
        let request = plan(arrangement, &self.registry)?;
        Ok(self.command_for(&request)?)
    }

    /// Applies a per-display request.
    ///
    /// # Errors
    ///
    /// Returns [`ApplyError::Synthesis`] before anything is run,
    /// [`ApplyError::Launch`] if the tool cannot be started, and
    /// [`ApplyError::Rejected`] if the tool printed anything.
    pub fn apply(&self, request: &ArrangementRequest) -> Result<(), ApplyError> {
        let command = self.command_for(request)?;
        self.run(&command)
    }

    /// Switches to a named arrangement.
    ///
    /// # Errors
    ///
    /// As [`apply`](Self::apply), plus [`ApplyError::Plan`] when the
    /// arrangement does not fit the configured displays.
    pub fn switch_to(&self, arrangement: Arrangement) -> Result<(), ApplyError> {
        let command = self.command_for_arrangement(arrangement)?;
        self.run(&command)?;
        info!(%arrangement, "switched display arrangement");
        Ok(())
    }

    fn run(&self, command: &Command) -> Result<(), ApplyError> {
        debug!(%command, "running display command");

        let output = self
            .runner
            .run(command)
            .map_err(|source| ApplyError::Launch {
                tool: command.program().to_string(),
                source,
            })?;

        if output.is_empty() {
            Ok(())
        } else {
            warn!(diagnostics = %output.trim_end(), "display tool reported a problem");
            Err(ApplyError::Rejected {
                diagnostics: output,
            })
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::function;
    use multimon_core::{DesiredState, DisplayRecord, Role};

    fn registry() -> DisplayRegistry {
        DisplayRegistry::new(vec![
            DisplayRecord::new("DP-0", "1920x1080", "60", Role::Main),
            DisplayRecord::new("HDMI-0", "1920x1080", "60", Role::Secondary),
        ])
        .unwrap()
    }

    fn use_case(runner: MockCommandRunner) -> ApplyArrangementUseCase {
        ApplyArrangementUseCase::new(registry(), "xrandr", Arc::new(runner))
    }

    #[test]
    fn test_apply_succeeds_when_tool_prints_nothing() {
        // Arrange
        let mut runner = MockCommandRunner::new();
        runner.expect_run().times(1).returning(|_| Ok(String::new()));
        let uc = use_case(runner);

        // Act
        let result = uc.switch_to(Arrangement::MainOnly);

        // Assert
        assert!(result.is_ok());
    }

    #[test]
    fn test_apply_fails_with_verbatim_diagnostics_when_tool_prints_anything() {
        // Arrange
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .returning(|_| Ok("xrandr: cannot find mode 1920x1080\n".to_string()));
        let uc = use_case(runner);

        // Act
        let err = uc.switch_to(Arrangement::SecondaryOnly).unwrap_err();

        // Assert
        assert_eq!(err.diagnostics(), Some("xrandr: cannot find mode 1920x1080\n"));
    }

    #[test]
    fn test_whitespace_only_output_still_counts_as_failure() {
        let mut runner = MockCommandRunner::new();
        runner.expect_run().returning(|_| Ok("\n".to_string()));
        let uc = use_case(runner);

        assert!(matches!(
            uc.switch_to(Arrangement::MainOnly),
            Err(ApplyError::Rejected { .. })
        ));
    }

    #[test]
    fn test_launch_failure_is_reported_with_tool_name() {
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .returning(|_| Err(io::Error::new(io::ErrorKind::NotFound, "no such file")));
        let uc = use_case(runner);

        let err = uc.switch_to(Arrangement::MainOnly).unwrap_err();

        assert!(matches!(err, ApplyError::Launch { ref tool, .. } if tool == "xrandr"));
    }

    #[test]
    fn test_runner_receives_synthesized_command() {
        // Arrange
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .with(function(|cmd: &Command| {
                cmd.to_string()
                    == "xrandr --output DP-0 --primary --mode 1920x1080 --rate 60 \
                        --output HDMI-0 --same-as DP-0 --mode 1920x1080 --rate 60"
            }))
            .times(1)
            .returning(|_| Ok(String::new()));
        let uc = use_case(runner);

        // Act / Assert
        uc.switch_to(Arrangement::SecondaryMirror).expect("apply");
    }

    #[test]
    fn test_resolution_failure_never_runs_the_tool() {
        // Arrange: the mock panics if `run` is called at all
        let mut runner = MockCommandRunner::new();
        runner.expect_run().never();
        let uc = use_case(runner);
        let request =
            ArrangementRequest::role_keyed([(Role::Main, DesiredState::right_of(Role::Tv))]);

        // Act
        let result = uc.apply(&request);

        // Assert
        assert!(matches!(result, Err(ApplyError::Synthesis(_))));
    }

    #[test]
    fn test_plan_failure_never_runs_the_tool() {
        let mut runner = MockCommandRunner::new();
        runner.expect_run().never();
        let uc = use_case(runner);

        let result = uc.switch_to(Arrangement::AllExtended);

        assert!(matches!(result, Err(ApplyError::Plan(_))));
    }

    #[test]
    fn test_applying_same_arrangement_twice_succeeds_both_times() {
        let mut runner = MockCommandRunner::new();
        runner.expect_run().times(2).returning(|_| Ok(String::new()));
        let uc = use_case(runner);

        assert!(uc.switch_to(Arrangement::SecondaryExtended).is_ok());
        assert!(uc.switch_to(Arrangement::SecondaryExtended).is_ok());
    }

    #[test]
    fn test_available_lists_arrangements_for_registry() {
        let uc = use_case(MockCommandRunner::new());
        assert_eq!(
            uc.available(),
            vec![
                Arrangement::MainOnly,
                Arrangement::SecondaryExtended,
                Arrangement::SecondaryMirror,
                Arrangement::SecondaryOnly,
            ]
        );
    }
}
