//! Command synthesis: arrangement request → xrandr argument list.
//!
//! # Grammar (for beginners)
//!
//! xrandr is configured one output at a time.  Each addressed display
//! contributes one *segment*:
//!
//! ```text
//! --output <PORT> (--off | --primary | (--left-of|--right-of|--same-as) <PORT>)
//!                 [--mode <WxH> --rate <NN>]
//! ```
//!
//! `--mode`/`--rate` are only emitted for displays that stay on.  Segments are
//! concatenated in registry order behind the tool name, e.g.
//!
//! ```text
//! xrandr --output DP-0 --primary --mode 1920x1080 --rate 60 \
//!        --output HDMI-0 --right-of DP-0 --mode 1280x720 --rate 50
//! ```
//!
//! Every relative reference is resolved to a port *before* any token is
//! produced, so a bad reference never yields a half-built command.

use std::fmt;

use thiserror::Error;
use tracing::trace;

use crate::domain::arrangement::{ArrangementRequest, DesiredState};
use crate::domain::display::{DisplayRecord, DisplayRegistry, ResolutionError};

/// Invocation name of the display configuration tool.
pub const DEFAULT_TOOL: &str = "xrandr";

/// Errors raised while turning a request into a command.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SynthesisError {
    /// A positional request does not have one state per display.
    #[error("positional request has {actual} states but {expected} displays are configured")]
    LengthMismatch { expected: usize, actual: usize },

    /// A relative placement references an unknown display.
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
}

/// Ordered token sequence for the external tool, program name first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    tokens: Vec<String>,
}

impl Command {
    /// Starts a command for `program` with no arguments.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            tokens: vec![program.into()],
        }
    }

    /// Appends one argument token.
    pub fn arg(&mut self, token: impl Into<String>) -> &mut Self {
        self.tokens.push(token.into());
        self
    }

    /// The program name (first token).
    pub fn program(&self) -> &str {
        &self.tokens[0]
    }

    /// All tokens after the program name.
    pub fn args(&self) -> &[String] {
        &self.tokens[1..]
    }

    /// All tokens, program name included.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Number of `--output` segments in the command.
    pub fn segment_count(&self) -> usize {
        self.args().iter().filter(|t| *t == "--output").count()
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tokens.join(" "))
    }
}

/// A display paired with its already-resolved target state.
enum ResolvedState {
    Off,
    Primary,
    Relative { flag: &'static str, port: String },
}

/// Builds the tool command that realises `request` on `registry`.
///
/// # Errors
///
/// Returns [`SynthesisError::LengthMismatch`] when a positional request does
/// not cover every display, and [`SynthesisError::Resolution`] when a relative
/// placement references a role or index that does not exist.
pub fn synthesize(
    tool: &str,
    registry: &DisplayRegistry,
    request: &ArrangementRequest,
) -> Result<Command, SynthesisError> {
    let addressed: Vec<(&DisplayRecord, &DesiredState)> = match request {
        ArrangementRequest::Positional(states) => {
            if states.len() != registry.len() {
                return Err(SynthesisError::LengthMismatch {
                    expected: registry.len(),
                    actual: states.len(),
                });
            }
            registry.iter().zip(states).collect()
        }
        ArrangementRequest::RoleKeyed(states) => registry
            .iter()
            .filter(|display| display.role.is_assigned())
            .filter_map(|display| states.get(&display.role).map(|state| (display, state)))
            .collect(),
    };

    // Resolve everything first so a failure leaves no partial command behind.
    let resolved = addressed
        .into_iter()
        .map(|(display, state)| Ok((display, resolve_state(registry, state)?)))
        .collect::<Result<Vec<_>, SynthesisError>>()?;

    let mut command = Command::new(tool);
    for (display, state) in &resolved {
        push_segment(&mut command, display, state);
    }

    trace!(%command, "synthesized display command");
    Ok(command)
}

fn resolve_state(
    registry: &DisplayRegistry,
    state: &DesiredState,
) -> Result<ResolvedState, ResolutionError> {
    Ok(match state {
        DesiredState::Off => ResolvedState::Off,
        DesiredState::Primary => ResolvedState::Primary,
        DesiredState::RelativeTo(direction, reference) => ResolvedState::Relative {
            flag: direction.flag(),
            port: registry.resolve(reference)?,
        },
    })
}

fn push_segment(command: &mut Command, display: &DisplayRecord, state: &ResolvedState) {
    command.arg("--output").arg(display.port.as_str());
    match state {
        ResolvedState::Off => {
            command.arg("--off");
            return;
        }
        ResolvedState::Primary => {
            command.arg("--primary");
        }
        ResolvedState::Relative { flag, port } => {
            command.arg(*flag).arg(port.as_str());
        }
    }
    command
        .arg("--mode")
        .arg(display.resolution.as_str())
        .arg("--rate")
        .arg(display.rate.as_str());
}

// ── Tests ─────────────────────────────────────────────────────────────────────
