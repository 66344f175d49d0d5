//! # multimon-core
//!
//! Display arrangement engine for MultiMon: translates a symbolic intent such
//! as "extend onto the TV" into the exact xrandr argument list, and infers the
//! current arrangement back from live display geometry.
//!
//! This crate is used by the `multimon` application crate.
//! It has zero dependencies on OS APIs, processes or the file system.
//!
//! # Architecture overview (for beginners)
//!
//! A desktop has a fixed row of physical displays, each plugged into a
//! *port* (`DP-0`, `HDMI-0`, ...) and tagged with a *role* (`main`,
//! `secondary`, `tv`, ...).  The user thinks in *arrangements* ("TV only",
//! "mirror on the TV"); xrandr thinks in per-output flags.
//!
//! - **`domain`** – The registry of displays, the resolver that maps a role or
//!   slot index to a port, arrangement requests, the planner that expands a
//!   named arrangement into a request, and the geometric detector.
//!
//! - **`command`** – The synthesizer that turns a request into the ordered
//!   xrandr token sequence.

pub mod command;
pub mod domain;

// Re-export the most-used types at the crate root so callers can write
// `multimon_core::DisplayRegistry` instead of the full module path.
pub use command::{synthesize, Command, SynthesisError, DEFAULT_TOOL};
pub use domain::arrangement::{
    available, plan, Arrangement, ArrangementKind, ArrangementRequest, DesiredState, Direction,
    PlanError, UnknownArrangement,
};
pub use domain::detection::{detect, ActiveDisplay, LiveDisplayState, DETECTION_PRECEDENCE};
pub use domain::display::{
    DisplayRecord, DisplayRegistry, Reference, RegistryError, ResolutionError, Role, UnknownRole,
};
