//! Command module: turns arrangement requests into xrandr argument lists.

pub mod synthesis;

pub use synthesis::{synthesize, Command, SynthesisError, DEFAULT_TOOL};
