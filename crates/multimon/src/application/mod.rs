//! Application layer use cases for MultiMon.
//!
//! # What is the "application" layer? (for beginners)
//!
//! In Clean Architecture the *application* layer sits between the domain
//! (pure business rules, here the `multimon-core` crate) and the
//! infrastructure (processes, files, the display server).
//!
//! Use cases in this layer:
//!
//! - **Orchestrate** domain objects to fulfil a user goal (e.g., "switch to
//!   the TV-only arrangement").
//! - **Depend on abstractions** (traits) rather than concrete implementations,
//!   so the infrastructure can be swapped without changing this code.
//! - **Contain no OS calls, no process spawning, no file system access**.
//!
//! # Sub-modules
//!
//! - **`apply_arrangement`** – Plans a named arrangement, synthesizes the
//!   xrandr command and runs it through a [`apply_arrangement::CommandRunner`].
//!   Success means the tool printed nothing.
//!
//! - **`detect_arrangement`** – Reads the live display geometry through a
//!   [`detect_arrangement::LiveDisplayQuery`] and names the arrangement in
//!   effect, if any.

pub mod apply_arrangement;
pub mod detect_arrangement;
