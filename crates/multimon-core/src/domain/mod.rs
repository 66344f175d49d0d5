//! Domain entities for MultiMon.
//!
//! This module contains pure business logic with no infrastructure dependencies.
//! Nothing here starts a process, reads a file or talks to the display server;
//! the application crate feeds records in and consumes the results.
//!
//! - **`display`** – the ordered [`display::DisplayRegistry`] of physical
//!   displays and the identifier resolver (role / index / port → port).
//! - **`arrangement`** – per-display [`arrangement::DesiredState`]s, the two
//!   request addressing modes, and the closed set of named arrangements.
//! - **`detection`** – infers the named arrangement from live geometry.

pub mod arrangement;
pub mod detection;
pub mod display;
