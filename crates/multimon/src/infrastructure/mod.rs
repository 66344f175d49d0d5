//! Infrastructure layer for the multimon application.
//!
//! Contains OS-facing adapters: the display tool process runner, the live
//! geometry query, and file-system storage.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `multimon_core`, but MUST NOT be imported by the `application` or domain
//! layers.

pub mod display_tool;
pub mod live_query;
pub mod storage;
