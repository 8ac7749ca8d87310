//! Command handler layer.
//!
//! This module owns CLI-oriented orchestration and output wiring.
//!
//! ## Principles
//! - Parse/match CLI inputs here.
//! - Delegate analysis and persistence to `services/*` and `collector`.
//! - Keep behavior and output schema stable.

pub mod runtime;

pub use runtime::handle_commands;
