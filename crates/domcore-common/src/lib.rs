//! Ambient utilities shared by every crate in the domcore workspace.
//!
//! This crate provides shared infrastructure used by the DOM core and the
//! selector engine:
//! - **Diagnostics** - deduplicating, colored terminal warnings for
//!   recoverable situations that are not spec-mandated failures.

pub mod warning;

pub use warning::{clear_warnings, warn_once};
