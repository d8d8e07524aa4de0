//! Change model and path inclusion policy for stakeout
//!
//! This crate holds the pure, IO-free half of the watcher:
//! - The change model ([`Change`], [`ChangeSet`])
//! - The [`PathFilter`] strategy trait and its stock variants
//! - [`FilterConfig`], the serializable filter selection
//!
//! The walking, diffing, and scheduling live in the `stakeout` crate.

pub mod change;
pub mod config;
pub mod error;
pub mod filter;

pub use change::{Change, ChangeSet};
pub use config::FilterConfig;
pub use error::FilterError;
pub use filter::{AcceptAll, DefaultFilter, PathFilter, PythonFilter, RegexFilter};
