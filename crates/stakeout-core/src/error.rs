//! Construction-time filter errors

use thiserror::Error;

/// Error building a filter from its configuration.
///
/// Filter misconfiguration is fatal at construction; walking never starts
/// with a half-built filter.
#[derive(Debug, Error)]
pub enum FilterError {
    /// The regex engine rejected a pattern
    #[error("invalid filter pattern {pattern:?}")]
    InvalidPattern {
        /// Pattern as supplied by the caller, before full-match anchoring
        pattern: String,
        #[source]
        source: regex::Error,
    },
}
