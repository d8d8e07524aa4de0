//! Declarative filter selection
//!
//! [`FilterConfig`] is the serializable form of the filter strategies in
//! [`crate::filter`], for callers that pick a policy from a config file
//! rather than constructing one in code. `build()` turns a configuration
//! into a boxed [`PathFilter`], surfacing bad patterns immediately.

use serde::{Deserialize, Serialize};

use crate::error::FilterError;
use crate::filter::{AcceptAll, DefaultFilter, PathFilter, PythonFilter, RegexFilter};

/// Filter selection, tagged by `kind`.
///
/// ```json
/// { "kind": "regex", "files": "^.*\\.rs$" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FilterConfig {
    /// Consider every directory and file
    All,
    /// Built-in denylist, optionally extended
    Default {
        /// Extra directory names to skip, on top of the built-ins
        #[serde(default)]
        extra_dirs: Vec<String>,
        /// Extra file suffixes to skip, on top of the built-ins
        #[serde(default)]
        extra_suffixes: Vec<String>,
    },
    /// Denylisted directories plus the Python source/packaging allowlist
    Python,
    /// Full-match patterns over the rendered path; an absent pattern
    /// accepts everything on its axis
    Regex {
        #[serde(default)]
        files: Option<String>,
        #[serde(default)]
        dirs: Option<String>,
    },
}

impl Default for FilterConfig {
    fn default() -> Self {
        FilterConfig::Default {
            extra_dirs: Vec::new(),
            extra_suffixes: Vec::new(),
        }
    }
}

impl FilterConfig {
    /// Build the filter this configuration describes.
    ///
    /// Fails only for the `regex` variant, when a pattern does not compile.
    pub fn build(&self) -> Result<Box<dyn PathFilter + Send + Sync>, FilterError> {
        Ok(match self {
            FilterConfig::All => Box::new(AcceptAll),
            FilterConfig::Default {
                extra_dirs,
                extra_suffixes,
            } => Box::new(DefaultFilter::with_extra(
                extra_dirs.iter().cloned(),
                extra_suffixes.iter().cloned(),
            )),
            FilterConfig::Python => Box::new(PythonFilter::new()),
            FilterConfig::Regex { files, dirs } => {
                Box::new(RegexFilter::new(files.as_deref(), dirs.as_deref())?)
            }
        })
    }
}
