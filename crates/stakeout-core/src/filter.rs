//! Path inclusion policy for tree walks
//!
//! A filter answers two questions during a walk: should this directory be
//! descended into, and should this file be recorded. Four strategies:
//! 1. [`AcceptAll`] - every path is considered
//! 2. [`DefaultFilter`] - denylist of VCS/cache directories and generated files
//! 3. [`PythonFilter`] - denylisted directories plus a source-file allowlist
//! 4. [`RegexFilter`] - full-match patterns over the rendered path
//!
//! Decisions are pure and re-evaluated on every walk; nothing is cached
//! between scans, so paths created or removed between polls are re-judged.

use regex::Regex;
use std::collections::HashSet;
use std::path::Path;

use crate::error::FilterError;

/// Inclusion policy evaluated at every step of a tree walk.
///
/// Returning `false` from [`should_include_dir`](PathFilter::should_include_dir)
/// prunes the whole subtree: files below an excluded directory are never
/// visited.
pub trait PathFilter {
    /// Whether to descend into `path`
    fn should_include_dir(&self, path: &Path) -> bool;

    /// Whether to record `path` in the snapshot
    fn should_include_file(&self, path: &Path) -> bool;
}

impl<T: PathFilter + ?Sized> PathFilter for Box<T> {
    fn should_include_dir(&self, path: &Path) -> bool {
        (**self).should_include_dir(path)
    }

    fn should_include_file(&self, path: &Path) -> bool {
        (**self).should_include_file(path)
    }
}

/// Considers every directory and file
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl PathFilter for AcceptAll {
    fn should_include_dir(&self, _path: &Path) -> bool {
        true
    }

    fn should_include_file(&self, _path: &Path) -> bool {
        true
    }
}

/// Directory names never descended into by [`DefaultFilter`]
const IGNORED_DIR_NAMES: &[&str] = &[
    ".git",
    ".hg",
    ".svn",
    ".tox",
    "__pycache__",
    "site-packages",
    ".idea",
    "node_modules",
];

/// File name suffixes skipped by [`DefaultFilter`]
const IGNORED_FILE_SUFFIXES: &[&str] = &[
    ".pyc", ".pyo", ".pyd", ".swp", ".swo", ".swn", ".swm", "~",
];

/// Built-in denylist: version-control metadata, caches, and the generated
/// or temporary files editors and toolchains leave behind.
///
/// Matching is by final path component. The built-in lists can be extended
/// per instance with [`with_extra`](DefaultFilter::with_extra).
#[derive(Debug, Clone)]
pub struct DefaultFilter {
    ignored_dirs: HashSet<String>,
    ignored_suffixes: Vec<String>,
}

impl DefaultFilter {
    /// Built-in denylist only
    pub fn new() -> Self {
        Self {
            ignored_dirs: IGNORED_DIR_NAMES.iter().map(|s| s.to_string()).collect(),
            ignored_suffixes: IGNORED_FILE_SUFFIXES.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Built-in denylist plus extra directory names and file suffixes
    pub fn with_extra(
        dirs: impl IntoIterator<Item = String>,
        suffixes: impl IntoIterator<Item = String>,
    ) -> Self {
        let mut filter = Self::new();
        filter.ignored_dirs.extend(dirs);
        filter.ignored_suffixes.extend(suffixes);
        filter
    }

    /// Check a file name against the suffix list and the fixed name patterns
    ///
    /// Covers: compiled bytecode, Vim swaps, backup files, Emacs autosave
    /// and lock files, JetBrains safe-write temporaries, macOS/Windows
    /// system litter.
    fn is_ignored_name(&self, name: &str) -> bool {
        if self.ignored_suffixes.iter().any(|s| name.ends_with(s.as_str())) {
            return true;
        }

        // Emacs lock files (.#*) and autosave files (#*#)
        if name.starts_with(".#") {
            return true;
        }
        if name.starts_with('#') && name.ends_with('#') {
            return true;
        }

        // JetBrains safe-write temporaries (*.___jb_old___ / *.___jb_bak___)
        if name.contains("___jb_") && name.ends_with("___") {
            return true;
        }

        // MacOS system files
        if name == ".DS_Store" || name.starts_with("._") {
            return true;
        }

        // Windows system files
        name == "Thumbs.db" || name == "desktop.ini"
    }
}

impl Default for DefaultFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl PathFilter for DefaultFilter {
    fn should_include_dir(&self, path: &Path) -> bool {
        match path.file_name() {
            Some(name) => !self.ignored_dirs.contains(name.to_string_lossy().as_ref()),
            None => true,
        }
    }

    fn should_include_file(&self, path: &Path) -> bool {
        match path.file_name() {
            Some(name) => !self.is_ignored_name(name.to_string_lossy().as_ref()),
            None => true,
        }
    }
}

/// File suffixes a Python project watch cares about: sources plus the
/// packaging manifests (pyproject.toml, setup.cfg)
const PYTHON_FILE_SUFFIXES: &[&str] = &[".py", ".pyx", ".pyd", ".pyi", ".toml", ".cfg"];

/// Python-project policy: [`DefaultFilter`]'s directory denylist, and files
/// only when their suffix is source or packaging relevant.
#[derive(Debug, Clone, Default)]
pub struct PythonFilter {
    dirs: DefaultFilter,
}

impl PythonFilter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PathFilter for PythonFilter {
    fn should_include_dir(&self, path: &Path) -> bool {
        self.dirs.should_include_dir(path)
    }

    fn should_include_file(&self, path: &Path) -> bool {
        match path.file_name() {
            Some(name) => {
                let name = name.to_string_lossy();
                PYTHON_FILE_SUFFIXES.iter().any(|s| name.ends_with(s))
            }
            None => false,
        }
    }
}

/// Regex policy over the rendered path.
///
/// Both patterns are optional and independent: the directories pattern
/// gates descent, the files pattern gates recording, and an absent pattern
/// accepts everything. Matching is full-match - the supplied pattern is
/// compiled anchored at both ends, so an unanchored pattern never matches
/// by substring.
#[derive(Debug, Clone)]
pub struct RegexFilter {
    files: Option<Regex>,
    dirs: Option<Regex>,
}

impl RegexFilter {
    /// Compile the optional file and directory patterns.
    ///
    /// Fails if either pattern is rejected by the regex engine.
    pub fn new(files: Option<&str>, dirs: Option<&str>) -> Result<Self, FilterError> {
        Ok(Self {
            files: files.map(compile_full_match).transpose()?,
            dirs: dirs.map(compile_full_match).transpose()?,
        })
    }
}

impl PathFilter for RegexFilter {
    fn should_include_dir(&self, path: &Path) -> bool {
        match &self.dirs {
            Some(re) => re.is_match(path.to_string_lossy().as_ref()),
            None => true,
        }
    }

    fn should_include_file(&self, path: &Path) -> bool {
        match &self.files {
            Some(re) => re.is_match(path.to_string_lossy().as_ref()),
            None => true,
        }
    }
}

/// Anchor a caller pattern at both ends so it must match the whole path
fn compile_full_match(pattern: &str) -> Result<Regex, FilterError> {
    Regex::new(&format!(r"\A(?:{})\z", pattern)).map_err(|source| FilterError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}
