//! Source location tracking.
//!
//! Every declaration, and every diagnostic, carries the [`Location`] at which
//! it originated: a search root (`base`), a forward-slash path relative to
//! that root, and an optional line/column position inside the file.

use std::fmt;

/// Identifies a file, and optionally a position inside it.
///
/// `base` names the search root the file was found under: a directory, an
/// archive, or the empty string for synthetic sources such as the bundled
/// descriptor definitions. `path` is relative to `base` and always uses
/// forward slashes, even inside archives. Equality is structural.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    base: String,
    path: String,
    line: i32,
    column: i32,
}

impl Location {
    /// Create a location for a file under a search root.
    pub fn get(base: impl Into<String>, path: impl Into<String>) -> Self {
        let base = base.into();
        Self {
            base: base.strip_suffix('/').map(str::to_owned).unwrap_or(base),
            path: path.into(),
            line: -1,
            column: -1,
        }
    }

    /// Create a location naming a search root itself.
    ///
    /// Used for configuration entries: the whole of `sourcePath` and
    /// `protoPath` is a list of roots, each a directory, an archive, or a
    /// single file.
    pub fn root(base: impl Into<String>) -> Self {
        Self::get(base, "")
    }

    /// Create a location with no base, for synthetic sources.
    pub fn synthetic(path: impl Into<String>) -> Self {
        Self::get("", path)
    }

    /// This location, narrowed to a line/column position (1-indexed).
    pub fn at(&self, line: i32, column: i32) -> Self {
        Self {
            base: self.base.clone(),
            path: self.path.clone(),
            line,
            column,
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// 1-indexed line, or -1 when the location names a whole file.
    pub fn line(&self) -> i32 {
        self.line
    }

    /// 1-indexed column, or -1 when absent.
    pub fn column(&self) -> i32 {
        self.column
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.base.is_empty(), self.path.is_empty()) {
            (false, false) => write!(f, "{}/{}", self.base, self.path)?,
            (false, true) => write!(f, "{}", self.base)?,
            (true, _) => write!(f, "{}", self.path)?,
        }
        if self.line != -1 {
            write!(f, ":{}", self.line)?;
            if self.column != -1 {
                write!(f, ":{}", self.column)?;
            }
        }
        Ok(())
    }
}
