// ABOUTME: Validated script name for files in the scripts directory.
// ABOUTME: Rejects anything that could escape the directory or reach a remote shell unquoted.

use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScriptNameError {
    #[error("script name cannot be empty")]
    Empty,

    #[error("script name cannot be '.' or '..'")]
    Relative,

    #[error("script name cannot start with a hyphen")]
    StartsWithHyphen,

    #[error("invalid character in script name: '{0}'")]
    InvalidChar(char),
}

/// Basename of a script inside the scripts directory.
///
/// Only `[A-Za-z0-9._-]` is accepted, so the joined path is safe to place
/// in a remote command line without quoting.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScriptName(String);

impl ScriptName {
    pub fn new(value: &str) -> Result<Self, ScriptNameError> {
        if value.is_empty() {
            return Err(ScriptNameError::Empty);
        }

        if value == "." || value == ".." {
            return Err(ScriptNameError::Relative);
        }

        if value.starts_with('-') {
            return Err(ScriptNameError::StartsWithHyphen);
        }

        for c in value.chars() {
            if !c.is_ascii_alphanumeric() && c != '.' && c != '_' && c != '-' {
                return Err(ScriptNameError::InvalidChar(c));
            }
        }

        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Absolute location of this script under `scripts_dir`.
    pub fn path_in(&self, scripts_dir: &Path) -> PathBuf {
        scripts_dir.join(&self.0)
    }
}

impl fmt::Display for ScriptName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
