// ABOUTME: Block store error types with SNAFU context selectors.
// ABOUTME: Each variant names the step of the rewrite protocol that failed.

use std::path::PathBuf;

use snafu::Snafu;

use crate::exit::ExitCode;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum BlockError {
    #[snafu(display("no such file {}", path.display()))]
    FileMissing { path: PathBuf },

    #[snafu(display("can't read {}: {source}", path.display()))]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("can't write temporary file next to {}: {source}", path.display()))]
    WriteTemp {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("unable to remove previous backup {}: {source}", path.display()))]
    RemoveBackup {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("unable to save {} to {}: {source}", from.display(), to.display()))]
    Backup {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("unable to move new content into {}: {source}", path.display()))]
    Swap {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl BlockError {
    pub fn exit_code(&self) -> ExitCode {
        match self {
            BlockError::FileMissing { .. } => ExitCode::ConfigMissing,
            _ => ExitCode::Failure,
        }
    }
}
