use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the orchestration layer around the rule pipeline
/// (config loading and the project walk are infallible in the sense that
/// they degrade to diagnostics, not `Err`, but a caller needs to be told
/// when the project root itself can't be read at all).
#[derive(Debug, Error)]
pub enum CheckError {
    /// The project root could not be accessed.
    #[error("cannot access project directory {path}: {source}")]
    ProjectDir {
        /// The directory that failed to open.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}
