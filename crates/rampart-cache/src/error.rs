use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading or writing the on-disk cache.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Could not create the cache directory (or a fingerprint's two-hex
    /// shard directory inside it).
    #[error("cannot create cache directory {path}: {source}")]
    CreateDir {
        /// The directory that failed to create.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Could not write the temporary file that precedes the atomic rename.
    #[error("cannot write cache entry to {path}: {source}")]
    Write {
        /// The path the entry was being staged under.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Could not rename the staged temporary file into place.
    #[error("cannot persist cache entry at {path}: {source}")]
    Persist {
        /// The final entry path.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Could not read an existing cache entry (treated as a miss by
    /// `Cache::get`'s caller for anything except a genuine I/O failure --
    /// this variant only surfaces the latter).
    #[error("cannot read cache entry at {path}: {source}")]
    Read {
        /// The entry that failed to read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Could not remove the cache directory (`clean`).
    #[error("cannot remove cache directory {path}: {source}")]
    Clean {
        /// The directory that failed to remove.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The action being cached could not be spawned at all (distinct from
    /// the action running and failing, which is a captured exit code, not
    /// an error).
    #[error("cannot run cached action: {0}")]
    Spawn(#[source] std::io::Error),
}
