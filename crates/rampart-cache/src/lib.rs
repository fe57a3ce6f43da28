/*!
The computation cache: a content-addressed on-disk store keyed by a
fingerprint over interpreter version, source contents, declared dependency
versions, and a user-named action, used to memoize the stdout/stderr of
expensive sub-commands.

This crate owns three things: the fingerprint algorithm (`fingerprint`),
the on-disk envelope format (`envelope`), and the content-addressed store
itself (`store`). It knows nothing about *which* sub-command it's wrapping
-- that's `crates/core`'s `test` command, which builds a
`FingerprintInputs` from the project configuration, asks a `Cache` for the
fingerprint, and either replays a hit or captures and stores a miss.
*/

#![deny(missing_docs)]

mod envelope;
mod error;
mod fingerprint;
mod store;

pub use crate::envelope::CacheEntry;
pub use crate::error::CacheError;
pub use crate::fingerprint::{compute, Fingerprint, FingerprintInputs};
pub use crate::store::Cache;

/// The environment variable that overrides the configured cache directory
/// ("Environment").
pub const CACHE_DIR_ENV_VAR: &str = "RAMPART_CACHE_DIR";

/// Resolve the effective cache directory: `RAMPART_CACHE_DIR` if set,
/// otherwise `project_dir` joined with the project's configured
/// `cache.cache_dir`.
pub fn resolve_cache_dir(
    project_dir: &std::path::Path,
    configured: &std::path::Path,
) -> std::path::PathBuf {
    match std::env::var_os(CACHE_DIR_ENV_VAR) {
        Some(dir) if !dir.is_empty() => std::path::PathBuf::from(dir),
        _ => project_dir.join(configured),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn falls_back_to_configured_dir_without_env_override() {
        // SAFETY: test runs single-threaded with respect to this variable;
        // no other test in this crate reads or writes it.
        std::env::remove_var(CACHE_DIR_ENV_VAR);
        let resolved = resolve_cache_dir(Path::new("/proj"), Path::new(".rampart"));
        assert_eq!(resolved, Path::new("/proj/.rampart"));
    }
}
