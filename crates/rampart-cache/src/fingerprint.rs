use std::fmt;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobSetBuilder};
use ignore::WalkBuilder;

/// A 256-bit content hash identifying one cacheable computation.
#[derive(Clone, Copy, Eq, PartialEq, Hash)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// The entry's two-hex-digit shard, used to keep any one cache
    /// directory from holding too many siblings ("Cache directory
    /// layout").
    pub fn shard(&self) -> String {
        hex(&self.0[..1])
    }

    /// The full fingerprint, rendered as lowercase hex.
    pub fn to_hex(&self) -> String {
        hex(&self.0)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", self.to_hex())
    }
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Every input that folds into a fingerprint, in a fixed, documented
/// order. The caller is responsible for resolving each
/// field to bytes; this type exists so the ordering is declared once and
/// can't drift between call sites.
pub struct FingerprintInputs {
    /// 1. The interpreter version string supplied by the caller.
    pub interpreter_version: String,
    /// 2. Every file under the source roots, hashed by its own bytes; this
    /// type sorts them by path before hashing so the result doesn't depend
    /// on directory-walk order.
    pub source_files: Vec<PathBuf>,
    /// 3. Raw bytes of the declared third-party dependency manifest (the
    /// first of `pyproject.toml`/`requirements.txt` found at the project
    /// root), standing in for "the declared third-party dependency pins".
    pub dependency_manifest: Option<Vec<u8>>,
    /// 4. Every path matched by a `cache.file_dependencies` glob, sorted.
    pub file_dependencies: Vec<PathBuf>,
    /// 5. `(name, value)` pairs for every `cache.env_dependencies` entry,
    /// value empty when the variable is unset.
    pub env_dependencies: Vec<(String, String)>,
    /// 6. The caller-supplied action label (e.g. the `test` subcommand's
    /// action name).
    pub action: String,
}

impl FingerprintInputs {
    /// Resolve `cache.file_dependencies` glob patterns against `project_dir`
    /// into a sorted, deduplicated file list (input 4). Patterns
    /// are matched against the forward-slash path relative to
    /// `project_dir`, exactly as `rampart-config`'s `exclude` patterns are.
    pub fn resolve_file_dependencies(project_dir: &Path, patterns: &[String]) -> Vec<PathBuf> {
        if patterns.is_empty() {
            return Vec::new();
        }
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            match Glob::new(pattern) {
                Ok(glob) => {
                    builder.add(glob);
                }
                Err(err) => log::warn!("cache: invalid file_dependencies pattern '{pattern}': {err}"),
            }
        }
        let Ok(set) = builder.build() else { return Vec::new() };

        let mut matches: Vec<PathBuf> = Vec::new();
        let walk = WalkBuilder::new()
            .add(project_dir)
            .default_excludes(false)
            .follow_links(false)
            .build();
        let Ok(walk) = walk else { return Vec::new() };
        for entry in walk.filter_map(Result::ok) {
            if !entry.is_file() {
                continue;
            }
            let rel = entry.path().strip_prefix(project_dir).unwrap_or(entry.path());
            if set.is_match(globset::normalize_to_forward_slash(rel)) {
                matches.push(entry.path().to_path_buf());
            }
        }
        matches.sort();
        matches
    }

    /// Read each `cache.env_dependencies` variable, recording an empty
    /// string for any that is unset -- an unset variable must still
    /// participate in the fingerprint, not be skipped, or a variable going
    /// from unset to unset-with-a-different-name would be invisible.
    pub fn read_env_dependencies(names: &[String]) -> Vec<(String, String)> {
        names
            .iter()
            .map(|name| (name.clone(), std::env::var(name).unwrap_or_default()))
            .collect()
    }
}

/// Compute the fingerprint for `inputs`. Hashing is order
/// sensitive by design: callers must present already-sorted file lists
/// (see `resolve_file_dependencies`) so that two runs over an unchanged
/// tree produce an identical fingerprint regardless of filesystem
/// iteration order.
pub fn compute(inputs: &FingerprintInputs) -> Fingerprint {
    let mut hasher = blake3::Hasher::new();

    hasher.update(inputs.interpreter_version.as_bytes());
    hasher.update(b"\0");

    let mut sorted_sources = inputs.source_files.clone();
    sorted_sources.sort();
    for path in &sorted_sources {
        hasher.update(path.to_string_lossy().as_bytes());
        match std::fs::read(path) {
            Ok(bytes) => {
                hasher.update(&bytes);
            }
            Err(err) => {
                log::debug!("cache: could not read source file {}: {err}", path.display());
            }
        }
        hasher.update(b"\0");
    }

    if let Some(manifest) = &inputs.dependency_manifest {
        hasher.update(manifest);
    }
    hasher.update(b"\0");

    for path in &inputs.file_dependencies {
        hasher.update(path.to_string_lossy().as_bytes());
        if let Ok(bytes) = std::fs::read(path) {
            hasher.update(&bytes);
        }
        hasher.update(b"\0");
    }

    for (name, value) in &inputs.env_dependencies {
        hasher.update(name.as_bytes());
        hasher.update(b"=");
        hasher.update(value.as_bytes());
        hasher.update(b"\0");
    }

    hasher.update(inputs.action.as_bytes());

    Fingerprint(*hasher.finalize().as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_inputs() -> FingerprintInputs {
        FingerprintInputs {
            interpreter_version: "3.11.4".to_string(),
            source_files: Vec::new(),
            dependency_manifest: None,
            file_dependencies: Vec::new(),
            env_dependencies: Vec::new(),
            action: "test".to_string(),
        }
    }

    #[test]
    fn same_inputs_produce_same_fingerprint() {
        let a = compute(&base_inputs());
        let b = compute(&base_inputs());
        assert_eq!(a, b);
    }

    #[test]
    fn different_action_changes_fingerprint() {
        let mut other = base_inputs();
        other.action = "lint".to_string();
        assert_ne!(compute(&base_inputs()), compute(&other));
    }

    #[test]
    fn different_env_value_changes_fingerprint() {
        let mut other = base_inputs();
        other.env_dependencies.push(("FOO".to_string(), "1".to_string()));
        let mut base = base_inputs();
        base.env_dependencies.push(("FOO".to_string(), "2".to_string()));
        assert_ne!(compute(&base), compute(&other));
    }

    #[test]
    fn source_file_content_change_changes_fingerprint() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.py");
        std::fs::write(&file, "x = 1").unwrap();

        let mut inputs = base_inputs();
        inputs.source_files = vec![file.clone()];
        let before = compute(&inputs);

        std::fs::write(&file, "x = 2").unwrap();
        let after = compute(&inputs);

        assert_ne!(before, after);
    }

    #[test]
    fn resolve_file_dependencies_matches_glob_under_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("lock.json"), "{}").unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("sub/other.txt"), "x").unwrap();

        let matches =
            FingerprintInputs::resolve_file_dependencies(dir.path(), &["*.json".to_string()]);
        assert_eq!(matches, vec![dir.path().join("lock.json")]);
    }
}
