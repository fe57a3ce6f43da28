use std::path::{Path, PathBuf};

use crate::envelope::CacheEntry;
use crate::error::CacheError;
use crate::fingerprint::Fingerprint;

/// An on-disk, content-addressed store for `CacheEntry` values, keyed by
/// `Fingerprint` ("Storage"). Default location is `.rampart`
/// relative to the project root; overridable by `RAMPART_CACHE_DIR` or the
/// project's `cache.cache_dir` (the caller resolves which wins before
/// constructing a `Cache`).
#[derive(Clone, Debug)]
pub struct Cache {
    root: PathBuf,
}

impl Cache {
    /// Open a store rooted at `root`. Doesn't touch the filesystem -- the
    /// directory is created lazily on first write.
    pub fn new(root: impl Into<PathBuf>) -> Cache {
        Cache { root: root.into() }
    }

    /// The store's root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<cache_root>/<first-two-hex-of-fingerprint>/<fingerprint>`.
    pub fn entry_path(&self, fingerprint: &Fingerprint) -> PathBuf {
        self.root.join(fingerprint.shard()).join(fingerprint.to_hex())
    }

    /// Look up `fingerprint`. A missing file, an unreadable file, or an
    /// envelope with an unrecognized version byte all come back as `Ok(None)`
    /// -- only a genuine I/O failure other than "not found" is an `Err`
    /// (unknown envelope versions "must... be treated as misses").
    pub fn get(&self, fingerprint: &Fingerprint) -> Result<Option<CacheEntry>, CacheError> {
        let path = self.entry_path(fingerprint);
        match std::fs::read(&path) {
            Ok(bytes) => Ok(CacheEntry::decode(&bytes)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(CacheError::Read { path, source }),
        }
    }

    /// Store `entry` under `fingerprint`. Writes to a temporary file in the
    /// same shard directory, then renames it into place, so concurrent
    /// readers always see either a complete old entry or a complete new one
    /// Writes are atomic: a temp file is written then renamed into place.
    pub fn put(&self, fingerprint: &Fingerprint, entry: &CacheEntry) -> Result<(), CacheError> {
        let path = self.entry_path(fingerprint);
        let dir = path.parent().expect("entry_path always has a shard parent");
        std::fs::create_dir_all(dir)
            .map_err(|source| CacheError::CreateDir { path: dir.to_path_buf(), source })?;

        let mut staged = tempfile::NamedTempFile::new_in(dir)
            .map_err(|source| CacheError::Write { path: path.clone(), source })?;
        {
            use std::io::Write as _;
            staged
                .write_all(&entry.encode())
                .map_err(|source| CacheError::Write { path: path.clone(), source })?;
        }
        staged
            .persist(&path)
            .map_err(|err| CacheError::Persist { path: path.clone(), source: err.error })?;
        Ok(())
    }

    /// Remove the entire cache directory ("The cache is never
    /// pruned automatically; `clean` removes the whole directory.").
    pub fn clean(&self) -> Result<(), CacheError> {
        match std::fs::remove_dir_all(&self.root) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(CacheError::Clean { path: self.root.clone(), source }),
        }
    }
}
