use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crossbeam_deque::{Injector, Steal, Stealer, Worker};
use globset::{Glob, GlobSet, GlobSetBuilder};
use same_file::Handle;

use crate::default_excludes::DEFAULT_EXCLUDES;
use crate::gitignore::Gitignore;

/// An error produced while walking a directory tree.
#[derive(Debug)]
pub enum Error {
    /// An I/O error reading a directory or following a symlink.
    Io { path: PathBuf, err: std::io::Error },
    /// An exclude pattern failed to compile.
    BadGlob { pattern: String, err: globset::Error },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io { path, err } => {
                write!(f, "{}: {}", path.display(), err)
            }
            Error::BadGlob { pattern, err } => {
                write!(f, "invalid exclude pattern '{pattern}': {err}")
            }
        }
    }
}

impl std::error::Error for Error {}

/// A single yielded directory entry.
#[derive(Clone, Debug)]
pub struct DirEntry {
    path: PathBuf,
    depth: usize,
    file_type: FileKind,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum FileKind {
    File,
    Dir,
    Other,
}

impl DirEntry {
    /// The entry's path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Depth relative to the source root that was being walked, with the
    /// root itself at depth 0.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Whether this entry is a regular file.
    pub fn is_file(&self) -> bool {
        self.file_type == FileKind::File
    }

    /// Whether this entry is a directory.
    pub fn is_dir(&self) -> bool {
        self.file_type == FileKind::Dir
    }
}

/// Controls how a `WalkParallel` visitor directs further traversal.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum WalkState {
    /// Keep walking.
    Continue,
    /// Stop walking entirely, as soon as every in-flight directory read
    /// finishes ("the in-flight batch finishes... before exit").
    Quit,
}

/// Shared, immutable configuration for a walk: source roots, exclude globs,
/// and whether to additionally honor `.gitignore` files.
#[derive(Clone)]
struct WalkConfig {
    excludes: GlobSet,
    respect_gitignore: bool,
    follow_links: bool,
    source_suffixes: Vec<String>,
}

impl WalkConfig {
    fn is_source_file(&self, path: &Path) -> bool {
        if self.source_suffixes.is_empty() {
            return true;
        }
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => {
                self.source_suffixes.iter().any(|s| s.trim_start_matches('.') == ext)
            }
            None => false,
        }
    }
}

/// Builds a `Walk` or `WalkParallel` over one or more source roots.
pub struct WalkBuilder {
    roots: Vec<PathBuf>,
    exclude_patterns: Vec<String>,
    use_default_excludes: bool,
    respect_gitignore: bool,
    follow_links: bool,
    threads: usize,
    source_suffixes: Vec<String>,
}

impl WalkBuilder {
    /// Start a builder with no roots configured. At least one root must be
    /// added via `add` before `build`/`build_parallel`.
    pub fn new() -> WalkBuilder {
        WalkBuilder {
            roots: Vec::new(),
            exclude_patterns: Vec::new(),
            use_default_excludes: true,
            respect_gitignore: false,
            follow_links: true,
            threads: 1,
            source_suffixes: Vec::new(),
        }
    }

    /// Add a source root to walk.
    pub fn add(&mut self, root: impl Into<PathBuf>) -> &mut WalkBuilder {
        self.roots.push(root.into());
        self
    }

    /// Add a user exclude glob pattern.
    pub fn exclude(&mut self, pattern: impl Into<String>) -> &mut WalkBuilder {
        self.exclude_patterns.push(pattern.into());
        self
    }

    /// Whether to add the built-in default excludes (compiled-artifact
    /// directories, virtual environments, ...) on top of user excludes.
    /// Enabled by default.
    pub fn default_excludes(&mut self, yes: bool) -> &mut WalkBuilder {
        self.use_default_excludes = yes;
        self
    }

    /// Whether to additionally honor `.gitignore` files found while
    /// walking.
    pub fn respect_gitignore(&mut self, yes: bool) -> &mut WalkBuilder {
        self.respect_gitignore = yes;
        self
    }

    /// Whether to follow symbolic links. Cycles are guarded against with an
    /// inode-identity set regardless of this setting.
    pub fn follow_links(&mut self, yes: bool) -> &mut WalkBuilder {
        self.follow_links = yes;
        self
    }

    /// Number of worker threads `build_parallel` should use.
    pub fn threads(&mut self, n: usize) -> &mut WalkBuilder {
        self.threads = n.max(1);
        self
    }

    /// Restrict yielded files to the given filename suffixes (without the
    /// dot, e.g. `"py"`). Empty means "every regular file".
    pub fn source_suffixes<I, S>(&mut self, suffixes: I) -> &mut WalkBuilder
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.source_suffixes = suffixes.into_iter().map(Into::into).collect();
        self
    }

    fn config(&self) -> Result<WalkConfig, Error> {
        let mut builder = GlobSetBuilder::new();
        if self.use_default_excludes {
            for pat in DEFAULT_EXCLUDES {
                builder.add(Glob::new(pat).map_err(|err| Error::BadGlob {
                    pattern: (*pat).to_string(),
                    err,
                })?);
            }
        }
        for pat in &self.exclude_patterns {
            builder.add(Glob::new(pat).map_err(|err| Error::BadGlob {
                pattern: pat.clone(),
                err,
            })?);
        }
        let excludes = builder.build().map_err(|err| Error::BadGlob {
            pattern: String::new(),
            err,
        })?;
        Ok(WalkConfig {
            excludes,
            respect_gitignore: self.respect_gitignore,
            follow_links: self.follow_links,
            source_suffixes: self.source_suffixes.clone(),
        })
    }

    /// Build a single-threaded, deterministic iterator.
    pub fn build(&self) -> Result<Walk, Error> {
        let config = Arc::new(self.config()?);
        Ok(Walk {
            config,
            pending: self.roots.iter().rev().cloned().map(|p| (p, 0)).collect(),
            stack: Vec::new(),
            seen: HashSet::new(),
            gitignores: Vec::new(),
        })
    }

    /// Build a multi-threaded walker. Order across files is not
    /// deterministic; callers that need stable ordering should use
    /// `build()` and sort.
    pub fn build_parallel(&self) -> WalkParallel {
        WalkParallel {
            roots: self.roots.clone(),
            config: self.config().unwrap_or_else(|_| WalkConfig {
                excludes: GlobSet::empty(),
                respect_gitignore: self.respect_gitignore,
                follow_links: self.follow_links,
                source_suffixes: self.source_suffixes.clone(),
            }),
            threads: self.threads,
        }
    }
}

impl Default for WalkBuilder {
    fn default() -> WalkBuilder {
        WalkBuilder::new()
    }
}

/// Relative path (forward-slash, from the originating root) used purely to
/// test against exclude globs.
fn candidate_for(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    globset::normalize_to_forward_slash(rel)
}

fn should_descend(
    config: &WalkConfig,
    gitignores: &[Gitignore],
    root: &Path,
    path: &Path,
    is_dir: bool,
) -> bool {
    let candidate = candidate_for(root, path);
    if !candidate.is_empty() && config.excludes.is_match(&candidate) {
        return false;
    }
    if config.respect_gitignore {
        for gi in gitignores {
            if gi.matched(&candidate, is_dir).is_ignore() {
                return false;
            }
        }
    }
    true
}

/// One directory entry reduced to what the walker needs downstream: its
/// path and file type, read once up front so the DFS stack never has to
/// re-query the filesystem for bookkeeping.
struct Entry {
    path: PathBuf,
    file_type: fs::FileType,
}

fn read_sorted_entries(dir: &Path) -> std::io::Result<Vec<Entry>> {
    let mut raw: Vec<fs::DirEntry> =
        fs::read_dir(dir)?.filter_map(|e| e.ok()).collect();
    raw.sort_by_key(|e| e.file_name());
    let mut entries = Vec::with_capacity(raw.len());
    for e in raw {
        let file_type = e.file_type()?;
        entries.push(Entry { path: e.path(), file_type });
    }
    Ok(entries)
}

/// A single-threaded, deterministic depth-first walker.
pub struct Walk {
    config: Arc<WalkConfig>,
    /// Roots still to start, each paired with the gitignore-stack depth at
    /// which it began (always 0 for a fresh root).
    pending: Vec<(PathBuf, usize)>,
    /// Explicit DFS stack: (root, dir path, sorted entries, next index).
    stack: Vec<(PathBuf, PathBuf, Vec<Entry>, usize)>,
    seen: HashSet<(PathBuf, InodeKey)>,
    gitignores: Vec<Gitignore>,
}

/// A best-effort, cross-platform file identity used to guard against
/// symlink cycles.
#[derive(Clone, Eq, PartialEq, Hash)]
struct InodeKey(u64);

fn inode_key(path: &Path) -> Option<InodeKey> {
    let handle = Handle::from_path(path).ok()?;
    // `Handle` doesn't expose a stable hashable key portably, so we hash its
    // debug representation, which includes the platform file identity.
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};
    let mut hasher = DefaultHasher::new();
    format!("{handle:?}").hash(&mut hasher);
    Some(InodeKey(hasher.finish()))
}

impl Iterator for Walk {
    type Item = Result<DirEntry, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((root, dir, entries, idx)) = self.stack.last_mut() {
                if *idx >= entries.len() {
                    self.stack.pop();
                    continue;
                }
                let path = entries[*idx].path.clone();
                let file_type = entries[*idx].file_type;
                *idx += 1;

                let is_symlink = file_type.is_symlink();
                let is_dir = if is_symlink {
                    if !self.config.follow_links {
                        continue;
                    }
                    match fs::metadata(&path) {
                        Ok(meta) => meta.is_dir(),
                        Err(_) => continue,
                    }
                } else {
                    file_type.is_dir()
                };

                if !should_descend(
                    &self.config,
                    &self.gitignores,
                    root,
                    &path,
                    is_dir,
                ) {
                    continue;
                }

                if is_dir {
                    if is_symlink {
                        if let Some(key) = inode_key(&path) {
                            if !self.seen.insert((root.clone(), key)) {
                                continue;
                            }
                        }
                    }
                    if self.config.respect_gitignore {
                        let gi_path = path.join(".gitignore");
                        if gi_path.is_file() {
                            if let Ok(gi) = Gitignore::from_file(&path, &gi_path)
                            {
                                self.gitignores.push(gi);
                            }
                        }
                    }
                    let depth = self.stack.len();
                    match read_sorted_entries(&path) {
                        Ok(sub) => {
                            self.stack.push((root.clone(), path.clone(), sub, 0));
                            return Some(Ok(DirEntry {
                                path,
                                depth: depth + 1,
                                file_type: FileKind::Dir,
                            }));
                        }
                        Err(err) => return Some(Err(Error::Io { path, err })),
                    }
                } else if file_type.is_file() {
                    if !self.config.is_source_file(&path) {
                        continue;
                    }
                    let depth = self.stack.len();
                    return Some(Ok(DirEntry {
                        path,
                        depth,
                        file_type: FileKind::File,
                    }));
                }
                continue;
            }

            // Stack is empty: start the next pending root.
            let (root, _) = self.pending.pop()?;
            match read_sorted_entries(&root) {
                Ok(entries) => {
                    self.stack.push((root.clone(), root.clone(), entries, 0));
                }
                Err(err) => return Some(Err(Error::Io { path: root, err })),
            }
        }
    }
}

/// A multi-threaded walker built via `WalkBuilder::build_parallel`.
pub struct WalkParallel {
    roots: Vec<PathBuf>,
    config: WalkConfig,
    threads: usize,
}

impl WalkParallel {
    /// Run the walk, invoking `mk_visitor` once per worker thread to build a
    /// per-thread visitor closure. Mirrors ripgrep's own parallel walker
    /// API: each visitor receives one `Result<DirEntry, Error>` at a time
    /// and returns a `WalkState` to direct whether the walk should
    /// continue.
    pub fn run<'s>(
        self,
        mut mk_visitor: impl FnMut() -> Box<
            dyn FnMut(Result<DirEntry, Error>) -> WalkState + Send + 's,
        >,
    ) {
        let injector: Injector<(PathBuf, PathBuf)> = Injector::new();
        for root in &self.roots {
            injector.push((root.clone(), root.clone()));
        }
        let config = Arc::new(self.config);
        let quit = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let injector = Arc::new(injector);

        std::thread::scope(|scope| {
            let workers: Vec<Worker<(PathBuf, PathBuf)>> =
                (0..self.threads).map(|_| Worker::new_fifo()).collect();
            let stealers: Vec<Stealer<(PathBuf, PathBuf)>> =
                workers.iter().map(|w| w.stealer()).collect();

            for worker in workers {
                let injector = Arc::clone(&injector);
                let stealers = stealers.clone();
                let config = Arc::clone(&config);
                let quit = Arc::clone(&quit);
                let mut visitor = mk_visitor();
                scope.spawn(move || {
                    loop {
                        if quit.load(std::sync::atomic::Ordering::SeqCst) {
                            break;
                        }
                        let task = worker.pop().or_else(|| {
                            std::iter::repeat_with(|| {
                                injector
                                    .steal_batch_and_pop(&worker)
                                    .or_else(|| {
                                        stealers
                                            .iter()
                                            .map(|s| s.steal())
                                            .find(|s| !s.is_retry())
                                            .unwrap_or(Steal::Empty)
                                    })
                            })
                            .find(|s| !s.is_retry())
                            .and_then(|s| s.success())
                        });
                        let Some((root, dir)) = task else {
                            if injector.is_empty() {
                                break;
                            }
                            continue;
                        };
                        let entries = match read_sorted_entries(&dir) {
                            Ok(e) => e,
                            Err(err) => {
                                if visitor(Err(Error::Io { path: dir, err }))
                                    == WalkState::Quit
                                {
                                    quit.store(
                                        true,
                                        std::sync::atomic::Ordering::SeqCst,
                                    );
                                    break;
                                }
                                continue;
                            }
                        };
                        for entry in entries {
                            let path = entry.path();
                            let file_type = match entry.file_type() {
                                Ok(ft) => ft,
                                Err(_) => continue,
                            };
                            let is_dir = file_type.is_dir()
                                || (file_type.is_symlink()
                                    && config.follow_links
                                    && fs::metadata(&path)
                                        .map(|m| m.is_dir())
                                        .unwrap_or(false));
                            if !should_descend(&config, &[], &root, &path, is_dir)
                            {
                                continue;
                            }
                            if is_dir {
                                worker.push((root.clone(), path));
                            } else if file_type.is_file()
                                && config.is_source_file(&path)
                            {
                                let state = visitor(Ok(DirEntry {
                                    path,
                                    depth: 0,
                                    file_type: FileKind::File,
                                }));
                                if state == WalkState::Quit {
                                    quit.store(
                                        true,
                                        std::sync::atomic::Ordering::SeqCst,
                                    );
                                    break;
                                }
                            }
                        }
                    }
                });
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"").unwrap();
    }

    #[test]
    fn walks_in_sorted_order_and_skips_excludes() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("b.py"));
        touch(&dir.path().join("a.py"));
        touch(&dir.path().join("__pycache__/x.pyc"));

        let walker = WalkBuilder::new()
            .add(dir.path())
            .source_suffixes(["py"])
            .build()
            .unwrap();

        let files: Vec<PathBuf> = walker
            .filter_map(|r| r.ok())
            .filter(|e| e.is_file())
            .map(|e| e.path().to_path_buf())
            .collect();

        assert_eq!(
            files,
            vec![dir.path().join("a.py"), dir.path().join("b.py")]
        );
    }

    #[test]
    fn user_exclude_prevents_descent() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("keep/a.py"));
        touch(&dir.path().join("skip/a.py"));

        let walker = WalkBuilder::new()
            .add(dir.path())
            .exclude("**/skip")
            .source_suffixes(["py"])
            .build()
            .unwrap();

        let files: Vec<PathBuf> = walker
            .filter_map(|r| r.ok())
            .filter(|e| e.is_file())
            .map(|e| e.path().to_path_buf())
            .collect();

        assert_eq!(files, vec![dir.path().join("keep/a.py")]);
    }
}
