/*!
`ignore` walks a directory tree and yields candidate source files, honoring
compiled exclude globs and, optionally, `.gitignore` rules. This
implements the file-discovery component of the boundary checker: it
never descends into an excluded directory, so no traversal cost is paid for
trees the caller doesn't care about, and its output order is deterministic
(lexicographic per directory) so that diagnostics stay stable across runs.
*/

#![deny(missing_docs)]

mod default_excludes;
mod gitignore;
mod walk;

pub use crate::default_excludes::DEFAULT_EXCLUDES;
pub use crate::gitignore::{Gitignore, Match};
pub use crate::walk::{
    DirEntry, Error, Walk, WalkBuilder, WalkParallel, WalkState,
};
