#![deny(missing_docs)]

//! The module resolver: turns a `ProjectConfig`'s declared modules into
//! a queryable trie, combines it with an external-package index built from
//! the project's dependency manifest, and answers "what does this dotted
//! import path resolve to" for the checker.

mod error;
mod external;
mod interface_index;
mod resolver;
mod tree;

pub use error::ResolveError;
pub use external::ExternalIndex;
pub use interface_index::InterfaceIndex;
pub use resolver::{Resolution, Resolver};
