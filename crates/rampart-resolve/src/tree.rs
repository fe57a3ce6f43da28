use std::collections::HashMap;

use rampart_config::{DottedPath, ModuleConfig};

/// One node of the module trie: a segment, an optional config if a module
/// was declared at exactly this path, and its children.
#[derive(Debug, Default)]
struct ModuleNode {
    config: Option<ModuleConfig>,
    children: HashMap<String, ModuleNode>,
}

/// A trie keyed by dotted-path segment, each node optionally carrying a
/// `ModuleConfig` (`ModuleTree`). `find_nearest` is the single
/// operation pervasively used to answer "which declared module owns this
/// dotted path" -- both for the file doing the importing and for the
/// thing being imported.
#[derive(Debug, Default)]
pub struct ModuleTree {
    root: ModuleNode,
    /// The `<root>` sentinel module, if declared, kept separate from the
    /// segment trie since it owns everything the trie itself doesn't
    /// match ("the sentinel `<root>` denotes the catch-all
    /// module for code outside every declared module").
    root_module: Option<ModuleConfig>,
}

impl ModuleTree {
    /// Insert every declared module. Duplicate paths are rejected by
    /// `rampart_config::validate` before this is ever called, so insertion
    /// here is infallible.
    pub fn build(modules: &[ModuleConfig]) -> ModuleTree {
        let mut tree = ModuleTree::default();
        for module in modules {
            if module.is_root() {
                tree.root_module = Some(module.clone());
                continue;
            }
            let mut node = &mut tree.root;
            for segment in module.path.segments() {
                node = node.children.entry(segment.clone()).or_default();
            }
            node.config = Some(module.clone());
        }
        tree
    }

    /// The `<root>` module config, if one was declared.
    pub fn root_module(&self) -> Option<&ModuleConfig> {
        self.root_module.as_ref()
    }

    /// The nearest ancestor module owning `path`: the module declared at
    /// the longest prefix of `path`'s segments that has a config attached.
    /// Returns `None` if no declared module is an ancestor of (or equal
    /// to) `path` -- the caller then falls back to the `<root>` sentinel
    /// or external resolution.
    pub fn find_nearest(&self, path: &DottedPath) -> Option<&ModuleConfig> {
        let mut node = &self.root;
        let mut nearest: Option<&ModuleConfig> = None;
        for segment in path.segments() {
            match node.children.get(segment) {
                Some(child) => {
                    node = child;
                    if node.config.is_some() {
                        nearest = node.config.as_ref();
                    }
                }
                None => break,
            }
        }
        nearest
    }

    /// Whether `path` names a module declared exactly (not just owned via
    /// ancestry).
    pub fn is_exact_module(&self, path: &DottedPath) -> bool {
        self.find_nearest(path).is_some_and(|m| &m.path == path)
    }
}
