use rampart_config::DottedPath;

use crate::ignore_directive::IgnoreDirective;

/// How an import statement was reached (`Import.kind`).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ImportKind {
    /// An ordinary, unconditional import.
    Runtime,
    /// Sits inside a block guarded by the `TYPE_CHECKING` sentinel.
    TypeChecking,
    /// A string literal passed to `import_module`/`__import__`, only
    /// emitted when `include_string_imports` is set.
    String,
}

/// One import reference extracted from a source file (`Import`).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Import {
    /// The dotted path being imported.
    pub module_path: DottedPath,
    /// 1-based source line the import statement starts on.
    pub line_number: usize,
    /// Where this import sits (top-level runtime, type-checking-gated, or a
    /// string literal).
    pub kind: ImportKind,
    /// The local name bound by the import, if different from the
    /// convention (`import a.b.c` binds `a`, unless `as x` is present, in
    /// which case it binds `x` and `alias` names the full target).
    pub alias: Option<DottedPath>,
    /// Whether this import is a star-import (`from a.b import *`):
    /// `module_path` names the target module itself, and the checker must
    /// treat this as importing the union of the target's exposed symbols.
    pub is_star: bool,
    /// The ignore directive attached to this import's line, if any.
    /// Suppression itself happens in the checker, which alone knows
    /// whether a diagnostic would have fired for this import.
    pub ignore: Option<IgnoreDirective>,
}

impl Import {
    /// The name this import binds into the importing file's namespace: the
    /// alias if one is given, otherwise the import's own path (or, for a
    /// plain `import a.b.c`, its first segment).
    pub fn bound_name(&self) -> DottedPath {
        self.alias.clone().unwrap_or_else(|| self.module_path.clone())
    }
}
