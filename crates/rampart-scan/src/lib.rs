/*!
The import scanner: given one source file's bytes and the project's
`ignore_type_checking_imports` / `include_string_imports` flags, produces
the full list of `Import` records in source order, tolerating parse
failures in the one file that hit them.

Parsing itself is delegated to `ruff_python_parser`/`ruff_python_ast` --
the same real AST the target language's own tooling ecosystem uses --
rather than a hand-rolled tokenizer; this crate's own work is walking that
AST for import statements and type-checking guards, resolving relative
imports against a file's own dotted path, and recovering the inline ignore
directives and string-import calls the AST itself doesn't preserve.
*/

#![deny(missing_docs)]

mod error;
mod ignore_directive;
mod import;
mod line_index;
mod scanner;

pub use crate::error::ScanIssue;
pub use crate::ignore_directive::{parse_directive, IgnoreDirective, IGNORE_KEYWORD};
pub use crate::import::{Import, ImportKind};
pub use crate::line_index::LineIndex;
pub use crate::scanner::{scan, ScanResult};
