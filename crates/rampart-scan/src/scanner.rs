use ruff_python_ast::{self as ast, Expr, Stmt};
use ruff_python_parser::parse_module;
use ruff_text_size::Ranged;

use rampart_config::DottedPath;

use crate::error::ScanIssue;
use crate::ignore_directive::{self, IgnoreDirective};
use crate::import::{Import, ImportKind};
use crate::line_index::LineIndex;

/// Call targets recognized as "string import" invocations:
/// `import_module("a.b.c")`, `importlib.import_module(...)`,
/// `__import__(...)`.
const STRING_IMPORT_CALLEES: &[&str] = &["import_module", "__import__"];

/// The full result of scanning one source file: every import reference in
/// source order, plus any non-fatal scan issues -- scanning is
/// failure-tolerant, so one bad file never aborts the whole run.
#[derive(Debug, Default)]
pub struct ScanResult {
    /// Imports found, in source order.
    pub imports: Vec<Import>,
    /// Non-fatal issues: unresolvable relative imports, parse failures,
    /// malformed ignore directives.
    pub issues: Vec<ScanIssue>,
}

/// Scan one source file's text.
///
/// `own_module_path` is the file's own dotted import path (derived from its
/// source-root-relative location), needed to resolve
/// relative imports. `ignore_type_checking_imports` drops imports found
/// inside a `TYPE_CHECKING`-guarded block rather than tagging and emitting
/// them. `include_string_imports` additionally scans for string-literal
/// imports. `require_ignore_reasons` turns a reason-less ignore directive
/// into a `Configuration` issue.
pub fn scan(
    source: &str,
    own_module_path: &DottedPath,
    ignore_type_checking_imports: bool,
    include_string_imports: bool,
    require_ignore_reasons: bool,
) -> ScanResult {
    let lines = LineIndex::new(source);
    let directives = ignore_directive::collect_ignore_directives(source);
    let mut result = ScanResult::default();

    for directive in &directives {
        if require_ignore_reasons && directive.reason.is_none() {
            result.issues.push(ScanIssue::new(
                directive.comment_line,
                "ignore directive is missing a required reason".to_string(),
            ));
        }
    }

    let parsed = match parse_module(source) {
        Ok(parsed) => parsed,
        Err(err) => {
            let offset: usize = err.location().start().into();
            let line = lines.line_number(offset);
            log::debug!("scan: syntax error in module '{own_module_path}' at line {line}: {err}");
            result.issues.push(ScanIssue::new(line, format!("syntax error: {err}")));
            return result;
        }
    };

    let mut walker = Walker {
        lines: &lines,
        directives: &directives,
        own_module_path,
        ignore_type_checking_imports,
        include_string_imports,
        result: &mut result,
    };
    walker.walk_body(parsed.suite(), false);

    result
}

struct Walker<'a> {
    lines: &'a LineIndex,
    directives: &'a [IgnoreDirective],
    own_module_path: &'a DottedPath,
    ignore_type_checking_imports: bool,
    include_string_imports: bool,
    result: &'a mut ScanResult,
}

impl<'a> Walker<'a> {
    fn walk_body(&mut self, body: &[Stmt], in_type_checking: bool) {
        for stmt in body {
            self.walk_stmt(stmt, in_type_checking);
        }
    }

    fn walk_stmt(&mut self, stmt: &Stmt, in_type_checking: bool) {
        match stmt {
            Stmt::Import(import) => self.emit_absolute_imports(import, in_type_checking),
            Stmt::ImportFrom(import) => self.emit_from_imports(import, in_type_checking),
            Stmt::FunctionDef(f) => self.walk_body(&f.body, in_type_checking),
            Stmt::ClassDef(c) => self.walk_body(&c.body, in_type_checking),
            Stmt::If(if_stmt) => {
                let guarded = in_type_checking || is_type_checking_guard(&if_stmt.test);
                self.walk_body(&if_stmt.body, guarded);
                for clause in &if_stmt.elif_else_clauses {
                    // Only the positive branch of a TYPE_CHECKING test is
                    // special; `else`/`elif` bodies run at import time.
                    self.walk_body(&clause.body, in_type_checking);
                }
            }
            Stmt::While(w) => {
                self.walk_body(&w.body, in_type_checking);
                self.walk_body(&w.orelse, in_type_checking);
            }
            Stmt::For(f) => {
                self.walk_body(&f.body, in_type_checking);
                self.walk_body(&f.orelse, in_type_checking);
            }
            Stmt::With(w) => self.walk_body(&w.body, in_type_checking),
            Stmt::Try(t) => {
                self.walk_body(&t.body, in_type_checking);
                for handler in &t.handlers {
                    let ast::ExceptHandler::ExceptHandler(h) = handler;
                    self.walk_body(&h.body, in_type_checking);
                }
                self.walk_body(&t.orelse, in_type_checking);
                self.walk_body(&t.finalbody, in_type_checking);
            }
            _ => {}
        }

        if self.include_string_imports {
            self.scan_string_imports(stmt, in_type_checking);
        }
    }

    fn attach_directive(&self, line: usize) -> Option<IgnoreDirective> {
        // A directive attaches to the line it trails, or the line
        // immediately before it (`IgnoreDirective`; design note: // "implement by buffering the previous non-blank line").
        self.directives
            .iter()
            .find(|d| d.comment_line == line || d.comment_line + 1 == line)
            .cloned()
    }

    fn emit_absolute_imports(&mut self, stmt: &ast::StmtImport, in_type_checking: bool) {
        let line = self.lines.line_number(stmt.range().start().into());
        if in_type_checking && self.ignore_type_checking_imports {
            return;
        }
        let kind =
            if in_type_checking { ImportKind::TypeChecking } else { ImportKind::Runtime };
        let ignore = self.attach_directive(line);
        for alias in &stmt.names {
            let module_path = DottedPath::parse(alias.name.as_str());
            let alias_path = alias.asname.as_ref().map(|a| DottedPath::parse(a.as_str()));
            self.result.imports.push(Import {
                module_path,
                line_number: line,
                kind,
                alias: alias_path,
                is_star: false,
                ignore: ignore.clone(),
            });
        }
    }

    fn emit_from_imports(&mut self, stmt: &ast::StmtImportFrom, in_type_checking: bool) {
        let line = self.lines.line_number(stmt.range().start().into());
        if in_type_checking && self.ignore_type_checking_imports {
            return;
        }
        let kind =
            if in_type_checking { ImportKind::TypeChecking } else { ImportKind::Runtime };

        let base = match self.resolve_from_base(stmt, line) {
            Some(base) => base,
            None => return,
        };

        let ignore = self.attach_directive(line);
        for alias in &stmt.names {
            if alias.name.as_str() == "*" {
                self.result.imports.push(Import {
                    module_path: base.clone(),
                    line_number: line,
                    kind,
                    alias: None,
                    is_star: true,
                    ignore: ignore.clone(),
                });
                continue;
            }
            let module_path = base.join(alias.name.as_str());
            let alias_path = alias.asname.as_ref().map(|a| DottedPath::parse(a.as_str()));
            self.result.imports.push(Import {
                module_path,
                line_number: line,
                kind,
                alias: alias_path,
                is_star: false,
                ignore: ignore.clone(),
            });
        }
    }

    /// Resolve `from X import ...` / `from .x import ...` to the dotted
    /// path the imported names hang off of. Returns `None` (after
    /// recording a `Configuration` issue) for a relative import with more
    /// leading dots than `own_module_path` has ancestors.
    fn resolve_from_base(&mut self, stmt: &ast::StmtImportFrom, line: usize) -> Option<DottedPath> {
        if stmt.level == 0 {
            let module = stmt.module.as_ref().map(|m| m.as_str()).unwrap_or_default();
            return Some(DottedPath::parse(module));
        }

        // Level 1 (`from . import x`) resolves relative to the *package*
        // containing this file, i.e. the file's own parent; each
        // additional dot climbs one more ancestor.
        let mut base = match self.own_module_path.parent() {
            Some(p) => p,
            None => {
                self.result.issues.push(ScanIssue::new(
                    line,
                    format!(
                        "relative import with {} leading dots has no enclosing package",
                        stmt.level
                    ),
                ));
                return None;
            }
        };
        for _ in 1..stmt.level {
            base = match base.parent() {
                Some(p) => p,
                None => {
                    self.result.issues.push(ScanIssue::new(
                        line,
                        format!(
                            "relative import with {} leading dots has no enclosing package",
                            stmt.level
                        ),
                    ));
                    return None;
                }
            };
        }
        if let Some(module) = &stmt.module {
            base = base.extend(&DottedPath::parse(module.as_str()));
        }
        Some(base)
    }

    fn scan_string_imports(&mut self, stmt: &Stmt, in_type_checking: bool) {
        if in_type_checking && self.ignore_type_checking_imports {
            return;
        }
        let mut calls = Vec::new();
        collect_calls_in_stmt(stmt, &mut calls);
        for call in calls {
            let Some(name) = callee_name(&call.func) else { continue };
            if !STRING_IMPORT_CALLEES.contains(&name.as_str()) {
                continue;
            }
            let Some(arg) = call.arguments.args.first() else { continue };
            let Expr::StringLiteral(lit) = arg else { continue };
            let text = lit.value.to_str();
            if !looks_like_dotted_path(text) {
                continue;
            }
            let line = self.lines.line_number(call.range().start().into());
            let ignore = self.attach_directive(line);
            self.result.imports.push(Import {
                module_path: DottedPath::parse(text),
                line_number: line,
                kind: ImportKind::String,
                alias: None,
                is_star: false,
                ignore,
            });
        }
    }
}

/// Whether `test` reads, on its leftmost operand, as a guard against the
/// `TYPE_CHECKING` sentinel: a condition whose leftmost name is the
/// language's conventional `TYPE_CHECKING` sentinel. Covers
/// `if TYPE_CHECKING:`, `if typing.TYPE_CHECKING:`, and
/// `if TYPE_CHECKING and <other>:`.
fn is_type_checking_guard(test: &Expr) -> bool {
    match test {
        Expr::Name(n) => n.id.as_str() == "TYPE_CHECKING",
        Expr::Attribute(a) => a.attr.as_str() == "TYPE_CHECKING",
        Expr::BoolOp(b) => b.values.first().is_some_and(is_type_checking_guard),
        _ => false,
    }
}

fn callee_name(func: &Expr) -> Option<String> {
    match func {
        Expr::Name(n) => Some(n.id.to_string()),
        Expr::Attribute(a) => Some(a.attr.to_string()),
        _ => None,
    }
}

fn looks_like_dotted_path(text: &str) -> bool {
    if text.is_empty() {
        return false;
    }
    text.split('.').all(|segment| {
        !segment.is_empty()
            && segment.chars().next().is_some_and(|c| c.is_alphabetic() || c == '_')
            && segment.chars().all(|c| c.is_alphanumeric() || c == '_')
    })
}

/// Collect every `Expr::Call` reachable from the directly-evaluated
/// sub-expressions of one statement (assignments, expression statements,
/// returns, and the test of a conditional). Doesn't need to be a fully
/// general expression visitor: string imports are only meaningful as the
/// right-hand side of a binding or a bare call.
fn collect_calls_in_stmt<'s>(stmt: &'s Stmt, out: &mut Vec<&'s ast::ExprCall>) {
    match stmt {
        Stmt::Expr(e) => collect_calls_in_expr(&e.value, out),
        Stmt::Assign(a) => collect_calls_in_expr(&a.value, out),
        Stmt::AnnAssign(a) => {
            if let Some(v) = &a.value {
                collect_calls_in_expr(v, out);
            }
        }
        Stmt::AugAssign(a) => collect_calls_in_expr(&a.value, out),
        Stmt::Return(r) => {
            if let Some(v) = &r.value {
                collect_calls_in_expr(v, out);
            }
        }
        _ => {}
    }
}

fn collect_calls_in_expr<'s>(expr: &'s Expr, out: &mut Vec<&'s ast::ExprCall>) {
    if let Expr::Call(call) = expr {
        out.push(call);
        for arg in &call.arguments.args {
            collect_calls_in_expr(arg, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(result: &ScanResult) -> Vec<String> {
        result.imports.iter().map(|i| i.module_path.to_string()).collect()
    }

    #[test]
    fn absolute_import() {
        let r = scan("import a.b.c\n", &DottedPath::parse("pkg.mod"), false, false, false);
        assert_eq!(paths(&r), vec!["a.b.c"]);
        assert_eq!(r.imports[0].line_number, 1);
    }

    #[test]
    fn absolute_import_with_alias() {
        let r = scan("import a.b as x\n", &DottedPath::parse("pkg.mod"), false, false, false);
        assert_eq!(r.imports[0].alias, Some(DottedPath::parse("x")));
    }

    #[test]
    fn from_import_emits_one_record_per_name() {
        let r = scan(
            "from a.b import c, d as e\n",
            &DottedPath::parse("pkg.mod"),
            false,
            false,
            false,
        );
        assert_eq!(paths(&r), vec!["a.b.c", "a.b.d"]);
        assert_eq!(r.imports[1].alias, Some(DottedPath::parse("e")));
    }

    #[test]
    fn star_import_is_opaque() {
        let r = scan("from a.b import *\n", &DottedPath::parse("pkg.mod"), false, false, false);
        assert_eq!(paths(&r), vec!["a.b"]);
        assert!(r.imports[0].is_star);
    }

    #[test]
    fn relative_import_resolves_against_own_path() {
        // pkg/sub/mod.py -> pkg.sub.mod; `from .x import y` resolves
        // relative to pkg.sub (the file's own parent package).
        let r = scan(
            "from .x import y\n",
            &DottedPath::parse("pkg.sub.mod"),
            false,
            false,
            false,
        );
        assert_eq!(paths(&r), vec!["pkg.sub.x.y"]);
    }

    #[test]
    fn relative_import_bare_dot_imports_sibling_package() {
        let r = scan("from . import y\n", &DottedPath::parse("pkg.sub.mod"), false, false, false);
        assert_eq!(paths(&r), vec!["pkg.sub.y"]);
    }

    #[test]
    fn unresolvable_relative_import_is_configuration_issue() {
        let r = scan("from .... import y\n", &DottedPath::parse("pkg.mod"), false, false, false);
        assert!(r.imports.is_empty());
        assert_eq!(r.issues.len(), 1);
    }

    #[test]
    fn relative_import_in_top_level_init_is_configuration_issue() {
        // A root `__init__.py`'s own dotted path is empty, so even a
        // single leading dot has no enclosing package to resolve against.
        let r = scan("from . import y\n", &DottedPath::empty(), false, false, false);
        assert!(r.imports.is_empty());
        assert_eq!(r.issues.len(), 1);
    }

    #[test]
    fn type_checking_block_is_dropped_when_requested() {
        let src = "from typing import TYPE_CHECKING\nif TYPE_CHECKING:\n    import a.b\n";
        let r = scan(src, &DottedPath::parse("pkg.mod"), true, false, false);
        assert!(paths(&r).iter().all(|p| p != "a.b"));
    }

    #[test]
    fn type_checking_block_is_tagged_when_kept() {
        let src = "import typing\nif typing.TYPE_CHECKING:\n    import a.b\n";
        let r = scan(src, &DottedPath::parse("pkg.mod"), false, false, false);
        let imp = r.imports.iter().find(|i| i.module_path == DottedPath::parse("a.b")).unwrap();
        assert_eq!(imp.kind, ImportKind::TypeChecking);
    }

    #[test]
    fn string_import_is_opt_in() {
        let src = "importlib.import_module(\"a.b.c\")\n";
        let without = scan(src, &DottedPath::parse("pkg.mod"), false, false, false);
        assert!(without.imports.is_empty());
        let with = scan(src, &DottedPath::parse("pkg.mod"), false, true, false);
        assert_eq!(paths(&with), vec!["a.b.c"]);
        assert_eq!(with.imports[0].kind, ImportKind::String);
    }

    #[test]
    fn parse_failure_yields_single_configuration_issue() {
        let r = scan("def (:\n", &DottedPath::parse("pkg.mod"), false, false, false);
        assert_eq!(r.issues.len(), 1);
        assert!(r.imports.is_empty());
    }

    #[test]
    fn ignore_directive_attaches_to_following_import() {
        let src = "# rampart-ignore(legacy)\nimport a.b\n";
        let r = scan(src, &DottedPath::parse("pkg.mod"), false, false, false);
        assert!(r.imports[0].ignore.is_some());
        assert_eq!(r.imports[0].ignore.as_ref().unwrap().reason.as_deref(), Some("legacy"));
    }

    #[test]
    fn ignore_directive_missing_reason_is_flagged_when_required() {
        let src = "import a.b  # rampart-ignore\n";
        let r = scan(src, &DottedPath::parse("pkg.mod"), false, false, true);
        assert_eq!(r.issues.len(), 1);
    }
}
