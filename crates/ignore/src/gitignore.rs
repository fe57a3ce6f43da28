use std::fs;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobMatcher};

/// A single parsed `.gitignore` rule.
#[derive(Debug)]
struct Rule {
    is_negation: bool,
    /// Whether the pattern ended in `/` (`foo/`): it may only match `foo`
    /// itself when `foo` is a directory, never a plain file of that name.
    dir_only: bool,
    whole_dir: GlobMatcher,
    contents: GlobMatcher,
}

/// A compiled set of `.gitignore` rules rooted at one directory.
///
/// Patterns are evaluated in file order with later rules able to
/// re-include (`!pattern`) what an earlier rule excluded, matching real
/// gitignore semantics.
#[derive(Debug, Default)]
pub struct Gitignore {
    root: PathBuf,
    rules: Vec<Rule>,
}

impl Gitignore {
    /// An empty set of rules that never matches.
    pub fn empty(root: impl Into<PathBuf>) -> Gitignore {
        Gitignore { root: root.into(), rules: Vec::new() }
    }

    /// Parse the `.gitignore` file at `path`, whose containing directory is
    /// `root` (patterns are resolved relative to it).
    pub fn from_file(root: &Path, path: &Path) -> std::io::Result<Gitignore> {
        let contents = fs::read_to_string(path)?;
        Ok(Gitignore::from_str(root, &contents))
    }

    /// Parse gitignore rule text directly, useful for tests and for the
    /// project-root `exclude` list, which shares this same rule grammar.
    pub fn from_str(root: &Path, contents: &str) -> Gitignore {
        let mut rules = Vec::new();
        for raw_line in contents.lines() {
            if let Some(rule) = parse_line(raw_line) {
                rules.push(rule);
            }
        }
        Gitignore { root: root.to_path_buf(), rules }
    }

    /// The directory this rule set is rooted at.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether `path` (absolute, or relative to the process cwd) is ignored
    /// by this rule set. `is_dir` controls whether directory-only (`foo/`)
    /// patterns apply.
    pub fn matched(&self, path: &str, is_dir: bool) -> Match {
        let mut result = Match::None;
        for rule in &self.rules {
            let whole_dir_hit =
                rule.whole_dir.is_match(path) && (!rule.dir_only || is_dir);
            let hit = whole_dir_hit
                || (is_dir && rule.contents.is_match(&format!("{path}/_")))
                || rule.contents.is_match(path);
            if hit {
                result = if rule.is_negation {
                    Match::Whitelist
                } else {
                    Match::Ignore
                };
            }
        }
        result
    }
}

/// The outcome of matching a path against a `Gitignore`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Match {
    /// No rule applied.
    None,
    /// A rule excludes this path.
    Ignore,
    /// A later negation rule re-includes this path.
    Whitelist,
}

impl Match {
    /// Whether this outcome means the path should be skipped.
    pub fn is_ignore(&self) -> bool {
        matches!(self, Match::Ignore)
    }
}

fn parse_line(raw_line: &str) -> Option<Rule> {
    let line = raw_line.trim_end();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    let (line, is_negation) = match line.strip_prefix('!') {
        Some(rest) => (rest, true),
        None => (line, false),
    };
    if line.is_empty() {
        return None;
    }

    let dir_only = line.ends_with('/');
    let mut pat = line.trim_end_matches('/').to_string();
    if pat.is_empty() {
        return None;
    }

    let anchored = pat.starts_with('/') || pat[1..].contains('/');
    if let Some(stripped) = pat.strip_prefix('/') {
        pat = stripped.to_string();
    }

    let whole_expr = if anchored { pat.clone() } else { format!("**/{pat}") };
    let contents_expr = if anchored {
        format!("{pat}/**")
    } else {
        format!("**/{pat}/**")
    };

    let whole_dir = Glob::new(&whole_expr).ok()?.compile_matcher();
    let contents = Glob::new(&contents_expr).ok()?.compile_matcher();
    Some(Rule { is_negation, dir_only, whole_dir, contents })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn ignore(rules: &str, path: &str) -> bool {
        Gitignore::from_str(Path::new("."), rules)
            .matched(path, false)
            .is_ignore()
    }

    #[test]
    fn simple_pattern() {
        assert!(ignore("*.pyc", "foo.pyc"));
        assert!(ignore("*.pyc", "a/b/foo.pyc"));
        assert!(!ignore("*.pyc", "foo.py"));
    }

    #[test]
    fn anchored_pattern() {
        assert!(ignore("/build", "build"));
        assert!(!ignore("/build", "a/build"));
    }

    #[test]
    fn directory_contents() {
        assert!(ignore("__pycache__/", "__pycache__/foo.pyc"));
    }

    #[test]
    fn directory_only_pattern_does_not_match_a_plain_file_of_the_same_name() {
        let rules = "build/";
        assert!(!Gitignore::from_str(Path::new("."), rules).matched("build", false).is_ignore());
        assert!(Gitignore::from_str(Path::new("."), rules).matched("build", true).is_ignore());
    }

    #[test]
    fn negation_reincludes() {
        let rules = "*.log\n!keep.log\n";
        assert!(ignore(rules, "debug.log"));
        assert!(!ignore(rules, "keep.log"));
    }
}
