use std::collections::{HashMap, HashSet};
use std::path::Path;

/// A conservative list of target-language standard-library top-level
/// module names. Not tied to a single interpreter version -- ideally this
/// would vary by the target language version, but the
/// checker's external/internal distinction only needs "is this name ever
/// plausibly stdlib", so one list covering the modern common case is
/// enough; anything genuinely version-gated still resolves correctly
/// because it falls through to the project's declared manifest or the
/// `Unknown` fallback rather than a wrong `Internal` hit.
const STDLIB_MODULES: &[&str] = &[
    "abc", "argparse", "array", "ast", "asyncio", "base64", "bisect",
    "builtins", "calendar", "collections", "concurrent", "configparser",
    "contextlib", "copy", "csv", "ctypes", "dataclasses", "datetime",
    "decimal", "difflib", "dis", "email", "enum", "errno", "functools",
    "gc", "getpass", "glob", "gzip", "hashlib", "heapq", "hmac", "html",
    "http", "importlib", "inspect", "io", "ipaddress", "itertools", "json",
    "keyword", "logging", "math", "mimetypes", "multiprocessing", "numbers",
    "operator", "os", "pathlib", "pickle", "platform", "pprint", "queue",
    "random", "re", "sched", "secrets", "select", "shelve", "shlex",
    "shutil", "signal", "site", "socket", "sqlite3", "ssl", "stat",
    "statistics", "string", "struct", "subprocess", "sys", "sysconfig",
    "tarfile", "tempfile", "textwrap", "threading", "time", "timeit",
    "tkinter", "token", "tokenize", "trace", "traceback", "types",
    "typing", "unicodedata", "unittest", "urllib", "uuid", "venv",
    "warnings", "weakref", "xml", "xmlrpc", "zipfile", "zlib", "zoneinfo",
    "__future__",
];

/// Maps top-level import names to the package providing them: the
/// standard library, the declared third-party dependency manifest, and the
/// `external.rename` alias table.
#[derive(Debug, Default)]
pub struct ExternalIndex {
    stdlib: HashSet<&'static str>,
    declared: HashSet<String>,
    /// distribution name -> import name, e.g. `pyyaml` -> `yaml`.
    rename: HashMap<String, String>,
    /// import name -> distribution name, the reverse lookup used to report
    /// a package by its manifest name.
    rename_rev: HashMap<String, String>,
}

impl ExternalIndex {
    /// Build an index from the manifest-declared package names and the
    /// project's `external.rename` table.
    pub fn build<I, S>(declared: I, rename: &[(String, String)]) -> ExternalIndex
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut rename_rev = HashMap::new();
        let mut rename_map = HashMap::new();
        for (dist, import) in rename {
            rename_map.insert(dist.clone(), import.clone());
            rename_rev.insert(import.clone(), dist.clone());
        }
        ExternalIndex {
            stdlib: STDLIB_MODULES.iter().copied().collect(),
            declared: declared.into_iter().map(Into::into).collect(),
            rename: rename_map,
            rename_rev,
        }
    }

    /// Whether `top_level_name` (a dotted path's first segment) is known
    /// to the standard library or the declared manifest.
    pub fn contains(&self, top_level_name: &str) -> bool {
        self.stdlib.contains(top_level_name)
            || self.declared.contains(top_level_name)
            || self.rename_rev.contains_key(top_level_name)
    }

    /// The package name to report for `top_level_name`: the distribution
    /// name if a rename alias maps back to one, otherwise the import name
    /// itself.
    pub fn package_name(&self, top_level_name: &str) -> String {
        self.rename_rev.get(top_level_name).cloned().unwrap_or_else(|| top_level_name.to_string())
    }

    /// Resolve a distribution name to its import name via `external.rename`,
    /// falling back to the distribution name unchanged.
    pub fn import_name_for(&self, distribution_name: &str) -> String {
        self.rename.get(distribution_name).cloned().unwrap_or_else(|| distribution_name.to_string())
    }
}

/// Extract top-level package names from a dependency manifest. Supports
/// the two common shapes in the retrieval pack's example projects:
/// `requirements.txt`-style (one requirement per line, optionally
/// version-pinned) and a `pyproject.toml` `[project] dependencies` /
/// `[tool.poetry.dependencies]` array of the same requirement strings.
/// Unrecognized manifest shapes yield an empty list rather than an error --
/// the external index degrades to "stdlib only", which is conservative
/// (more imports get classified as `Unknown` rather than wrongly allowed).
pub fn parse_manifest_names(path: &Path) -> Vec<String> {
    let Ok(text) = std::fs::read_to_string(path) else {
        log::debug!("external: could not read dependency manifest at {}", path.display());
        return Vec::new();
    };
    let is_toml = path.extension().and_then(|e| e.to_str()) == Some("toml");
    if is_toml {
        parse_toml_manifest(&text)
    } else {
        text.lines().filter_map(parse_requirement_line).collect()
    }
}

fn parse_toml_manifest(text: &str) -> Vec<String> {
    let Ok(value) = text.parse::<toml::Value>() else { return Vec::new() };
    let mut names = Vec::new();
    if let Some(deps) = value.get("project").and_then(|p| p.get("dependencies")) {
        collect_toml_requirement_strings(deps, &mut names);
    }
    if let Some(deps) =
        value.get("tool").and_then(|t| t.get("poetry")).and_then(|p| p.get("dependencies"))
    {
        if let Some(table) = deps.as_table() {
            names.extend(table.keys().filter(|k| k.as_str() != "python").cloned());
        }
    }
    names
}

fn collect_toml_requirement_strings(value: &toml::Value, out: &mut Vec<String>) {
    if let Some(array) = value.as_array() {
        for item in array {
            if let Some(s) = item.as_str() {
                if let Some(name) = parse_requirement_line(s) {
                    out.push(name);
                }
            }
        }
    }
}

fn parse_requirement_line(line: &str) -> Option<String> {
    let line = line.split('#').next().unwrap_or("").trim();
    if line.is_empty() || line.starts_with('-') {
        return None;
    }
    let end = line
        .find(|c: char| "[<>=!~; ".contains(c))
        .unwrap_or(line.len());
    let name = line[..end].trim();
    if name.is_empty() {
        None
    } else {
        Some(name.replace('-', "_"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stdlib_names_resolve() {
        let index = ExternalIndex::build(Vec::<String>::new(), &[]);
        assert!(index.contains("os"));
        assert!(!index.contains("numpy"));
    }

    #[test]
    fn declared_manifest_names_resolve() {
        let index = ExternalIndex::build(vec!["numpy".to_string()], &[]);
        assert!(index.contains("numpy"));
    }

    #[test]
    fn rename_alias_resolves_both_directions() {
        let index = ExternalIndex::build(
            Vec::<String>::new(),
            &[("pyyaml".to_string(), "yaml".to_string())],
        );
        assert!(index.contains("yaml"));
        assert_eq!(index.package_name("yaml"), "pyyaml");
        assert_eq!(index.import_name_for("pyyaml"), "yaml");
    }

    #[test]
    fn requirement_line_strips_version_pin() {
        assert_eq!(parse_requirement_line("requests>=2.0"), Some("requests".to_string()));
        assert_eq!(parse_requirement_line("# comment"), None);
        assert_eq!(parse_requirement_line(""), None);
    }
}
