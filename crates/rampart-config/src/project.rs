use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::interface::InterfaceConfig;
use crate::module::ModuleConfig;

/// How imports that resolve to the implicit `<root>` module are treated.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RootModuleTreatment {
    /// `<root>` behaves like any other module: importers must list it in
    /// `depends_on` to import from it.
    Allow,
    /// Imports that resolve to `<root>` are never flagged, in either
    /// direction.
    Ignore,
    /// `<root>` may be depended on by anyone (no declaration required) but
    /// modules may not list it as an explicit dependency.
    DependenciesOnly,
    /// Any import touching `<root>` is always an error.
    Forbid,
}

impl Default for RootModuleTreatment {
    fn default() -> RootModuleTreatment {
        RootModuleTreatment::Allow
    }
}

/// Severity level assignable to a configurable rule (`rules.*`).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleSeverity {
    /// Raise as an `Error` diagnostic.
    Error,
    /// Raise as a `Warning` diagnostic.
    Warning,
    /// Don't raise at all.
    Off,
}

impl Default for RuleSeverity {
    fn default() -> RuleSeverity {
        RuleSeverity::Warning
    }
}

/// `rules.*` block: severities for checks that aren't unconditionally
/// errors or warnings.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RulesConfig {
    /// Severity for an ignore directive that suppressed nothing.
    #[serde(default)]
    pub unused_ignore_directives: RuleSeverity,

    /// If `"error"`, an ignore directive missing a reason is itself a
    /// `Configuration` error in its own right.
    #[serde(default)]
    pub require_ignore_directive_reasons: RuleSeverity,
}

/// `external.*` block: rename aliases and the project-wide external
/// allowlist.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ExternalConfig {
    /// Distribution-name to import-name rewrites, e.g. `pyyaml -> yaml`.
    #[serde(default)]
    pub rename: Vec<RenameEntry>,

    /// Project-wide allowlist of external package names consulted when a
    /// module declares neither `depends_on_external` nor
    /// `cannot_depend_on_external`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<Vec<String>>,
}

/// One `external.rename` entry.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct RenameEntry {
    /// The name as it appears in the dependency manifest.
    pub distribution_name: String,
    /// The name used at import time.
    pub import_name: String,
}

/// `cache.*` block.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CacheConfig {
    /// On-disk cache directory, relative to the project root. Overridable
    /// by the `RAMPART_CACHE_DIR` environment variable.
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,

    /// Glob patterns whose resolved contents are hashed into the
    /// fingerprint in addition to source files.
    #[serde(default)]
    pub file_dependencies: Vec<String>,

    /// Environment variable names whose values are hashed into the
    /// fingerprint (empty string if unset).
    #[serde(default)]
    pub env_dependencies: Vec<String>,
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from(".rampart")
}

impl Default for CacheConfig {
    fn default() -> CacheConfig {
        CacheConfig {
            cache_dir: default_cache_dir(),
            file_dependencies: Vec::new(),
            env_dependencies: Vec::new(),
        }
    }
}

/// The full, parsed `rampart.toml` document.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Declared modules.
    #[serde(default)]
    pub modules: Vec<ModuleConfig>,

    /// Declared interfaces.
    #[serde(default)]
    pub interfaces: Vec<InterfaceConfig>,

    /// Ordered layer names, lowest index is the topmost layer.
    #[serde(default)]
    pub layers: Vec<String>,

    /// Directories under which dotted import paths are resolved.
    #[serde(default = "default_source_roots")]
    pub source_roots: Vec<PathBuf>,

    /// Exclude glob patterns, in addition to the built-in defaults.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Rule severities.
    #[serde(default)]
    pub rules: RulesConfig,

    /// How imports to the implicit `<root>` module are treated.
    #[serde(default)]
    pub root_module_treatment: RootModuleTreatment,

    /// Whether a cycle among non-deprecated module dependencies is an
    /// error (circular-dependency check).
    #[serde(default)]
    pub forbid_circular_dependencies: bool,

    /// Whether imports inside a `TYPE_CHECKING`-guarded block are dropped
    /// before checking.
    #[serde(default)]
    pub ignore_type_checking_imports: bool,

    /// Whether string-literal "imports" (`import_module("a.b.c")`) are
    /// scanned at all.
    #[serde(default)]
    pub include_string_imports: bool,

    /// Whether `.gitignore` rules apply in addition to `exclude`.
    #[serde(default)]
    pub respect_gitignore: bool,

    /// Computation cache settings.
    #[serde(default)]
    pub cache: CacheConfig,

    /// External-package handling.
    #[serde(default)]
    pub external: ExternalConfig,

    /// Unrecognized top-level keys, captured rather than rejected: unknown
    /// keys produce a `Configuration` warning, not a hard error.
    #[serde(flatten)]
    pub unknown: BTreeMap<String, toml::Value>,
}

fn default_source_roots() -> Vec<PathBuf> {
    vec![PathBuf::from(".")]
}

impl Default for ProjectConfig {
    fn default() -> ProjectConfig {
        ProjectConfig {
            modules: Vec::new(),
            interfaces: Vec::new(),
            layers: Vec::new(),
            source_roots: default_source_roots(),
            exclude: Vec::new(),
            rules: RulesConfig::default(),
            root_module_treatment: RootModuleTreatment::default(),
            forbid_circular_dependencies: false,
            ignore_type_checking_imports: false,
            include_string_imports: false,
            respect_gitignore: false,
            cache: CacheConfig::default(),
            external: ExternalConfig::default(),
            unknown: BTreeMap::new(),
        }
    }
}
