/*!
Project configuration schema and loader for rampart.

`rampart-config` owns the `ProjectConfig`/`ModuleConfig`/`InterfaceConfig`
data model and the TOML (de)serialization of `rampart.toml` . It also owns `DottedPath`, the segment-wise dotted-path type shared by
the scanner, resolver, and checker -- everything downstream
of configuration depends on this crate for it.
*/

#![deny(missing_docs)]

mod dotted_path;
mod error;
mod interface;
mod module;
mod project;
mod validate;

use std::path::Path;

pub use crate::dotted_path::{DottedPath, ROOT_SENTINEL};
pub use crate::error::ConfigError;
pub use crate::interface::{DataTypes, InterfaceConfig};
pub use crate::module::{DependencyEdge, ExternalDependencyEdge, ModuleConfig};
pub use crate::project::{
    CacheConfig, ExternalConfig, ProjectConfig, RenameEntry, RootModuleTreatment,
    RuleSeverity, RulesConfig,
};
pub use crate::validate::validate;

/// Default file name for the project configuration, looked up at the
/// project root.
pub const DEFAULT_CONFIG_FILE_NAME: &str = "rampart.toml";

/// Read and validate the project configuration at `path`.
pub fn load(path: &Path) -> Result<ProjectConfig, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&text, path)
}

/// Parse configuration text already read from `path` (kept separate from
/// `load` so callers with in-memory configuration -- tests, the language
/// server -- don't need a real file).
pub fn parse(text: &str, path: &Path) -> Result<ProjectConfig, ConfigError> {
    let config: ProjectConfig = toml::from_str(text)
        .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })?;
    validate(&config)?;
    for key in config.unknown.keys() {
        log::warn!("unrecognized configuration key '{key}' in {}", path.display());
    }
    Ok(config)
}

/// Serialize `config` back to TOML text, for `sync` to write out.
pub fn to_toml_string(config: &ProjectConfig) -> Result<String, toml::ser::Error> {
    toml::to_string_pretty(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn parses_minimal_config() {
        let toml = r#"
            source_roots = ["src"]

            [[modules]]
            path = "a"
            depends_on = ["b"]

            [[modules]]
            path = "b"
        "#;
        let config = parse(toml, Path::new("rampart.toml")).unwrap();
        assert_eq!(config.modules.len(), 2);
        assert_eq!(config.modules[0].path, DottedPath::parse("a"));
        assert!(config.modules[0].depends_on_path(&DottedPath::parse("b")));
    }

    #[test]
    fn unknown_top_level_key_is_captured_not_rejected() {
        let toml = r#"
            totally_unknown_key = true
        "#;
        let config = parse(toml, Path::new("rampart.toml")).unwrap();
        assert!(config.unknown.contains_key("totally_unknown_key"));
    }

    #[test]
    fn deprecated_dependency_table_form_parses() {
        let toml = r#"
            [[modules]]
            path = "a"
            depends_on = [{ path = "b", deprecated = true }]

            [[modules]]
            path = "b"
        "#;
        let config = parse(toml, Path::new("rampart.toml")).unwrap();
        let edge = config.modules[0].dependency_edge(&DottedPath::parse("b")).unwrap();
        assert!(edge.is_deprecated());
    }

    #[test]
    fn rejects_bad_layer_reference() {
        let toml = r#"
            [[modules]]
            path = "a"
            layer = "nonexistent"
        "#;
        assert!(parse(toml, Path::new("rampart.toml")).is_err());
    }
}
