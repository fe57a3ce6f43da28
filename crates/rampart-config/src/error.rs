use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading or validating a project configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file couldn't be read from disk.
    #[error("failed to read configuration at {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file's contents aren't valid TOML, or don't match
    /// the `ProjectConfig` schema.
    #[error("invalid configuration at {path}: {source}")]
    Parse {
        /// Path that failed to parse.
        path: PathBuf,
        /// Underlying parse error.
        #[source]
        source: toml::de::Error,
    },

    /// Two modules declared the same `path`.
    #[error("duplicate module path '{0}'")]
    DuplicateModule(String),

    /// More than one module declared `path = "<root>"`.
    #[error("'<root>' declared more than once")]
    DuplicateRoot,

    /// An interface's `from_modules` names a path with no matching module.
    #[error("interface references unknown module '{0}'")]
    UnknownInterfaceModule(String),

    /// A module's `layer` names a tag absent from the top-level `layers`
    /// list.
    #[error("module '{module}' references undeclared layer '{layer}'")]
    UnknownLayer {
        /// The offending module's path.
        module: String,
        /// The undeclared layer tag.
        layer: String,
    },
}
