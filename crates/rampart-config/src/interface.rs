use serde::{Deserialize, Serialize};

use crate::dotted_path::DottedPath;

/// Controls how strictly `InterfaceConfig::data_types` limits the exposed
/// symbol set.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataTypes {
    /// No additional restriction beyond matching an `expose` pattern.
    All,
    /// An additional annotation-time check limits exposed symbols to those
    /// whose declared types are language primitives. Best-effort: skipped
    /// silently if type annotations aren't available to inspect.
    Primitive,
}

impl Default for DataTypes {
    fn default() -> DataTypes {
        DataTypes::All
    }
}

/// `{expose, from_modules, visibility, data_types}`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InterfaceConfig {
    /// Regex patterns naming the symbols this interface exposes.
    pub expose: Vec<String>,

    /// Modules that expose the above symbols via this interface.
    #[serde(rename = "from")]
    pub from_modules: Vec<DottedPath>,

    /// Modules allowed to depend on this interface's `from_modules`. Absent
    /// means every module may.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Vec<String>>,

    /// Restriction on the declared types of exposed symbols.
    #[serde(default)]
    pub data_types: DataTypes,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_data_types_is_all() {
        assert_eq!(DataTypes::default(), DataTypes::All);
    }
}
