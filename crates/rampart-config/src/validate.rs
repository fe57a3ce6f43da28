use std::collections::HashSet;

use crate::error::ConfigError;
use crate::project::ProjectConfig;

/// Check the invariants documented for `ModuleConfig`/`InterfaceConfig`:
/// module paths unique, at most one `<root>`, interfaces and layers
/// reference things that exist. Called once after parsing, before the
/// module tree is built.
pub fn validate(config: &ProjectConfig) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    let mut root_seen = false;
    for module in &config.modules {
        let key = module.path.to_string();
        if !seen.insert(key.clone()) {
            return Err(ConfigError::DuplicateModule(key));
        }
        if module.is_root() {
            if root_seen {
                return Err(ConfigError::DuplicateRoot);
            }
            root_seen = true;
        }
        if let Some(layer) = &module.layer {
            if !config.layers.iter().any(|l| l == layer) {
                return Err(ConfigError::UnknownLayer {
                    module: key.clone(),
                    layer: layer.clone(),
                });
            }
        }
    }

    let known_paths: HashSet<String> =
        config.modules.iter().map(|m| m.path.to_string()).collect();
    for interface in &config.interfaces {
        for module in &interface.from_modules {
            if !known_paths.contains(&module.to_string()) {
                return Err(ConfigError::UnknownInterfaceModule(module.to_string()));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dotted_path::DottedPath;
    use crate::module::ModuleConfig;

    #[test]
    fn rejects_duplicate_module_path() {
        let mut config = ProjectConfig::default();
        config.modules.push(ModuleConfig::new(DottedPath::parse("a")));
        config.modules.push(ModuleConfig::new(DottedPath::parse("a")));
        assert!(matches!(validate(&config), Err(ConfigError::DuplicateModule(_))));
    }

    #[test]
    fn rejects_second_root_sentinel() {
        let mut config = ProjectConfig::default();
        config.modules.push(ModuleConfig::new(DottedPath::parse("<root>")));
        config.modules.push(ModuleConfig::new(DottedPath::parse("<root>")));
        assert!(matches!(
            validate(&config),
            Err(ConfigError::DuplicateModule(_) | ConfigError::DuplicateRoot)
        ));
    }

    #[test]
    fn accepts_well_formed_config() {
        let mut config = ProjectConfig::default();
        config.modules.push(ModuleConfig::new(DottedPath::parse("a")));
        config.modules.push(ModuleConfig::new(DottedPath::parse("b")));
        assert!(validate(&config).is_ok());
    }
}
