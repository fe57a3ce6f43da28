use regex::Regex;

use rampart_config::{DataTypes, DottedPath, InterfaceConfig};

/// One `expose` pattern compiled to a regex anchored at both ends, plus the
/// interface's data-type and visibility constraints it carries.
struct CompiledInterface {
    from_modules: Vec<DottedPath>,
    patterns: Vec<Regex>,
    data_types: DataTypes,
}

/// Compiled `[[interfaces]]` declarations: for a module
/// governed by one or more interfaces, answers whether a given imported
/// name is among the names those interfaces expose.
#[derive(Default)]
pub struct InterfaceIndex {
    interfaces: Vec<CompiledInterface>,
}

impl InterfaceIndex {
    /// Compile every interface declaration. A malformed `expose` pattern is
    /// logged and skipped rather than failing the whole build -- one bad
    /// interface entry shouldn't block every other check.
    pub fn build(interfaces: &[InterfaceConfig]) -> InterfaceIndex {
        let mut compiled = Vec::with_capacity(interfaces.len());
        for interface in interfaces {
            let mut patterns = Vec::with_capacity(interface.expose.len());
            for pattern in &interface.expose {
                match compile_expose_pattern(pattern) {
                    Ok(re) => patterns.push(re),
                    Err(err) => {
                        log::warn!("interfaces: skipping invalid expose pattern '{pattern}': {err}");
                    }
                }
            }
            compiled.push(CompiledInterface {
                from_modules: interface.from_modules.clone(),
                patterns,
                data_types: interface.data_types,
            });
        }
        InterfaceIndex { interfaces: compiled }
    }

    /// Whether any module is governed by at least one interface declaration.
    /// When this is false, interface-strictness checks are
    /// skipped entirely since there is nothing to enforce.
    pub fn is_empty(&self) -> bool {
        self.interfaces.is_empty()
    }

    /// Whether `module` has any interface declarations naming it in
    /// `from_modules` -- i.e. whether it is subject to interface
    /// strictness at all.
    pub fn governs(&self, module: &DottedPath) -> bool {
        self.interfaces.iter().any(|i| i.from_modules.iter().any(|m| m == module))
    }

    /// Whether `exposed_name` (the bound name an importer used, before any
    /// local alias) is exposed by some interface governing `module`.
    pub fn exposes(&self, module: &DottedPath, exposed_name: &str) -> bool {
        self.interfaces
            .iter()
            .filter(|i| i.from_modules.iter().any(|m| m == module))
            .any(|i| i.patterns.iter().any(|re| re.is_match(exposed_name)))
    }

    /// The most restrictive `data_types` constraint among interfaces
    /// governing `module`, if any. `Primitive` wins over `All` when both
    /// are declared, since that's the stricter reading.
    pub fn data_types_for(&self, module: &DottedPath) -> Option<DataTypes> {
        self.interfaces
            .iter()
            .filter(|i| i.from_modules.iter().any(|m| m == module))
            .map(|i| i.data_types)
            .reduce(|a, b| if a == DataTypes::Primitive || b == DataTypes::Primitive {
                DataTypes::Primitive
            } else {
                DataTypes::All
            })
    }
}

/// `expose` entries are full regex patterns (spec §3: "list of regex
/// patterns"), not glob shorthand -- `"foo|bar"` must be an alternation,
/// not the literal string `foo\|bar`. Wrap in a non-capturing group before
/// anchoring both ends, so an alternation at the top level of the pattern
/// is anchored as a whole rather than only binding its last arm.
fn compile_expose_pattern(pattern: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!("^(?:{pattern})$"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interface(from: &str, expose: &[&str]) -> InterfaceConfig {
        InterfaceConfig {
            expose: expose.iter().map(|s| s.to_string()).collect(),
            from_modules: vec![DottedPath::parse(from)],
            visibility: None,
            data_types: DataTypes::All,
        }
    }

    #[test]
    fn exact_name_matches() {
        let index = InterfaceIndex::build(&[interface("a.b", &["public_fn"])]);
        assert!(index.exposes(&DottedPath::parse("a.b"), "public_fn"));
        assert!(!index.exposes(&DottedPath::parse("a.b"), "private_fn"));
    }

    #[test]
    fn regex_pattern_matches_prefix() {
        let index = InterfaceIndex::build(&[interface("a.b", &["get_.*"])]);
        assert!(index.exposes(&DottedPath::parse("a.b"), "get_user"));
        assert!(!index.exposes(&DottedPath::parse("a.b"), "set_user"));
    }

    #[test]
    fn alternation_is_not_escaped() {
        let index = InterfaceIndex::build(&[interface("a.b", &["foo|bar"])]);
        assert!(index.exposes(&DottedPath::parse("a.b"), "foo"));
        assert!(index.exposes(&DottedPath::parse("a.b"), "bar"));
        assert!(!index.exposes(&DottedPath::parse("a.b"), "foobar"));
    }

    #[test]
    fn ungoverned_module_reports_not_governed() {
        let index = InterfaceIndex::build(&[interface("a.b", &["*"])]);
        assert!(!index.governs(&DottedPath::parse("c.d")));
        assert!(index.governs(&DottedPath::parse("a.b")));
    }
}
