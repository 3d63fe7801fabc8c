use std::collections::HashMap;

/// Maps simple type names to fully-qualified names, built from a file's
/// import declarations. Wildcard imports are kept as candidate packages and
/// tried in declaration order.
#[derive(Debug, Clone, Default)]
pub struct ImportMap {
    imports: HashMap<String, String>,
    wildcard_packages: Vec<String>,
}

impl ImportMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, qualified_name: &str) {
        if let Some(simple) = qualified_name.rsplit('.').next() {
            self.imports
                .insert(simple.to_string(), qualified_name.to_string());
        }
    }

    pub fn insert_wildcard(&mut self, package: &str) {
        self.wildcard_packages.push(package.to_string());
    }

    /// Resolve a type name as written in source to a fully-qualified name.
    /// Already-qualified names pass through; unknown simple names resolve
    /// through the first wildcard import, if any.
    pub fn resolve(&self, name: &str) -> Option<String> {
        if name.contains('.') {
            return Some(name.to_string());
        }
        if let Some(qualified) = self.imports.get(name) {
            return Some(qualified.clone());
        }
        self.wildcard_packages
            .first()
            .map(|pkg| format!("{pkg}.{name}"))
    }

    pub fn len(&self) -> usize {
        self.imports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.imports.is_empty() && self.wildcard_packages.is_empty()
    }
}
