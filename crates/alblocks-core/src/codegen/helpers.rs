//! Hoisted definitions: helper procedures and user procedure bodies.

use super::format::reindent;
use super::names::{NameAllocator, NameKind};
use indexmap::IndexMap;
use rustc_hash::FxHashMap;

/// Token in helper templates that is replaced by the allocated helper name.
pub const FUNCTION_NAME_PLACEHOLDER: &str = "{%FUNCTION_NAME%}";

/// Ordered table of definitions emitted ahead of the program body.
///
/// Entries keep first-registration order. Re-registering a key never
/// renders the template again.
#[derive(Debug, Clone, Default)]
pub struct HelperRegistry {
    definitions: IndexMap<String, String>,
    helper_names: FxHashMap<String, String>,
}

impl HelperRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the helper `key` and returns its callable name.
    ///
    /// On first use the name is allocated from `key`, the placeholder in
    /// `template` is replaced, and two-space indentation is rewritten to
    /// `indent`.
    pub fn provide_function(
        &mut self,
        key: &str,
        template: &str,
        names: &mut NameAllocator,
        indent: &str,
    ) -> String {
        if let Some(name) = self.helper_names.get(key) {
            return name.clone();
        }

        let name = names.get_distinct_name(key, NameKind::Procedure);
        let text = template.trim().replace(FUNCTION_NAME_PLACEHOLDER, &name);
        let text = reindent(&text, indent);
        tracing::debug!("Registered helper {} as {}", key, name);

        self.helper_names.insert(key.to_string(), name.clone());
        self.definitions.insert(key.to_string(), text);
        name
    }

    /// Stores a fully rendered definition under `key`. A later definition
    /// with the same key replaces the text but keeps the original position.
    pub fn define(&mut self, key: impl Into<String>, text: impl Into<String>) {
        self.definitions.insert(key.into(), text.into());
    }

    pub fn contains(&self, key: &str) -> bool {
        self.definitions.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.definitions.get(key).map(String::as_str)
    }

    pub fn definitions(&self) -> impl Iterator<Item = &str> {
        self.definitions.values().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn reset(&mut self) {
        self.definitions.clear();
        self.helper_names.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOUBLE: &str = "
procedure {%FUNCTION_NAME%}(n : Decimal) : Decimal
begin
  exit(n * 2);
end;
";

    #[test]
    fn test_provide_function_renders_once() {
        let mut registry = HelperRegistry::new();
        let mut names = NameAllocator::default();
        let first = registry.provide_function("math_double", DOUBLE, &mut names, "  ");
        let second = registry.provide_function("math_double", "ignored", &mut names, "  ");
        assert_eq!(first, "math_double");
        assert_eq!(first, second);
        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.get("math_double"),
            Some("procedure math_double(n : Decimal) : Decimal\nbegin\n  exit(n * 2);\nend;")
        );
    }

    #[test]
    fn test_provide_function_reindents() {
        let mut registry = HelperRegistry::new();
        let mut names = NameAllocator::default();
        registry.provide_function("math_double", DOUBLE, &mut names, "\t");
        assert!(registry.get("math_double").unwrap().contains("\n\texit(n * 2);"));
    }

    #[test]
    fn test_helper_name_avoids_user_names() {
        let mut registry = HelperRegistry::new();
        let mut names = NameAllocator::default();
        names.get_name("math_sum", NameKind::Procedure);
        let name = registry.provide_function("math_sum", DOUBLE, &mut names, "  ");
        assert_eq!(name, "math_sum2");
    }

    #[test]
    fn test_definitions_keep_registration_order() {
        let mut registry = HelperRegistry::new();
        registry.define("%b", "b");
        registry.define("%a", "a");
        registry.define("%b", "b2");
        let all: Vec<_> = registry.definitions().collect();
        assert_eq!(all, vec!["b2", "a"]);
    }

    #[test]
    fn test_reset() {
        let mut registry = HelperRegistry::new();
        let mut names = NameAllocator::default();
        registry.provide_function("math_double", DOUBLE, &mut names, "  ");
        registry.reset();
        assert!(registry.is_empty());
        assert!(!registry.contains("math_double"));
    }
}
