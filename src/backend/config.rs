//! Generator configuration
//!
//! Names and layout of the generated program. Defaults produce the conventional single-file stack program.

use serde::{Deserialize, Serialize};

/// Generator configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Name of the single generated file
    pub file_name: String,
    /// Name of the generated wrapper class
    pub class_name: String,
    /// Base class of the wrapper class
    pub base_class: String,
    /// Root namespace of the infrastructure runtime; always imported, never listed twice
    pub runtime_namespace: String,
    /// Number of spaces per indentation level
    pub indent_width: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            file_name: "MyStack.cs".to_string(),
            class_name: "MyStack".to_string(),
            base_class: "Stack".to_string(),
            runtime_namespace: "Pulumi".to_string(),
            indent_width: 4,
        }
    }
}

impl GeneratorConfig {
    /// Create a new config with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the wrapper class name; the output file name follows it
    pub fn with_class_name(mut self, name: impl Into<String>) -> Self {
        self.class_name = name.into();
        self.file_name = format!("{}.cs", self.class_name);
        self
    }

    /// Set the output file name
    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = name.into();
        self
    }

    /// Set the wrapper base class
    pub fn with_base_class(mut self, name: impl Into<String>) -> Self {
        self.base_class = name.into();
        self
    }

    /// Set the indentation width
    pub fn with_indent_width(mut self, width: usize) -> Self {
        self.indent_width = width;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================
    // Default config tests
    // ========================================

    #[test]
    fn test_default_config_file_name() {
        let config = GeneratorConfig::default();
        assert_eq!(config.file_name, "MyStack.cs");
    }

    #[test]
    fn test_default_config_class() {
        let config = GeneratorConfig::default();
        assert_eq!(config.class_name, "MyStack");
        assert_eq!(config.base_class, "Stack");
    }

    #[test]
    fn test_default_config_runtime_namespace() {
        let config = GeneratorConfig::default();
        assert_eq!(config.runtime_namespace, "Pulumi");
    }

    #[test]
    fn test_new_equals_default() {
        assert_eq!(GeneratorConfig::new(), GeneratorConfig::default());
    }

    // ========================================
    // Builder tests
    // ========================================

    #[test]
    fn test_with_class_name_renames_file() {
        let config = GeneratorConfig::new().with_class_name("WebsiteStack");
        assert_eq!(config.class_name, "WebsiteStack");
        assert_eq!(config.file_name, "WebsiteStack.cs");
    }

    #[test]
    fn test_with_file_name_after_class_name_wins() {
        let config = GeneratorConfig::new()
            .with_class_name("WebsiteStack")
            .with_file_name("Program.cs");
        assert_eq!(config.file_name, "Program.cs");
    }

    #[test]
    fn test_builder_chain() {
        let config = GeneratorConfig::new().with_indent_width(2).with_base_class("ComponentResource");
        assert_eq!(config.indent_width, 2);
        assert_eq!(config.base_class, "ComponentResource");
    }

    // ========================================
    // Loading tests
    // ========================================

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: GeneratorConfig = serde_json::from_str(r#"{"class_name": "Infra"}"#).unwrap();
        assert_eq!(config.class_name, "Infra");
        assert_eq!(config.file_name, "MyStack.cs");
        assert_eq!(config.indent_width, 4);
    }
}
