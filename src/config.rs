//! Configuration for schema building and output
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (aggregate-schema.toml)
//! - Environment variables (AGGREGATE_SCHEMA__*)
//!
//! ## Example config file (aggregate-schema.toml):
//! ```toml
//! [naming]
//! reserved_words = ["type", "class", "select", "order"]
//! sequence_member = "seq"
//! separator = "_"
//!
//! [validation]
//! require_multiple_variants = false
//! integer_discriminators = false
//! suggest_references = true
//!
//! [output]
//! format = "pretty"
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaConfig {
    /// Physical identifier generation
    #[serde(default)]
    pub naming: NamingConfig,

    /// Build validation settings
    #[serde(default)]
    pub validation: ValidationConfig,

    /// Document output settings
    #[serde(default)]
    pub output: OutputConfig,
}

/// Physical identifier generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamingConfig {
    /// Identifiers that must never be emitted as-is (compared case-insensitively)
    #[serde(default = "default_reserved_words")]
    pub reserved_words: Vec<String>,

    /// Name of the implicit sequence member added to keyless Children aggregates
    #[serde(default = "default_sequence_member")]
    pub sequence_member: String,

    /// Joins an owner's physical id and a name when disambiguating
    #[serde(default = "default_separator")]
    pub separator: String,
}

/// Build validation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Reject variation switches with a single variant instead of warning
    #[serde(default)]
    pub require_multiple_variants: bool,

    /// Reject variation discriminators that are not integers instead of warning
    #[serde(default)]
    pub integer_discriminators: bool,

    /// Attach "did you mean" hints to unresolved references
    #[serde(default = "default_true")]
    pub suggest_references: bool,
}

/// Document output settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
}

/// Output format for JSON
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Pretty,
    Compact,
}

fn default_reserved_words() -> Vec<String> {
    [
        // SQL
        "select", "from", "where", "order", "group", "table", "index", "key", "user",
        // C# / TypeScript
        "class", "type", "public", "private", "new", "return", "default", "string", "object",
        "namespace", "interface", "enum", "function", "delete", "switch", "case",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_sequence_member() -> String {
    "seq".to_string()
}

fn default_separator() -> String {
    "_".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            reserved_words: default_reserved_words(),
            sequence_member: default_sequence_member(),
            separator: default_separator(),
        }
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            require_multiple_variants: false,
            integer_discriminators: false,
            suggest_references: true,
        }
    }
}

impl SchemaConfig {
    /// Load configuration from default locations
    pub fn load() -> std::result::Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration, layering a specific file over the default locations
    pub fn load_from(config_path: Option<&str>) -> std::result::Result<Self, ConfigError> {
        let mut builder = Config::builder();

        let config_locations = [
            "aggregate-schema.toml",
            ".aggregate-schema.toml",
            "config/aggregate-schema.toml",
        ];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        if let Some(dirs) = directories::ProjectDirs::from("dev", "aggregate", "aggregate-schema") {
            let xdg_config = dirs.config_dir().join("aggregate-schema.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix("AGGREGATE_SCHEMA")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SchemaConfig::default();
        assert_eq!(config.naming.sequence_member, "seq");
        assert!(config.naming.reserved_words.iter().any(|w| w == "class"));
        assert!(!config.validation.require_multiple_variants);
        assert_eq!(config.output.format, OutputFormat::Pretty);
    }

    #[test]
    fn test_serialize_config() {
        let config = SchemaConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[naming]"));
        assert!(toml_str.contains("[validation]"));
        assert!(toml_str.contains("[output]"));
    }

    #[test]
    fn test_load_explicit_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(
            &path,
            "[validation]\nrequire_multiple_variants = true\n\n[naming]\nsequence_member = \"row_no\"\n",
        )
        .unwrap();

        let config = SchemaConfig::load_from(Some(path.to_str().unwrap())).unwrap();
        assert!(config.validation.require_multiple_variants);
        assert_eq!(config.naming.sequence_member, "row_no");
        // untouched sections keep their defaults
        assert_eq!(config.naming.separator, "_");
        assert!(config.validation.suggest_references);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("saved.toml");
        let mut config = SchemaConfig::default();
        config.output.format = OutputFormat::Compact;
        config.save(path.to_str().unwrap()).unwrap();

        let loaded = SchemaConfig::load_from(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(loaded.output.format, OutputFormat::Compact);
    }
}
