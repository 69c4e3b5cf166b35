//! Configuration management for jxview

use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

/// Default number of characters of a value shown in the outline
const DEFAULT_MAX_VALUE_CHARS: usize = 60;

/// Default indentation, shared by the outline and pretty-printed output
const DEFAULT_INDENT: usize = 2;

/// jxview configuration
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Outline rendering
    pub display: DisplayConfig,
    /// Output of `save` / `convert`
    pub serializer: SerializerConfig,
    /// XML reading
    pub xml: XmlConfig,
}

/// Outline rendering configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct DisplayConfig {
    /// Values longer than this are cut and end in `...`
    pub max_value_chars: usize,
    /// Spaces per nesting level
    pub indent: usize,
    /// Print leaf values next to their names
    pub show_values: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            max_value_chars: DEFAULT_MAX_VALUE_CHARS,
            indent: DEFAULT_INDENT,
            show_values: true,
        }
    }
}

/// Serializer configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct SerializerConfig {
    /// Emit indented, multi-line output
    pub pretty: bool,
    /// Spaces per nesting level when `pretty` is set
    pub indent_width: usize,
}

impl Default for SerializerConfig {
    fn default() -> Self {
        Self {
            pretty: true,
            indent_width: DEFAULT_INDENT,
        }
    }
}

/// XML reader configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct XmlConfig {
    /// Strip leading and trailing whitespace from text
    pub trim_text: bool,
}

impl Default for XmlConfig {
    fn default() -> Self {
        Self { trim_text: true }
    }
}

impl Config {
    /// Parse configuration from a JSON value, falling back to defaults when
    /// it does not describe a valid configuration
    pub fn from_init_options(options: Option<serde_json::Value>) -> Self {
        match options {
            Some(value) => serde_json::from_value(value).unwrap_or_else(|e| {
                tracing::warn!("Invalid configuration, using defaults: {e}");
                Self::default()
            }),
            None => Self::default(),
        }
    }

    /// Read configuration from a JSON file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("invalid config file {}", path.display()))?;
        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.display.max_value_chars, DEFAULT_MAX_VALUE_CHARS);
        assert_eq!(config.display.indent, DEFAULT_INDENT);
        assert!(config.display.show_values);
        assert!(config.serializer.pretty);
        assert_eq!(config.serializer.indent_width, 2);
        assert!(config.xml.trim_text);
    }

    #[test]
    fn test_parse_from_json() {
        let options = json!({
            "display": {
                "max_value_chars": 20,
                "show_values": false
            },
            "serializer": {
                "pretty": false
            },
            "xml": {
                "trim_text": false
            }
        });

        let config = Config::from_init_options(Some(options));
        assert_eq!(config.display.max_value_chars, 20);
        assert_eq!(config.display.indent, DEFAULT_INDENT);
        assert!(!config.display.show_values);
        assert!(!config.serializer.pretty);
        assert_eq!(config.serializer.indent_width, 2);
        assert!(!config.xml.trim_text);
    }

    #[test]
    fn test_partial_config() {
        let options = json!({
            "serializer": {
                "indent_width": 4
            }
        });

        let config = Config::from_init_options(Some(options));
        assert!(config.serializer.pretty);
        assert_eq!(config.serializer.indent_width, 4);
        assert_eq!(config.display, DisplayConfig::default());
    }

    #[test]
    fn test_none_options() {
        assert_eq!(Config::from_init_options(None), Config::default());
    }

    #[test]
    fn test_invalid_options_fall_back_to_defaults() {
        let options = json!({ "display": { "indent": "wide" } });
        assert_eq!(Config::from_init_options(Some(options)), Config::default());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"display": {{"indent": 4}}}}"#).unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.display.indent, 4);
        assert!(config.serializer.pretty);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(&dir.path().join("absent.json")).unwrap_err();
        assert!(err.to_string().contains("absent.json"), "{err}");
    }

    #[test]
    fn test_load_malformed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(Config::load(file.path()).is_err());
    }
}
