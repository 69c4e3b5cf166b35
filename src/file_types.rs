//! Document format detection
//!
//! Format selection is a caller-level decision; the parsers never look at
//! file names themselves. This module maps file extensions to formats for
//! the callers that want the conventional mapping.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Supported document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    /// JSON documents (object/array/scalar model)
    Json,
    /// XML documents (element/attribute/text model)
    Xml,
}

const XML_EXTENSIONS: &[&str] = &["xml", "xaml", "csproj", "config", "svg", "xsd", "plist"];

impl DocumentFormat {
    /// Detect the format from a file path's extension (case-insensitive).
    ///
    /// Returns `None` if the extension is not recognized.
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        if extension == "json" {
            Some(DocumentFormat::Json)
        } else if XML_EXTENSIONS.contains(&extension.as_str()) {
            Some(DocumentFormat::Xml)
        } else {
            None
        }
    }

    /// Canonical file extension
    pub fn extension(self) -> &'static str {
        match self {
            DocumentFormat::Json => "json",
            DocumentFormat::Xml => "xml",
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentFormat::Json => f.write_str("JSON"),
            DocumentFormat::Xml => f.write_str("XML"),
        }
    }
}

impl crate::reactive::Describe for DocumentFormat {
    fn describe(&self) -> String {
        self.to_string()
    }
}
