//! Parsers turning JSON and XML documents into a [`TreeNode`] graph

use thiserror::Error;

use crate::config::XmlConfig;
use crate::file_types::DocumentFormat;
use crate::tree::TreeNode;

pub mod json;
pub mod xml;

/// Malformed source document
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("document is empty")]
    Empty,
    #[error("invalid JSON at line {line}, column {column}: {message}")]
    Json {
        line: usize,
        column: usize,
        message: String,
    },
    #[error("invalid XML at byte {position}: {message}")]
    Xml { position: u64, message: String },
    #[error("XML document has no root element")]
    NoRootElement,
}

/// Trait for document parsers
pub trait Parser: Send + Sync {
    /// Parse `content` into a tree rooted at a node named [`crate::tree::ROOT_NAME`].
    ///
    /// On error no partial tree is returned.
    fn parse(&self, content: &str) -> Result<TreeNode, ParseError>;

    /// The format this parser reads
    fn format(&self) -> DocumentFormat;
}

/// Parse `content` with the default parser for `format`
pub fn parse(content: &str, format: DocumentFormat) -> Result<TreeNode, ParseError> {
    parser_for(format, &XmlConfig::default()).parse(content)
}

/// Parser for `format`, with XML reading tuned by `xml`
pub fn parser_for(format: DocumentFormat, xml: &XmlConfig) -> Box<dyn Parser> {
    match format {
        DocumentFormat::Json => Box::new(json::JsonParser::new()),
        DocumentFormat::Xml => Box::new(xml::XmlParser::with_trim_text(xml.trim_text)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dispatches_on_format() {
        let json = parse(r#"{"a": 1}"#, DocumentFormat::Json).unwrap();
        assert_eq!(json.child("a").unwrap().value.as_deref(), Some("1"));

        let xml = parse("<a>1</a>", DocumentFormat::Xml).unwrap();
        assert_eq!(xml.child("a").unwrap().value.as_deref(), Some("1"));
    }

    #[test]
    fn test_parser_for_honours_xml_config() {
        let untrimmed = XmlConfig { trim_text: false };
        let parser = parser_for(DocumentFormat::Xml, &untrimmed);
        assert_eq!(parser.format(), DocumentFormat::Xml);
        let root = parser.parse("<a> x </a>").unwrap();
        assert_eq!(root.child("a").unwrap().value.as_deref(), Some(" x "));

        let json = parser_for(DocumentFormat::Json, &untrimmed);
        assert_eq!(json.format(), DocumentFormat::Json);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(parse("", DocumentFormat::Json), Err(ParseError::Empty));
        assert_eq!(parse("  \n", DocumentFormat::Xml), Err(ParseError::Empty));
    }

    #[test]
    fn test_error_display() {
        let err = ParseError::Json {
            line: 2,
            column: 5,
            message: "expected value".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid JSON at line 2, column 5: expected value"
        );
    }
}
