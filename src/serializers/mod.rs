//! Serializers turning a [`TreeNode`] graph back into document text
//!
//! Trees carry every value as text, so the JSON writer re-infers scalar
//! types and the container kind from node names. The XML writer maps the
//! `@name` / `#text` conventions of the XML parser back onto markup.

use thiserror::Error;

use crate::config::SerializerConfig;
use crate::file_types::DocumentFormat;
use crate::tree::TreeNode;

pub mod json;
pub mod xml;

#[derive(Debug, Error)]
pub enum SerializeError {
    #[error("XML output needs exactly one element under the root node, found {0}")]
    NoDocumentElement(usize),
    #[error("failed to write {format}: {message}")]
    Write {
        format: DocumentFormat,
        message: String,
    },
}

/// Serialize the tree rooted at `root` as `format`
pub fn serialize(
    root: &TreeNode,
    format: DocumentFormat,
    config: &SerializerConfig,
) -> Result<String, SerializeError> {
    match format {
        DocumentFormat::Json => json::to_string(root, config),
        DocumentFormat::Xml => xml::to_string(root, config),
    }
}
