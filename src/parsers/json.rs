//! Parser for JSON documents

use serde_json::Value;

use super::{ParseError, Parser};
use crate::file_types::DocumentFormat;
use crate::tree::{ROOT_NAME, TreeNode, index_name};

/// Parser for JSON documents.
///
/// Objects become containers named by key, arrays produce children named
/// `[0]`, `[1]`, ..., and scalars become leaves holding their textual form.
#[derive(Debug, Default)]
pub struct JsonParser;

impl JsonParser {
    pub fn new() -> Self {
        Self
    }
}

impl Parser for JsonParser {
    fn parse(&self, content: &str) -> Result<TreeNode, ParseError> {
        if content.trim().is_empty() {
            return Err(ParseError::Empty);
        }

        let value: Value = serde_json::from_str(content).map_err(|e| ParseError::Json {
            line: e.line(),
            column: e.column(),
            message: e.to_string(),
        })?;

        Ok(value_to_node(&value, ROOT_NAME))
    }

    fn format(&self) -> DocumentFormat {
        DocumentFormat::Json
    }
}

/// Convert a JSON value into a node named `name`.
///
/// Recursion depth is bounded by serde_json's own nesting limit.
pub fn value_to_node(value: &Value, name: &str) -> TreeNode {
    match value {
        Value::Object(map) => TreeNode {
            name: name.to_string(),
            children: map.iter().map(|(key, item)| value_to_node(item, key)).collect(),
            ..Default::default()
        },
        Value::Array(items) => TreeNode {
            name: name.to_string(),
            children: items
                .iter()
                .enumerate()
                .map(|(index, item)| value_to_node(item, &index_name(index)))
                .collect(),
            ..Default::default()
        },
        Value::String(text) => TreeNode::leaf(name, text.as_str()),
        Value::Number(number) => TreeNode::leaf(name, number.to_string()),
        Value::Bool(flag) => TreeNode::leaf(name, flag.to_string()),
        Value::Null => TreeNode::leaf(name, "null"),
    }
}
