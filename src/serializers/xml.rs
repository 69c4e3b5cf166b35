//! XML writer

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use super::SerializeError;
use crate::config::SerializerConfig;
use crate::file_types::DocumentFormat;
use crate::parsers::xml::{ATTRIBUTE_PREFIX, TEXT_NODE_NAME};
use crate::tree::{TreeNode, parse_index_name};

/// Element name used for nodes whose name is not a usable tag (array items)
pub const ITEM_ELEMENT: &str = "item";

/// Render `root` as an XML document.
///
/// The root node itself is not written; it must hold exactly one child, the
/// document element.
pub fn to_string(root: &TreeNode, config: &SerializerConfig) -> Result<String, SerializeError> {
    let [document] = root.children.as_slice() else {
        return Err(SerializeError::NoDocumentElement(root.children.len()));
    };

    let mut writer = if config.pretty {
        Writer::new_with_indent(Vec::new(), b' ', config.indent_width)
    } else {
        Writer::new(Vec::new())
    };

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(write_error)?;
    write_element(&mut writer, document)?;

    String::from_utf8(writer.into_inner()).map_err(write_error)
}

fn write_error(error: impl std::fmt::Display) -> SerializeError {
    SerializeError::Write {
        format: DocumentFormat::Xml,
        message: error.to_string(),
    }
}

fn write_element(writer: &mut Writer<Vec<u8>>, node: &TreeNode) -> Result<(), SerializeError> {
    let tag = element_name(&node.name);
    let mut start = BytesStart::new(tag.as_str());

    let (attributes, content): (Vec<&TreeNode>, Vec<&TreeNode>) = node
        .children
        .iter()
        .partition(|child| child.is_leaf() && attribute_name(&child.name).is_some());
    for attribute in &attributes {
        if let Some(key) = attribute_name(&attribute.name) {
            start.push_attribute((key, attribute.value.as_deref().unwrap_or_default()));
        }
    }

    let text = node.value.as_deref().unwrap_or_default();
    if content.is_empty() && text.is_empty() {
        return writer.write_event(Event::Empty(start)).map_err(write_error);
    }

    writer.write_event(Event::Start(start)).map_err(write_error)?;
    if !text.is_empty() {
        writer
            .write_event(Event::Text(BytesText::new(text)))
            .map_err(write_error)?;
    }
    for child in content {
        match (&child.value, child.name.as_str()) {
            (Some(text), TEXT_NODE_NAME) => writer
                .write_event(Event::Text(BytesText::new(text)))
                .map_err(write_error)?,
            _ => write_element(writer, child)?,
        }
    }
    writer
        .write_event(Event::End(BytesEnd::new(tag.as_str())))
        .map_err(write_error)
}

/// Attribute name carried by an `@`-prefixed node, if it is a valid XML name.
/// Other `@` nodes are written as elements.
fn attribute_name(name: &str) -> Option<&str> {
    name.strip_prefix(ATTRIBUTE_PREFIX).filter(|key| is_xml_name(key))
}

fn is_xml_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || matches!(c, '_' | ':'))
        && chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | ':'))
}

/// Map a node name onto a well-formed tag
fn element_name(name: &str) -> String {
    if name.is_empty() || parse_index_name(name).is_some() {
        return ITEM_ELEMENT.to_string();
    }

    let mut tag: String = name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | ':') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if tag
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_digit() || matches!(c, '-' | '.'))
    {
        tag.insert(0, '_');
    }
    tag
}
