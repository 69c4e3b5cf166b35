//! Parser for XML documents
//!
//! The document element becomes the single child of the root node. Within an
//! element:
//!
//! - attributes become leaves named `@name`, ahead of any element children
//! - an element with neither attributes nor child elements becomes a leaf
//!   holding its text
//! - otherwise, non-blank text runs become `#text` leaves in document order
//!
//! Comments, processing instructions, the declaration and DOCTYPE are skipped.

use quick_xml::Reader;
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesStart, Event};

use super::{ParseError, Parser};
use crate::file_types::DocumentFormat;
use crate::tree::TreeNode;

/// Prefix of nodes holding attribute values
pub const ATTRIBUTE_PREFIX: &str = "@";

/// Name of nodes holding text mixed with markup
pub const TEXT_NODE_NAME: &str = "#text";

/// Parser for XML documents
#[derive(Debug)]
pub struct XmlParser {
    trim_text: bool,
}

impl Default for XmlParser {
    fn default() -> Self {
        Self { trim_text: true }
    }
}

impl XmlParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep leading and trailing whitespace of leaf text when `false`
    pub fn with_trim_text(trim_text: bool) -> Self {
        Self { trim_text }
    }
}

/// Element under construction
struct Frame {
    node: TreeNode,
    text: String,
}

impl Frame {
    fn new(node: TreeNode) -> Self {
        Self {
            node,
            text: String::new(),
        }
    }

    /// Move pending text into a `#text` child unless it is blank
    fn flush_text(&mut self, trim: bool) {
        let text = std::mem::take(&mut self.text);
        if text.trim().is_empty() {
            return;
        }
        let text = if trim { text.trim().to_string() } else { text };
        self.node.children.push(TreeNode::leaf(TEXT_NODE_NAME, text));
    }

    fn finish(mut self, trim: bool) -> TreeNode {
        if self.node.children.is_empty() {
            let text = if trim {
                self.text.trim().to_string()
            } else {
                self.text
            };
            self.node.value = Some(text);
        } else {
            self.flush_text(trim);
        }
        self.node
    }
}

impl Parser for XmlParser {
    fn parse(&self, content: &str) -> Result<TreeNode, ParseError> {
        if content.trim().is_empty() {
            return Err(ParseError::Empty);
        }

        let mut reader = Reader::from_str(content);
        let mut stack: Vec<Frame> = Vec::new();
        let mut root = TreeNode::root();

        loop {
            let event = reader
                .read_event()
                .map_err(|e| xml_error(reader.error_position() as u64, e))?;
            let position = reader.buffer_position() as u64;

            match event {
                Event::Start(start) => {
                    if let Some(parent) = stack.last_mut() {
                        parent.flush_text(self.trim_text);
                    }
                    let node = element_node(&start, position)?;
                    stack.push(Frame::new(node));
                }
                Event::Empty(start) => {
                    if let Some(parent) = stack.last_mut() {
                        parent.flush_text(self.trim_text);
                    }
                    let node = Frame::new(element_node(&start, position)?).finish(self.trim_text);
                    attach(&mut stack, &mut root, node, position)?;
                }
                Event::End(_) => {
                    let frame = stack
                        .pop()
                        .ok_or_else(|| xml_error(position, "unexpected closing tag"))?;
                    let node = frame.finish(self.trim_text);
                    attach(&mut stack, &mut root, node, position)?;
                }
                Event::Text(text) => {
                    let decoded = text.decode().map_err(|e| xml_error(position, e))?;
                    push_text(&mut stack, &decoded, position)?;
                }
                Event::CData(data) => {
                    let decoded = data.decode().map_err(|e| xml_error(position, e))?;
                    push_text(&mut stack, &decoded, position)?;
                }
                Event::GeneralRef(reference) => {
                    let resolved = match reference
                        .resolve_char_ref()
                        .map_err(|e| xml_error(position, e))?
                    {
                        Some(ch) => ch.to_string(),
                        None => {
                            let name = reference.decode().map_err(|e| xml_error(position, e))?;
                            resolve_predefined_entity(&name)
                                .ok_or_else(|| {
                                    xml_error(position, format!("unknown entity '&{name};'"))
                                })?
                                .to_string()
                        }
                    };
                    push_text(&mut stack, &resolved, position)?;
                }
                Event::Eof => break,
                // comments, declarations, processing instructions, DOCTYPE
                _ => {}
            }
        }

        if let Some(open) = stack.last() {
            return Err(xml_error(
                reader.buffer_position() as u64,
                format!("element '{}' is never closed", open.node.name),
            ));
        }
        if root.children.is_empty() {
            return Err(ParseError::NoRootElement);
        }

        Ok(root)
    }

    fn format(&self) -> DocumentFormat {
        DocumentFormat::Xml
    }
}

fn xml_error(position: u64, error: impl std::fmt::Display) -> ParseError {
    ParseError::Xml {
        position,
        message: error.to_string(),
    }
}

/// Container node for an element, with one `@name` leaf per attribute
fn element_node(start: &BytesStart<'_>, position: u64) -> Result<TreeNode, ParseError> {
    let mut node = TreeNode::container(String::from_utf8_lossy(start.name().as_ref()));
    for attribute in start.attributes() {
        let attribute = attribute.map_err(|e| xml_error(position, e))?;
        let key = String::from_utf8_lossy(attribute.key.as_ref());
        let value = attribute
            .unescape_value()
            .map_err(|e| xml_error(position, e))?;
        node.children
            .push(TreeNode::leaf(format!("{ATTRIBUTE_PREFIX}{key}"), value.into_owned()));
    }
    Ok(node)
}

/// Add a finished element to its parent, or install it as the document element
fn attach(
    stack: &mut [Frame],
    root: &mut TreeNode,
    node: TreeNode,
    position: u64,
) -> Result<(), ParseError> {
    match stack.last_mut() {
        Some(parent) => parent.node.children.push(node),
        None if root.children.is_empty() => root.children.push(node),
        None => {
            return Err(xml_error(
                position,
                format!("second root element '{}'", node.name),
            ));
        }
    }
    Ok(())
}

fn push_text(stack: &mut [Frame], text: &str, position: u64) -> Result<(), ParseError> {
    match stack.last_mut() {
        Some(frame) => frame.text.push_str(text),
        None if text.trim().is_empty() => {}
        None => return Err(xml_error(position, "text outside the root element")),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> TreeNode {
        XmlParser::new().parse(content).unwrap()
    }

    fn child_names(node: &TreeNode) -> Vec<&str> {
        node.children.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn test_document_element_under_root() {
        let root = parse(r#"<?xml version="1.0"?><config><name>demo</name></config>"#);
        assert_eq!(root.name, "Root");
        assert_eq!(child_names(&root), vec!["config"]);

        let config = root.child("config").unwrap();
        assert!(!config.is_leaf());
        assert_eq!(config.child("name").unwrap().value.as_deref(), Some("demo"));
    }

    #[test]
    fn test_attributes_come_first() {
        let root = parse(r#"<item id="7" kind="box"><label>Crate</label></item>"#);
        let item = root.child("item").unwrap();
        assert_eq!(child_names(item), vec!["@id", "@kind", "label"]);
        assert_eq!(item.child("@id").unwrap().value.as_deref(), Some("7"));
    }

    #[test]
    fn test_repeated_siblings_keep_document_order() {
        let root = parse("<list><v>1</v><v>2</v><w/><v>3</v></list>");
        let list = root.child("list").unwrap();
        assert_eq!(child_names(list), vec!["v", "v", "w", "v"]);
        let values: Vec<_> = list
            .children
            .iter()
            .map(|c| c.value.as_deref().unwrap())
            .collect();
        assert_eq!(values, vec!["1", "2", "", "3"]);
    }

    #[test]
    fn test_mixed_content() {
        let root = parse("<p lang=\"en\">Hello <b>big</b> world</p>");
        let p = root.child("p").unwrap();
        assert_eq!(child_names(p), vec!["@lang", "#text", "b", "#text"]);
        assert_eq!(p.children[1].value.as_deref(), Some("Hello"));
        assert_eq!(p.children[3].value.as_deref(), Some("world"));
    }

    #[test]
    fn test_text_with_attributes() {
        let root = parse(r#"<price currency="EUR"> 12.50 </price>"#);
        let price = root.child("price").unwrap();
        assert_eq!(child_names(price), vec!["@currency", "#text"]);
        assert_eq!(price.children[1].value.as_deref(), Some("12.50"));
    }

    #[test]
    fn test_entities_and_cdata() {
        let root = parse("<t>a &amp; b &#65;<![CDATA[<raw>]]></t>");
        assert_eq!(
            root.child("t").unwrap().value.as_deref(),
            Some("a & b A<raw>")
        );
    }

    #[test]
    fn test_attribute_entities() {
        let root = parse(r#"<t q="&quot;x&quot; &lt; y"/>"#);
        let t = root.child("t").unwrap();
        assert_eq!(t.child("@q").unwrap().value.as_deref(), Some("\"x\" < y"));
    }

    #[test]
    fn test_untrimmed_text() {
        let root = XmlParser::with_trim_text(false)
            .parse("<t>  padded  </t>")
            .unwrap();
        assert_eq!(root.child("t").unwrap().value.as_deref(), Some("  padded  "));
    }

    #[test]
    fn test_comments_are_skipped() {
        let root = parse("<!-- lead --><a><!-- inner --><b>1</b></a>");
        let a = root.child("a").unwrap();
        assert_eq!(child_names(a), vec!["b"]);
    }

    #[test]
    fn test_mismatched_end_tag() {
        let err = XmlParser::new().parse("<a><b></a>").unwrap_err();
        assert!(matches!(err, ParseError::Xml { .. }), "{err:?}");
    }

    #[test]
    fn test_unclosed_element() {
        let err = XmlParser::new().parse("<a><b>text</b>").unwrap_err();
        assert!(matches!(err, ParseError::Xml { .. }), "{err:?}");
    }

    #[test]
    fn test_two_root_elements() {
        let err = XmlParser::new().parse("<a/><b/>").unwrap_err();
        assert!(matches!(err, ParseError::Xml { .. }), "{err:?}");
    }

    #[test]
    fn test_no_root_element() {
        let err = XmlParser::new().parse("<!-- nothing here -->").unwrap_err();
        assert_eq!(err, ParseError::NoRootElement);
    }

    #[test]
    fn test_unknown_entity() {
        let err = XmlParser::new().parse("<a>&nbsp;</a>").unwrap_err();
        assert!(err.to_string().contains("nbsp"), "{err}");
    }
}
