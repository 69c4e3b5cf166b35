//! JSON writer

use serde::Serialize;
use serde_json::ser::{CompactFormatter, PrettyFormatter, Serializer};
use serde_json::{Map, Number, Value};

use super::SerializeError;
use crate::config::SerializerConfig;
use crate::file_types::DocumentFormat;
use crate::tree::{TreeNode, parse_index_name};

/// Render `root` as JSON text
pub fn to_string(root: &TreeNode, config: &SerializerConfig) -> Result<String, SerializeError> {
    let value = node_to_value(root);
    let mut out = Vec::new();

    let result = if config.pretty {
        let indent = " ".repeat(config.indent_width);
        let formatter = PrettyFormatter::with_indent(indent.as_bytes());
        value.serialize(&mut Serializer::with_formatter(&mut out, formatter))
    } else {
        value.serialize(&mut Serializer::with_formatter(&mut out, CompactFormatter))
    };
    result.map_err(|e| SerializeError::Write {
        format: DocumentFormat::Json,
        message: e.to_string(),
    })?;

    String::from_utf8(out).map_err(|e| SerializeError::Write {
        format: DocumentFormat::Json,
        message: e.to_string(),
    })
}

/// Rebuild a JSON value from a node.
///
/// Containers whose children are named `[0]`..`[n-1]` become arrays; other
/// containers become objects, with repeated child names collected into an
/// array. Leaves go through [`infer_scalar`].
pub fn node_to_value(node: &TreeNode) -> Value {
    if let Some(text) = &node.value {
        return infer_scalar(text);
    }

    if is_array(&node.children) {
        return Value::Array(node.children.iter().map(node_to_value).collect());
    }

    let mut map = Map::new();
    for child in &node.children {
        let value = node_to_value(child);
        let repeated = node
            .children
            .iter()
            .filter(|sibling| sibling.name == child.name)
            .nth(1)
            .is_some();
        if !repeated {
            map.insert(child.name.clone(), value);
            continue;
        }
        match map.get_mut(&child.name) {
            Some(Value::Array(items)) => items.push(value),
            _ => {
                map.insert(child.name.clone(), Value::Array(vec![value]));
            }
        }
    }
    Value::Object(map)
}

fn is_array(children: &[TreeNode]) -> bool {
    !children.is_empty()
        && children
            .iter()
            .enumerate()
            .all(|(index, child)| parse_index_name(&child.name) == Some(index))
}

/// Best-effort typing of a leaf's text: null, then number, then boolean,
/// falling back to a string.
///
/// Only text that is already a JSON number literal becomes a number, so
/// strings like `007` or `+5` survive a save unchanged.
pub fn infer_scalar(text: &str) -> Value {
    if text == "null" {
        return Value::Null;
    }
    if let Some(number) = json_number(text) {
        return Value::Number(number);
    }
    if text.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    }
    if text.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }
    Value::String(text.to_string())
}

fn json_number(text: &str) -> Option<Number> {
    // serde_json skips surrounding whitespace, which would be lost on output
    let starts = text.starts_with(|c: char| c == '-' || c.is_ascii_digit());
    let ends = text.ends_with(|c: char| c.is_ascii_digit());
    if !starts || !ends {
        return None;
    }
    serde_json::from_str(text).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::Parser;
    use crate::parsers::json::JsonParser;
    use serde_json::json;

    fn compact() -> SerializerConfig {
        SerializerConfig {
            pretty: false,
            ..Default::default()
        }
    }

    fn round_trip(source: &str) -> String {
        let tree = JsonParser::new().parse(source).unwrap();
        to_string(&tree, &compact()).unwrap()
    }

    #[test]
    fn test_round_trip_preserves_order() {
        assert_eq!(
            round_trip(r#"{"a": 1, "b": [true, null]}"#),
            r#"{"a":1,"b":[true,null]}"#
        );
        assert_eq!(
            round_trip(r#"{"z": {"y": [1.5, "x"]}, "a": false}"#),
            r#"{"z":{"y":[1.5,"x"]},"a":false}"#
        );
    }

    #[test]
    fn test_infer_scalar() {
        assert_eq!(infer_scalar("null"), Value::Null);
        assert_eq!(infer_scalar("42"), json!(42));
        assert_eq!(infer_scalar("-7"), json!(-7));
        assert_eq!(infer_scalar("18446744073709551615"), json!(u64::MAX));
        assert_eq!(infer_scalar("2.25"), json!(2.25));
        assert_eq!(infer_scalar("True"), json!(true));
        assert_eq!(infer_scalar("false"), json!(false));
        assert_eq!(infer_scalar("NaN"), json!("NaN"));
        assert_eq!(infer_scalar("inf"), json!("inf"));
        assert_eq!(infer_scalar(""), json!(""));
        assert_eq!(infer_scalar("hello"), json!("hello"));
        assert_eq!(infer_scalar(" 1"), json!(" 1"));
        assert_eq!(infer_scalar("1e3"), json!(1000.0));
        assert_eq!(infer_scalar("1e999999"), json!("1e999999"));
    }

    #[test]
    fn test_non_json_number_spellings_stay_strings() {
        for text in ["007", "+5", "1.", ".5", "-", "0x1F", "1_000", "-.5", "01.5"] {
            assert_eq!(infer_scalar(text), json!(text), "{text}");
        }
    }

    #[test]
    fn test_unedited_string_data_round_trips() {
        let source = r#"{"zip":"007","sign":"+5","dot":"1.","lead":".5","n":0}"#;
        assert_eq!(round_trip(source), source);
    }

    #[test]
    fn test_array_detection() {
        let sequential = TreeNode::container("list")
            .with_child(TreeNode::leaf("[0]", "a"))
            .with_child(TreeNode::leaf("[1]", "b"));
        assert_eq!(node_to_value(&sequential), json!(["a", "b"]));

        let gapped = TreeNode::container("list")
            .with_child(TreeNode::leaf("[0]", "a"))
            .with_child(TreeNode::leaf("[2]", "b"));
        assert_eq!(node_to_value(&gapped), json!({"[0]": "a", "[2]": "b"}));
    }

    #[test]
    fn test_empty_container_is_object() {
        assert_eq!(node_to_value(&TreeNode::container("x")), json!({}));
    }

    #[test]
    fn test_repeated_names_become_array() {
        let node = TreeNode::container("list")
            .with_child(TreeNode::leaf("v", "1"))
            .with_child(TreeNode::leaf("w", "x"))
            .with_child(TreeNode::leaf("v", "2"));
        let value = node_to_value(&node);
        assert_eq!(value, json!({"v": [1, 2], "w": "x"}));
        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["v", "w"]);
    }

    #[test]
    fn test_pretty_indent_width() {
        let tree = JsonParser::new().parse(r#"{"a": [1]}"#).unwrap();
        let config = SerializerConfig {
            pretty: true,
            indent_width: 4,
        };
        assert_eq!(
            to_string(&tree, &config).unwrap(),
            "{\n    \"a\": [\n        1\n    ]\n}"
        );
    }

    #[test]
    fn test_string_stays_string_after_edit() {
        let mut tree = JsonParser::new().parse(r#"{"name": "old"}"#).unwrap();
        tree.children[0].value = Some("new name".to_string());
        assert_eq!(to_string(&tree, &compact()).unwrap(), r#"{"name":"new name"}"#);
    }
}
