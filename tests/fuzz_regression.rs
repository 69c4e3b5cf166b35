//! Regression tests for fuzz crashes

use jxview::config::SerializerConfig;
use jxview::file_types::DocumentFormat;
use jxview::parsers::{Parser, json::JsonParser, xml::XmlParser};
use jxview::serializers;
use jxview::tree::TreeNode;
use std::panic::AssertUnwindSafe;

/// A parsed tree must serialize to JSON that parses back
fn validate_tree(root: &TreeNode, parser_name: &str) {
    assert_eq!(root.name, "Root", "{}: root must be named Root", parser_name);

    let config = SerializerConfig::default();
    let json = serializers::serialize(root, DocumentFormat::Json, &config)
        .unwrap_or_else(|e| panic!("{}: JSON output failed: {}", parser_name, e));
    // serde_json refuses to read past 128 levels
    if root.depth() > 100 {
        return;
    }
    assert!(
        serde_json::from_str::<serde_json::Value>(&json).is_ok(),
        "{}: JSON output does not parse: {}",
        parser_name,
        json
    );
}

fn check_no_panic(parser: &dyn Parser, content: &str, parser_name: &str) {
    let result = std::panic::catch_unwind(AssertUnwindSafe(|| parser.parse(content)));
    match result {
        Ok(Ok(root)) => validate_tree(&root, parser_name),
        Ok(Err(_)) => {}
        Err(_) => panic!("{} panicked on input {:?}", parser_name, content),
    }
}

#[test]
fn test_json_malformed_inputs() {
    let parser = JsonParser::new();
    let inputs = [
        "",
        " ",
        "{",
        "}",
        "[",
        "[1,",
        "{\"a\":}",
        "{\"a\" 1}",
        "\"unterminated",
        "\"\\ud800\"",
        "nul",
        "1e999999",
        "-",
        "{\"a\":1,}",
        "\u{feff}{}",
        "\0",
    ];
    for input in inputs {
        check_no_panic(&parser, input, "json");
    }
}

#[test]
fn test_json_deep_nesting() {
    // serde_json stops at its recursion limit instead of overflowing the stack
    let deep = format!("{}{}", "[".repeat(10_000), "]".repeat(10_000));
    check_no_panic(&JsonParser::new(), &deep, "json");

    let nested = format!("{}1{}", "[".repeat(100), "]".repeat(100));
    let root = JsonParser::new().parse(&nested).unwrap();
    assert_eq!(root.depth(), 101);
}

#[test]
fn test_json_odd_keys() {
    let content = r##"{"": 1, "[0]": 2, "a/b": 3, "@x": 4, "#text": 5}"##;
    let root = JsonParser::new().parse(content).unwrap();
    assert_eq!(root.children.len(), 5);
    validate_tree(&root, "json");
}

#[test]
fn test_xml_malformed_inputs() {
    let parser = XmlParser::new();
    let inputs = [
        "",
        "<",
        "<a",
        "<a>",
        "</a>",
        "<a></b>",
        "<a><b></a></b>",
        "<a x=\"1\" x=\"2\"/>",
        "<a x=1/>",
        "<a>&bogus;</a>",
        "<a>&#xFFFFFFFF;</a>",
        "<a>&#0;</a>",
        "<a/><b/>",
        "text only",
        "<?xml version=\"1.0\"?>",
        "<!DOCTYPE a><a/>",
        "<a><![CDATA[unterminated</a>",
        "<a><!-- unterminated</a>",
        "<a>\0</a>",
    ];
    for input in inputs {
        check_no_panic(&parser, input, "xml");
    }
}

#[test]
fn test_xml_deep_nesting() {
    let deep = format!("{}{}", "<a>".repeat(2_000), "</a>".repeat(2_000));
    check_no_panic(&XmlParser::new(), &deep, "xml");
}

#[test]
fn test_xml_output_for_json_shaped_trees() {
    // Names that are not valid tags must still yield well-formed XML
    let content =
        r#"{"doc": {"": 1, "two words": 2, "1st": 3, "[0]": 4, "a<b": 5, "@": 6, "@a b": 7}}"#;
    let root = JsonParser::new().parse(content).unwrap();
    let xml = serializers::serialize(&root, DocumentFormat::Xml, &SerializerConfig::default())
        .unwrap();
    let reparsed = XmlParser::new().parse(&xml).unwrap();
    assert_eq!(reparsed.child("doc").unwrap().children.len(), 7);
}
