#![no_main]

use jxview::config::SerializerConfig;
use jxview::file_types::DocumentFormat;
use jxview::parsers::Parser;
use jxview::parsers::xml::XmlParser;
use jxview::serializers;
use libfuzzer_sys::fuzz_target;
use std::panic::AssertUnwindSafe;

fuzz_target!(|data: &[u8]| {
    if let Ok(content) = std::str::from_utf8(data) {
        let parser = XmlParser::new();

        let result = std::panic::catch_unwind(AssertUnwindSafe(|| parser.parse(content)));

        if let Ok(Ok(root)) = result {
            assert_eq!(root.children.len(), 1, "exactly one document element");

            let config = SerializerConfig::default();
            let written = serializers::serialize(&root, DocumentFormat::Xml, &config)
                .expect("a parsed XML tree must serialize");
            assert!(
                parser.parse(&written).is_ok(),
                "serialized XML must parse again"
            );
        }
    }
});
