#![no_main]

use jxview::config::SerializerConfig;
use jxview::file_types::DocumentFormat;
use jxview::parsers::Parser;
use jxview::parsers::json::JsonParser;
use jxview::serializers;
use libfuzzer_sys::fuzz_target;
use std::panic::AssertUnwindSafe;

fuzz_target!(|data: &[u8]| {
    if let Ok(content) = std::str::from_utf8(data) {
        let parser = JsonParser::new();

        let result = std::panic::catch_unwind(AssertUnwindSafe(|| parser.parse(content)));

        if let Ok(Ok(root)) = result {
            assert_eq!(root.name, "Root", "root must be named Root");

            let config = SerializerConfig::default();
            let written = serializers::serialize(&root, DocumentFormat::Json, &config)
                .expect("a parsed JSON tree must serialize");
            let reparsed = parser
                .parse(&written)
                .expect("serialized JSON must parse again");
            assert_eq!(
                reparsed.count(),
                root.count(),
                "node count changed across a round trip"
            );
        }
    }
});
