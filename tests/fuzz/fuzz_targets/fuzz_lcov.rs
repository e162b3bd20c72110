#![no_main]
use libfuzzer_sys::fuzz_target;

use covtree::model::Counted;
use covtree::parsers::lcov::TraceFileParser;
use covtree::parsers::ParseMode;
use covtree::registry::Registry;
use covtree::source::SourceOptions;

fuzz_target!(|data: &[u8]| {
    let options = SourceOptions {
        no_source: true,
        ..SourceOptions::default()
    };
    let mut registry = Registry::new();
    let text = String::from_utf8_lossy(data);

    // Parser must not panic on any input, in either direction.
    for mode in [ParseMode::Trace, ParseMode::Baseline] {
        let mut parser = TraceFileParser::new(&mut registry, &options, mode);
        parser.parse_str(&text);
        parser.finish();
    }

    for file in registry.iter() {
        for line in file.lines() {
            assert!(line.total_hits() >= -1);
        }
    }
});
