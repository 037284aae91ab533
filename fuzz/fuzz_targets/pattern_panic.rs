#![no_main]
use libfuzzer_sys::fuzz_target;
use logpar::{Logpar, ParserRegistry, Schema};
use serde_json::json;

fuzz_target!(|data: &[u8]| {
    // First line is the pattern, the rest is the log line. Neither compiling
    // nor running may panic, whatever the bytes.
    let s = String::from_utf8_lossy(data);
    let s: &str = &s;
    let (pattern, line) = s.split_once('\n').unwrap_or((s, ""));

    let Ok(schema) = Schema::from_json(&json!({
        "a": "keyword",
        "b": "long",
        "c.d": "ip",
        "e": "date",
        "f": "url"
    })) else {
        return;
    };
    let Ok(registry) = ParserRegistry::with_builtins() else {
        return;
    };
    let logpar = Logpar::new(schema, registry);
    if let Ok(parser) = logpar.build(pattern) {
        let _ = parser.run(line);
        for index in [1, line.len() / 2, line.len() + 1] {
            let _ = parser.parse(line, index);
        }
    }
});
