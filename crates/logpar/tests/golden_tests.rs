use logpar::{Logpar, ParserRegistry, Schema};
use serde_json::{Value, json};
use std::fs;
use std::path::Path;

fn run_case(case: &Value) -> Value {
    let schema = Schema::from_json(&case["schema"]).expect("Invalid schema in fixture");
    let pattern = case["pattern"].as_str().expect("Fixture has no pattern");
    let logpar = Logpar::new(schema, ParserRegistry::with_builtins().unwrap());
    let parser = logpar.build(pattern).expect("Fixture pattern does not compile");

    let lines = case["lines"].as_array().expect("Fixture has no lines");
    let results = lines
        .iter()
        .map(|line| {
            let line = line.as_str().expect("Fixture lines must be strings");
            match parser.run(line) {
                Ok(success) => json!({"line": line, "document": success.value}),
                Err(failure) => json!({
                    "line": line,
                    "error": {"message": failure.message, "index": failure.index}
                }),
            }
        })
        .collect();
    Value::Array(results)
}

#[test]
fn run_golden_tests() {
    let fixtures_dir = Path::new("tests/fixtures");
    if !fixtures_dir.exists() {
        // Skip if no fixtures
        return;
    }

    for entry in fs::read_dir(fixtures_dir).unwrap() {
        let path = entry.unwrap().path();
        let is_case = path.extension().is_some_and(|ext| ext == "json")
            && !path.to_string_lossy().ends_with(".golden.json");
        if !is_case {
            continue;
        }

        let case: Value =
            serde_json::from_str(&fs::read_to_string(&path).expect("Failed to read fixture"))
                .expect("Fixture is not JSON");
        let actual = run_case(&case);
        let golden_path = path.with_extension("golden.json");

        if std::env::var("UPDATE_GOLDEN").is_ok() {
            let json_output =
                serde_json::to_string_pretty(&actual).expect("Failed to serialize results");
            fs::write(&golden_path, json_output + "\n").expect("Failed to update golden file");
        } else {
            let expected = fs::read_to_string(&golden_path)
                .expect("Failed to read golden file (run with UPDATE_GOLDEN=1 to create)");
            let expected: Value = serde_json::from_str(&expected).expect("Golden file is not JSON");
            assert_eq!(actual, expected, "Golden test failed for {:?}", path);
        }
    }
}
