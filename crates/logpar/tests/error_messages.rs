//! Snapshots of the messages users see when a schema, registry or pattern is
//! rejected, or when a line does not match.

use expect_test::{Expect, expect};
use logpar::{Logpar, ParserRegistry, ParserType, Schema};
use serde_json::{Value, json};

fn check_schema(schema: Value, expect: Expect) {
    let err = Schema::from_json(&schema).unwrap_err();
    expect.assert_eq(&err.to_string());
}

fn check_build(pattern: &str, expect: Expect) {
    let schema = Schema::from_json(&json!({"a": "long", "name": "keyword"})).unwrap();
    let logpar = Logpar::new(schema, ParserRegistry::with_builtins().unwrap());
    let err = logpar.build(pattern).unwrap_err();
    expect.assert_eq(&err.to_string());
}

#[test]
fn schema_errors() {
    check_schema(json!("ip"), expect!["Schema must be an object"]);
    check_schema(json!({}), expect!["Schema must not be empty"]);
    check_schema(
        json!({"a": 1}),
        expect!["Schema field 'a' must be a string with the name of the type"],
    );
    check_schema(
        json!({"a": "wat"}),
        expect!["Type 'wat' in schema field 'a' is not supported"],
    );
}

#[test]
fn registry_errors() {
    let mut registry = ParserRegistry::with_builtins().unwrap();
    let err = registry
        .register(ParserType::Ip, |_, _: &[String]| unreachable!())
        .unwrap_err();
    expect!["Parser type 'ip' already registered"].assert_eq(&err.to_string());
}

#[test]
fn build_errors() {
    check_build("<a> <b>", expect!["Field 'b' not found in schema"]);
    check_build("<~x/nope>", expect!["Parser type 'nope' not found"]);
    check_build("<~x/xml>", expect!["Parser type 'xml' is not registered"]);
    check_build(
        "<a> ?",
        expect!["Invalid pattern '<a> ?': Expected EOF, found '?' at offset 4"],
    );
    check_build(
        "<?a>?<name>",
        expect!["Invalid pattern '<?a>?<name>': Expected field, found optional field 'a' at offset 0"],
    );
    check_build("", expect!["Empty pattern"]);
    check_build(
        "<name><a>",
        expect![
            "Invalid arguments for parser 'text': a text field must be followed by a literal or end the pattern"
        ],
    );
    check_build(
        "<~d/date/%Q>",
        expect!["Invalid arguments for parser 'date': invalid date format '%Q'"],
    );
    check_build(
        "<~n/long/extra>",
        expect!["Invalid arguments for parser 'long': expected no arguments, got 1"],
    );
}

#[test]
fn match_failures() {
    let schema = Schema::from_json(&json!({"src.ip": "ip", "n": "byte"})).unwrap();
    let logpar = Logpar::new(schema, ParserRegistry::with_builtins().unwrap());

    let parser = logpar.build("<src.ip> <n>").unwrap();
    expect!["ip: expected an address at offset 0"]
        .assert_eq(&parser.run("host 1").unwrap_err().to_string());
    expect!["byte: '300' is out of range at offset 9"]
        .assert_eq(&parser.run("10.0.0.1 300").unwrap_err().to_string());
    expect!["Expected ' ', found '-' at offset 8"]
        .assert_eq(&parser.run("10.0.0.1-1").unwrap_err().to_string());
}
