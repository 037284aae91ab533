use logpar::{Document, Logpar, LogparError, Parser, ParserRegistry, Schema};
use serde_json::{Value, json};

fn compile(schema: Value, pattern: &str) -> Parser<Document> {
    let schema = Schema::from_json(&schema).expect("valid schema");
    let registry = ParserRegistry::with_builtins().expect("builtins register once");
    Logpar::new(schema, registry)
        .build(pattern)
        .expect("pattern compiles")
}

fn doc(parser: &Parser<Document>, line: &str) -> Value {
    parser
        .run(line)
        .unwrap_or_else(|e| panic!("'{line}' did not match: {e}"))
        .value
        .into_value()
}

#[test]
fn test_round_trip_scenario() {
    let parser = compile(
        json!({"src.ip": "ip", "user.name": "keyword"}),
        "<src.ip> - <user.name>",
    );

    assert_eq!(
        doc(&parser, "10.0.0.1 - alice"),
        json!({"src": {"ip": "10.0.0.1"}, "user": {"name": "alice"}})
    );
    assert!(parser.run("not-an-ip - alice").is_err());
}

#[test]
fn test_discard_scenario() {
    let parser = compile(json!({"dst.ip": "ip"}), "<~> <dst.ip>");
    assert_eq!(
        doc(&parser, "ignored 8.8.8.8"),
        json!({"dst": {"ip": "8.8.8.8"}})
    );
}

#[test]
fn test_optional_field_absence_is_not_fatal() {
    let parser = compile(json!({"code": "long"}), "status <?code>;done");
    assert_eq!(doc(&parser, "status 200;done"), json!({"code": 200}));
    assert_eq!(doc(&parser, "status ;done"), json!({}));
}

#[test]
fn test_choice_takes_left_when_both_match() {
    // Both sides accept "123"; the left one must win.
    let parser = compile(
        json!({"port": "long", "service": "keyword"}),
        "to <port>?<service>",
    );
    assert_eq!(doc(&parser, "to 123"), json!({"port": 123}));
    assert_eq!(doc(&parser, "to ssh"), json!({"service": "ssh"}));
}

#[test]
fn test_backtracking_restarts_from_original_cursor() {
    // The group consumes ".2.3" before failing on 'y'; the next field must
    // start right after the first number.
    let parser = compile(
        json!({"a": "long", "b": "keyword"}),
        "<a>(?.<a>.<a>x)<~rest>",
    );
    assert_eq!(
        doc(&parser, "1.2.3y"),
        json!({"a": 1, "~rest": ".2.3y"})
    );
}

#[test]
fn test_group_resumes_at_pre_group_cursor() {
    let parser = compile(
        json!({"method": "keyword", "bytes": "long"}),
        "<method> (?sent <bytes> bytes )end",
    );
    assert_eq!(
        doc(&parser, "GET sent 512 bytes end"),
        json!({"method": "GET", "bytes": 512})
    );
    assert_eq!(doc(&parser, "GET end"), json!({"method": "GET"}));
    // Group fails halfway ("sent" then no number); nothing from it survives.
    assert!(parser.run("GET sent many bytes end").is_err());
}

#[test]
fn test_nested_groups() {
    let parser = compile(
        json!({"a": "long", "b": "long", "c": "long"}),
        "<a>(?,<b>(?,<c>))",
    );
    assert_eq!(doc(&parser, "1,2,3"), json!({"a": 1, "b": 2, "c": 3}));
    assert_eq!(doc(&parser, "1,2"), json!({"a": 1, "b": 2}));
    assert_eq!(doc(&parser, "1"), json!({"a": 1}));
}

#[test]
fn test_full_consumption_is_required() {
    let parser = compile(json!({"n": "long"}), "n=<n>");
    assert!(parser.run("n=5").is_ok());
    let err = parser.run("n=5 trailing").unwrap_err();
    assert_eq!(err.index, 3);
    assert!(err.message.starts_with("Expected EOF"));
}

#[test]
fn test_determinism() {
    let parser = compile(
        json!({"src.ip": "ip", "user.name": "keyword"}),
        "<src.ip> - <user.name>",
    );
    for line in ["10.0.0.1 - alice", "bogus - bob"] {
        assert_eq!(parser.run(line), parser.run(line));
    }
}

#[test]
fn test_schema_binding_errors_name_the_culprit() {
    let schema = Schema::from_json(&json!({"a": "long"})).unwrap();
    let logpar = Logpar::new(schema, ParserRegistry::with_builtins().unwrap());

    let err = logpar.build("<a> <b.c>").unwrap_err();
    assert_eq!(err, LogparError::UnknownField("b.c".to_string()));
    assert!(err.to_string().contains("b.c"));

    let err = logpar.build("<~x/csv>").unwrap_err();
    assert!(err.to_string().contains("csv"));
}

#[test]
fn test_schema_must_be_a_non_empty_object() {
    let registry = ParserRegistry::with_builtins().unwrap();
    assert_eq!(
        Logpar::from_schema_json(&json!([]), registry.clone()).unwrap_err(),
        LogparError::SchemaNotObject
    );
    assert_eq!(
        Logpar::from_schema_json(&json!({}), registry.clone()).unwrap_err(),
        LogparError::EmptySchema
    );
    assert!(matches!(
        Logpar::from_schema_json(&json!({"a": "wat"}), registry).unwrap_err(),
        LogparError::UnsupportedSchemaType { .. }
    ));
}

#[test]
fn test_every_schema_type_compiles() {
    let schema = json!({
        "f.ip": "ip",
        "f.long": "long",
        "f.keyword": "keyword",
        "f.text": "text",
        "f.nested": "nested",
        "f.object": "object",
        "f.scaled": "scaled_float",
        "f.bool": "boolean",
        "f.date": "date",
        "f.float": "float",
        "f.url": "url",
        "f.ua": "user_agent",
        "f.geo": "geo_point"
    });
    let schema = Schema::from_json(&schema).unwrap();
    let logpar = Logpar::new(schema.clone(), ParserRegistry::with_builtins().unwrap());
    for field in [
        "f.ip", "f.long", "f.keyword", "f.text", "f.nested", "f.object", "f.scaled", "f.bool",
        "f.date", "f.float", "f.url", "f.ua", "f.geo",
    ] {
        assert!(schema.contains(field));
        let pattern = format!("<{field}>");
        assert!(logpar.build(&pattern).is_ok(), "{pattern} did not compile");
    }
}

#[test]
fn test_escaped_glyphs_in_literals() {
    let parser = compile(json!({"n": "long"}), r"\<\(<n>\)>");
    assert_eq!(doc(&parser, "<(7)>"), json!({"n": 7}));
}

#[test]
fn test_quoted_and_uri_fields() {
    let parser = compile(
        json!({"url.full": "url"}),
        r#"<~msg/quoted> <url.full>"#,
    );
    assert_eq!(
        doc(&parser, r#""hello \"world\"" http://example.org/x"#),
        json!({
            "~msg": "hello \"world\"",
            "url": {"full": {
                "original": "http://example.org/x",
                "scheme": "http",
                "domain": "example.org",
                "path": "/x"
            }}
        })
    );
}

#[test]
fn test_values_followed_by_sentence_punctuation() {
    let parser = compile(json!({"src.ip": "ip"}), "connection from <src.ip>.");
    assert_eq!(
        doc(&parser, "connection from 10.0.0.1."),
        json!({"src": {"ip": "10.0.0.1"}})
    );

    let parser = compile(json!({"took": "float"}), "took <took>.");
    assert_eq!(doc(&parser, "took 5."), json!({"took": 5.0}));
    assert_eq!(doc(&parser, "took 2.5."), json!({"took": 2.5}));
}
