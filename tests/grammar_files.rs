//! Grammars authored as JSON and YAML documents

use hilite::grammar::GrammarSpec;
use hilite::testing::assert_tokens;
use hilite::{GrammarError, GrammarRegistry};

const INI_YAML: &str = r#"
remark:
  pattern: '^[;#].*'
  flags: m
  alias: comment
section:
  pattern: '^\[[^\]\r\n]+\]'
  flags: m
  alias: keyword
key:
  - pattern: '(^|\n)\w+(?=\s*=)'
    lookbehind: true
value:
  pattern: '=.*'
  inside:
    operator: '^='
    string: '"[^"]*"'
rest: lua
"#;

#[test]
fn test_yaml_grammar_tokenizes() {
    let mut registry = GrammarRegistry::with_defaults().unwrap();
    registry.define_from_yaml("ini", INI_YAML).unwrap();

    let tokens = registry
        .tokenize("; settings\n[core]\nname = \"hilite\"\n", "ini")
        .unwrap();
    assert_tokens(&tokens)
        .kinds(&["comment", "keyword", "key", "value"])
        .item(2, |t| t.kind("keyword").name("section").text("[core]"))
        .item(6, |t| {
            t.kind("value")
                .text("= \"hilite\"")
                .children(|c| c.kinds(&["operator", "string"]))
        });
}

#[test]
fn test_yaml_rest_reaches_lua() {
    let mut registry = GrammarRegistry::with_defaults().unwrap();
    registry.define_from_yaml("ini", INI_YAML).unwrap();

    // rest entries fill in for tokens the grammar does not know
    let grammar = registry.resolve("ini").unwrap();
    assert_eq!(grammar.rest(), Some(&hilite::GrammarRef::named("lua")));
    assert_tokens(&registry.tokenize("[a] local", "ini").unwrap()).kinds(&["keyword", "keyword"]);
}

#[test]
fn test_rest_replaces_entries_of_the_same_name() {
    let mut registry = GrammarRegistry::with_defaults().unwrap();
    registry
        .define_from_yaml("notes", "comment: '^;.*'\nrest: lua\n")
        .unwrap();

    // lua's comment rules take over the "comment" entry
    assert_tokens(&registry.tokenize("; x -- y", "notes").unwrap())
        .kinds(&["punctuation", "comment"])
        .item(2, |t| t.kind("comment").text("-- y"));
}

#[test]
fn test_json_grammar_keeps_priority_order() {
    let mut registry = GrammarRegistry::new();
    registry
        .define_from_json(
            "todo",
            r#"{
                "marker": {"pattern": "\\b(?:TODO|FIXME)\\b", "alias": "important"},
                "word": "\\w+"
            }"#,
        )
        .unwrap();

    assert_tokens(&registry.tokenize("fix TODO now", "todo").unwrap())
        .kinds(&["word", "important", "word"]);
}

#[test]
fn test_json_and_yaml_compile_to_the_same_grammar() {
    let json = GrammarSpec::from_json(
        r#"{"number": {"pattern": "\\d+", "greedy": true}, "word": ["\\w+", "\\S"]}"#,
    )
    .unwrap();
    let yaml = GrammarSpec::from_yaml(
        "number:\n  pattern: '\\d+'\n  greedy: true\nword:\n  - '\\w+'\n  - '\\S'\n",
    )
    .unwrap();

    assert_eq!(json, yaml);
    assert_eq!(
        json.compile(1_000).unwrap(),
        yaml.compile(1_000).unwrap()
    );
}

#[test]
fn test_malformed_pattern_is_reported() {
    let err = GrammarSpec::from_json(r#"{"broken": "(unclosed"}"#)
        .unwrap()
        .compile(1_000)
        .unwrap_err();
    assert!(
        matches!(&err, GrammarError::MalformedPattern { pattern, .. } if pattern == "(unclosed"),
        "unexpected error: {err}"
    );
}

#[test]
fn test_unknown_rule_field_is_rejected() {
    let err = GrammarSpec::from_yaml("word:\n  pattern: '\\w+'\n  greedyy: true\n").unwrap_err();
    assert!(matches!(err, GrammarError::InvalidDefinition(_)));
}

#[test]
fn test_non_mapping_document_is_rejected() {
    let err = GrammarSpec::from_json("[1, 2, 3]").unwrap_err();
    assert!(matches!(err, GrammarError::InvalidDefinition(_)));
    assert!(err.to_string().contains("grammar mapping"));
}

#[test]
fn test_failed_definition_leaves_registry_untouched() {
    let mut registry = GrammarRegistry::new();
    registry.define_from_json("x", r#"{"a": "a"}"#).unwrap();
    assert!(registry.define_from_json("x", r#"{"a": "("}"#).is_err());
    assert_tokens(&registry.tokenize("a", "x").unwrap()).kinds(&["a"]);
}
