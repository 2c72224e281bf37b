//! Property-based tests for the tokenizer
//!
//! Whatever the input and grammar, the token tree must cover the input
//! exactly once, spans must be contiguous at every level, and tokenizing
//! twice must give the same tree.

use hilite::grammar::{Grammar, GrammarRef, Rule};
use hilite::tokenizer::{flatten_text, Detached, Token, TokenContent, Tokenizer};
use hilite::GrammarRegistry;
use proptest::prelude::*;
use std::ops::Range;

/// Check that `tokens` tile `span` of `input` and that every token's text
/// is the input slice its span points at.
fn check_tiling(tokens: &[Token], input: &str, span: Range<usize>) -> Result<(), String> {
    let mut cursor = span.start;
    for token in tokens {
        if token.span.start != cursor {
            return Err(format!("gap or overlap at {cursor}: {:?}", token.span));
        }
        if token.span.is_empty() {
            return Err(format!("empty token at {cursor}"));
        }
        if token.text() != input[token.span.clone()] {
            return Err(format!("text mismatch for {:?}", token.span));
        }
        if !token.is_classified() && !matches!(token.content, TokenContent::Text(_)) {
            return Err(format!("unclassified token with children at {cursor}"));
        }
        if let TokenContent::Nested(children) = &token.content {
            check_tiling(children, input, token.span.clone())?;
        }
        cursor = token.span.end;
    }
    if cursor != span.end && !(tokens.is_empty() && span.is_empty()) {
        return Err(format!("tokens end at {cursor}, expected {}", span.end));
    }
    Ok(())
}

fn defaults() -> GrammarRegistry {
    GrammarRegistry::with_defaults().expect("bundled grammars compile")
}

/// Source-like text: identifiers, numbers, quotes, brackets, comment
/// markers and newlines mixed together
fn source_strategy() -> impl Strategy<Value = String> {
    let fragment = prop_oneof![
        "[a-zA-Z_][a-zA-Z0-9_]{0,8}",
        "[0-9]{1,4}(\\.[0-9]{1,3})?",
        Just(" ".to_string()),
        Just("\n".to_string()),
        Just("\"".to_string()),
        Just("'".to_string()),
        Just("--".to_string()),
        Just("//".to_string()),
        Just("/*".to_string()),
        Just("*/".to_string()),
        Just("#".to_string()),
        Just("$".to_string()),
        Just("$(".to_string()),
        Just("[[".to_string()),
        Just("]]".to_string()),
        Just("<<EOF\n".to_string()),
        "[(){}\\[\\];,.:=+*<>&|\\\\-]",
        "[éλ→]",
    ];
    prop::collection::vec(fragment, 0..40).prop_map(|parts| parts.concat())
}

/// Small grammar built from a fixed vocabulary of rules in random order,
/// with random greedy and lookbehind options
fn grammar_strategy() -> impl Strategy<Value = Grammar> {
    let vocabulary: Vec<(&'static str, &'static str)> = vec![
        ("word", r"\w+"),
        ("number", r"\d+"),
        ("string", r#""[^"]*""#),
        ("comment", r"(^|[^\\])#.*"),
        ("pair", r"\(\w*\)"),
        ("spaces", r"\s+"),
        ("maybe", r"x*"),
        ("dots", r"\.+"),
    ];
    (
        Just(vocabulary.clone()).prop_shuffle(),
        prop::collection::vec(any::<(bool, bool)>(), vocabulary.len()),
        1..=vocabulary.len(),
    )
        .prop_map(|(rules, options, count)| {
            let mut builder = Grammar::builder();
            for ((name, source), (greedy, lookbehind)) in rules.into_iter().zip(options).take(count) {
                let mut rule = Rule::parse(source).expect("vocabulary pattern compiles");
                if greedy {
                    rule = rule.greedy();
                }
                if lookbehind && source.starts_with('(') {
                    rule = rule.lookbehind();
                }
                if name == "string" {
                    let inner = Grammar::builder()
                        .rule("variable", Rule::parse(r"\$\w+").expect("compiles"))
                        .build();
                    rule = rule.inside(inner);
                }
                builder = builder.rule(name, rule);
            }
            builder.build()
        })
}

proptest! {
    #[test]
    fn test_bundled_languages_cover_input(input in source_strategy()) {
        let registry = defaults();
        for language in ["lua", "nelua", "c", "bash"] {
            let tokens = registry.tokenize(&input, language).unwrap();
            prop_assert_eq!(flatten_text(&tokens), input.clone(), "language {}", language);
            let tiling = check_tiling(&tokens, &input, 0..input.len());
            prop_assert!(tiling.is_ok(), "{}: {:?}", language, tiling);
        }
    }

    #[test]
    fn test_random_grammars_cover_input(input in source_strategy(), grammar in grammar_strategy()) {
        let tokens = Tokenizer::new(&Detached).tokenize(&input, &grammar);
        prop_assert_eq!(flatten_text(&tokens), input.clone());
        let tiling = check_tiling(&tokens, &input, 0..input.len());
        prop_assert!(tiling.is_ok(), "{:?}", tiling);
    }

    #[test]
    fn test_tokenization_is_deterministic(input in source_strategy(), grammar in grammar_strategy()) {
        let tokenizer = Tokenizer::new(&Detached);
        prop_assert_eq!(tokenizer.tokenize(&input, &grammar), tokenizer.tokenize(&input, &grammar));
    }

    #[test]
    fn test_self_referencing_grammar_terminates(depth in 0usize..6, input in "[()a ]{0,30}") {
        let mut registry = GrammarRegistry::new();
        registry.define(
            "parens",
            Grammar::builder()
                .rule(
                    "group",
                    Rule::parse(r"\([\s\S]*\)")
                        .expect("compiles")
                        .inside(GrammarRef::named("parens")),
                )
                .build(),
        );
        let config = hilite::TokenizerConfig { max_depth: depth, ..Default::default() };
        let grammar = registry.resolve("parens").unwrap();
        let tokens = Tokenizer::with_config(&registry, config).tokenize(&input, &grammar);
        prop_assert_eq!(flatten_text(&tokens), input);
    }
}
