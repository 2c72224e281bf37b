//! Base grammar shared by C-family languages

use super::keywords;
use crate::error::GrammarError;
use crate::grammar::{Grammar, Rule};

pub const NAME: &str = "clike";

pub fn grammar() -> Result<Grammar, GrammarError> {
    let class_name_inside = Grammar::builder()
        .rule("punctuation", Rule::parse(r"[.\\]")?)
        .build();

    Ok(Grammar::builder()
        .rules(
            "comment",
            vec![
                Rule::parse(r"(^|[^\\])/\*[\s\S]*?(?:\*/|$)")?.lookbehind(),
                Rule::parse(r"(^|[^\\:])//.*")?.lookbehind().greedy(),
            ],
        )
        .rule("string", string()?)
        .rule(
            "class-name",
            Rule::parse_with_flags(
                r"(\b(?:class|interface|extends|implements|trait|instanceof|new)\s+|\bcatch\s+\()[\w.\\]+",
                "i",
            )?
            .lookbehind()
            .inside(class_name_inside),
        )
        .rule(
            "keyword",
            Rule::parse(&keywords(
                "if|else|while|do|for|return|in|instanceof|function|new|try|throw|catch|finally|null|break|continue",
            ))?,
        )
        .rule("boolean", Rule::parse(&keywords("true|false"))?)
        .rule("function", Rule::parse(r"\w+(?=\()")?)
        .rule(
            "number",
            Rule::parse_with_flags(r"\b0x[\da-f]+\b|(?:\b\d+\.?\d*|\B\.\d+)(?:e[+-]?\d+)?", "i")?,
        )
        .rule(
            "operator",
            Rule::parse(r"[<>]=?|[!=]=?=?|--?|\+\+?|&&?|\|\|?|[?*/~^%]")?,
        )
        .rule("punctuation", Rule::parse(r"[{}\[\];(),.:]")?)
        .build())
}

/// Single or double quoted string with escapes
pub(crate) fn string() -> Result<Rule, GrammarError> {
    Ok(Rule::parse(r#"(["'])(?:\\(?:\r\n|[\s\S])|(?!\1)[^\\\r\n])*\1"#)?.greedy())
}
