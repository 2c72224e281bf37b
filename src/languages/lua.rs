//! Lua

use super::{keywords, LUA_STRING};
use crate::error::GrammarError;
use crate::grammar::{Grammar, Rule};

pub const NAME: &str = "lua";

const KEYWORDS: &str = "and|break|do|else|elseif|end|for|function|goto|if|in|local|not|or|repeat|return|then|until|while";

pub fn grammar() -> Result<Grammar, GrammarError> {
    Ok(Grammar::builder()
        .rule("comment", comment()?)
        .rule("special", Rule::parse(r"\bself\b")?)
        .rule("builtin", Rule::parse(&keywords("false|true|nil"))?)
        .rule("keyword", Rule::parse(&keywords(KEYWORDS))?)
        .rule("function", function()?)
        .rule("string", Rule::parse(LUA_STRING)?.greedy())
        .rule(
            "number",
            Rule::parse_with_flags(
                r"\b0x[a-f\d]+\.?[a-f\d]*(?:p[+-]?\d+)?\b|\b\d+(?:\.\B|\.?\d*(?:e[+-]?\d+)?\b)|\B\.\d+(?:e[+-]?\d+)?\b",
                "i",
            )?,
        )
        .rules(
            "operator",
            vec![
                Rule::parse(r"[-+*%^&|#]|//?|<[<=]?|>[>=]?|[=~]=?")?,
                concat()?,
            ],
        )
        .rule("punctuation", punctuation()?)
        .build())
}

/// Shebang line, long comments and line comments
pub(crate) fn comment() -> Result<Rule, GrammarError> {
    Rule::parse_with_flags(r"^#!.+|--(?:\[(=*)\[[\s\S]*?\]\1\]|.*)", "m")
}

/// Identifier directly followed by a call
pub(crate) fn function() -> Result<Rule, GrammarError> {
    Rule::parse(r#"(?!\d)\w+(?=\s*(?:[({'"]))"#)
}

/// `..` without breaking up `...`
pub(crate) fn concat() -> Result<Rule, GrammarError> {
    Ok(Rule::parse(r"(^|[^.])\.\.(?!\.)")?.lookbehind())
}

pub(crate) fn punctuation() -> Result<Rule, GrammarError> {
    Rule::parse(r"[\[\](){},;]|\.+|:+")
}
