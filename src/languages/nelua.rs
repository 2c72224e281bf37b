//! Nelua: Lua syntax plus preprocessor blocks, type annotations and a few
//! extra keywords
//!
//! Preprocessor blocks hold Lua code. Their sub-grammars only classify the
//! block delimiters and pull in the `lua` grammar through `rest`.

use super::{keywords, lua, LUA_STRING};
use crate::error::GrammarError;
use crate::grammar::{Grammar, GrammarRef, Rule};

pub const NAME: &str = "nelua";

const KEYWORDS: &str = "and|break|do|else|elseif|end|for|function|goto|if|in|local|not|or|repeat|return|then|until|while|switch|case|continue|fallthrough|global|defer";

pub fn grammar() -> Result<Grammar, GrammarError> {
    Ok(Grammar::builder()
        .rules("preprocessor", preprocessor()?)
        .rule("comment", lua::comment()?)
        .rule("special", Rule::parse(r"\bself\b")?)
        .rule("builtin", Rule::parse(&keywords("false|true|nil|nilptr"))?)
        .rule("keyword", Rule::parse(&keywords(KEYWORDS))?)
        .rules(
            "type",
            vec![
                Rule::parse(r"(@)\w+")?.lookbehind(),
                Rule::parse(r"(:)\s+\w+")?.lookbehind(),
            ],
        )
        .rule("function", lua::function()?)
        .rule(
            "annotation",
            Rule::parse(r"<\w+\s*(,\s*\w+\s*)*>")?.inside(GrammarRef::named(lua::NAME)),
        )
        .rule("string", Rule::parse(LUA_STRING)?.greedy())
        .rule(
            "number",
            Rule::parse_with_flags(
                r"\b0x[a-f\d]+\.?[a-f\d]*(?:p[+-]?\d+)?(_\w+)?\b|\b\d+(?:\.\B|\.?\d*(?:e[+-]?\d+)?(_\w+)?\b)|\B\.\d+(?:e[+-]?\d+)?(_\w+)?\b",
                "i",
            )?,
        )
        .rules(
            "operator",
            vec![
                Rule::parse(r"[-@$+*%^&|#?]|//?|<[<=]?|>[>=]?|[=~]=?")?,
                lua::concat()?,
            ],
        )
        .rule("punctuation", lua::punctuation()?)
        .build())
}

fn preprocessor() -> Result<Vec<Rule>, GrammarError> {
    let long_block = Grammar::builder()
        .rule("macro", Rule::parse(r"##\[=*\[")?)
        .rule("macro_end", Rule::parse(r"\]=*\]")?.alias("macro"))
        .rest(GrammarRef::named(lua::NAME))
        .build();

    Ok(vec![
        Rule::parse_with_flags(r"##\[(=*)\[[\s\S]*?\]\1\]", "m")?.inside(long_block),
        Rule::parse(r"##.*")?.inside(delimited(r"##")?),
        Rule::parse_with_flags(r"#\|[\s\S]*?\|#", "m")?
            .lookbehind()
            .inside(delimited(r"#\||\|#")?),
        Rule::parse_with_flags(r"#\[[\s\S]*?\]#", "m")?
            .lookbehind()
            .inside(delimited(r"#\[|\]#")?),
    ])
}

/// Lua code between preprocessor delimiters matching `delimiter`
fn delimited(delimiter: &str) -> Result<Grammar, GrammarError> {
    Ok(Grammar::builder()
        .rule("macro", Rule::parse(delimiter)?)
        .rest(GrammarRef::named(lua::NAME))
        .build())
}
