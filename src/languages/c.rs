//! C, derived from `clike`
//!
//! Built in three registry steps: extend `clike` with C comments, types and
//! operators, insert the preprocessor rules before `string`, then drop
//! `boolean`, which C does not have as keywords.

use super::{clike, keywords};
use crate::error::GrammarError;
use crate::grammar::{Grammar, GrammarRef, Rule};
use crate::registry::GrammarRegistry;

pub const NAME: &str = "c";

const KEYWORDS: &str = "__attribute__|_Alignas|_Alignof|_Atomic|_Bool|_Complex|_Generic|_Imaginary|_Noreturn|_Static_assert|_Thread_local|asm|typeof|inline|auto|break|case|char|const|continue|default|do|double|else|enum|extern|float|for|goto|if|int|long|register|return|short|signed|sizeof|static|struct|switch|typedef|union|unsigned|void|volatile|while";

const CONSTANTS: &str = "__FILE__|__LINE__|__DATE__|__TIME__|__TIMESTAMP__|__func__|EOF|NULL|SEEK_CUR|SEEK_END|SEEK_SET|stdin|stdout|stderr";

pub fn register(registry: &mut GrammarRegistry) -> Result<(), GrammarError> {
    registry.extend(NAME, clike::NAME, overrides()?)?;
    registry.insert_before(NAME, "string", preprocessor()?)?;
    registry.remove_token(NAME, "boolean")?;
    Ok(())
}

fn overrides() -> Result<Grammar, GrammarError> {
    Ok(Grammar::builder()
        .rule("comment", comment()?)
        .rule(
            "class-name",
            Rule::parse(r"(\b(?:enum|struct)\s+(?:__attribute__\s*\(\([\s\S]*?\)\)\s*)?)\w+")?
                .lookbehind(),
        )
        .rule("keyword", Rule::parse(&keywords(KEYWORDS))?)
        .rule("function", Rule::parse_with_flags(r"[a-z_]\w*(?=\s*\()", "i")?)
        .rule(
            "operator",
            Rule::parse(r">>=?|<<=?|->|([-+&|:])\1|[?:~]|[-+*/%&|^!=<>]=?")?,
        )
        .rule(
            "number",
            Rule::parse_with_flags(
                r"(?:\b0x(?:[\da-f]+\.?[\da-f]*|\.[\da-f]+)(?:p[+-]?\d+)?|(?:\b\d+\.?\d*|\B\.\d+)(?:e[+-]?\d+)?)[ful]*",
                "i",
            )?,
        )
        .build())
}

fn comment() -> Result<Rule, GrammarError> {
    Ok(
        Rule::parse(r"//(?:[^\r\n\\]|\\(?:\r\n?|\n|(?![\r\n])))*|/\*[\s\S]*?(?:\*/|$)")?
            .greedy(),
    )
}

/// `macro` and `constant`, placed ahead of `string`
fn preprocessor() -> Result<Grammar, GrammarError> {
    let directive = Grammar::builder()
        .rules(
            "string",
            vec![
                Rule::parse(r"^(#\s*include\s*)<[^>]+>")?.lookbehind(),
                clike::string()?,
            ],
        )
        .rule("comment", comment()?)
        .rule(
            "directive",
            Rule::parse(r"^(#\s*)[a-z]+")?
                .lookbehind()
                .alias("keyword"),
        )
        .rule("directive-hash", Rule::parse(r"^#")?)
        .rule("punctuation", Rule::parse(r"##|\\(?=[\r\n])")?)
        .rule(
            "expression",
            Rule::parse(r"\S[\s\S]*")?.inside(GrammarRef::named(NAME)),
        )
        .build();

    Ok(Grammar::builder()
        .rule(
            "macro",
            Rule::parse_with_flags(
                r"(^\s*)#\s*[a-z]+(?:[^\r\n\\/]|/(?!\*)|/\*(?:[^*]|\*(?!/))*\*/|\\(?:\r\n|[\s\S]))*",
                "im",
            )?
            .lookbehind()
            .greedy()
            .alias("property")
            .inside(directive),
        )
        .rule("constant", Rule::parse(&keywords(CONSTANTS))?)
        .build())
}
