//! Bundled language grammars
//!
//! Each submodule builds its grammar with the builder API. `c` and `bash`
//! register themselves because they are assembled from registry operations
//! (extend, insert, remove, alias) rather than declared in one piece.

pub mod bash;
pub mod c;
pub mod clike;
pub mod lua;
pub mod nelua;

use crate::error::GrammarError;
use crate::registry::GrammarRegistry;

/// Quoted and long-bracket strings, shared by Lua and Nelua
pub(crate) const LUA_STRING: &str = r#"(["'])(?:(?!\1)[^\\\r\n]|\\z(?:\r\n|\s)|\\(?:\r\n|[\s\S]))*\1|\[(=*)\[[\s\S]*?\]\2\]"#;

/// Register every bundled language
pub fn register_all(registry: &mut GrammarRegistry) -> Result<(), GrammarError> {
    registry.define(lua::NAME, lua::grammar()?);
    registry.define(nelua::NAME, nelua::grammar()?);
    registry.define(clike::NAME, clike::grammar()?);
    c::register(registry)?;
    bash::register(registry)?;
    Ok(())
}

/// Language for a file extension, without the leading dot
pub fn for_extension(extension: &str) -> Option<&'static str> {
    match extension.to_ascii_lowercase().as_str() {
        "lua" => Some(lua::NAME),
        "nelua" => Some(nelua::NAME),
        "c" | "h" => Some(c::NAME),
        "sh" | "bash" => Some(bash::NAME),
        _ => None,
    }
}

/// `|`-separated words as a regex alternation, each word escaped
pub(crate) fn alternation(words: &str) -> String {
    words
        .split('|')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join("|")
}

/// Whole-word match of any of the `|`-separated words
pub(crate) fn keywords(words: &str) -> String {
    format!(r"\b(?:{})\b", alternation(words))
}
