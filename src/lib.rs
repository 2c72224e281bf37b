//! # hilite
//!
//! A declarative, regex-driven tokenizer for syntax highlighting.
//!
//! A [`Grammar`] is an ordered list of named rules. The [`Tokenizer`] walks
//! the input once per nesting level, classifies the spans the rules match,
//! and tokenizes matched spans again with a rule's `inside` grammar. The
//! result is a tree of [`Token`]s whose text, concatenated, is exactly the
//! input.
//!
//! Grammars live in a [`GrammarRegistry`], which supports deriving one
//! language from another (`extend`, `insert_before`, `insert_after`) and
//! resolves grammars referenced by name while tokenizing. A process-wide
//! registry with the bundled languages is available through
//! [`registry::global`] and the [`highlight`] shortcut.
//!
//! ## Testing
//!
//! The [testing module](testing) provides a fluent assertion API for token
//! streams.

pub mod config;
pub mod error;
pub mod formats;
pub mod grammar;
pub mod languages;
pub mod registry;
pub mod testing;
pub mod tokenizer;

pub use error::GrammarError;
pub use grammar::{Grammar, GrammarRef, Pattern, Rule};
pub use registry::GrammarRegistry;
pub use tokenizer::{Token, TokenContent, Tokenizer, TokenizerConfig};

use std::sync::PoisonError;

/// Tokenize `text` with `grammar`, resolving named references through the
/// process-wide registry.
pub fn tokenize(text: &str, grammar: &Grammar) -> Vec<Token> {
    Tokenizer::new(&registry::Global).tokenize(text, grammar)
}

/// Tokenize `text` with a language from the process-wide registry
pub fn highlight(text: &str, language: &str) -> Result<Vec<Token>, GrammarError> {
    let grammar = registry::global()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .resolve(language)?;
    Ok(tokenize(text, &grammar))
}
