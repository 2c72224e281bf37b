//! Errors raised while building, registering and resolving grammars
//!
//! Tokenization itself never fails: text that no rule matches simply stays
//! unclassified. Everything that can go wrong happens before that, when a
//! pattern is compiled or a grammar is looked up.

use std::fmt;

/// Error type for grammar and registry operations
#[derive(Debug, Clone, PartialEq)]
pub enum GrammarError {
    /// No grammar is registered under this language name
    UnknownGrammar(String),
    /// The grammar exists but has no entry with this token name
    UnknownToken { grammar: String, token: String },
    /// A rule's pattern failed to compile
    MalformedPattern { pattern: String, message: String },
    /// A grammar definition file could not be read into a grammar
    InvalidDefinition(String),
}

impl fmt::Display for GrammarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrammarError::UnknownGrammar(name) => write!(f, "Grammar '{name}' is not registered"),
            GrammarError::UnknownToken { grammar, token } => {
                write!(f, "Grammar '{grammar}' has no token named '{token}'")
            }
            GrammarError::MalformedPattern { pattern, message } => {
                write!(f, "Malformed pattern /{pattern}/: {message}")
            }
            GrammarError::InvalidDefinition(msg) => write!(f, "Invalid grammar definition: {msg}"),
        }
    }
}

impl std::error::Error for GrammarError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grammar_error_display() {
        let err = GrammarError::UnknownGrammar("lua".to_string());
        assert_eq!(format!("{err}"), "Grammar 'lua' is not registered");

        let err = GrammarError::UnknownToken {
            grammar: "c".to_string(),
            token: "boolean".to_string(),
        };
        assert_eq!(format!("{err}"), "Grammar 'c' has no token named 'boolean'");

        let err = GrammarError::MalformedPattern {
            pattern: "(a".to_string(),
            message: "unclosed group".to_string(),
        };
        assert_eq!(format!("{err}"), "Malformed pattern /(a/: unclosed group");

        let err = GrammarError::InvalidDefinition("expected a map".to_string());
        assert_eq!(
            format!("{err}"),
            "Invalid grammar definition: expected a map"
        );
    }
}
