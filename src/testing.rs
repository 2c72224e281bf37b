//! Fluent assertion API for token streams
//!
//! ```ignore
//! assert_tokens(&tokens)
//!     .count(3)
//!     .item(0, |t| t.kind("keyword").text("local"))
//!     .item(1, |t| t.plain(" "))
//!     .item(2, |t| t.kind("string").children(|c| c.count(2)));
//! ```
//!
//! Failures name the path of the offending token (`tokens[2].children[0]`)
//! and summarize its siblings.

use crate::tokenizer::{Token, TokenContent};
use std::ops::Range;

// ============================================================================
// Entry Point
// ============================================================================

/// Create an assertion builder for a token sequence
pub fn assert_tokens(tokens: &[Token]) -> TokensAssertion<'_> {
    TokensAssertion {
        tokens,
        context: "tokens".to_string(),
    }
}

// ============================================================================
// Sequence Assertions
// ============================================================================

pub struct TokensAssertion<'a> {
    tokens: &'a [Token],
    context: String,
}

impl<'a> TokensAssertion<'a> {
    /// Assert the number of tokens in the sequence
    pub fn count(self, expected: usize) -> Self {
        assert_eq!(
            self.tokens.len(),
            expected,
            "{}: Expected {} tokens, found {}: [{}]",
            self.context,
            expected,
            self.tokens.len(),
            summarize(self.tokens)
        );
        self
    }

    /// Assert on a specific token by index
    pub fn item<F, R>(self, index: usize, assertion: F) -> Self
    where
        F: FnOnce(TokenAssertion<'a>) -> R,
    {
        assert!(
            index < self.tokens.len(),
            "{}: Token index {} out of bounds ({} tokens: [{}])",
            self.context,
            index,
            self.tokens.len(),
            summarize(self.tokens)
        );
        assertion(TokenAssertion {
            token: &self.tokens[index],
            context: format!("{}[{}]", self.context, index),
        });
        self
    }

    /// Assert the concatenated text of the sequence
    pub fn text(self, expected: &str) -> Self {
        let actual = crate::tokenizer::flatten_text(self.tokens);
        assert_eq!(actual, expected, "{}: text mismatch", self.context);
        self
    }

    /// Assert the reported kinds of the classified tokens, in order
    pub fn kinds(self, expected: &[&str]) -> Self {
        let actual: Vec<&str> = self.tokens.iter().filter_map(Token::kind).collect();
        assert_eq!(actual, expected, "{}: kinds mismatch", self.context);
        self
    }
}

// ============================================================================
// Token Assertions
// ============================================================================

pub struct TokenAssertion<'a> {
    token: &'a Token,
    context: String,
}

impl<'a> TokenAssertion<'a> {
    /// Assert the reported kind (alias, else rule name)
    pub fn kind(self, expected: &str) -> Self {
        assert_eq!(
            self.token.kind(),
            Some(expected),
            "{}: Expected kind '{}', found {:?} ({:?})",
            self.context,
            expected,
            self.token.kind(),
            self.token.text()
        );
        self
    }

    /// Assert the rule name, regardless of any alias
    pub fn name(self, expected: &str) -> Self {
        assert_eq!(
            self.token.name.as_deref(),
            Some(expected),
            "{}: Expected rule name '{}'",
            self.context,
            expected
        );
        self
    }

    /// Assert the token is unclassified text with the given content
    pub fn plain(self, expected: &str) -> Self {
        assert!(
            !self.token.is_classified(),
            "{}: Expected plain text, found {:?}",
            self.context,
            self.token.kind()
        );
        self.text(expected)
    }

    /// Assert the covered text, nested tokens flattened
    pub fn text(self, expected: &str) -> Self {
        assert_eq!(
            self.token.text(),
            expected,
            "{}: text mismatch",
            self.context
        );
        self
    }

    pub fn span(self, expected: Range<usize>) -> Self {
        assert_eq!(
            self.token.span, expected,
            "{}: span mismatch",
            self.context
        );
        self
    }

    /// Assert the token holds text, not nested tokens
    pub fn leaf(self) -> Self {
        assert!(
            matches!(self.token.content, TokenContent::Text(_)),
            "{}: Expected text content, found nested tokens: [{}]",
            self.context,
            summarize(self.token.children())
        );
        self
    }

    /// Assert on the nested tokens
    pub fn children<F, R>(self, assertion: F) -> Self
    where
        F: FnOnce(TokensAssertion<'a>) -> R,
    {
        assert!(
            matches!(self.token.content, TokenContent::Nested(_)),
            "{}: Expected nested tokens, found text {:?}",
            self.context,
            self.token.text()
        );
        assertion(TokensAssertion {
            tokens: self.token.children(),
            context: format!("{}.children", self.context),
        });
        self
    }
}

fn summarize(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(|t| format!("{}:{:?}", t.kind().unwrap_or("text"), t.text()))
        .collect::<Vec<_>>()
        .join(", ")
}
