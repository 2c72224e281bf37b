//! Token stream types

use serde::Serialize;
use std::ops::Range;

/// Content of a token: raw text or the tokens of a sub-grammar
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum TokenContent {
    Text(String),
    Nested(Vec<Token>),
}

/// A span of the input, classified by a rule or left as plain text.
///
/// `span` holds absolute byte offsets into the text handed to the
/// tokenizer, at every nesting level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    /// Name of the rule that produced the token, `None` for unclassified text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    pub content: TokenContent,
    pub span: Range<usize>,
}

impl Token {
    /// Unclassified text
    pub fn plain(text: impl Into<String>, span: Range<usize>) -> Self {
        Self {
            name: None,
            alias: None,
            content: TokenContent::Text(text.into()),
            span,
        }
    }

    pub fn classified(
        name: impl Into<String>,
        alias: Option<String>,
        content: TokenContent,
        span: Range<usize>,
    ) -> Self {
        Self {
            name: Some(name.into()),
            alias,
            content,
            span,
        }
    }

    /// Reported type: the alias when set, otherwise the rule name
    pub fn kind(&self) -> Option<&str> {
        self.alias.as_deref().or(self.name.as_deref())
    }

    pub fn is_classified(&self) -> bool {
        self.name.is_some()
    }

    /// The covered text, with nested tokens flattened
    pub fn text(&self) -> String {
        let mut out = String::with_capacity(self.span.len());
        self.write_text(&mut out);
        out
    }

    pub fn write_text(&self, out: &mut String) {
        match &self.content {
            TokenContent::Text(text) => out.push_str(text),
            TokenContent::Nested(children) => {
                for child in children {
                    child.write_text(out);
                }
            }
        }
    }

    pub fn children(&self) -> &[Token] {
        match &self.content {
            TokenContent::Nested(children) => children,
            TokenContent::Text(_) => &[],
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match &self.content {
            TokenContent::Text(text) => Some(text),
            TokenContent::Nested(_) => None,
        }
    }
}

/// Concatenated text of a token sequence
pub fn flatten_text(tokens: &[Token]) -> String {
    let mut out = String::new();
    for token in tokens {
        token.write_text(&mut out);
    }
    out
}
