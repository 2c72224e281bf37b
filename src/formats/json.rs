//! JSON serialization of token streams
//!
//! Tokens serialize through serde: `name` and `alias` are omitted for
//! unclassified text, `content` is a string or an array of tokens, and
//! `span` is an object with `start` and `end` byte offsets.

use super::registry::{FormatError, Formatter};
use crate::tokenizer::Token;

pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn name(&self) -> &'static str {
        "json"
    }

    fn render(&self, tokens: &[Token]) -> Result<String, FormatError> {
        serde_json::to_string_pretty(tokens)
            .map_err(|e| FormatError::Encoding(e.to_string()))
    }

    fn summary(&self) -> &'static str {
        "Token tree as pretty-printed JSON"
    }
}
