//! XML-like tag serialization
//!
//! Reproduces the input text with every classified token wrapped in a tag
//! named after its kind. Tags nest the way tokens do, so the output reads
//! like the markup a highlighter would emit:
//!
//! ```text
//! <class-name rule="builtin">echo</class-name> <string>&quot;<constant rule="environment">$HOME</constant>&quot;</string>
//! ```
//!
//! A token whose kind comes from an alias carries the rule name in a `rule`
//! attribute. Text is escaped; nothing else is added, so stripping the tags
//! and unescaping gives back the input.

use super::registry::{FormatError, Formatter};
use crate::tokenizer::{Token, TokenContent};

pub fn to_tag_str(tokens: &[Token]) -> String {
    let mut output = String::new();
    for token in tokens {
        append_token(&mut output, token);
    }
    output
}

fn append_token(output: &mut String, token: &Token) {
    let Some(kind) = token.kind() else {
        if let TokenContent::Text(text) = &token.content {
            output.push_str(&escape_xml(text));
        }
        return;
    };

    output.push('<');
    output.push_str(kind);
    if let (Some(_), Some(name)) = (&token.alias, &token.name) {
        output.push_str(&format!(" rule=\"{}\"", escape_xml(name)));
    }
    output.push('>');

    match &token.content {
        TokenContent::Text(text) => output.push_str(&escape_xml(text)),
        TokenContent::Nested(children) => {
            for child in children {
                append_token(output, child);
            }
        }
    }

    output.push_str(&format!("</{kind}>"));
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

pub struct TagFormatter;

impl Formatter for TagFormatter {
    fn name(&self) -> &'static str {
        "tag"
    }

    fn render(&self, tokens: &[Token]) -> Result<String, FormatError> {
        Ok(to_tag_str(tokens))
    }

    fn summary(&self) -> &'static str {
        "Input text with XML-like tags around classified tokens"
    }
}
