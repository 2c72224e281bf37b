//! Treeviz formatter for token streams
//!
//! One line per token, nesting drawn with box connectors:
//!
//! ```text
//! ├─ function "print"
//! ├─ punctuation "("
//! ├─ string "\"hi $USER\""
//! │ ├─ text "\"hi "
//! │ ├─ constant (environment) "$USER"
//! │ └─ text "\""
//! └─ punctuation ")"
//! ```
//!
//! Unclassified text shows as `text`. Aliased tokens show the alias followed
//! by the rule name. Labels are truncated to 30 characters and quoted, so
//! whitespace and newlines stay visible.

use super::registry::{FormatError, Formatter};
use crate::tokenizer::Token;

const LABEL_WIDTH: usize = 30;

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let mut truncated = s.chars().take(max_chars).collect::<String>();
        truncated.push_str("...");
        truncated
    } else {
        s.to_string()
    }
}

pub fn to_treeviz_str(tokens: &[Token]) -> String {
    let mut result = String::new();
    append_tokens(&mut result, tokens, "");
    result
}

fn append_tokens(result: &mut String, tokens: &[Token], prefix: &str) {
    for (i, token) in tokens.iter().enumerate() {
        let is_last = i == tokens.len() - 1;
        append_token(result, token, prefix, is_last);
    }
}

fn append_token(result: &mut String, token: &Token, prefix: &str, is_last: bool) {
    let connector = if is_last { "└─" } else { "├─" };
    let label = truncate(&token.text(), LABEL_WIDTH);

    result.push_str(&format!(
        "{}{} {} {:?}\n",
        prefix,
        connector,
        describe(token),
        label
    ));

    let children = token.children();
    if !children.is_empty() {
        let new_prefix = format!("{}{}", prefix, if is_last { "  " } else { "│ " });
        append_tokens(result, children, &new_prefix);
    }
}

fn describe(token: &Token) -> String {
    match (&token.alias, &token.name) {
        (Some(alias), Some(name)) => format!("{alias} ({name})"),
        (None, Some(name)) => name.clone(),
        _ => "text".to_string(),
    }
}

pub struct TreevizFormatter;

impl Formatter for TreevizFormatter {
    fn name(&self) -> &'static str {
        "treeviz"
    }

    fn render(&self, tokens: &[Token]) -> Result<String, FormatError> {
        Ok(to_treeviz_str(tokens))
    }

    fn summary(&self) -> &'static str {
        "One line per token with box-drawing nesting"
    }
}
