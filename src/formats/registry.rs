//! Named output formats
//!
//! A format turns the token tree of one tokenizer run into text. Formats are
//! stored by name in a sorted map, so the CLI lists them alphabetically and
//! a format registered twice keeps only the last definition.

use crate::tokenizer::Token;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum FormatError {
    /// No format is registered under this name
    UnknownFormat(String),
    /// The format could not encode the token tree
    Encoding(String),
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatError::UnknownFormat(name) => write!(f, "Unknown output format '{name}'"),
            FormatError::Encoding(msg) => write!(f, "Could not encode tokens: {msg}"),
        }
    }
}

impl std::error::Error for FormatError {}

/// Renders a token tree as text
pub trait Formatter: Send + Sync {
    /// Name used to select the format, e.g. on the command line
    fn name(&self) -> &'static str;

    /// One line shown by `hilite formats`
    fn summary(&self) -> &'static str;

    fn render(&self, tokens: &[Token]) -> Result<String, FormatError>;
}

#[derive(Default)]
pub struct FormatRegistry {
    formats: BTreeMap<&'static str, Box<dyn Formatter>>,
}

impl FormatRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The `treeviz`, `tag` and `json` formats
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.add(super::TreevizFormatter);
        registry.add(super::TagFormatter);
        registry.add(super::JsonFormatter);
        registry
    }

    pub fn add(&mut self, format: impl Formatter + 'static) {
        self.formats.insert(format.name(), Box::new(format));
    }

    pub fn get(&self, name: &str) -> Option<&dyn Formatter> {
        self.formats.get(name).map(Box::as_ref)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.formats.contains_key(name)
    }

    /// Registered formats, sorted by name
    pub fn iter(&self) -> impl Iterator<Item = &dyn Formatter> {
        self.formats.values().map(Box::as_ref)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.formats.keys().copied()
    }

    /// Render `tokens` with the format called `name`
    pub fn render(&self, tokens: &[Token], name: &str) -> Result<String, FormatError> {
        match self.get(name) {
            Some(format) => format.render(tokens),
            None => Err(FormatError::UnknownFormat(name.to_string())),
        }
    }
}
