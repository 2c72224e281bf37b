//! A single matching rule: a pattern plus its options

use super::pattern::Pattern;
use super::GrammarRef;
use crate::error::GrammarError;

/// One way of recognizing a token.
///
/// A bare pattern is a rule with every option off. Options are set with the
/// consuming builder methods:
///
/// ```ignore
/// let rule = Rule::parse(r"(^|[^\\])//.*")?.lookbehind().greedy();
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pattern: Pattern,
    inside: Option<GrammarRef>,
    lookbehind: bool,
    greedy: bool,
    alias: Option<String>,
}

impl Rule {
    pub fn new(pattern: Pattern) -> Self {
        Self {
            pattern,
            inside: None,
            lookbehind: false,
            greedy: false,
            alias: None,
        }
    }

    /// Compile `source` and wrap it in a rule
    pub fn parse(source: &str) -> Result<Self, GrammarError> {
        Pattern::new(source).map(Self::new)
    }

    /// Compile `source` with flags and wrap it in a rule
    pub fn parse_with_flags(source: &str, flags: &str) -> Result<Self, GrammarError> {
        Pattern::with_flags(source, flags).map(Self::new)
    }

    /// The first capture group is context, not part of the token
    pub fn lookbehind(mut self) -> Self {
        self.lookbehind = true;
        self
    }

    /// The match may run over text claimed by higher-priority rules
    pub fn greedy(mut self) -> Self {
        self.greedy = true;
        self
    }

    /// Report tokens of this rule under another type
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Tokenize the matched text again with a sub-grammar
    pub fn inside(mut self, grammar: impl Into<GrammarRef>) -> Self {
        self.inside = Some(grammar.into());
        self
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    pub fn inside_grammar(&self) -> Option<&GrammarRef> {
        self.inside.as_ref()
    }

    pub fn is_lookbehind(&self) -> bool {
        self.lookbehind
    }

    pub fn is_greedy(&self) -> bool {
        self.greedy
    }

    pub fn alias_name(&self) -> Option<&str> {
        self.alias.as_deref()
    }
}

impl From<Pattern> for Rule {
    fn from(pattern: Pattern) -> Self {
        Self::new(pattern)
    }
}
