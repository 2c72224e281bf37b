//! Compiled rule patterns
//!
//! Grammar tables lean on lookaround and backreferences (`(?!\1)`, `(?=\()`),
//! so patterns are compiled with the backtracking engine from `fancy-regex`.
//! Patterns that use none of those features are delegated to the `regex`
//! crate by `fancy-regex` itself.
//!
//! The tokenizer matches against the unconsumed part of a level, so `^` and
//! `\b` treat the end of the previous token as the start of the text. Each
//! pattern is compiled twice: as written, and anchored at the start of the
//! haystack for the cheap "does it match right here" check.

use crate::error::GrammarError;
use fancy_regex::{Captures, Regex, RegexBuilder};
use std::fmt;
use std::sync::Arc;

/// Default cap on backtracking steps for a single match attempt
pub const DEFAULT_BACKTRACK_LIMIT: usize = 1_000_000;

/// A compiled regular expression together with the source it was built from.
#[derive(Clone)]
pub struct Pattern {
    source: String,
    flags: String,
    regex: Arc<Regex>,
    anchored: Arc<Regex>,
    lookbehind: bool,
}

impl Pattern {
    /// Compile a pattern without flags
    pub fn new(source: &str) -> Result<Self, GrammarError> {
        Self::with_flags(source, "")
    }

    /// Compile a pattern with flags
    ///
    /// Supported flags: `i` (case insensitive), `m` (`^`/`$` match at line
    /// boundaries), `s` (`.` matches newlines) and `x` (verbose). `g`, `u` and
    /// `y` are accepted and ignored, they only affect stateful regex objects.
    pub fn with_flags(source: &str, flags: &str) -> Result<Self, GrammarError> {
        Self::compile(source, flags, DEFAULT_BACKTRACK_LIMIT)
    }

    /// Compile a pattern with flags and an explicit backtracking limit
    pub fn compile(
        source: &str,
        flags: &str,
        backtrack_limit: usize,
    ) -> Result<Self, GrammarError> {
        let mut inline = String::new();
        for flag in flags.chars() {
            match flag {
                'i' | 'm' | 's' | 'x' => {
                    if !inline.contains(flag) {
                        inline.push(flag);
                    }
                }
                'g' | 'u' | 'y' => {}
                other => {
                    return Err(GrammarError::MalformedPattern {
                        pattern: source.to_string(),
                        message: format!("unsupported flag '{other}'"),
                    })
                }
            }
        }

        let prefix = if inline.is_empty() {
            String::new()
        } else {
            format!("(?{inline})")
        };
        // a trailing comment in verbose mode would swallow the closing group
        let close = if inline.contains('x') { "\n)" } else { ")" };

        let regex = build(source, &format!("{prefix}{source}"), backtrack_limit)?;
        let anchored = build(
            source,
            &format!("{prefix}\\A(?:{source}{close}"),
            backtrack_limit,
        )?;

        Ok(Self {
            source: source.to_string(),
            flags: inline,
            regex: Arc::new(regex),
            anchored: Arc::new(anchored),
            lookbehind: source.contains("(?<=") || source.contains("(?<!"),
        })
    }

    /// The pattern as written, without inline flags
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Normalized flags (`i`, `m`, `s`, `x`)
    pub fn flags(&self) -> &str {
        &self.flags
    }

    /// Find the leftmost match starting at or after `pos`.
    ///
    /// `pos` must lie on a char boundary of `haystack`. Errors are runtime
    /// failures of the backtracking engine (e.g. the backtrack limit).
    pub fn captures_from<'t>(
        &self,
        haystack: &'t str,
        pos: usize,
    ) -> Result<Option<Captures<'t>>, fancy_regex::Error> {
        self.regex.captures_from_pos(haystack, pos)
    }

    /// Match that starts exactly at the beginning of `haystack`
    pub fn captures_at_start<'t>(
        &self,
        haystack: &'t str,
    ) -> Result<Option<Captures<'t>>, fancy_regex::Error> {
        self.anchored.captures(haystack)
    }

    /// Whether the pattern contains a lookbehind assertion, so a match may
    /// depend on text before the position it starts at
    pub fn looks_behind(&self) -> bool {
        self.lookbehind
    }

    /// Whether the pattern matches anywhere in `text`
    pub fn is_match(&self, text: &str) -> bool {
        matches!(self.regex.is_match(text), Ok(true))
    }
}

fn build(source: &str, expression: &str, backtrack_limit: usize) -> Result<Regex, GrammarError> {
    RegexBuilder::new(expression)
        .backtrack_limit(backtrack_limit)
        .build()
        .map_err(|e| GrammarError::MalformedPattern {
            pattern: source.to_string(),
            message: e.to_string(),
        })
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/{}", self.source, self.flags)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source && self.flags == other.flags
    }
}
