//! Match search for one rule at one grammar level
//!
//! Every search runs on the unconsumed part of the level, starting at the
//! level cursor, so `^` and `\b` see the end of the previous token as the
//! start of the text. Each rule keeps a cursor with its next candidate. When
//! the level cursor moves, a cached candidate is reused if nothing before it
//! can have changed, and only the new first position is tried again with the
//! anchored pattern. A full search runs when the candidate was overtaken.
//!
//! A lookbehind candidate stays valid while only its context is consumed: the
//! heredoc body after `<<` is still a string once `<<` became an operator.

use crate::grammar::Rule;
use tracing::warn;

/// A match of a rule, in byte offsets of the level text.
///
/// `raw_start..start` is the lookbehind context, `start..end` the classified
/// span. Without lookbehind both starts are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Candidate {
    pub raw_start: usize,
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Default)]
pub(crate) struct RuleCursor {
    /// Level cursor the cached result was computed for
    slice_start: Option<usize>,
    /// `None` once a search came up empty
    cached: Option<Candidate>,
    warned: bool,
}

impl RuleCursor {
    /// Leftmost match of `rule` in `text[cursor..]` whose classified span is
    /// not empty.
    pub fn candidate(
        &mut self,
        name: &str,
        rule: &Rule,
        text: &str,
        cursor: usize,
    ) -> Option<Candidate> {
        let Some(previous) = self.slice_start else {
            let found = self.search(name, rule, text, cursor, text.len());
            return self.remember(cursor, found);
        };
        if previous == cursor {
            return self.cached;
        }

        let pattern = rule.pattern();
        let cached = self.cached;
        let found = match cached {
            // positions after the old first one saw the same text
            None if !pattern.looks_behind() => self.at_start(name, rule, text, cursor),
            Some(cached) if cached.start < cursor || cached.raw_start == cursor => {
                self.search(name, rule, text, cursor, text.len())
            }
            Some(cached) if cached.raw_start > cursor && !pattern.looks_behind() => {
                earlier(self.at_start(name, rule, text, cursor), Some(cached))
            }
            // the context of the cached match is consumed, its token is not
            Some(cached) => earlier(
                self.search(name, rule, text, cursor, text.len()),
                Some(cached).filter(|c| c.raw_start < cursor),
            ),
            None => self.search(name, rule, text, cursor, text.len()),
        };
        self.remember(cursor, found)
    }

    /// Leftmost match in `text[cursor..limit]`. The result is not cached.
    pub fn windowed(
        &mut self,
        name: &str,
        rule: &Rule,
        text: &str,
        cursor: usize,
        limit: usize,
    ) -> Option<Candidate> {
        self.search(name, rule, text, cursor, limit)
    }

    fn remember(&mut self, cursor: usize, found: Option<Candidate>) -> Option<Candidate> {
        self.slice_start = Some(cursor);
        self.cached = found;
        found
    }

    fn search(
        &mut self,
        name: &str,
        rule: &Rule,
        text: &str,
        cursor: usize,
        limit: usize,
    ) -> Option<Candidate> {
        let haystack = &text[cursor..limit];
        let mut from = 0;
        while from <= haystack.len() {
            let caps = match rule.pattern().captures_from(haystack, from) {
                Ok(Some(caps)) => caps,
                Ok(None) => return None,
                Err(err) => {
                    runtime_failure(name, rule, &err);
                    return None;
                }
            };
            let whole = caps.get(0)?;
            if let Some(found) = self.classify(name, rule, &caps, cursor) {
                return Some(found);
            }
            from = next_char_boundary(haystack, whole.start());
        }
        None
    }

    /// Match that starts exactly at `cursor`
    fn at_start(&mut self, name: &str, rule: &Rule, text: &str, cursor: usize) -> Option<Candidate> {
        match rule.pattern().captures_at_start(&text[cursor..]) {
            Ok(Some(caps)) => self.classify(name, rule, &caps, cursor),
            Ok(None) => None,
            Err(err) => {
                runtime_failure(name, rule, &err);
                None
            }
        }
    }

    /// Split a match into context and classified span, shifted by `offset`.
    /// Matches with an empty classified span are rejected.
    fn classify(
        &mut self,
        name: &str,
        rule: &Rule,
        caps: &fancy_regex::Captures<'_>,
        offset: usize,
    ) -> Option<Candidate> {
        let whole = caps.get(0)?;
        let start = if rule.is_lookbehind() {
            caps.get(1).map_or(whole.start(), |context| {
                context.end().clamp(whole.start(), whole.end())
            })
        } else {
            whole.start()
        };

        if start == whole.end() {
            if !self.warned {
                self.warned = true;
                warn!(
                    rule = name,
                    pattern = rule.pattern().source(),
                    offset = offset + start,
                    "Rule produced an empty match, skipping it"
                );
            }
            return None;
        }

        Some(Candidate {
            raw_start: offset + whole.start(),
            start: offset + start,
            end: offset + whole.end(),
        })
    }
}

/// The candidate with the earlier classified start, `kept` on a tie
fn earlier(fresh: Option<Candidate>, kept: Option<Candidate>) -> Option<Candidate> {
    match (fresh, kept) {
        (Some(fresh), Some(kept)) if kept.start <= fresh.start => Some(kept),
        (Some(fresh), _) => Some(fresh),
        (None, kept) => kept,
    }
}

fn runtime_failure(name: &str, rule: &Rule, err: &fancy_regex::Error) {
    warn!(
        rule = name,
        pattern = rule.pattern().source(),
        error = %err,
        "Pattern failed at runtime, treating it as no match"
    );
}

fn next_char_boundary(text: &str, pos: usize) -> usize {
    pos + text[pos..].chars().next().map_or(1, char::len_utf8)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(source: &str) -> Rule {
        Rule::parse(source).unwrap()
    }

    #[test]
    fn test_candidate_is_cached_until_passed() {
        let rule = rule(r"\d+");
        let mut cursor = RuleCursor::default();

        let first = cursor.candidate("number", &rule, "ab 12 cd 34", 0).unwrap();
        assert_eq!((first.start, first.end), (3, 5));
        assert_eq!(cursor.candidate("number", &rule, "ab 12 cd 34", 2), Some(first));

        let second = cursor.candidate("number", &rule, "ab 12 cd 34", 5).unwrap();
        assert_eq!((second.start, second.end), (9, 11));
        assert_eq!(cursor.candidate("number", &rule, "ab 12 cd 34", 11), None);
    }

    #[test]
    fn test_lookbehind_context_may_be_consumed() {
        let rule = rule(r"(\.)\w+").lookbehind();
        let mut cursor = RuleCursor::default();

        let found = cursor.candidate("property", &rule, "a.b", 0).unwrap();
        assert_eq!(found, Candidate { raw_start: 1, start: 2, end: 3 });
        // another token took the dot, the property name is still free
        assert_eq!(cursor.candidate("property", &rule, "a.b", 2), Some(found));
    }

    #[test]
    fn test_consumed_text_is_not_searched() {
        let rule = rule(r"(\.)\w+").lookbehind();
        let mut cursor = RuleCursor::default();
        assert_eq!(cursor.candidate("property", &rule, "a.b", 2), None);
    }

    #[test]
    fn test_lookbehind_match_before_cursor_is_skipped() {
        let rule = rule(r"(\.)\w+").lookbehind();
        let mut cursor = RuleCursor::default();

        let found = cursor.candidate("property", &rule, "a.bc.d", 3).unwrap();
        assert_eq!((found.start, found.end), (5, 6));
    }

    #[test]
    fn test_start_anchor_matches_at_cursor() {
        let rule = rule(r"^\w+");
        let mut cursor = RuleCursor::default();
        let text = "ab cd";

        assert_eq!(cursor.candidate("head", &rule, text, 0).map(|c| c.end), Some(2));
        assert_eq!(cursor.candidate("head", &rule, text, 2), None);
        let found = cursor.candidate("head", &rule, text, 3).unwrap();
        assert_eq!((found.start, found.end), (3, 5));
    }

    #[test]
    fn test_word_boundary_at_cursor() {
        let rule = rule(r"\bthen\b");
        let mut cursor = RuleCursor::default();
        let text = "xthen then";

        let found = cursor.candidate("keyword", &rule, text, 0).unwrap();
        assert_eq!(found.start, 6);
        // after a consumed "x" the first "then" starts the text
        let mut fresh = RuleCursor::default();
        assert_eq!(fresh.candidate("keyword", &rule, text, 1).map(|c| c.start), Some(1));
    }

    #[test]
    fn test_empty_matches_are_skipped() {
        let rule = rule(r"x*");
        let mut cursor = RuleCursor::default();

        let found = cursor.candidate("xs", &rule, "ab xx", 0).unwrap();
        assert_eq!((found.start, found.end), (3, 5));
    }

    #[test]
    fn test_windowed_match_stays_inside_limit() {
        let rule = rule(r"[a-z ]+");
        let mut cursor = RuleCursor::default();
        let text = "abc def";

        let full = cursor.candidate("word", &rule, text, 0).unwrap();
        assert_eq!(full.end, 7);

        let windowed = cursor.windowed("word", &rule, text, 0, 4).unwrap();
        assert_eq!((windowed.start, windowed.end), (0, 4));
        // the full candidate is still cached
        assert_eq!(cursor.candidate("word", &rule, text, 0), Some(full));
    }

    #[test]
    fn test_windowed_match_keeps_its_first_character() {
        let rule = rule(r"[a-z ]+");
        let mut cursor = RuleCursor::default();
        let text = "x abc then";

        let full = cursor.candidate("ident", &rule, text, 1).unwrap();
        assert_eq!((full.start, full.end), (1, 10));

        let windowed = cursor.windowed("ident", &rule, text, 2, 6).unwrap();
        assert_eq!((windowed.start, windowed.end), (2, 6));
    }

    #[test]
    fn test_multibyte_text() {
        let rule = rule(r"é+");
        let mut cursor = RuleCursor::default();
        let found = cursor.candidate("e", &rule, "aé é", 0).unwrap();
        assert_eq!((found.start, found.end), (1, 3));
    }
}
