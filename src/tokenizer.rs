//! Priority-ordered recursive tokenizer
//!
//! The tokenizer walks a text once per grammar level with a single cursor.
//! At every step each rule offers its next candidate match (see
//! [`matcher`]); the candidate that starts first wins, and rules declared
//! earlier win ties. Text between the cursor and the winner becomes an
//! unclassified token. The winner becomes a classified token, tokenized again
//! with its `inside` grammar when it has one, and the cursor jumps to its end.
//! Patterns only see the text from the cursor on, so `^` matches right after
//! the previous token.
//!
//! Rules are tried in priority order, so a lower-priority rule must not
//! swallow text a higher-priority rule would classify. When a non-greedy
//! rule's match starts earlier but runs past the start of a higher-priority
//! candidate, the rule is matched again in the window that ends at that
//! start. A greedy rule keeps its full match, which is how strings and
//! comments stay whole even when they contain text that looks like a keyword.
//!
//! Tokenization never fails. Runtime regex failures are treated as "no
//! match", empty matches are skipped, and nesting deeper than
//! [`TokenizerConfig::max_depth`] is emitted as plain text. All three are
//! reported with `tracing::warn!`.

pub mod matcher;
pub mod token;

pub use token::{flatten_text, Token, TokenContent};

use crate::grammar::pattern::DEFAULT_BACKTRACK_LIMIT;
use crate::grammar::{Grammar, GrammarRef, Rule};
use matcher::{Candidate, RuleCursor};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{trace, warn};

/// Default bound on nested `inside` grammars and `rest` hops
pub const DEFAULT_MAX_DEPTH: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TokenizerConfig {
    /// Deepest level of `inside` nesting that is still tokenized
    pub max_depth: usize,
    /// Backtracking budget for patterns compiled from grammar files
    pub backtrack_limit: usize,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            backtrack_limit: DEFAULT_BACKTRACK_LIMIT,
        }
    }
}

/// Looks up named grammar references while tokenizing
pub trait GrammarResolver {
    fn resolve_grammar(&self, name: &str) -> Option<Arc<Grammar>>;
}

/// A resolver that knows no grammars.
///
/// For self-contained grammars that only use inline references.
#[derive(Debug, Clone, Copy, Default)]
pub struct Detached;

impl GrammarResolver for Detached {
    fn resolve_grammar(&self, _name: &str) -> Option<Arc<Grammar>> {
        None
    }
}

/// A rule taking part in one level, with the entry name it belongs to
#[derive(Debug, Clone, Copy)]
struct ActiveRule<'g> {
    name: &'g str,
    rule: &'g Rule,
}

pub struct Tokenizer<'r> {
    resolver: &'r dyn GrammarResolver,
    config: TokenizerConfig,
}

impl<'r> Tokenizer<'r> {
    pub fn new(resolver: &'r dyn GrammarResolver) -> Self {
        Self::with_config(resolver, TokenizerConfig::default())
    }

    pub fn with_config(resolver: &'r dyn GrammarResolver, config: TokenizerConfig) -> Self {
        Self { resolver, config }
    }

    pub fn config(&self) -> &TokenizerConfig {
        &self.config
    }

    /// Split `text` into tokens that cover it exactly once, in order
    pub fn tokenize(&self, text: &str, grammar: &Grammar) -> Vec<Token> {
        self.tokenize_level(text, 0, grammar, 0)
    }

    fn tokenize_level(&self, text: &str, base: usize, grammar: &Grammar, depth: usize) -> Vec<Token> {
        let mut tokens = Vec::new();
        if text.is_empty() {
            return tokens;
        }

        let chain = self.rest_chain(grammar);
        let rules = active_rules(grammar, &chain);
        trace!(depth, len = text.len(), rules = rules.len(), "Tokenizing level");

        let mut cursors: Vec<RuleCursor> = rules.iter().map(|_| RuleCursor::default()).collect();
        let mut cursor = 0;

        while cursor < text.len() {
            let Some((index, found)) = select(&rules, &mut cursors, text, cursor) else {
                break;
            };

            if found.start > cursor {
                tokens.push(plain(text, base, cursor..found.start));
            }
            tokens.push(self.classify(text, base, rules[index], found, depth));
            cursor = found.end;
        }

        if cursor < text.len() {
            tokens.push(plain(text, base, cursor..text.len()));
        }
        tokens
    }

    fn classify(
        &self,
        text: &str,
        base: usize,
        active: ActiveRule<'_>,
        found: Candidate,
        depth: usize,
    ) -> Token {
        let matched = &text[found.start..found.end];
        let span = base + found.start..base + found.end;

        let content = match active.rule.inside_grammar() {
            None => TokenContent::Text(matched.to_string()),
            Some(_) if depth >= self.config.max_depth => {
                warn!(
                    rule = active.name,
                    max_depth = self.config.max_depth,
                    "Nesting limit reached, keeping match as plain text"
                );
                TokenContent::Text(matched.to_string())
            }
            Some(reference) => match self.resolve(reference) {
                Some(inner) => TokenContent::Nested(self.tokenize_level(
                    matched,
                    span.start,
                    &inner,
                    depth + 1,
                )),
                None => TokenContent::Text(matched.to_string()),
            },
        };

        Token::classified(
            active.name,
            active.rule.alias_name().map(str::to_string),
            content,
            span,
        )
    }

    fn resolve(&self, reference: &GrammarRef) -> Option<Arc<Grammar>> {
        match reference {
            GrammarRef::Inline(grammar) => Some(Arc::clone(grammar)),
            GrammarRef::Named(name) => {
                let resolved = self.resolver.resolve_grammar(name);
                if resolved.is_none() {
                    warn!(grammar = %name, "Unresolved grammar reference, keeping match as plain text");
                }
                resolved
            }
        }
    }

    /// Grammars reachable through `rest`, nearest first
    fn rest_chain(&self, grammar: &Grammar) -> Vec<Arc<Grammar>> {
        let mut chain: Vec<Arc<Grammar>> = Vec::new();
        let mut next = grammar.rest().cloned();

        while let Some(reference) = next.take() {
            if chain.len() >= self.config.max_depth {
                warn!(
                    max_depth = self.config.max_depth,
                    "Too many rest grammars, ignoring the remainder"
                );
                break;
            }
            let Some(resolved) = self.resolve(&reference) else {
                break;
            };
            next = resolved.rest().cloned();
            chain.push(resolved);
        }
        chain
    }
}

/// Entries of `grammar` with its rest chain merged on top.
///
/// A rest entry whose name is already present replaces that entry's rules at
/// its position; other rest entries are appended.
fn active_rules<'g>(grammar: &'g Grammar, chain: &'g [Arc<Grammar>]) -> Vec<ActiveRule<'g>> {
    let mut merged: Vec<(&'g str, &'g [Rule])> = Vec::new();
    for source in std::iter::once(grammar).chain(chain.iter().map(|g| g.as_ref())) {
        for entry in source.entries() {
            match merged.iter_mut().find(|(name, _)| *name == entry.name()) {
                Some(existing) => existing.1 = entry.rules(),
                None => merged.push((entry.name(), entry.rules())),
            }
        }
    }

    merged
        .into_iter()
        .flat_map(|(name, rules)| rules.iter().map(move |rule| ActiveRule { name, rule }))
        .collect()
}

/// Pick the rule that classifies the next span at or after `cursor`
fn select(
    rules: &[ActiveRule<'_>],
    cursors: &mut [RuleCursor],
    text: &str,
    cursor: usize,
) -> Option<(usize, Candidate)> {
    let mut best: Option<(usize, Candidate)> = None;

    for (index, (active, rule_cursor)) in rules.iter().zip(cursors.iter_mut()).enumerate() {
        let Some(found) = rule_cursor.candidate(active.name, active.rule, text, cursor) else {
            continue;
        };

        let claimed = match best {
            None => {
                best = Some((index, found));
                continue;
            }
            Some((_, current)) => current.start,
        };

        if found.start >= claimed {
            continue;
        }
        if active.rule.is_greedy() || found.end <= claimed {
            best = Some((index, found));
        } else if let Some(windowed) =
            rule_cursor.windowed(active.name, active.rule, text, cursor, claimed)
        {
            best = Some((index, windowed));
        }
    }
    best
}

fn plain(text: &str, base: usize, range: std::ops::Range<usize>) -> Token {
    Token::plain(&text[range.clone()], base + range.start..base + range.end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::assert_tokens;

    fn rule(source: &str) -> Rule {
        Rule::parse(source).unwrap()
    }

    fn tokenize(text: &str, grammar: &Grammar) -> Vec<Token> {
        Tokenizer::new(&Detached).tokenize(text, grammar)
    }

    #[test]
    fn test_empty_input() {
        let grammar = Grammar::builder().rule("word", rule(r"\w+")).build();
        assert!(tokenize("", &grammar).is_empty());
    }

    #[test]
    fn test_empty_grammar_yields_single_text_token() {
        let tokens = tokenize("anything at all", &Grammar::new());
        assert_eq!(tokens, vec![Token::plain("anything at all", 0..15)]);
    }

    #[test]
    fn test_gaps_become_plain_text() {
        let grammar = Grammar::builder().rule("number", rule(r"\d+")).build();
        assert_tokens(&tokenize("a 12 b", &grammar))
            .count(3)
            .item(0, |t| t.plain("a "))
            .item(1, |t| t.kind("number").text("12").span(2..4))
            .item(2, |t| t.plain(" b"));
    }

    #[test]
    fn test_earliest_match_wins() {
        let grammar = Grammar::builder()
            .rule("keyword", rule(r"\bend\b"))
            .rule("word", rule(r"\w+"))
            .build();
        assert_tokens(&tokenize("x end", &grammar))
            .count(3)
            .item(0, |t| t.kind("word").text("x"))
            .item(2, |t| t.kind("keyword").text("end"));
    }

    #[test]
    fn test_declared_order_breaks_ties() {
        let grammar = Grammar::builder()
            .rule("keyword", rule(r"\bif\b"))
            .rule("identifier", rule(r"\w+"))
            .build();
        assert_tokens(&tokenize("if", &grammar))
            .count(1)
            .item(0, |t| t.kind("keyword"));
    }

    #[test]
    fn test_lower_priority_match_is_windowed() {
        let grammar = Grammar::builder()
            .rule("number", rule(r"\d+"))
            .rule("word", rule(r"[a-z0-9]+"))
            .build();
        assert_tokens(&tokenize("ab12cd", &grammar))
            .count(3)
            .item(0, |t| t.kind("word").text("ab"))
            .item(1, |t| t.kind("number").text("12"))
            .item(2, |t| t.kind("word").text("cd"));
    }

    #[test]
    fn test_greedy_match_is_not_fragmented() {
        let grammar = Grammar::builder()
            .rule("keyword", rule(r"\bthen\b"))
            .rule("string", rule(r#""[^"]*""#).greedy())
            .build();
        assert_tokens(&tokenize(r#"x "a then b" then"#, &grammar))
            .count(4)
            .item(1, |t| t.kind("string").text(r#""a then b""#))
            .item(3, |t| t.kind("keyword"));
    }

    #[test]
    fn test_non_greedy_match_is_fragmented() {
        let grammar = Grammar::builder()
            .rule("keyword", rule(r"\bthen\b"))
            .rule("string", rule(r#""[^"]*""#))
            .build();
        let tokens = tokenize(r#""a then b""#, &grammar);
        assert!(tokens.iter().all(|t| t.kind() != Some("string")));
        assert_tokens(&tokens).item(1, |t| t.kind("keyword"));
    }

    #[test]
    fn test_lookbehind_prefix_stays_plain() {
        let grammar = Grammar::builder()
            .rule("comment", rule(r"(^|[^\\])#.*").lookbehind())
            .build();
        assert_tokens(&tokenize(r"a \# b # c", &grammar))
            .count(2)
            .item(0, |t| t.plain(r"a \# b "))
            .item(1, |t| t.kind("comment").text("# c").span(7..10));
    }

    #[test]
    fn test_alias_is_reported_as_kind() {
        let grammar = Grammar::builder()
            .rule("heredoc", rule(r"<<\w+").alias("string"))
            .build();
        assert_tokens(&tokenize("<<EOF", &grammar)).item(0, |t| t.kind("string").name("heredoc"));
    }

    #[test]
    fn test_inside_grammar_with_absolute_spans() {
        let interpolation = Grammar::builder()
            .rule("variable", rule(r"\$\w+"))
            .build();
        let grammar = Grammar::builder()
            .rule("string", rule(r#""[^"]*""#).inside(interpolation))
            .build();

        assert_tokens(&tokenize(r#"echo "hi $name""#, &grammar))
            .count(2)
            .item(1, |t| {
                t.kind("string").span(5..15).children(|c| {
                    c.count(3)
                        .item(0, |t| t.plain("\"hi ").span(5..9))
                        .item(1, |t| t.kind("variable").text("$name").span(9..14))
                        .item(2, |t| t.plain("\"").span(14..15))
                })
            });
    }

    #[test]
    fn test_unresolved_named_inside_keeps_text() {
        let grammar = Grammar::builder()
            .rule("embedded", rule(r"\{[^}]*\}").inside(GrammarRef::named("missing")))
            .build();
        assert_tokens(&tokenize("{x}", &grammar)).item(0, |t| t.kind("embedded").text("{x}").leaf());
    }

    #[test]
    fn test_depth_limit_keeps_plain_text() {
        let inner = Grammar::builder().rule("digit", rule(r"\d")).build();
        let grammar = Grammar::builder()
            .rule("group", rule(r"\(\d+\)").inside(inner))
            .build();

        let tokenizer = Tokenizer::with_config(
            &Detached,
            TokenizerConfig {
                max_depth: 0,
                ..TokenizerConfig::default()
            },
        );
        let tokens = tokenizer.tokenize("(12)", &grammar);
        assert_tokens(&tokens).item(0, |t| t.kind("group").leaf());
    }

    #[test]
    fn test_rest_entries_follow_own_entries() {
        let base = Arc::new(
            Grammar::builder()
                .rule("number", rule(r"\d+"))
                .rule("word", rule(r"[a-z]+"))
                .build(),
        );
        let grammar = Grammar::builder()
            .rule("constant", rule(r"[A-Z]+"))
            .rest(Arc::clone(&base))
            .build();

        assert_tokens(&tokenize("AB cd 7", &grammar))
            .kinds(&["constant", "word", "number"]);
    }

    #[test]
    fn test_rest_entry_overrides_same_name_in_place() {
        let base = Arc::new(Grammar::builder().rule("word", rule(r"[a-z]+")).build());
        let grammar = Grammar::builder()
            .rule("word", rule(r"[A-Z]+"))
            .rule("letter", rule(r"[A-Za-z]"))
            .rest(Arc::clone(&base))
            .build();

        // "word" keeps its priority over "letter" but takes the rest rules
        assert_tokens(&tokenize("AB cd", &grammar))
            .kinds(&["letter", "letter", "word"])
            .item(3, |t| t.kind("word").text("cd"));
    }

    #[test]
    fn test_lower_priority_window_keeps_first_character() {
        let grammar = Grammar::builder()
            .rule("keyword", rule(r"\bthen\b"))
            .rule("ident", rule(r"[a-z ]+"))
            .build();
        assert_tokens(&tokenize("abc then", &grammar))
            .count(2)
            .item(0, |t| t.kind("ident").text("abc "))
            .item(1, |t| t.kind("keyword").text("then"));
    }

    #[test]
    fn test_start_anchor_matches_after_each_token() {
        let grammar = Grammar::builder()
            .rule("command", rule(r"^\w+"))
            .rule("separator", rule(r";\s*"))
            .build();
        assert_tokens(&tokenize("ls; cd x", &grammar))
            .kinds(&["command", "separator", "command"])
            .item(3, |t| t.plain(" x"));
    }

    #[test]
    fn test_empty_match_rule_is_skipped() {
        let grammar = Grammar::builder()
            .rule("nothing", rule(r"x*"))
            .rule("word", rule(r"[a-z]+"))
            .build();
        assert_tokens(&tokenize("ab", &grammar))
            .count(1)
            .item(0, |t| t.kind("word").text("ab"));
    }

    #[test]
    fn test_config_default() {
        let config = TokenizerConfig::default();
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(config.backtrack_limit, DEFAULT_BACKTRACK_LIMIT);
    }
}
