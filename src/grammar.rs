//! Grammars: ordered, named lists of matching rules
//!
//! A grammar is an explicit ordered sequence of entries, each entry a token
//! name with one or more [`Rule`]s. Entry order is matching priority, so it is
//! kept as a `Vec` with stable keys instead of relying on the iteration order
//! of a map. That also makes "insert before/after token X" a plain splice.
//!
//! Sub-grammars (`inside`) and the `rest` tail are [`GrammarRef`]s: either a
//! shared inline grammar or a language name that is resolved through the
//! registry when text is tokenized. Named references let a grammar refer to
//! another registered grammar, or to itself, without building an infinite
//! structure up front.
//!
//! Grammars are immutable once shared. Every mutation below works on an owned
//! value; the registry uses copy-on-write so that readers holding an older
//! `Arc<Grammar>` keep seeing the grammar they started with.

pub mod pattern;
pub mod rule;
pub mod spec;

pub use pattern::Pattern;
pub use rule::Rule;
pub use spec::GrammarSpec;

use std::collections::HashSet;
use std::sync::Arc;

/// Reference to a sub-grammar
#[derive(Debug, Clone, PartialEq)]
pub enum GrammarRef {
    /// A grammar owned by the rule that references it
    Inline(Arc<Grammar>),
    /// A registered language, looked up at tokenization time
    Named(String),
}

impl GrammarRef {
    pub fn named(name: impl Into<String>) -> Self {
        GrammarRef::Named(name.into())
    }
}

impl From<Grammar> for GrammarRef {
    fn from(grammar: Grammar) -> Self {
        GrammarRef::Inline(Arc::new(grammar))
    }
}

impl From<Arc<Grammar>> for GrammarRef {
    fn from(grammar: Arc<Grammar>) -> Self {
        GrammarRef::Inline(grammar)
    }
}

/// A token name and the rules that produce it, in priority order
#[derive(Debug, Clone, PartialEq)]
pub struct GrammarEntry {
    name: String,
    rules: Vec<Rule>,
}

impl GrammarEntry {
    pub fn new(name: impl Into<String>, rules: Vec<Rule>) -> Self {
        Self {
            name: name.into(),
            rules,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }
}

/// Where [`Grammar::splice`] places new entries relative to the target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Before,
    After,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grammar {
    entries: Vec<GrammarEntry>,
    rest: Option<GrammarRef>,
}

impl Grammar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> GrammarBuilder {
        GrammarBuilder::default()
    }

    pub fn entries(&self) -> &[GrammarEntry] {
        &self.entries
    }

    pub fn get(&self, name: &str) -> Option<&GrammarEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Rules of the entry named `name`
    pub fn rules(&self, name: &str) -> Option<&[Rule]> {
        self.get(name).map(|e| e.rules())
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Token names in priority order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Grammar whose entries follow this grammar's own entries
    pub fn rest(&self) -> Option<&GrammarRef> {
        self.rest.as_ref()
    }

    pub fn set_rest(&mut self, rest: Option<GrammarRef>) {
        self.rest = rest;
    }

    /// Set the rules for `name`.
    ///
    /// An existing entry keeps its position; a new one is appended with the
    /// lowest priority.
    pub fn set(&mut self, name: impl Into<String>, rules: Vec<Rule>) {
        let name = name.into();
        match self.position(&name) {
            Some(idx) => self.entries[idx].rules = rules,
            None => self.entries.push(GrammarEntry { name, rules }),
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<GrammarEntry> {
        let idx = self.position(name)?;
        Some(self.entries.remove(idx))
    }

    /// Copy of this grammar with `overrides` merged on top.
    ///
    /// Overridden entries keep their position, new entries are appended, and
    /// a `rest` set on the overrides replaces this grammar's `rest`.
    pub fn merged(&self, overrides: &Grammar) -> Grammar {
        let mut merged = self.clone();
        for entry in &overrides.entries {
            merged.set(entry.name.clone(), entry.rules.clone());
        }
        if overrides.rest.is_some() {
            merged.rest = overrides.rest.clone();
        }
        merged
    }

    /// Splice the entries of `inserted` next to the entry named `target`.
    ///
    /// Entries of this grammar that share a name with an inserted entry are
    /// dropped from their old position, so an inserted entry may also replace
    /// the target itself. Returns `false` (and leaves the grammar untouched)
    /// when `target` is absent.
    pub fn splice(&mut self, target: &str, inserted: Grammar, placement: Placement) -> bool {
        if !self.contains(target) {
            return false;
        }

        let replaced: HashSet<&str> = inserted.names().collect();
        let mut entries = Vec::with_capacity(self.entries.len() + inserted.len());
        let mut pending = Some(inserted.entries.clone());

        for entry in self.entries.drain(..) {
            let is_target = entry.name == target;
            if is_target && placement == Placement::Before {
                entries.extend(pending.take().unwrap_or_default());
            }
            let keep = !replaced.contains(entry.name.as_str());
            if keep {
                entries.push(entry);
            }
            if is_target && placement == Placement::After {
                entries.extend(pending.take().unwrap_or_default());
            }
        }

        self.entries = entries;
        true
    }
}

/// Incremental construction of a [`Grammar`]
#[derive(Debug, Default)]
pub struct GrammarBuilder {
    grammar: Grammar,
}

impl GrammarBuilder {
    /// Entry with a single rule
    pub fn rule(mut self, name: impl Into<String>, rule: impl Into<Rule>) -> Self {
        self.grammar.set(name, vec![rule.into()]);
        self
    }

    /// Entry with several rules, tried in order
    pub fn rules(mut self, name: impl Into<String>, rules: Vec<Rule>) -> Self {
        self.grammar.set(name, rules);
        self
    }

    pub fn rest(mut self, rest: impl Into<GrammarRef>) -> Self {
        self.grammar.rest = Some(rest.into());
        self
    }

    pub fn build(self) -> Grammar {
        self.grammar
    }
}
