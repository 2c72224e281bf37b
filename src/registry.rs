//! Grammar registry
//!
//! Maps language names to grammars. Grammars are stored as `Arc<Grammar>`
//! and every mutation goes through [`Arc::make_mut`], so a grammar handed
//! out earlier (or one that was used as the base of an `extend`) is never
//! changed behind its holder's back.
//!
//! Aliases share the grammar of their target: tokenizing `shell` and `bash`
//! uses the same entries, and mutating either name mutates both.
//!
//! [`global`] returns a process-wide registry seeded with the bundled
//! languages. Everything else works just as well on a registry built and
//! owned by the caller.

use crate::error::GrammarError;
use crate::grammar::pattern::DEFAULT_BACKTRACK_LIMIT;
use crate::grammar::{Grammar, GrammarEntry, GrammarSpec, Placement};
use crate::tokenizer::{GrammarResolver, Token, Tokenizer};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, error};

/// Registry of grammars by language name
#[derive(Debug, Clone, Default)]
pub struct GrammarRegistry {
    grammars: HashMap<String, Arc<Grammar>>,
    aliases: HashMap<String, String>,
}

impl GrammarRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the bundled languages
    pub fn with_defaults() -> Result<Self, GrammarError> {
        let mut registry = Self::new();
        crate::languages::register_all(&mut registry)?;
        Ok(registry)
    }

    /// Register `grammar` under `name`, replacing any previous grammar.
    ///
    /// Defining a name that was an alias turns it into a language of its own.
    pub fn define(&mut self, name: impl Into<String>, grammar: Grammar) -> Arc<Grammar> {
        let name = name.into();
        self.aliases.remove(&name);
        let grammar = Arc::new(grammar);
        debug!(language = %name, entries = grammar.len(), "Defined grammar");
        self.grammars.insert(name, Arc::clone(&grammar));
        grammar
    }

    /// Register a copy of `base` with `overrides` merged on top.
    ///
    /// Overridden entries keep their position, new entries get the lowest
    /// priority. `base` itself is not modified.
    pub fn extend(
        &mut self,
        name: impl Into<String>,
        base: &str,
        overrides: Grammar,
    ) -> Result<Arc<Grammar>, GrammarError> {
        let name = name.into();
        let merged = self.resolve(base)?.merged(&overrides);
        debug!(language = %name, base, "Extending grammar");
        Ok(self.define(name, merged))
    }

    /// Insert `entries` right before the entry named `target`
    pub fn insert_before(
        &mut self,
        language: &str,
        target: &str,
        entries: Grammar,
    ) -> Result<(), GrammarError> {
        self.splice(language, target, entries, Placement::Before)
    }

    /// Insert `entries` right after the entry named `target`
    pub fn insert_after(
        &mut self,
        language: &str,
        target: &str,
        entries: Grammar,
    ) -> Result<(), GrammarError> {
        self.splice(language, target, entries, Placement::After)
    }

    fn splice(
        &mut self,
        language: &str,
        target: &str,
        entries: Grammar,
        placement: Placement,
    ) -> Result<(), GrammarError> {
        let grammar = self.grammar_mut(language)?;
        if !grammar.contains(target) {
            return Err(GrammarError::UnknownToken {
                grammar: language.to_string(),
                token: target.to_string(),
            });
        }
        debug!(language, target, ?placement, inserted = entries.len(), "Inserting entries");
        Arc::make_mut(grammar).splice(target, entries, placement);
        Ok(())
    }

    /// Remove the entry named `token` from a language
    pub fn remove_token(&mut self, language: &str, token: &str) -> Result<GrammarEntry, GrammarError> {
        let grammar = self.grammar_mut(language)?;
        if !grammar.contains(token) {
            return Err(GrammarError::UnknownToken {
                grammar: language.to_string(),
                token: token.to_string(),
            });
        }
        debug!(language, token, "Removing entry");
        Arc::make_mut(grammar)
            .remove(token)
            .ok_or_else(|| GrammarError::UnknownToken {
                grammar: language.to_string(),
                token: token.to_string(),
            })
    }

    /// Make `alias` another name for the language `target`
    pub fn alias_language(
        &mut self,
        alias: impl Into<String>,
        target: &str,
    ) -> Result<(), GrammarError> {
        let alias = alias.into();
        let canonical = self.canonical(target).to_string();
        if !self.grammars.contains_key(&canonical) {
            return Err(GrammarError::UnknownGrammar(target.to_string()));
        }
        if alias == canonical {
            return Ok(());
        }
        debug!(alias = %alias, target = %canonical, "Aliased language");
        self.grammars.remove(&alias);
        self.aliases.insert(alias, canonical);
        Ok(())
    }

    /// Compile and register a grammar from a JSON document
    pub fn define_from_json(
        &mut self,
        name: impl Into<String>,
        source: &str,
    ) -> Result<Arc<Grammar>, GrammarError> {
        let grammar = GrammarSpec::from_json(source)?.compile(DEFAULT_BACKTRACK_LIMIT)?;
        Ok(self.define(name, grammar))
    }

    /// Compile and register a grammar from a YAML document
    pub fn define_from_yaml(
        &mut self,
        name: impl Into<String>,
        source: &str,
    ) -> Result<Arc<Grammar>, GrammarError> {
        let grammar = GrammarSpec::from_yaml(source)?.compile(DEFAULT_BACKTRACK_LIMIT)?;
        Ok(self.define(name, grammar))
    }

    /// Get the grammar of a language
    pub fn resolve(&self, name: &str) -> Result<Arc<Grammar>, GrammarError> {
        self.get(name)
            .ok_or_else(|| GrammarError::UnknownGrammar(name.to_string()))
    }

    pub fn get(&self, name: &str) -> Option<Arc<Grammar>> {
        self.grammars.get(self.canonical(name)).cloned()
    }

    /// Check if a language (or alias) is registered
    pub fn has(&self, name: &str) -> bool {
        self.grammars.contains_key(self.canonical(name))
    }

    /// All language names and aliases (sorted)
    pub fn languages(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .grammars
            .keys()
            .chain(self.aliases.keys())
            .cloned()
            .collect();
        names.sort();
        names
    }

    /// Tokenize `text` with a registered language
    pub fn tokenize(&self, text: &str, language: &str) -> Result<Vec<Token>, GrammarError> {
        let grammar = self.resolve(language)?;
        Ok(Tokenizer::new(self).tokenize(text, &grammar))
    }

    fn canonical<'a>(&'a self, name: &'a str) -> &'a str {
        self.aliases.get(name).map(String::as_str).unwrap_or(name)
    }

    fn grammar_mut(&mut self, language: &str) -> Result<&mut Arc<Grammar>, GrammarError> {
        let canonical = self.canonical(language).to_string();
        self.grammars
            .get_mut(&canonical)
            .ok_or_else(|| GrammarError::UnknownGrammar(language.to_string()))
    }
}

impl GrammarResolver for GrammarRegistry {
    fn resolve_grammar(&self, name: &str) -> Option<Arc<Grammar>> {
        self.get(name)
    }
}

static GLOBAL: Lazy<RwLock<GrammarRegistry>> = Lazy::new(|| {
    let registry = GrammarRegistry::with_defaults().unwrap_or_else(|err| {
        error!(error = %err, "Bundled grammars failed to load, starting with an empty registry");
        GrammarRegistry::new()
    });
    RwLock::new(registry)
});

/// The process-wide registry, seeded with the bundled languages
pub fn global() -> &'static RwLock<GrammarRegistry> {
    &GLOBAL
}

/// Resolves names through the process-wide registry.
///
/// The read lock is taken per lookup, never for a whole tokenization run.
#[derive(Debug, Clone, Copy, Default)]
pub struct Global;

impl GrammarResolver for Global {
    fn resolve_grammar(&self, name: &str) -> Option<Arc<Grammar>> {
        global()
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
    }
}
