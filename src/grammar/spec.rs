//! Serde authoring surface for grammars
//!
//! Grammar files are JSON or YAML mappings from token name to one rule or a
//! list of rules:
//!
//! ```yaml
//! comment:
//!   pattern: '(^|[^\\])#.*'
//!   lookbehind: true
//!   greedy: true
//! keyword: '\b(?:if|then|else|fi)\b'
//! string:
//!   - pattern: '"(?:\\.|[^"\\])*"'
//!     greedy: true
//!     inside:
//!       variable: '\$\w+'
//! rest: bash
//! ```
//!
//! A rule is either a bare pattern string or a mapping with `pattern` and the
//! optional `flags`, `lookbehind`, `greedy`, `alias` and `inside` keys.
//! `inside` is a language name or a nested grammar mapping. The reserved key
//! `rest` names a language whose entries follow this grammar's own.
//!
//! Entry order is matching priority, so [`GrammarSpec`] deserializes the
//! mapping with its own visitor and keeps entries in document order.

use super::pattern::{Pattern, DEFAULT_BACKTRACK_LIMIT};
use super::{Grammar, GrammarRef, Rule};
use crate::error::GrammarError;
use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::fmt;

/// Key reserved for the `rest` reference
pub const REST_KEY: &str = "rest";

/// Uncompiled grammar, in file order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GrammarSpec {
    pub entries: Vec<(String, RuleSpecs)>,
    pub rest: Option<String>,
}

/// One rule or a list of rules.
///
/// `Many` must stay first. A rule mapping also deserializes from a sequence,
/// so `["a", "i"]` would otherwise read as one rule with flags.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RuleSpecs {
    Many(Vec<RuleSpec>),
    One(RuleSpec),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RuleSpec {
    Pattern(String),
    Detailed(DetailedRule),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DetailedRule {
    pub pattern: String,
    #[serde(default)]
    pub flags: String,
    #[serde(default)]
    pub lookbehind: bool,
    #[serde(default)]
    pub greedy: bool,
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(default)]
    pub inside: Option<InsideSpec>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum InsideSpec {
    Named(String),
    Inline(GrammarSpec),
}

impl GrammarSpec {
    pub fn from_json(source: &str) -> Result<Self, GrammarError> {
        serde_json::from_str(source).map_err(|e| GrammarError::InvalidDefinition(e.to_string()))
    }

    pub fn from_yaml(source: &str) -> Result<Self, GrammarError> {
        serde_yaml::from_str(source).map_err(|e| GrammarError::InvalidDefinition(e.to_string()))
    }

    /// Compile every pattern and build the grammar.
    ///
    /// A token name listed twice keeps its first position and the rules of
    /// its last occurrence.
    pub fn compile(&self, backtrack_limit: usize) -> Result<Grammar, GrammarError> {
        let mut grammar = Grammar::new();
        for (name, specs) in &self.entries {
            let rules = match specs {
                RuleSpecs::One(spec) => vec![spec.compile(backtrack_limit)?],
                RuleSpecs::Many(specs) => specs
                    .iter()
                    .map(|spec| spec.compile(backtrack_limit))
                    .collect::<Result<Vec<_>, _>>()?,
            };
            grammar.set(name.clone(), rules);
        }
        grammar.set_rest(self.rest.as_ref().map(GrammarRef::named));
        Ok(grammar)
    }
}

impl RuleSpec {
    fn compile(&self, backtrack_limit: usize) -> Result<Rule, GrammarError> {
        let detailed = match self {
            RuleSpec::Pattern(source) => {
                return Pattern::compile(source, "", backtrack_limit).map(Rule::new)
            }
            RuleSpec::Detailed(detailed) => detailed,
        };

        let mut rule = Rule::new(Pattern::compile(
            &detailed.pattern,
            &detailed.flags,
            backtrack_limit,
        )?);
        if detailed.lookbehind {
            rule = rule.lookbehind();
        }
        if detailed.greedy {
            rule = rule.greedy();
        }
        if let Some(alias) = &detailed.alias {
            rule = rule.alias(alias.clone());
        }
        match &detailed.inside {
            Some(InsideSpec::Named(name)) => rule = rule.inside(GrammarRef::named(name.clone())),
            Some(InsideSpec::Inline(spec)) => rule = rule.inside(spec.compile(backtrack_limit)?),
            None => {}
        }
        Ok(rule)
    }
}

impl TryFrom<&GrammarSpec> for Grammar {
    type Error = GrammarError;

    fn try_from(spec: &GrammarSpec) -> Result<Self, Self::Error> {
        spec.compile(DEFAULT_BACKTRACK_LIMIT)
    }
}

struct GrammarSpecVisitor;

impl<'de> Visitor<'de> for GrammarSpecVisitor {
    type Value = GrammarSpec;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a grammar mapping of token names to rules")
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut spec = GrammarSpec::default();
        while let Some(key) = map.next_key::<String>()? {
            if key == REST_KEY {
                if spec.rest.is_some() {
                    return Err(de::Error::duplicate_field(REST_KEY));
                }
                spec.rest = Some(map.next_value()?);
            } else {
                let rules: RuleSpecs = map.next_value()?;
                spec.entries.push((key, rules));
            }
        }
        Ok(spec)
    }
}

impl<'de> Deserialize<'de> for GrammarSpec {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(GrammarSpecVisitor)
    }
}
