//! Rules: a definition plus host-language code, in priority order.

use std::fmt;

use crate::definition::DefId;
use crate::error::{Error, Result};
use crate::{MAX_NAME_BYTES, MAX_RULE_CODE_BYTES, MAX_RULES};

/// Stable handle of a rule; declaration order is matching priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RuleId(pub u32);

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rule{}", self.0)
    }
}

/// One rule of the lexicon.
#[derive(Debug, Clone)]
pub struct Rule {
    /// Dense id, assigned on append.
    pub id: RuleId,
    /// Name used in diagnostics and the emitted dispatch table.
    pub name: String,
    /// The definition this rule matches with.
    pub def: DefId,
    /// Host-language code, opaque to the engine, emitted verbatim.
    pub code: String,
    pub(crate) prev: Option<RuleId>,
    pub(crate) next: Option<RuleId>,
}

impl Rule {
    /// Handle of the next rule in declaration order.
    pub fn next(&self) -> Option<RuleId> {
        self.next
    }

    /// Handle of the previous rule.
    pub fn prev(&self) -> Option<RuleId> {
        self.prev
    }
}

/// Append-only registry of rules with dense ids.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    /// An empty registry.
    pub fn new() -> RuleSet {
        RuleSet::default()
    }

    /// Number of rules appended.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether no rule has been appended.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Iterate rules in declaration (priority) order.
    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    /// Append a rule bound to an existing definition.
    pub fn append(&mut self, name: &str, def: DefId, code: &str) -> Result<RuleId> {
        if name.len() > MAX_NAME_BYTES || self.rules.len() >= MAX_RULES {
            return Err(Error::MaxLength);
        }
        if code.len() > MAX_RULE_CODE_BYTES {
            return Err(Error::MaxLength);
        }

        let id = RuleId(self.rules.len() as u32);
        let prev = self.rules.last().map(|r| r.id);
        if let Some(prev) = prev {
            self.rules[prev.0 as usize].next = Some(id);
        }
        self.rules.push(Rule {
            id,
            name: name.to_owned(),
            def,
            code: code.to_owned(),
            prev,
            next: None,
        });
        Ok(id)
    }

    /// Look up a rule by handle.
    pub fn get(&self, id: RuleId) -> Result<&Rule> {
        self.rules.get(id.0 as usize).ok_or(Error::NotARule)
    }

    /// Find the first rule with this name.
    pub fn find_by_name(&self, name: &str) -> Option<RuleId> {
        self.rules.iter().find(|r| r.name == name).map(|r| r.id)
    }
}
