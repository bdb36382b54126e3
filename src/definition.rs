//! The definition registry.
//!
//! A definition is the pattern half of a rule: a category test, an
//! exact literal, an anchored regex, or a multi definition composing
//! references to other definitions. Definitions live in an append-only
//! arena with dense ids; `prev`/`next` handles preserve the registry's
//! traversal contract.

use std::fmt;

use crate::cat::Cat;
use crate::error::{Error, Result};
use crate::multi::MultiDef;
use crate::read::measure;
use crate::regex::RegexDef;
use crate::unit::Locations;
use crate::{MAX_BODY_BYTES, MAX_DEFINITIONS, MAX_NAME_BYTES};

/// Stable handle of a definition within its registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DefId(pub u32);

impl fmt::Display for DefId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "definition{}", self.0)
    }
}

/// A category definition: match `min..=max` consecutive graphemes whose
/// category intersects the mask.
#[derive(Debug, Clone)]
pub struct CatDef {
    /// The category mask graphemes are tested against.
    pub cat: Cat,
    /// Canonical `|`-separated rendering of the mask.
    pub formatted: String,
    /// Minimum number of consecutive matching graphemes.
    pub min: usize,
    /// Maximum number of matching graphemes; `None` is unbounded.
    pub max: Option<usize>,
}

impl CatDef {
    /// Build a category definition, validating the mask and quantifier.
    pub fn new(cat: Cat, min: usize, max: Option<usize>) -> Result<CatDef> {
        if cat.is_none() {
            return Err(Error::Cat("NONE".to_owned()));
        }
        if let Some(max) = max {
            if max == 0 || max < min {
                return Err(Error::BadMax);
            }
        }
        Ok(CatDef {
            cat,
            formatted: cat.to_string(),
            min,
            max,
        })
    }
}

/// A literal definition: match these exact bytes.
///
/// The per-unit extent of the literal is measured once here, so a
/// literal containing a line break can be applied without re-counting
/// graphemes at match time.
#[derive(Debug, Clone)]
pub struct LiteralDef {
    /// The exact text to match.
    pub text: String,
    /// Precomputed lengths, resets and hashes of the text.
    pub loc: Locations,
}

impl LiteralDef {
    /// Build a literal definition; the empty literal is rejected.
    pub fn new(text: &str) -> Result<LiteralDef> {
        if text.is_empty() {
            return Err(Error::EmptyDefinition);
        }
        if text.len() > MAX_BODY_BYTES {
            return Err(Error::MaxLength);
        }
        Ok(LiteralDef {
            text: text.to_owned(),
            loc: measure(text)?,
        })
    }
}

/// The four definition kinds.
#[derive(Debug, Clone)]
pub enum DefinitionKind {
    /// Category test with a quantifier.
    Cat(CatDef),
    /// Exact byte string.
    Literal(LiteralDef),
    /// Anchored regular expression.
    Regex(RegexDef),
    /// Composition of references.
    Multi(MultiDef),
}

impl DefinitionKind {
    /// Short kind name for diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            DefinitionKind::Cat(_) => "cat",
            DefinitionKind::Literal(_) => "literal",
            DefinitionKind::Regex(_) => "regex",
            DefinitionKind::Multi(_) => "multi",
        }
    }
}

/// A named definition in the registry.
#[derive(Debug, Clone)]
pub struct Definition {
    /// Dense id, assigned on append.
    pub id: DefId,
    /// The name references resolve against.
    pub name: String,
    pub(crate) prev: Option<DefId>,
    pub(crate) next: Option<DefId>,
    /// Kind-specific payload.
    pub kind: DefinitionKind,
}

impl Definition {
    /// Handle of the next definition in registry order.
    pub fn next(&self) -> Option<DefId> {
        self.next
    }

    /// Handle of the previous definition in registry order.
    pub fn prev(&self) -> Option<DefId> {
        self.prev
    }
}

/// Append-only arena of definitions with dense, strictly increasing ids.
#[derive(Debug, Clone, Default)]
pub struct DefinitionSet {
    defs: Vec<Definition>,
}

impl DefinitionSet {
    /// An empty registry.
    pub fn new() -> DefinitionSet {
        DefinitionSet::default()
    }

    /// Number of definitions appended.
    pub fn len(&self) -> usize {
        self.defs.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Handle of the first definition.
    pub fn head(&self) -> Option<DefId> {
        if self.defs.is_empty() {
            None
        } else {
            Some(DefId(0))
        }
    }

    /// Iterate definitions in registry order.
    pub fn iter(&self) -> impl Iterator<Item = &Definition> {
        self.defs.iter()
    }

    /// Append a definition, linking it behind the current tail.
    pub fn append(&mut self, name: &str, kind: DefinitionKind) -> Result<DefId> {
        if name.len() > MAX_NAME_BYTES {
            return Err(Error::MaxLength);
        }
        if self.defs.len() >= MAX_DEFINITIONS {
            return Err(Error::MaxLength);
        }

        let id = DefId(self.defs.len() as u32);
        let prev = self.defs.last().map(|d| d.id);
        if let Some(prev) = prev {
            self.defs[prev.0 as usize].next = Some(id);
        }
        self.defs.push(Definition {
            id,
            name: name.to_owned(),
            prev,
            next: None,
            kind,
        });
        Ok(id)
    }

    /// Look up a definition by handle.
    pub fn get(&self, id: DefId) -> Result<&Definition> {
        self.defs.get(id.0 as usize).ok_or(Error::BadId(id.0))
    }

    pub(crate) fn get_mut(&mut self, id: DefId) -> Result<&mut Definition> {
        self.defs.get_mut(id.0 as usize).ok_or(Error::BadId(id.0))
    }

    /// Find the first definition with this name, walking the registry
    /// chain. A walk past the registry cap trips the infinite-loop
    /// sentinel.
    pub fn find_by_name(&self, name: &str) -> Result<Option<DefId>> {
        self.scan(|def| def.name == name)
    }

    /// Find a definition by numeric id via registry traversal.
    pub fn find_by_id(&self, id: u32) -> Result<Option<DefId>> {
        self.scan(|def| def.id.0 == id)
    }

    fn scan(&self, matches: impl Fn(&Definition) -> bool) -> Result<Option<DefId>> {
        let mut walked = 0usize;
        let mut cursor = self.head();
        while let Some(id) = cursor {
            walked += 1;
            if walked > MAX_DEFINITIONS {
                return Err(Error::InfiniteLoop);
            }
            let def = self.get(id)?;
            if matches(def) {
                return Ok(Some(id));
            }
            cursor = def.next;
        }
        Ok(None)
    }

    /// Bind every reference of one multi definition against the
    /// registry. The first name that fails to resolve is reported.
    pub fn resolve_multi(&mut self, id: DefId) -> Result<()> {
        let unresolved: Vec<(usize, String)> = match &self.get(id)?.kind {
            DefinitionKind::Multi(multi) => multi
                .refs
                .iter()
                .enumerate()
                .filter(|(_, r)| r.def.is_none())
                .map(|(i, r)| (i, r.name.clone()))
                .collect(),
            _ => return Err(Error::DefinitionType),
        };

        let mut bindings = Vec::with_capacity(unresolved.len());
        for (index, name) in unresolved {
            match self.find_by_name(&name)? {
                Some(target) => bindings.push((index, target)),
                None => return Err(Error::UnresolvedDefinition(name)),
            }
        }

        if let DefinitionKind::Multi(multi) = &mut self.get_mut(id)?.kind {
            for (index, target) in bindings {
                multi.refs[index].def = Some(target);
            }
        }
        Ok(())
    }

    /// Resolve every multi definition in registry order.
    pub fn resolve_all(&mut self) -> Result<()> {
        let multis: Vec<DefId> = self
            .defs
            .iter()
            .filter(|d| matches!(d.kind, DefinitionKind::Multi(_)))
            .map(|d| d.id)
            .collect();
        for id in multis {
            self.resolve_multi(id)?;
        }
        Ok(())
    }
}
