//! Multi definitions: sequences and alternations of references.

use crate::definition::DefId;
use crate::error::{Error, Result};
use crate::{MAX_NAME_BYTES, MAX_REFERENCES};

/// How a multi definition composes its references.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MultiKind {
    /// Every reference must match, in order.
    Sequence,
    /// The first matching alternative wins.
    Or,
}

/// A named, quantified edge from a multi definition to another
/// definition. Unresolved until [`def`](Reference::def) is bound.
#[derive(Debug, Clone)]
pub struct Reference {
    /// Name of the referenced definition.
    pub name: String,
    /// The bound definition, once resolution has run.
    pub def: Option<DefId>,
    /// Minimum number of instances.
    pub min: usize,
    /// Maximum number of instances; `None` is unbounded.
    pub max: Option<usize>,
}

impl Reference {
    /// Build an unresolved reference with a quantifier: `1..=1` for a
    /// bare name, `0..` for `*`, `1..` for `+`.
    pub fn new(name: &str, min: usize, max: Option<usize>) -> Result<Reference> {
        if name.is_empty() || name.len() > MAX_NAME_BYTES {
            return Err(Error::MaxLength);
        }
        if let Some(max) = max {
            if max == 0 || max < min {
                return Err(Error::BadMax);
            }
        }
        Ok(Reference {
            name: name.to_owned(),
            def: None,
            min,
            max,
        })
    }

    /// Whether the reference has been bound to a definition.
    pub fn is_resolved(&self) -> bool {
        self.def.is_some()
    }
}

/// Payload of a multi definition.
#[derive(Debug, Clone)]
pub struct MultiDef {
    /// Sequence or alternation.
    pub kind: MultiKind,
    /// References in declaration order.
    pub refs: Vec<Reference>,
}

impl MultiDef {
    /// An empty multi of the given kind.
    pub fn new(kind: MultiKind) -> MultiDef {
        MultiDef {
            kind,
            refs: Vec::new(),
        }
    }

    /// Append a reference, bounded by the per-multi cap.
    pub fn push_reference(&mut self, reference: Reference) -> Result<()> {
        if self.refs.len() >= MAX_REFERENCES {
            return Err(Error::MaxLength);
        }
        self.refs.push(reference);
        Ok(())
    }

    /// Adjust the most recently appended reference's quantifier, as the
    /// spec grammar does when it sees a trailing `*` or `+`.
    pub fn requantify_last(&mut self, min: usize, max: Option<usize>) -> Result<()> {
        let last = self.refs.last_mut().ok_or(Error::NotFound("*".into()))?;
        last.min = min;
        last.max = max;
        Ok(())
    }

    /// Whether every reference is bound.
    pub fn is_resolved(&self) -> bool {
        self.refs.iter().all(Reference::is_resolved)
    }
}
