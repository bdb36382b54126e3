//! Tokens, sub-tokens and the per-state capture arena.

use std::borrow::Cow;
use std::fmt;

use crate::definition::DefId;
use crate::error::{Error, Result};
use crate::rule::RuleId;
use crate::unit::{Locations, Unit};
use crate::{MAX_MULTI_DEPTH, MAX_SUB_TOKENS};

/// One successfully extracted token.
///
/// The matched bytes are owned: a token may span buffer boundaries, so
/// there is no single backing string to borrow from.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The rule that matched.
    pub rule: RuleId,
    /// The rule's definition.
    pub def: DefId,
    /// The matched bytes.
    pub bytes: Vec<u8>,
    /// Absolute byte index of the first matched byte.
    pub start_byte: usize,
    /// Number of matched bytes.
    pub len_bytes: usize,
    /// Absolute per-unit locations of the match.
    pub loc: Locations,
    /// Direct sub-tokens captured by a multi definition, in match order.
    pub subs: Vec<SubId>,
}

impl Token {
    /// The matched text. Lossy only in the warned-about case where a
    /// regex match disagreed with the grapheme re-read.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }
}

/// Handle of a sub-token in its state's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubId(pub u32);

impl fmt::Display for SubId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "subtoken{}", self.0)
    }
}

/// A captured match for one reference instance inside a multi token.
///
/// Capture rehomes the match into the arena: bytes and locations are
/// copied out of the matching cursor, so the record stays valid after
/// the driver advances the state.
#[derive(Debug, Clone, PartialEq)]
pub struct SubToken {
    /// The referenced definition that matched.
    pub def: DefId,
    /// Name of the referenced definition.
    pub name: String,
    /// The matched bytes.
    pub bytes: Vec<u8>,
    /// Per-unit locations; starts are absolute within the stream.
    pub loc: Locations,
    /// Enclosing sub-token, if this capture is nested.
    pub parent: Option<SubId>,
    /// Nested captures of this instance, in match order.
    pub children: Vec<SubId>,
}

impl SubToken {
    /// The matched text.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }
}

/// Fixed-capacity arena of sub-tokens, reused between driver calls.
///
/// Failed multi attempts rewind to a saved used-count, so partial
/// captures leave no residue.
#[derive(Debug, Clone, Default)]
pub struct SubTokenArena {
    slots: Vec<SubToken>,
}

impl SubTokenArena {
    /// Number of live captures.
    pub fn used(&self) -> usize {
        self.slots.len()
    }

    /// Look up a capture by handle.
    pub fn get(&self, id: SubId) -> Result<&SubToken> {
        self.slots.get(id.0 as usize).ok_or(Error::Token)
    }

    pub(crate) fn get_mut(&mut self, id: SubId) -> Result<&mut SubToken> {
        self.slots.get_mut(id.0 as usize).ok_or(Error::Token)
    }

    pub(crate) fn alloc(&mut self, sub: SubToken) -> Result<SubId> {
        if self.slots.len() >= MAX_SUB_TOKENS {
            return Err(Error::MaxLength);
        }
        let id = SubId(self.slots.len() as u32);
        self.slots.push(sub);
        Ok(id)
    }

    pub(crate) fn mark(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn rewind(&mut self, mark: usize) {
        self.slots.truncate(mark);
    }

    pub(crate) fn reset(&mut self) {
        self.slots.clear();
    }

    /// Depth-first search over a capture tree for the `nth` (0-based)
    /// sub-token matching `key`, bounded by the multi depth cap.
    pub fn find(&self, roots: &[SubId], key: &SubKey<'_>, nth: usize) -> Result<Option<SubId>> {
        let mut remaining = nth;
        self.find_inner(roots, key, &mut remaining, 0)
    }

    fn find_inner(
        &self,
        roots: &[SubId],
        key: &SubKey<'_>,
        remaining: &mut usize,
        depth: usize,
    ) -> Result<Option<SubId>> {
        if depth > MAX_MULTI_DEPTH {
            return Err(Error::InfiniteLoop);
        }
        for &id in roots {
            let sub = self.get(id)?;
            let hit = match key {
                SubKey::Name(name) => sub.name == *name,
                SubKey::Def(def) => sub.def == *def,
            };
            if hit {
                if *remaining == 0 {
                    return Ok(Some(id));
                }
                *remaining -= 1;
            }
            if let Some(found) = self.find_inner(&sub.children, key, remaining, depth + 1)? {
                return Ok(Some(found));
            }
        }
        Ok(None)
    }
}

/// How to look up a sub-token: by referenced-definition name or handle.
#[derive(Debug, Clone, Copy)]
pub enum SubKey<'a> {
    /// Match on the referenced definition's name.
    Name(&'a str),
    /// Match on the referenced definition's handle.
    Def(DefId),
}

pub(crate) fn sub_starts(base: &Locations, consumed: &Locations) -> Locations {
    let mut loc = *consumed;
    for unit in Unit::ALL {
        loc[unit].start = if consumed[unit].after >= 0 {
            consumed[unit].after
        } else {
            base[unit].start + consumed[unit].length.max(0)
        };
    }
    loc
}
