//! Lexing state: the buffer chain plus the absolute read cursor.

use crate::buffer::{Buffer, BufferId, Chain, Pos, Str};
use crate::error::{Error, Result};
use crate::token::{SubId, SubKey, SubToken, SubTokenArena};
use crate::unit::{Locations, Unit};

/// All mutable state of one lexing stream.
///
/// Owns the buffer chain, the absolute per-unit cursor across the whole
/// chain, the sub-token arena consumed by multi matching, and the
/// configuration flags. Not sharable between concurrent callers.
#[derive(Debug, Clone)]
pub struct State {
    pub(crate) chain: Chain,
    pub(crate) current: Option<BufferId>,
    /// Absolute read cursor. Starts cleared; the driver zeroes it on
    /// the first call.
    pub loc: Locations,
    pub(crate) subs: SubTokenArena,
    /// When set, the driver writes per-rule pre/post trace records to
    /// stdout.
    pub tracing: bool,
}

impl Default for State {
    fn default() -> State {
        State::new()
    }
}

impl State {
    /// A fresh state with an empty chain.
    pub fn new() -> State {
        State {
            chain: Chain::new(),
            current: None,
            loc: Locations::CLEARED,
            subs: SubTokenArena::default(),
            tracing: false,
        }
    }

    /// Append a buffer of bytes at the tail of the chain.
    pub fn append(&mut self, text: Str, is_eof: bool) -> Result<BufferId> {
        let id = self.chain.append(Buffer::new(text, is_eof))?;
        if self.current.is_none() {
            self.current = Some(id);
        }
        Ok(id)
    }

    /// Append a string slice as a buffer.
    pub fn append_str(&mut self, text: &str, is_eof: bool) -> Result<BufferId> {
        self.append(Str::from(text), is_eof)
    }

    /// The buffer chain.
    pub fn chain(&self) -> &Chain {
        &self.chain
    }

    /// The sub-token arena of the most recent driver call.
    pub fn arena(&self) -> &SubTokenArena {
        &self.subs
    }

    /// Look up a captured sub-token.
    pub fn sub_token(&self, id: SubId) -> Result<&SubToken> {
        self.subs.get(id)
    }

    /// Depth-first search of a capture tree for the `nth` sub-token
    /// matching `key`.
    pub fn find_sub_token(
        &self,
        roots: &[SubId],
        key: &SubKey<'_>,
        nth: usize,
    ) -> Result<Option<SubId>> {
        self.subs.find(roots, key, nth)
    }

    /// Release the chain and the arena, returning the state to its
    /// initial shape.
    pub fn clear(&mut self) {
        self.chain = Chain::new();
        self.current = None;
        self.loc = Locations::CLEARED;
        self.subs.reset();
    }

    /// The matching position: the current buffer and the buffer-local
    /// byte offset derived from the absolute cursor.
    pub(crate) fn pos(&self) -> Result<Option<Pos>> {
        let Some(current) = self.current else {
            return Ok(None);
        };
        let buffer = self.chain.get(current)?;
        let local = self.loc[Unit::Byte].start - buffer.loc[Unit::Byte].start;
        if local < 0 {
            return Err(Error::BadStart);
        }
        Ok(Some(Pos {
            buf: current,
            off: local as usize,
        }))
    }
}
