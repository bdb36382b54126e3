//! Chained input buffers.
//!
//! Input arrives as a FIFO chain of buffers, each wrapping one string of
//! bytes. Appending at the tail is the only structural mutation; the
//! final buffer's `is_eof` flag tells the engine whether more bytes may
//! ever arrive. Buffers live in an arena and link to each other through
//! stable [`BufferId`] handles.

use std::fmt;
use std::ops::Index;

use crate::error::{Error, Result};
use crate::unit::{Locations, Unit};
use crate::MAX_BUFFERS;

/// An owned byte string bound to a buffer.
///
/// The engine never mutates a string once a buffer wraps it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Str {
    bytes: Vec<u8>,
}

impl Str {
    /// Wrap an owned byte vector.
    pub fn new(bytes: Vec<u8>) -> Str {
        Str { bytes }
    }

    /// Number of bytes used.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the string holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The underlying bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl From<&str> for Str {
    fn from(text: &str) -> Str {
        Str::new(text.as_bytes().to_vec())
    }
}

impl From<String> for Str {
    fn from(text: String) -> Str {
        Str::new(text.into_bytes())
    }
}

impl From<Vec<u8>> for Str {
    fn from(bytes: Vec<u8>) -> Str {
        Str::new(bytes)
    }
}

/// Stable handle of a buffer within its chain's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferId(pub u32);

impl fmt::Display for BufferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "buffer{}", self.0)
    }
}

/// One node of the input chain.
#[derive(Debug, Clone)]
pub struct Buffer {
    pub(crate) prev: Option<BufferId>,
    pub(crate) next: Option<BufferId>,
    /// The bytes this buffer covers.
    pub text: Str,
    /// Where this buffer sits in the chain's coordinate space. Only the
    /// byte unit is known without decoding, so char, grapheme and line
    /// stay cleared.
    pub loc: Locations,
    /// True iff no more bytes will ever arrive on this chain.
    pub is_eof: bool,
}

impl Buffer {
    /// Create an unlinked buffer around a string.
    pub fn new(text: Str, is_eof: bool) -> Buffer {
        Buffer {
            prev: None,
            next: None,
            text,
            loc: Locations::CLEARED,
            is_eof,
        }
    }

    /// Handle of the following buffer, if one has been appended.
    pub fn next(&self) -> Option<BufferId> {
        self.next
    }

    /// Handle of the preceding buffer.
    pub fn prev(&self) -> Option<BufferId> {
        self.prev
    }
}

/// A byte position within a chain: an offset relative to one buffer.
/// The offset may run past the buffer's end; readers walk `next` links
/// to normalize as they go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Pos {
    pub buf: BufferId,
    pub off: usize,
}

impl Pos {
    pub(crate) fn advanced(self, n: usize) -> Pos {
        Pos {
            buf: self.buf,
            off: self.off + n,
        }
    }
}

/// The FIFO chain of buffers, stored as an arena with an implicit head.
#[derive(Debug, Clone, Default)]
pub struct Chain {
    buffers: Vec<Buffer>,
}

impl Chain {
    /// An empty chain.
    pub fn new() -> Chain {
        Chain::default()
    }

    /// Number of buffers appended so far.
    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    /// Whether no buffer has been appended yet.
    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    /// Handle of the first buffer.
    pub fn head(&self) -> Option<BufferId> {
        if self.buffers.is_empty() {
            None
        } else {
            Some(BufferId(0))
        }
    }

    /// Whether the chain has been sealed: the tail buffer carries the
    /// end-of-file flag.
    pub fn is_eof(&self) -> bool {
        self.buffers.last().map(|b| b.is_eof).unwrap_or(false)
    }

    /// Look up a buffer by handle.
    pub fn get(&self, id: BufferId) -> Result<&Buffer> {
        self.buffers.get(id.0 as usize).ok_or(Error::BadId(id.0))
    }

    /// Append a buffer at the tail of the chain.
    ///
    /// The buffer must be unlinked; a node that already carries chain
    /// links is a mid-chain insert, which is forbidden. The walk to the
    /// tail follows `next` links and trips the infinite-loop sentinel
    /// past [`MAX_BUFFERS`] steps; a full chain is a max-length error.
    pub fn append(&mut self, mut buffer: Buffer) -> Result<BufferId> {
        if buffer.prev.is_some() || buffer.next.is_some() {
            return Err(Error::ChainInsert);
        }
        if self.buffers.len() >= MAX_BUFFERS {
            return Err(Error::MaxLength);
        }

        let id = BufferId(self.buffers.len() as u32);

        let mut byte_start = 0i64;
        if let Some(head) = self.head() {
            let mut walked = 0usize;
            let mut tail = head;
            loop {
                walked += 1;
                if walked > MAX_BUFFERS {
                    return Err(Error::InfiniteLoop);
                }
                match self.get(tail)?.next {
                    Some(next) => tail = next,
                    None => break,
                }
            }
            let tail_loc = self.get(tail)?.loc[Unit::Byte];
            byte_start = tail_loc.start.max(0) + tail_loc.length.max(0);
            buffer.prev = Some(tail);
            self.buffers[tail.0 as usize].next = Some(id);
        }

        let mut loc = Locations::CLEARED;
        loc[Unit::Byte].start = byte_start;
        loc[Unit::Byte].length = buffer.text.len() as i64;
        loc[Unit::Byte].hash = buffer
            .text
            .as_bytes()
            .iter()
            .fold(0u64, |h, &b| h.wrapping_add(u64::from(b)));
        buffer.loc = loc;

        self.buffers.push(buffer);
        Ok(id)
    }

    /// Read the byte at a position, walking `next` links as needed.
    pub(crate) fn byte_at(&self, pos: Pos) -> Option<u8> {
        let mut buf = pos.buf;
        let mut off = pos.off;
        loop {
            let buffer = self.buffers.get(buf.0 as usize)?;
            if off < buffer.text.len() {
                return Some(buffer.text.as_bytes()[off]);
            }
            off -= buffer.text.len();
            buf = buffer.next?;
        }
    }

    /// Copy `len` bytes starting at a position, crossing buffer
    /// boundaries. Stops early if the chain runs out.
    pub(crate) fn copy_range(&self, pos: Pos, len: usize) -> Vec<u8> {
        let mut out = Vec::with_capacity(len.min(4096));
        let mut buf = pos.buf;
        let mut off = pos.off;
        while out.len() < len {
            let Some(buffer) = self.buffers.get(buf.0 as usize) else {
                break;
            };
            if off < buffer.text.len() {
                let take = (buffer.text.len() - off).min(len - out.len());
                out.extend_from_slice(&buffer.text.as_bytes()[off..off + take]);
                off += take;
            }
            if off >= buffer.text.len() {
                match buffer.next {
                    Some(next) => {
                        off -= buffer.text.len();
                        buf = next;
                    }
                    None => break,
                }
            }
        }
        out
    }

    /// Copy every byte from a position to the end of the chain.
    pub(crate) fn copy_to_end(&self, pos: Pos) -> Vec<u8> {
        self.copy_range(pos, usize::MAX)
    }
}

impl Index<BufferId> for Chain {
    type Output = Buffer;

    fn index(&self, id: BufferId) -> &Buffer {
        &self.buffers[id.0 as usize]
    }
}
