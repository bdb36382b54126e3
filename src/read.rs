//! Reading one grapheme cluster at a time out of a buffer chain.
//!
//! A cluster is one leading codepoint plus any immediately following
//! combining marks, with the CR LF pair fused into a single cluster.
//! Reads cross buffer boundaries transparently; running out of bytes
//! mid-sequence is recoverable (`NeedMore`) until the chain is sealed,
//! after which a truncated sequence is malformed input.

use crate::buffer::{Chain, Pos};
use crate::cat::{is_line_separator, Cat};
use crate::error::{Error, Result};
use crate::unit::{Locations, Unit};

/// One grapheme cluster as read from the chain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Grapheme {
    /// Per-unit lengths, resets and hashes of the cluster. Starts are
    /// cleared; the caller knows where it is reading.
    pub loc: Locations,
    /// The leading codepoint.
    pub cp: char,
    /// Category of the leading codepoint.
    pub cat: Cat,
}

/// Outcome of one read attempt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Next {
    Grapheme(Grapheme),
    /// The cluster cannot be completed with the bytes on hand and the
    /// chain is not sealed.
    NeedMore,
    /// The chain is sealed and fully consumed.
    Eof,
}

enum Decoded {
    Cp { cp: char, len: usize },
    NeedMore,
    Eof,
}

/// Decode the codepoint at `pos`, without consuming it.
fn decode_cp(chain: &Chain, pos: Pos) -> Result<Decoded> {
    let Some(lead) = chain.byte_at(pos) else {
        return Ok(if chain.is_eof() {
            Decoded::Eof
        } else {
            Decoded::NeedMore
        });
    };

    let (len, init) = match lead {
        0x00..=0x7F => {
            return Ok(Decoded::Cp {
                cp: lead as char,
                len: 1,
            })
        }
        0xC2..=0xDF => (2, u32::from(lead & 0x1F)),
        0xE0..=0xEF => (3, u32::from(lead & 0x0F)),
        0xF0..=0xF4 => (4, u32::from(lead & 0x07)),
        _ => return Err(Error::BadUtf8),
    };

    let mut cp = init;
    for i in 1..len {
        let Some(byte) = chain.byte_at(pos.advanced(i)) else {
            if chain.is_eof() {
                // Truncated at the end of all input: nothing can repair it.
                return Err(Error::BadUtf8);
            }
            return Ok(Decoded::NeedMore);
        };
        // Overlong encodings and surrogates are caught by the tighter
        // second-byte windows.
        let valid = match (i, lead) {
            (1, 0xE0) => (0xA0..=0xBF).contains(&byte),
            (1, 0xED) => (0x80..=0x9F).contains(&byte),
            (1, 0xF0) => (0x90..=0xBF).contains(&byte),
            (1, 0xF4) => (0x80..=0x8F).contains(&byte),
            _ => (0x80..=0xBF).contains(&byte),
        };
        if !valid {
            return Err(Error::BadUtf8);
        }
        cp = (cp << 6) | u32::from(byte & 0x3F);
    }

    let cp = char::from_u32(cp).ok_or(Error::BadUtf8)?;
    Ok(Decoded::Cp { cp, len })
}

fn absorb(loc: &mut Locations, cp: char, len: usize) {
    let mut bytes = [0u8; 4];
    let byte_hash = cp
        .encode_utf8(&mut bytes)
        .as_bytes()
        .iter()
        .fold(0u64, |h, &b| h.wrapping_add(u64::from(b)));
    loc[Unit::Byte].length += len as i64;
    loc[Unit::Byte].hash = loc[Unit::Byte].hash.wrapping_add(byte_hash);
    loc[Unit::Char].length += 1;
    loc[Unit::Char].hash = loc[Unit::Char].hash.wrapping_add(u64::from(u32::from(cp)));
}

/// Read the grapheme cluster at `pos`, advancing `pos` past it on
/// success. On `NeedMore` the position is left untouched so the caller
/// can retry after appending a buffer.
pub(crate) fn read_grapheme(chain: &Chain, pos: &mut Pos) -> Result<Next> {
    let (lead_cp, lead_len) = match decode_cp(chain, *pos)? {
        Decoded::Cp { cp, len } => (cp, len),
        Decoded::NeedMore => return Ok(Next::NeedMore),
        Decoded::Eof => return Ok(Next::Eof),
    };

    let mut cursor = pos.advanced(lead_len);
    let mut loc = Locations::extent();
    absorb(&mut loc, lead_cp, lead_len);
    loc[Unit::Grapheme].length = 1;
    loc[Unit::Grapheme].hash = u64::from(u32::from(lead_cp));
    let cat = Cat::of(lead_cp);

    if is_line_separator(lead_cp) {
        loc[Unit::Line].length = 1;
        loc[Unit::Line].hash = 1;
        loc[Unit::Char].after = 0;
        loc[Unit::Grapheme].after = 0;

        if lead_cp == '\r' {
            // CR directly followed by LF is one cluster and one line.
            match decode_cp(chain, cursor) {
                Ok(Decoded::Cp { cp: '\n', len }) => {
                    absorb(&mut loc, '\n', len);
                    cursor = cursor.advanced(len);
                }
                Ok(Decoded::Cp { .. }) | Ok(Decoded::Eof) | Err(_) => {}
                Ok(Decoded::NeedMore) => return Ok(Next::NeedMore),
            }
        }

        *pos = cursor;
        return Ok(Next::Grapheme(Grapheme { loc, cp: lead_cp, cat }));
    }

    // Combining marks extend the cluster.
    loop {
        match decode_cp(chain, cursor) {
            Ok(Decoded::Cp { cp, len }) if Cat::of(cp).intersects(Cat::MARK) => {
                absorb(&mut loc, cp, len);
                cursor = cursor.advanced(len);
            }
            Ok(Decoded::Cp { .. }) | Ok(Decoded::Eof) => break,
            Ok(Decoded::NeedMore) => return Ok(Next::NeedMore),
            // A malformed tail surfaces on the next read.
            Err(_) => break,
        }
    }

    *pos = cursor;
    Ok(Next::Grapheme(Grapheme { loc, cp: lead_cp, cat }))
}

/// Measure the per-unit extent of a standalone string: the Locations a
/// literal of this text covers, line resets included.
pub(crate) fn measure(text: &str) -> Result<Locations> {
    let mut chain = Chain::new();
    chain.append(crate::buffer::Buffer::new(
        crate::buffer::Str::from(text),
        true,
    ))?;
    let mut pos = Pos {
        buf: crate::buffer::BufferId(0),
        off: 0,
    };
    let mut loc = Locations::extent();
    loop {
        match read_grapheme(&chain, &mut pos)? {
            Next::Grapheme(g) => loc.extend(&g.loc),
            Next::Eof => break,
            // Unreachable on a sealed chain, but the taxonomy is closed.
            Next::NeedMore => return Err(Error::BadUtf8),
        }
    }
    Ok(loc)
}
