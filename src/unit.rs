//! Position units and the quadruple location record.
//!
//! Every advancement through the input updates four counters at once:
//! bytes, characters (codepoints), grapheme clusters and lines. A
//! [`Location`] describes one unit's view of a region; [`Locations`] is
//! the bundle of all four.

use std::fmt;
use std::ops::{Index, IndexMut};

/// One of the four position units tracked by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Unit {
    /// Raw bytes of the UTF-8 encoding.
    Byte = 0,
    /// Unicode scalar values.
    Char = 1,
    /// Grapheme clusters (user-perceived characters).
    Grapheme = 2,
    /// Lines, as delimited by the extended line-separator set.
    Line = 3,
}

impl Unit {
    /// Number of units; the length of every [`Locations`] array.
    pub const COUNT: usize = 4;

    /// All units in ordinal order.
    pub const ALL: [Unit; Unit::COUNT] = [Unit::Byte, Unit::Char, Unit::Grapheme, Unit::Line];
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Unit::Byte => "byte",
            Unit::Char => "char",
            Unit::Grapheme => "grapheme",
            Unit::Line => "line",
        };
        f.write_str(name)
    }
}

/// One unit's view of a region of input.
///
/// `start` is the first index covered (-1 when cleared), `length` the
/// number of units covered, and `after` the reset value to use for the
/// next `start` once the region has been consumed: -1 means no reset
/// (advance by `length`), any other value replaces `start` outright.
/// Char and grapheme counts reset to 0 at a line break this way, while
/// byte and line stay monotonic. `hash` is an additive fingerprint of
/// the unit values covered, with unsigned wrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    /// First index covered, or -1 when cleared.
    pub start: i64,
    /// Number of units covered, or -1 when cleared.
    pub length: i64,
    /// Reset value for the next `start`, or -1 for no reset.
    pub after: i64,
    /// Additive hash of the unit values covered.
    pub hash: u64,
}

impl Location {
    /// A cleared location: no position, no extent, no reset.
    pub const CLEARED: Location = Location {
        start: -1,
        length: -1,
        after: -1,
        hash: 0,
    };

    /// A location pinned at the origin with no extent.
    pub const ZERO: Location = Location {
        start: 0,
        length: 0,
        after: -1,
        hash: 0,
    };

    /// Whether this location carries a valid position.
    pub fn is_valid(&self) -> bool {
        self.start >= 0 && self.length >= 0 && self.after >= -1
    }
}

/// The four per-unit locations of a region, indexed by [`Unit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Locations(pub [Location; Unit::COUNT]);

impl Locations {
    /// All four locations cleared.
    pub const CLEARED: Locations = Locations([Location::CLEARED; Unit::COUNT]);

    /// All four locations at the origin with zero extent.
    pub const ZERO: Locations = Locations([Location::ZERO; Unit::COUNT]);

    /// Extent-only locations: zero lengths, cleared starts, no resets.
    /// The shape every matcher accumulates into.
    pub(crate) fn extent() -> Locations {
        Locations(
            [Location {
                start: -1,
                length: 0,
                after: -1,
                hash: 0,
            }; Unit::COUNT],
        )
    }

    /// Fold another region's lengths, resets and hashes into this one.
    ///
    /// A reset in `other` replaces any accumulated reset; lengths after
    /// an established reset keep counting from the reset value, so the
    /// final `after` always names the position immediately following
    /// the combined region.
    pub(crate) fn extend(&mut self, other: &Locations) {
        for unit in Unit::ALL {
            let add = other[unit];
            if add.after >= 0 {
                self[unit].after = add.after;
            } else if self[unit].after >= 0 {
                self[unit].after += add.length.max(0);
            }
            self[unit].length += add.length.max(0);
            self[unit].hash = self[unit].hash.wrapping_add(add.hash);
        }
    }

    /// Apply a consumed region to a cursor: each unit's `start` jumps to
    /// the region's `after` when one is set, else advances by the
    /// region's `length`. In-flight lengths and resets are zeroed.
    pub(crate) fn advance(&mut self, consumed: &Locations) {
        for unit in Unit::ALL {
            let region = consumed[unit];
            if region.after >= 0 {
                self[unit].start = region.after;
            } else {
                self[unit].start += region.length.max(0);
            }
            self[unit].length = 0;
            self[unit].after = -1;
            self[unit].hash = self[unit].hash.wrapping_add(region.hash);
        }
    }
}

impl Index<Unit> for Locations {
    type Output = Location;

    fn index(&self, unit: Unit) -> &Location {
        &self.0[unit as usize]
    }
}

impl IndexMut<Unit> for Locations {
    fn index_mut(&mut self, unit: Unit) -> &mut Location {
        &mut self.0[unit as usize]
    }
}
