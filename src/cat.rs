//! Unicode category classification.
//!
//! A [`Cat`] is a bitmask over the 29 base general categories, the
//! unassigned pseudo-category, and one synthetic bit for the extended
//! line-separator set. Matching logic tests masks by intersection, so a
//! definition may name any `|`-combination of base categories and
//! precomputed groups.
//!
//! The per-category codepoint ranges come out of `regex_syntax`'s
//! `\p{..}` class data, parsed once into static tables.

use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};
use std::str::FromStr;

use lazy_static::lazy_static;
use regex_syntax::hir::{Class, HirKind};
use regex_syntax::ParserBuilder;

use crate::error::Error;

/// Bitmask of Unicode categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cat(pub u32);

impl Cat {
    /// The empty mask.
    pub const NONE: Cat = Cat(0);

    /// Uppercase letter (Lu).
    pub const LETTER_UPPER: Cat = Cat(1 << 0);
    /// Lowercase letter (Ll).
    pub const LETTER_LOWER: Cat = Cat(1 << 1);
    /// Titlecase letter (Lt).
    pub const LETTER_TITLE: Cat = Cat(1 << 2);
    /// Modifier letter (Lm).
    pub const LETTER_MODIFIER: Cat = Cat(1 << 3);
    /// Other letter (Lo).
    pub const LETTER_OTHER: Cat = Cat(1 << 4);
    /// Non-spacing mark (Mn).
    pub const MARK_NON_SPACING: Cat = Cat(1 << 5);
    /// Spacing combining mark (Mc).
    pub const MARK_SPACING: Cat = Cat(1 << 6);
    /// Enclosing mark (Me).
    pub const MARK_ENCLOSING: Cat = Cat(1 << 7);
    /// Decimal digit (Nd).
    pub const NUM_DECIMAL: Cat = Cat(1 << 8);
    /// Letter number (Nl).
    pub const NUM_LETTER: Cat = Cat(1 << 9);
    /// Other number (No).
    pub const NUM_OTHER: Cat = Cat(1 << 10);
    /// Connector punctuation (Pc).
    pub const PUNCT_CONNECTOR: Cat = Cat(1 << 11);
    /// Dash punctuation (Pd).
    pub const PUNCT_DASH: Cat = Cat(1 << 12);
    /// Open punctuation (Ps).
    pub const PUNCT_OPEN: Cat = Cat(1 << 13);
    /// Close punctuation (Pe).
    pub const PUNCT_CLOSE: Cat = Cat(1 << 14);
    /// Initial quote punctuation (Pi).
    pub const PUNCT_QUOTE_OPEN: Cat = Cat(1 << 15);
    /// Final quote punctuation (Pf).
    pub const PUNCT_QUOTE_CLOSE: Cat = Cat(1 << 16);
    /// Other punctuation (Po).
    pub const PUNCT_OTHER: Cat = Cat(1 << 17);
    /// Math symbol (Sm).
    pub const SYM_MATH: Cat = Cat(1 << 18);
    /// Currency symbol (Sc).
    pub const SYM_CURRENCY: Cat = Cat(1 << 19);
    /// Modifier symbol (Sk).
    pub const SYM_MODIFIER: Cat = Cat(1 << 20);
    /// Other symbol (So).
    pub const SYM_OTHER: Cat = Cat(1 << 21);
    /// Space separator (Zs).
    pub const SEP_SPACE: Cat = Cat(1 << 22);
    /// Line separator (Zl).
    pub const SEP_LINE: Cat = Cat(1 << 23);
    /// Paragraph separator (Zp).
    pub const SEP_PARAGRAPH: Cat = Cat(1 << 24);
    /// Control (Cc).
    pub const OTHER_CONTROL: Cat = Cat(1 << 25);
    /// Format (Cf).
    pub const OTHER_FORMAT: Cat = Cat(1 << 26);
    /// Surrogate (Cs).
    pub const OTHER_SURROGATE: Cat = Cat(1 << 27);
    /// Private use (Co).
    pub const OTHER_PRIVATE: Cat = Cat(1 << 28);
    /// Unassigned (Cn).
    pub const NA: Cat = Cat(1 << 29);
    /// The extended line-separator set: U+000A-U+000D, U+0085, U+2028,
    /// U+2029. Synthetic; OR'd onto the base category at classification.
    pub const EXT_SEP_LINE: Cat = Cat(1 << 30);

    /// All letter categories.
    pub const LETTER: Cat = Cat(Cat::LETTER_UPPER.0
        | Cat::LETTER_LOWER.0
        | Cat::LETTER_TITLE.0
        | Cat::LETTER_MODIFIER.0
        | Cat::LETTER_OTHER.0);
    /// All mark categories.
    pub const MARK: Cat =
        Cat(Cat::MARK_NON_SPACING.0 | Cat::MARK_SPACING.0 | Cat::MARK_ENCLOSING.0);
    /// All number categories.
    pub const NUM: Cat = Cat(Cat::NUM_DECIMAL.0 | Cat::NUM_LETTER.0 | Cat::NUM_OTHER.0);
    /// All punctuation categories.
    pub const PUNCT: Cat = Cat(Cat::PUNCT_CONNECTOR.0
        | Cat::PUNCT_DASH.0
        | Cat::PUNCT_OPEN.0
        | Cat::PUNCT_CLOSE.0
        | Cat::PUNCT_QUOTE_OPEN.0
        | Cat::PUNCT_QUOTE_CLOSE.0
        | Cat::PUNCT_OTHER.0);
    /// All symbol categories.
    pub const SYM: Cat =
        Cat(Cat::SYM_MATH.0 | Cat::SYM_CURRENCY.0 | Cat::SYM_MODIFIER.0 | Cat::SYM_OTHER.0);
    /// Horizontal whitespace.
    pub const HSPACE: Cat = Cat::SEP_SPACE;
    /// Vertical whitespace: separators plus the extended line set.
    pub const VSPACE: Cat = Cat(Cat::SEP_LINE.0 | Cat::SEP_PARAGRAPH.0 | Cat::EXT_SEP_LINE.0);
    /// Horizontal and vertical whitespace combined.
    pub const WHITESPACE: Cat = Cat(Cat::HSPACE.0 | Cat::VSPACE.0);
    /// The "other" categories: control, format, surrogate, private use
    /// and unassigned.
    pub const OTHER: Cat = Cat(Cat::OTHER_CONTROL.0
        | Cat::OTHER_FORMAT.0
        | Cat::OTHER_SURROGATE.0
        | Cat::OTHER_PRIVATE.0
        | Cat::NA.0);
    /// Every category bit.
    pub const ALL: Cat = Cat(Cat::LETTER.0
        | Cat::MARK.0
        | Cat::NUM.0
        | Cat::PUNCT.0
        | Cat::SYM.0
        | Cat::SEP_SPACE.0
        | Cat::SEP_LINE.0
        | Cat::SEP_PARAGRAPH.0
        | Cat::OTHER.0
        | Cat::EXT_SEP_LINE.0);
    /// Everything but letters.
    pub const NOT_LETTER: Cat = Cat(Cat::ALL.0 & !Cat::LETTER.0);
    /// Everything but numbers.
    pub const NOT_NUM: Cat = Cat(Cat::ALL.0 & !Cat::NUM.0);
    /// Everything but whitespace.
    pub const NOT_WHITESPACE: Cat = Cat(Cat::ALL.0 & !Cat::WHITESPACE.0);
    /// Everything but vertical whitespace.
    pub const NOT_VSPACE: Cat = Cat(Cat::ALL.0 & !Cat::VSPACE.0);

    /// Classify a codepoint: its single base category bit, plus the
    /// extended line-separator bit when it is in that set.
    pub fn of(cp: char) -> Cat {
        let code = cp as u32;
        let mut cat = Cat::NA;
        for (candidate, ranges) in BASE_TABLE.iter() {
            if in_ranges(ranges, code) {
                cat = *candidate;
                break;
            }
        }
        if is_line_separator(cp) {
            cat |= Cat::EXT_SEP_LINE;
        }
        cat
    }

    /// Whether the two masks share any bit.
    pub fn intersects(self, other: Cat) -> bool {
        self.0 & other.0 != 0
    }

    /// Whether no bit is set.
    pub fn is_none(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for Cat {
    type Output = Cat;

    fn bitor(self, rhs: Cat) -> Cat {
        Cat(self.0 | rhs.0)
    }
}

impl BitOrAssign for Cat {
    fn bitor_assign(&mut self, rhs: Cat) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for Cat {
    type Output = Cat;

    fn bitand(self, rhs: Cat) -> Cat {
        Cat(self.0 & rhs.0)
    }
}

/// Whether a codepoint terminates a line.
pub fn is_line_separator(cp: char) -> bool {
    matches!(
        cp,
        '\u{000A}' | '\u{000B}' | '\u{000C}' | '\u{000D}' | '\u{0085}' | '\u{2028}' | '\u{2029}'
    )
}

/// Base category names in bit order, plus the `\p{..}` class each is
/// built from. Cs has no parseable class in Unicode mode (char cannot
/// hold a surrogate) and is pinned to its fixed range below.
const BASE_NAMES: [(&str, Cat, &str); 29] = [
    ("LETTER_UPPER", Cat::LETTER_UPPER, r"\p{Lu}"),
    ("LETTER_LOWER", Cat::LETTER_LOWER, r"\p{Ll}"),
    ("LETTER_TITLE", Cat::LETTER_TITLE, r"\p{Lt}"),
    ("LETTER_MODIFIER", Cat::LETTER_MODIFIER, r"\p{Lm}"),
    ("LETTER_OTHER", Cat::LETTER_OTHER, r"\p{Lo}"),
    ("MARK_NON_SPACING", Cat::MARK_NON_SPACING, r"\p{Mn}"),
    ("MARK_SPACING", Cat::MARK_SPACING, r"\p{Mc}"),
    ("MARK_ENCLOSING", Cat::MARK_ENCLOSING, r"\p{Me}"),
    ("NUM_DECIMAL", Cat::NUM_DECIMAL, r"\p{Nd}"),
    ("NUM_LETTER", Cat::NUM_LETTER, r"\p{Nl}"),
    ("NUM_OTHER", Cat::NUM_OTHER, r"\p{No}"),
    ("PUNCT_CONNECTOR", Cat::PUNCT_CONNECTOR, r"\p{Pc}"),
    ("PUNCT_DASH", Cat::PUNCT_DASH, r"\p{Pd}"),
    ("PUNCT_OPEN", Cat::PUNCT_OPEN, r"\p{Ps}"),
    ("PUNCT_CLOSE", Cat::PUNCT_CLOSE, r"\p{Pe}"),
    ("PUNCT_QUOTE_OPEN", Cat::PUNCT_QUOTE_OPEN, r"\p{Pi}"),
    ("PUNCT_QUOTE_CLOSE", Cat::PUNCT_QUOTE_CLOSE, r"\p{Pf}"),
    ("PUNCT_OTHER", Cat::PUNCT_OTHER, r"\p{Po}"),
    ("SYM_MATH", Cat::SYM_MATH, r"\p{Sm}"),
    ("SYM_CURRENCY", Cat::SYM_CURRENCY, r"\p{Sc}"),
    ("SYM_MODIFIER", Cat::SYM_MODIFIER, r"\p{Sk}"),
    ("SYM_OTHER", Cat::SYM_OTHER, r"\p{So}"),
    ("SEP_SPACE", Cat::SEP_SPACE, r"\p{Zs}"),
    ("SEP_LINE", Cat::SEP_LINE, r"\p{Zl}"),
    ("SEP_PARAGRAPH", Cat::SEP_PARAGRAPH, r"\p{Zp}"),
    ("OTHER_CONTROL", Cat::OTHER_CONTROL, r"\p{Cc}"),
    ("OTHER_FORMAT", Cat::OTHER_FORMAT, r"\p{Cf}"),
    ("OTHER_SURROGATE", Cat::OTHER_SURROGATE, ""),
    ("OTHER_PRIVATE", Cat::OTHER_PRIVATE, r"\p{Co}"),
];

/// Group names accepted in category expressions.
const GROUP_NAMES: [(&str, Cat); 16] = [
    ("NA", Cat::NA),
    ("EXT_SEP_LINE", Cat::EXT_SEP_LINE),
    ("LETTER", Cat::LETTER),
    ("MARK", Cat::MARK),
    ("NUM", Cat::NUM),
    ("PUNCT", Cat::PUNCT),
    ("SYM", Cat::SYM),
    ("WHITESPACE", Cat::WHITESPACE),
    ("HSPACE", Cat::HSPACE),
    ("VSPACE", Cat::VSPACE),
    ("OTHER", Cat::OTHER),
    ("ALL", Cat::ALL),
    ("NOT_LETTER", Cat::NOT_LETTER),
    ("NOT_NUM", Cat::NOT_NUM),
    ("NOT_WHITESPACE", Cat::NOT_WHITESPACE),
    ("NOT_VSPACE", Cat::NOT_VSPACE),
];

lazy_static! {
    static ref BASE_TABLE: Vec<(Cat, Vec<(u32, u32)>)> = BASE_NAMES
        .iter()
        .map(|&(_, cat, class)| {
            let ranges = if cat == Cat::OTHER_SURROGATE {
                vec![(0xD800, 0xDFFF)]
            } else {
                class_ranges(class)
            };
            (cat, ranges)
        })
        .collect();
}

fn class_ranges(class: &str) -> Vec<(u32, u32)> {
    let hir = ParserBuilder::new()
        .build()
        .parse(class)
        .expect("category class data must parse");
    match hir.into_kind() {
        HirKind::Class(Class::Unicode(class)) => class
            .ranges()
            .iter()
            .map(|range| (range.start() as u32, range.end() as u32))
            .collect(),
        _ => unreachable!("category pattern is always a class"),
    }
}

fn in_ranges(ranges: &[(u32, u32)], code: u32) -> bool {
    let idx = ranges.partition_point(|&(start, _)| start <= code);
    idx > 0 && code <= ranges[idx - 1].1
}

impl fmt::Display for Cat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            return f.write_str("NONE");
        }
        // Prefer an exact group name for the whole mask, but never let a
        // single-bit alias (HSPACE) shadow its base category name.
        for &(name, group) in GROUP_NAMES.iter() {
            if *self == group && group.0.count_ones() > 1 {
                return f.write_str(name);
            }
        }
        let mut first = true;
        let mut write = |name: &str, f: &mut fmt::Formatter<'_>| -> fmt::Result {
            if !first {
                f.write_str("|")?;
            }
            first = false;
            f.write_str(name)
        };
        for &(name, cat, _) in BASE_NAMES.iter() {
            if self.intersects(cat) {
                write(name, f)?;
            }
        }
        if self.intersects(Cat::NA) {
            write("NA", f)?;
        }
        if self.intersects(Cat::EXT_SEP_LINE) {
            write("EXT_SEP_LINE", f)?;
        }
        Ok(())
    }
}

impl FromStr for Cat {
    type Err = Error;

    fn from_str(expr: &str) -> Result<Cat, Error> {
        let mut cat = Cat::NONE;
        for name in expr.split('|') {
            let name = name.trim();
            if name.is_empty() {
                return Err(Error::Cat(expr.to_owned()));
            }
            let base = BASE_NAMES
                .iter()
                .find(|(candidate, _, _)| *candidate == name)
                .map(|&(_, cat, _)| cat);
            let group = GROUP_NAMES
                .iter()
                .find(|(candidate, _)| *candidate == name)
                .map(|&(_, cat)| cat);
            match base.or(group) {
                Some(found) => cat |= found,
                None => return Err(Error::Cat(name.to_owned())),
            }
        }
        if cat.is_none() {
            return Err(Error::Cat(expr.to_owned()));
        }
        Ok(cat)
    }
}
