//! # utf8lex
//!
//! The runtime of the utf8lex lexer generator: a matching engine that
//! understands UTF-8 input at the granularity of bytes, characters,
//! grapheme clusters and lines, all at once.
//!
//! Input arrives as a chain of [`Buffer`]s inside a [`State`]; a
//! [`Lexicon`] holds the definitions and rules to match with. Each call
//! to [`lex`] extracts one token:
//!
//! ```
//! use utf8lex::{lex, Cat, Lexed, Lexicon, State};
//!
//! # fn main() -> Result<(), utf8lex::Error> {
//! let mut lexicon = Lexicon::new();
//! lexicon.regex("NUMBER", "[0-9]+")?;
//! lexicon.category("SPACE", Cat::WHITESPACE, 1, None)?;
//! lexicon.rule("number", "NUMBER", "")?;
//! lexicon.rule("space", "SPACE", "")?;
//! lexicon.resolve()?;
//!
//! let mut state = State::new();
//! state.append_str("42 7", true)?;
//!
//! let Lexed::Token(token) = lex(&lexicon, &mut state)? else {
//!     panic!("expected a token");
//! };
//! assert_eq!(token.text(), "42");
//! # Ok(())
//! # }
//! ```
//!
//! Generated programs build their `Lexicon` through the same
//! constructors the example uses; the `utf8lex-codegen` crate emits
//! that code from a spec file.

mod buffer;
mod cat;
mod definition;
mod error;
mod lexer;
mod matcher;
mod multi;
mod read;
mod regex;
mod rule;
mod state;
mod token;
mod unit;

pub use buffer::{Buffer, BufferId, Chain, Str};
pub use cat::{is_line_separator, Cat};
pub use definition::{CatDef, DefId, Definition, DefinitionKind, DefinitionSet, LiteralDef};
pub use error::{Error, Lexed, Result};
pub use lexer::lex;
pub use multi::{MultiDef, MultiKind, Reference};
pub use regex::RegexDef;
pub use rule::{Rule, RuleId, RuleSet};
pub use state::State;
pub use token::{SubId, SubKey, SubToken, SubTokenArena, Token};
pub use unit::{Location, Locations, Unit};

/// Hard cap on definitions per registry.
pub const MAX_DEFINITIONS: usize = 1024;
/// Hard cap on rules per registry.
pub const MAX_RULES: usize = 1024;
/// Hard cap on references per multi definition.
pub const MAX_REFERENCES: usize = 256;
/// Hard cap on sub-token captures per driver call.
pub const MAX_SUB_TOKENS: usize = 256;
/// Hard cap on buffers per chain.
pub const MAX_BUFFERS: usize = 16_384;
/// Hard cap on definition and rule names, in bytes.
pub const MAX_NAME_BYTES: usize = 64;
/// Hard cap on literal and regex bodies, in bytes.
pub const MAX_BODY_BYTES: usize = 256;
/// Hard cap on one rule's host-language code, in bytes.
pub const MAX_RULE_CODE_BYTES: usize = 1024;
/// Hard cap on recursion depth through multi definitions.
pub const MAX_MULTI_DEPTH: usize = 256;

/// The definition registry and rule registry of one lexer.
///
/// Immutable after construction and resolution; may then be shared
/// read-only, including across threads owning distinct [`State`]s.
#[derive(Debug, Clone, Default)]
pub struct Lexicon {
    /// Definitions in declaration order.
    pub definitions: DefinitionSet,
    /// Rules in declaration (priority) order.
    pub rules: RuleSet,
}

impl Lexicon {
    /// An empty lexicon.
    pub fn new() -> Lexicon {
        Lexicon::default()
    }

    /// Append a category definition.
    pub fn category(
        &mut self,
        name: &str,
        cat: Cat,
        min: usize,
        max: Option<usize>,
    ) -> Result<DefId> {
        self.definitions
            .append(name, DefinitionKind::Cat(CatDef::new(cat, min, max)?))
    }

    /// Append a category definition from a `|`-separated expression.
    pub fn category_expr(
        &mut self,
        name: &str,
        expr: &str,
        min: usize,
        max: Option<usize>,
    ) -> Result<DefId> {
        self.category(name, expr.parse()?, min, max)
    }

    /// Append a literal definition.
    pub fn literal(&mut self, name: &str, text: &str) -> Result<DefId> {
        self.definitions
            .append(name, DefinitionKind::Literal(LiteralDef::new(text)?))
    }

    /// Append a regex definition, compiling the pattern.
    pub fn regex(&mut self, name: &str, pattern: &str) -> Result<DefId> {
        self.definitions
            .append(name, DefinitionKind::Regex(RegexDef::new(pattern)?))
    }

    /// Append an empty multi definition of the given kind.
    pub fn multi(&mut self, name: &str, kind: MultiKind) -> Result<DefId> {
        self.definitions
            .append(name, DefinitionKind::Multi(MultiDef::new(kind)))
    }

    /// Append an unresolved reference to a multi definition.
    pub fn reference(
        &mut self,
        multi: DefId,
        name: &str,
        min: usize,
        max: Option<usize>,
    ) -> Result<()> {
        let reference = Reference::new(name, min, max)?;
        match &mut self.definitions.get_mut(multi)?.kind {
            DefinitionKind::Multi(def) => def.push_reference(reference),
            _ => Err(Error::DefinitionType),
        }
    }

    /// Bind every reference of every multi definition.
    pub fn resolve(&mut self) -> Result<()> {
        self.definitions.resolve_all()
    }

    /// Append a rule bound to a definition by name.
    pub fn rule(&mut self, name: &str, definition: &str, code: &str) -> Result<RuleId> {
        let def = self
            .definitions
            .find_by_name(definition)?
            .ok_or_else(|| Error::NotFound(definition.to_owned()))?;
        self.rules.append(name, def, code)
    }

    /// Append a rule bound to a definition by numeric id, as the
    /// emitted table-building code does.
    pub fn rule_by_id(&mut self, name: &str, definition: u32, code: &str) -> Result<RuleId> {
        let def = self
            .definitions
            .find_by_id(definition)?
            .ok_or(Error::BadId(definition))?;
        self.rules.append(name, def, code)
    }
}
