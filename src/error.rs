//! The closed set of result codes shared by the whole engine.
//!
//! Signalling outcomes (end of input, more bytes needed, no rule matched)
//! are not errors; the driver reports them through [`Lexed`]. Everything
//! else is a hard failure carried by [`Error`], each variant with a fixed
//! numeric code suitable for a process exit status.

use thiserror::Error;

use crate::token::Token;

/// Result alias used throughout the runtime.
pub type Result<T> = std::result::Result<T, Error>;

/// Outcome of one driver call.
#[derive(Debug, Clone, PartialEq)]
pub enum Lexed {
    /// One token was extracted and the state advanced past it.
    Token(Token),
    /// No rule matched the input at the current position.
    NoMatch,
    /// The current data ran out before a verdict was possible; append
    /// another buffer to the chain and call again.
    NeedMore,
    /// The chain is exhausted and flagged end-of-file.
    Eof,
}

impl Lexed {
    /// Numeric code for the signalling outcomes, mirroring the error
    /// code space: 0 success, 1 EOF, 2 need-more, 3 no-match.
    pub fn code(&self) -> i32 {
        match self {
            Lexed::Token(_) => 0,
            Lexed::Eof => 1,
            Lexed::NeedMore => 2,
            Lexed::NoMatch => 3,
        }
    }
}

/// Every hard failure the engine can produce.
///
/// The set is closed: new operations reuse these codes rather than
/// growing the enum. Variants are grouped into invariant violations,
/// resource errors and semantic errors; [`Error::code`] assigns each a
/// stable number starting after the signalling codes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    // Invariant violations.
    /// A location start was negative where a valid start was required.
    #[error("bad location start")]
    BadStart,
    /// A location length was negative where a valid length was required.
    #[error("bad location length")]
    BadLength,
    /// A location `after` was neither -1 nor a non-negative reset value.
    #[error("bad location after")]
    BadAfter,
    /// An id did not resolve to a live registry slot.
    #[error("bad id {0}")]
    BadId(u32),
    /// A quantifier minimum was out of range.
    #[error("bad min occurrences")]
    BadMin,
    /// A quantifier maximum was below the minimum.
    #[error("bad max occurrences")]
    BadMax,
    /// A multi definition carried an unknown composition kind.
    #[error("bad multi type")]
    BadMultiType,
    /// A compiled automaton misbehaved at match time.
    #[error("bad regex: {0}")]
    BadRegex(String),
    /// Malformed UTF-8 that no further input can repair.
    #[error("bad UTF-8 sequence")]
    BadUtf8,
    /// An error path was reached that the taxonomy cannot describe.
    #[error("bad error")]
    BadError,

    // Resource errors.
    /// A file could not be opened.
    #[error("cannot open file: {0}")]
    FileOpen(String),
    /// A file could not be read.
    #[error("cannot read file: {0}")]
    FileRead(String),
    /// A file could not be written.
    #[error("cannot write file: {0}")]
    FileWrite(String),
    /// A file size could not be determined or was out of range.
    #[error("bad file size: {0}")]
    FileSize(String),
    /// An input file was empty.
    #[error("empty file: {0}")]
    FileEmpty(String),
    /// A file could not be mapped into memory.
    #[error("cannot mmap file: {0}")]
    FileMmap(String),
    /// A buffer carrying chain links was offered for appending; buffers
    /// may only be appended at the tail, never inserted mid-chain.
    #[error("buffer chain insert")]
    ChainInsert,
    /// A buffer was initialized twice.
    #[error("buffer already initialized")]
    BufferInitialized,
    /// A registry, name, body or chain exceeded its hard cap.
    #[error("maximum length exceeded")]
    MaxLength,

    // Semantic errors.
    /// A category expression did not parse.
    #[error("bad category: {0}")]
    Cat(String),
    /// A definition had an unexpected kind for the requested operation.
    #[error("bad definition type")]
    DefinitionType,
    /// A literal definition with no bytes.
    #[error("empty definition")]
    EmptyDefinition,
    /// A name lookup failed.
    #[error("not found: {0}")]
    NotFound(String),
    /// A rule lookup returned something that is not a rule.
    #[error("not a rule")]
    NotARule,
    /// The operation is recognised but not implemented.
    #[error("not implemented")]
    NotImplemented,
    /// A regex pattern failed to compile.
    #[error("regex error: {0}")]
    Regex(String),
    /// A unit ordinal was out of range.
    #[error("bad unit")]
    Unit,
    /// A multi definition still carries an unbound reference.
    #[error("unresolved definition: {0}")]
    UnresolvedDefinition(String),
    /// A traversal exceeded its depth or iteration cap.
    #[error("infinite loop detected")]
    InfiniteLoop,
    /// A token was malformed or used after its state was reset.
    #[error("bad token")]
    Token,
    /// A state was used before initialization or after clearing.
    #[error("bad state")]
    State,
}

impl Error {
    /// Stable numeric code, used as the process exit status.
    ///
    /// 0 is success and 1-3 are the signalling outcomes (see
    /// [`Lexed::code`]); hard errors count upward from 4 in declaration
    /// order.
    pub fn code(&self) -> i32 {
        match self {
            Error::BadStart => 4,
            Error::BadLength => 5,
            Error::BadAfter => 6,
            Error::BadId(_) => 7,
            Error::BadMin => 8,
            Error::BadMax => 9,
            Error::BadMultiType => 10,
            Error::BadRegex(_) => 11,
            Error::BadUtf8 => 12,
            Error::BadError => 13,
            Error::FileOpen(_) => 14,
            Error::FileRead(_) => 15,
            Error::FileWrite(_) => 16,
            Error::FileSize(_) => 17,
            Error::FileEmpty(_) => 18,
            Error::FileMmap(_) => 19,
            Error::ChainInsert => 20,
            Error::BufferInitialized => 21,
            Error::MaxLength => 22,
            Error::Cat(_) => 23,
            Error::DefinitionType => 24,
            Error::EmptyDefinition => 25,
            Error::NotFound(_) => 26,
            Error::NotARule => 27,
            Error::NotImplemented => 28,
            Error::Regex(_) => 29,
            Error::Unit => 30,
            Error::UnresolvedDefinition(_) => 31,
            Error::InfiniteLoop => 32,
            Error::Token => 33,
            Error::State => 34,
        }
    }
}
