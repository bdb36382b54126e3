//! Codegen errors: engine failures wrapped with positional context.

use beef::lean::Cow;
use thiserror::Error;

/// Result alias for the codegen crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong between reading a spec file and
/// emitting its generated source.
#[derive(Debug, Error)]
pub enum Error {
    /// A runtime-engine failure outside any particular spec line.
    #[error(transparent)]
    Engine(#[from] utf8lex::Error),

    /// A runtime-engine failure pinned to a spec line.
    #[error("line {line}: {source}\n  near: {excerpt}")]
    At {
        /// 1-based spec line.
        line: usize,
        /// The underlying engine failure.
        source: utf8lex::Error,
        /// The offending line, control characters visualised.
        excerpt: String,
    },

    /// The body state machine hit an invalid transition.
    #[error(
        "syntax error at line {line}, column {column}: {message}\n  near: {excerpt}\n  states: {history}"
    )]
    Syntax {
        /// 1-based spec line.
        line: usize,
        /// 1-based byte column of the offending token.
        column: usize,
        /// What went wrong.
        message: Cow<'static, str>,
        /// The offending line, control characters visualised.
        excerpt: String,
        /// The last body-machine states, most recent first.
        history: String,
    },

    /// The spec file exceeded the line cap.
    #[error("spec file exceeds {max} lines")]
    TooManyLines {
        /// The cap that was exceeded.
        max: usize,
    },

    /// One line produced more meta tokens than the iteration cap.
    #[error("line {line} exceeds the token iteration cap")]
    TooManyTokens {
        /// 1-based spec line.
        line: usize,
    },

    /// Declared counts disagreed with emitted registrations.
    #[error("internal error: declared {declared} {kind} definitions but emitted {emitted}")]
    CountMismatch {
        /// Definition kind whose count went wrong.
        kind: &'static str,
        /// Count written into the declaration.
        declared: usize,
        /// Registrations actually emitted.
        emitted: usize,
    },
}

impl Error {
    /// Stable numeric code for the process exit status, continuing the
    /// runtime taxonomy's number space.
    pub fn code(&self) -> i32 {
        match self {
            Error::Engine(err) => err.code(),
            Error::At { source, .. } => source.code(),
            Error::Syntax { .. } => 35,
            Error::TooManyLines { .. } => 36,
            Error::TooManyTokens { .. } => 37,
            Error::CountMismatch { .. } => 38,
        }
    }
}

/// Visualise line breaks and tabs so an excerpt stays on one line.
pub(crate) fn sanitize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out
}
