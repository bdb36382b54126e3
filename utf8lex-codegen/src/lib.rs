//! # utf8lex-codegen
//!
//! Turns a utf8lex spec file (definitions `%%` rules `%%` user code)
//! into a Rust source file that, linked against the `utf8lex` runtime,
//! tokenizes input with the declared rules.
//!
//! ```
//! let spec = "NUMBER [0-9]+\n%%\nNUMBER { return 1; }\n%%\n";
//! let source = utf8lex_codegen::generate(spec, false).unwrap();
//! assert!(source.contains("pub fn build_lexicon"));
//! ```

#[macro_use]
mod macros;

mod body;
mod emit;
mod error;
mod meta;
mod parser;

pub use error::{Error, Result};
pub use parser::{parse, SpecDb, MAX_LINE_TOKENS, MAX_SPEC_LINES};

/// Generate the Rust source for a spec file.
///
/// Pure: the output is a deterministic function of the spec text, so
/// generating twice yields byte-identical source. `tracing` enables the
/// runtime's per-rule trace records while the parser lexes the spec
/// with the meta-lexicon.
pub fn generate(spec: &str, tracing: bool) -> Result<String> {
    let db = parser::parse(spec, tracing)?;
    emit::emit(&db)
}
