//! The spec-file parser.
//!
//! A spec file has three sections separated by lines of exactly `%%`:
//! definitions, rules, then verbatim user code. Within the first two
//! sections, blank lines, space- or tab-indented lines and `%{ .. %}`
//! blocks pass through to the emitted output; every other line is a
//! definition or rule, tokenized with the meta-lexicon and fed through
//! the body state machine.

use crate::body::{BodyMachine, ParsedBody, ParsedLine, Section};
use crate::error::{sanitize, Error, Result};
use crate::meta::meta_lexicon;
use utf8lex::{lex, Lexed, Lexicon, State};

/// Hard cap on spec-file lines.
pub const MAX_SPEC_LINES: usize = 65_536;
/// Hard cap on meta tokens per line, a defence against grammar bugs.
pub const MAX_LINE_TOKENS: usize = 65_536;

/// A parsed spec file: the lexicon under construction plus the
/// pass-through segments the emitter copies verbatim.
#[derive(Debug, Clone, Default)]
pub struct SpecDb {
    /// Definitions and rules, in declaration order, resolved.
    pub lexicon: Lexicon,
    /// `%{ %}` blocks and indented/blank lines from Sections 1 and 2.
    pub header: String,
    /// Section 3, verbatim.
    pub user_code: String,
}

/// Parse a spec file into its database.
///
/// `tracing` turns on the runtime's per-rule trace records while the
/// parser lexes definition bodies with the meta-lexicon.
pub fn parse(spec: &str, tracing: bool) -> Result<SpecDb> {
    debug!("parsing spec of {} bytes", spec.len());
    let meta = meta_lexicon()?;
    let mut db = SpecDb::default();
    let mut section = 1u8;
    let mut enclosed = false;

    for (index, line) in spec.lines().enumerate() {
        let line_no = index + 1;
        if line_no > MAX_SPEC_LINES {
            return Err(Error::TooManyLines {
                max: MAX_SPEC_LINES,
            });
        }

        if section == 3 {
            db.user_code.push_str(line);
            db.user_code.push('\n');
            continue;
        }

        if line == "%%" {
            section += 1;
            continue;
        }

        if enclosed {
            if line.starts_with("%}") {
                enclosed = false;
            } else {
                db.header.push_str(line);
                db.header.push('\n');
            }
            continue;
        }
        if line.starts_with("%{") {
            enclosed = true;
            continue;
        }

        if line.is_empty() || line.starts_with(' ') || line.starts_with('\t') {
            db.header.push_str(line);
            db.header.push('\n');
            continue;
        }

        let body_section = if section == 1 {
            Section::Definitions
        } else {
            Section::Rules
        };
        let parsed = parse_line(&meta, line, line_no, body_section, tracing)?;
        install(&mut db, parsed, body_section, line_no, line)?;
    }

    db.lexicon.resolve().map_err(Error::Engine)?;
    debug!(
        "parsed {} definitions, {} rules",
        db.lexicon.definitions.len(),
        db.lexicon.rules.len()
    );
    Ok(db)
}

/// Tokenize one line with the meta-lexicon and run the body machine.
fn parse_line(
    meta: &Lexicon,
    line: &str,
    line_no: usize,
    section: Section,
    tracing: bool,
) -> Result<ParsedLine> {
    let mut state = State::new();
    state.tracing = tracing;
    state
        .append_str(line, false)
        .and_then(|_| state.append_str("\n", true))
        .map_err(|err| at(line_no, line, err))?;

    let mut machine = BodyMachine::new(section);
    let mut column = 1usize;
    let mut iterations = 0usize;
    loop {
        iterations += 1;
        if iterations > MAX_LINE_TOKENS {
            return Err(Error::TooManyTokens { line: line_no });
        }
        match lex(meta, &mut state).map_err(|err| at(line_no, line, err))? {
            Lexed::Token(token) => {
                let text = token.text().into_owned();
                machine.feed(token.rule.0, &text).map_err(|err| Error::Syntax {
                    line: line_no,
                    column,
                    message: err.message,
                    excerpt: sanitize(line),
                    history: err.history,
                })?;
                column += token.len_bytes;
            }
            Lexed::Eof => break,
            // The catch-all meta rule makes these unreachable; keep the
            // taxonomy anyway.
            Lexed::NoMatch | Lexed::NeedMore => {
                return Err(at(line_no, line, utf8lex::Error::State))
            }
        }
        if machine.is_complete() {
            break;
        }
    }

    machine.finish().map_err(|err| Error::Syntax {
        line: line_no,
        column,
        message: err.message,
        excerpt: sanitize(line),
        history: err.history,
    })
}

/// Install a parsed line into the database.
fn install(
    db: &mut SpecDb,
    parsed: ParsedLine,
    section: Section,
    line_no: usize,
    line: &str,
) -> Result<()> {
    let name = match section {
        Section::Definitions => parsed
            .name
            .clone()
            .ok_or_else(|| at(line_no, line, utf8lex::Error::State))?,
        Section::Rules => format!("rule_{}", db.lexicon.rules.len()),
    };

    let def = match &parsed.body {
        ParsedBody::Literal(text) => db.lexicon.literal(&name, text),
        ParsedBody::Regex(pattern) => db.lexicon.regex(&name, pattern),
        ParsedBody::Multi { kind, refs } => (|| {
            let id = db.lexicon.multi(&name, *kind)?;
            for (ref_name, min, max) in refs {
                db.lexicon.reference(id, ref_name, *min, *max)?;
            }
            Ok(id)
        })(),
    }
    .map_err(|err| at(line_no, line, err))?;

    if section == Section::Rules {
        db.lexicon
            .rules
            .append(&name, def, parsed.code.as_deref().unwrap_or(""))
            .map_err(|err| at(line_no, line, err))?;
    }
    Ok(())
}

fn at(line: usize, text: &str, source: utf8lex::Error) -> Error {
    Error::At {
        line,
        source,
        excerpt: sanitize(text),
    }
}
