//! The lex driver: one call, one token.

use crate::error::{Lexed, Result};
use crate::matcher::{match_definition, MatchAttempt};
use crate::state::State;
use crate::token::Token;
use crate::unit::{Locations, Unit};
use crate::Lexicon;

/// Extract the next token from the state.
///
/// Rules are tried strictly in declaration order and the first OK
/// result wins; there is no longest-match preference between rules,
/// though each matcher still maximises within its own semantics. On
/// success both the token's locations and the state's absolute cursor
/// are advanced, applying any char/grapheme reset the token's line
/// breaks established.
///
/// `NeedMore` is a cooperative yield: append another buffer to the
/// chain and call again with the state untouched.
pub fn lex(lexicon: &Lexicon, state: &mut State) -> Result<Lexed> {
    // First call on a fresh state: pin the absolute cursor to the origin.
    if state.loc[Unit::Byte].start < 0 {
        state.loc = Locations::ZERO;
    }

    // Find the buffer holding the cursor, hopping over exhausted ones.
    loop {
        let Some(current) = state.current else {
            return Ok(Lexed::NeedMore);
        };
        let buffer = state.chain.get(current)?;
        let local = state.loc[Unit::Byte].start - buffer.loc[Unit::Byte].start;
        if local < 0 {
            return Err(crate::Error::BadStart);
        }
        if (local as usize) < buffer.text.len() {
            break;
        }
        match buffer.next() {
            Some(next) => state.current = Some(next),
            None if buffer.is_eof => return Ok(Lexed::Eof),
            None => return Ok(Lexed::NeedMore),
        }
    }

    let Some(pos) = state.pos()? else {
        return Ok(Lexed::NeedMore);
    };

    // The arena is reused across calls; captures of the previous token
    // are dead from here on.
    state.subs.reset();

    let base = state.loc;
    for rule in lexicon.rules.iter() {
        if state.tracing {
            println!(
                "utf8lex: trace: try rule {} ({}) at byte {}",
                rule.id.0,
                rule.name,
                base[Unit::Byte].start
            );
        }
        let attempt = match_definition(
            &lexicon.definitions,
            &state.chain,
            &mut state.subs,
            rule.def,
            pos,
            &base,
            0,
        )?;
        match attempt {
            MatchAttempt::Match(att) => {
                let mut loc = att.loc;
                for unit in Unit::ALL {
                    loc[unit].start = base[unit].start;
                }
                let token = Token {
                    rule: rule.id,
                    def: rule.def,
                    bytes: att.text,
                    start_byte: loc[Unit::Byte].start.max(0) as usize,
                    len_bytes: loc[Unit::Byte].length.max(0) as usize,
                    loc,
                    subs: att.subs,
                };
                if token.len_bytes == 0 {
                    // A zero-length match never becomes a token.
                    if state.tracing {
                        println!(
                            "utf8lex: trace: rule {} ({}) => empty, skipped",
                            rule.id.0, rule.name
                        );
                    }
                    continue;
                }
                state.loc.advance(&token.loc);
                if state.tracing {
                    println!(
                        "utf8lex: trace: rule {} ({}) => {} bytes",
                        rule.id.0, rule.name, token.len_bytes
                    );
                }
                return Ok(Lexed::Token(token));
            }
            MatchAttempt::NoMatch => {
                if state.tracing {
                    println!(
                        "utf8lex: trace: rule {} ({}) => no match",
                        rule.id.0, rule.name
                    );
                }
            }
            MatchAttempt::NeedMore => {
                if state.tracing {
                    println!(
                        "utf8lex: trace: rule {} ({}) => need more input",
                        rule.id.0, rule.name
                    );
                }
                return Ok(Lexed::NeedMore);
            }
        }
    }
    Ok(Lexed::NoMatch)
}
