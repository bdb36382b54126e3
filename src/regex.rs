//! Regex definitions: anchored prefix matching over a dense DFA.
//!
//! Patterns are compiled once into an anchored `regex-automata` dense
//! DFA; matching walks the automaton byte by byte so the engine can
//! tell a dead end ("no match, ever") from a live tail ("more input
//! could still change the answer"), which is what turns a buffer
//! boundary into `NeedMore` instead of a wrong verdict.

use regex_automata::dfa::{dense, Automaton, StartKind};
use regex_automata::util::primitives::StateID;
use regex_automata::{Anchored, Input, MatchKind};

use crate::error::{Error, Result};
use crate::MAX_BODY_BYTES;

type OwnedDfa = dense::DFA<Vec<u32>>;

/// Outcome of an anchored prefix match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Prefix {
    /// Longest match, in bytes. Never zero.
    Match(usize),
    /// No prefix of the input matches, and no further input would help.
    NoMatch,
    /// The automaton was still live when the input ran out on an
    /// unsealed chain.
    NeedMore,
}

/// Every anchored match end, for callers that backtrack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PrefixAll {
    /// All match ends in bytes, ascending, zero excluded.
    Ends(Vec<usize>),
    /// The automaton was still live when the input ran out on an
    /// unsealed chain.
    NeedMore,
}

/// A compiled regex definition.
#[derive(Debug, Clone)]
pub struct RegexDef {
    /// The pattern as written in the spec file.
    pub pattern: String,
    dfa: OwnedDfa,
}

impl RegexDef {
    /// Compile a pattern. `\h`/`\H` are rewritten to Unicode classes
    /// first; everything else is `regex-syntax` as-is.
    pub fn new(pattern: &str) -> Result<RegexDef> {
        if pattern.is_empty() {
            return Err(Error::EmptyDefinition);
        }
        if pattern.len() > MAX_BODY_BYTES {
            return Err(Error::MaxLength);
        }
        let translated = translate(pattern);
        let dfa = dense::Builder::new()
            .configure(
                dense::Config::new()
                    .start_kind(StartKind::Anchored)
                    .match_kind(MatchKind::All),
            )
            .build(&translated)
            .map_err(|err| Error::Regex(err.to_string()))?;
        Ok(RegexDef {
            pattern: pattern.to_owned(),
            dfa,
        })
    }

    /// Longest anchored match against `haystack`, whose final byte is
    /// the end of all buffered input. `is_eof` says whether the chain is
    /// sealed; an unsealed live tail reports [`Prefix::NeedMore`].
    pub(crate) fn prefix_match(&self, haystack: &[u8], is_eof: bool) -> Result<Prefix> {
        Ok(match self.prefix_matches(haystack, is_eof)? {
            PrefixAll::NeedMore => Prefix::NeedMore,
            PrefixAll::Ends(ends) => match ends.last() {
                Some(&len) => Prefix::Match(len),
                None => Prefix::NoMatch,
            },
        })
    }

    /// All anchored match ends against `haystack`, walking the DFA byte
    /// by byte. Zero-length matches are dropped: they never make a
    /// token.
    pub(crate) fn prefix_matches(&self, haystack: &[u8], is_eof: bool) -> Result<PrefixAll> {
        let input = Input::new(haystack).anchored(Anchored::Yes);
        let mut state = self
            .dfa
            .start_state_forward(&input)
            .map_err(|err| Error::BadRegex(err.to_string()))?;

        let mut ends = Vec::new();
        let mut dead = false;
        for (i, &byte) in haystack.iter().enumerate() {
            state = self.dfa.next_state(state, byte);
            if self.dfa.is_special_state(state) {
                if self.dfa.is_match_state(state) {
                    // Dense DFA matches are delayed by one byte: entering
                    // a match state after byte i means the match ended at i.
                    if i > 0 {
                        ends.push(i);
                    }
                } else if self.dfa.is_dead_state(state) || self.dfa.is_quit_state(state) {
                    dead = true;
                    break;
                }
            }
        }

        if !dead {
            if !is_eof && self.can_extend(state) {
                return Ok(PrefixAll::NeedMore);
            }
            let eoi = self.dfa.next_eoi_state(state);
            if self.dfa.is_match_state(eoi) && !haystack.is_empty() {
                ends.push(haystack.len());
            }
        }

        Ok(PrefixAll::Ends(ends))
    }

    /// Whether any further byte could keep the automaton out of the
    /// dead state.
    fn can_extend(&self, state: StateID) -> bool {
        (0..=u8::MAX).any(|byte| {
            let next = self.dfa.next_state(state, byte);
            !self.dfa.is_dead_state(next)
        })
    }
}

/// Rewrite the PCRE-style horizontal-whitespace escapes into classes
/// `regex-syntax` understands. Inside a character class `\h` expands
/// without the surrounding brackets.
fn translate(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    let mut chars = pattern.chars();
    let mut in_class = false;
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('h') if in_class => out.push_str("\\t\\p{Zs}"),
                Some('h') => out.push_str("[\\t\\p{Zs}]"),
                Some('H') if !in_class => out.push_str("[^\\t\\p{Zs}]"),
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                }
                None => out.push('\\'),
            },
            '[' if !in_class => {
                in_class = true;
                out.push(c);
            }
            ']' if in_class => {
                in_class = false;
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}
