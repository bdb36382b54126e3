//! Shared helpers for the integration tests.

use utf8lex::{lex, Lexed, Lexicon, State, Token, Unit};

/// Expected shape of one token: rule id, text, and the four unit
/// lengths in byte/char/grapheme/line order.
pub type Expected<'a> = (u32, &'a str, [i64; 4]);

/// Per-unit lengths of a token, in byte/char/grapheme/line order.
pub fn lengths(token: &Token) -> [i64; 4] {
    [
        token.loc[Unit::Byte].length,
        token.loc[Unit::Char].length,
        token.loc[Unit::Grapheme].length,
        token.loc[Unit::Line].length,
    ]
}

/// Per-unit starts of a token, in byte/char/grapheme/line order.
pub fn starts(token: &Token) -> [i64; 4] {
    [
        token.loc[Unit::Byte].start,
        token.loc[Unit::Char].start,
        token.loc[Unit::Grapheme].start,
        token.loc[Unit::Line].start,
    ]
}

/// Lex `input` to exhaustion and assert every produced token against
/// the expectation list, then assert clean EOF.
pub fn assert_lex(lexicon: &Lexicon, input: &str, expected: &[Expected<'_>]) {
    let mut state = State::new();
    state.append_str(input, true).unwrap();

    for (index, &(rule, text, lens)) in expected.iter().enumerate() {
        match lex(lexicon, &mut state).unwrap() {
            Lexed::Token(token) => {
                assert_eq!(token.rule.0, rule, "rule id of token {index}");
                assert_eq!(token.text(), text, "text of token {index}");
                assert_eq!(lengths(&token), lens, "unit lengths of token {index}");
            }
            other => panic!("expected token {index}, got {other:?}"),
        }
    }
    assert_eq!(lex(lexicon, &mut state).unwrap(), Lexed::Eof);
}

/// Collect the rule-id sequence a lexicon produces over an input,
/// stopping at EOF. Panics on NoMatch or NeedMore.
pub fn rule_ids(lexicon: &Lexicon, input: &str) -> Vec<u32> {
    let mut state = State::new();
    state.append_str(input, true).unwrap();
    let mut ids = Vec::new();
    loop {
        match lex(lexicon, &mut state).unwrap() {
            Lexed::Token(token) => ids.push(token.rule.0),
            Lexed::Eof => return ids,
            other => panic!("unexpected {other:?}"),
        }
    }
}
