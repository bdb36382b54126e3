//! Buffer chains, NEED_MORE handling and the partial-UTF-8 rescue.

use pretty_assertions::assert_eq;
use utf8lex::{lex, Cat, Error, Lexed, Lexicon, State, Unit};

fn abc_lexicon() -> Lexicon {
    let mut lexicon = Lexicon::new();
    lexicon.literal("ABC", "abc").unwrap();
    lexicon.rule("abc", "ABC", "").unwrap();
    lexicon.resolve().unwrap();
    lexicon
}

#[test]
fn token_completes_across_appended_buffers() {
    let lexicon = abc_lexicon();
    let mut state = State::new();
    state.append_str("ab", false).unwrap();

    // Not enough bytes yet, and more may arrive.
    assert_eq!(lex(&lexicon, &mut state).unwrap(), Lexed::NeedMore);

    state.append_str("cd", true).unwrap();
    let Lexed::Token(token) = lex(&lexicon, &mut state).unwrap() else {
        panic!("expected a token");
    };
    assert_eq!(token.text(), "abc");
    assert_eq!(token.loc[Unit::Byte].length, 3);

    // "d" remains, matching nothing.
    assert_eq!(lex(&lexicon, &mut state).unwrap(), Lexed::NoMatch);
}

#[test]
fn short_prefix_on_a_sealed_chain_is_no_match() {
    let lexicon = abc_lexicon();
    let mut state = State::new();
    state.append_str("ab", true).unwrap();
    assert_eq!(lex(&lexicon, &mut state).unwrap(), Lexed::NoMatch);
}

#[test]
fn regex_rides_the_buffer_seam() {
    let mut lexicon = Lexicon::new();
    lexicon.regex("NUM", "[0-9]+").unwrap();
    lexicon.rule("num", "NUM", "").unwrap();
    lexicon.resolve().unwrap();

    let mut state = State::new();
    state.append_str("12", false).unwrap();
    assert_eq!(lex(&lexicon, &mut state).unwrap(), Lexed::NeedMore);

    state.append_str("34x", true).unwrap();
    let Lexed::Token(token) = lex(&lexicon, &mut state).unwrap() else {
        panic!("expected a token");
    };
    assert_eq!(token.text(), "1234");
}

#[test]
fn partial_utf8_at_open_tail_waits_and_completes() {
    let mut lexicon = Lexicon::new();
    lexicon.category("LETTERS", Cat::LETTER, 1, None).unwrap();
    lexicon.rule("letters", "LETTERS", "").unwrap();
    lexicon.resolve().unwrap();

    // "é" is C3 A9; split it across buffers.
    let mut state = State::new();
    state.append(vec![0x68, 0xC3].into(), false).unwrap();
    assert_eq!(lex(&lexicon, &mut state).unwrap(), Lexed::NeedMore);

    state.append(vec![0xA9].into(), true).unwrap();
    let Lexed::Token(token) = lex(&lexicon, &mut state).unwrap() else {
        panic!("expected a token");
    };
    assert_eq!(token.text(), "hé");
    assert_eq!(token.loc[Unit::Char].length, 2);
}

#[test]
fn partial_utf8_at_sealed_tail_is_malformed() {
    let mut lexicon = Lexicon::new();
    lexicon.category("LETTERS", Cat::LETTER, 1, None).unwrap();
    lexicon.rule("letters", "LETTERS", "").unwrap();
    lexicon.resolve().unwrap();

    let mut state = State::new();
    state.append(vec![0x68, 0xC3].into(), true).unwrap();
    assert_eq!(lex(&lexicon, &mut state), Err(Error::BadUtf8));
}

#[test]
fn tokens_resume_at_the_right_offset_after_a_hop() {
    let mut lexicon = Lexicon::new();
    lexicon.literal("A", "a").unwrap();
    lexicon.literal("B", "b").unwrap();
    lexicon.rule("a", "A", "").unwrap();
    lexicon.rule("b", "B", "").unwrap();
    lexicon.resolve().unwrap();

    let mut state = State::new();
    state.append_str("a", false).unwrap();
    let Lexed::Token(first) = lex(&lexicon, &mut state).unwrap() else {
        panic!("expected 'a'");
    };
    assert_eq!(first.text(), "a");

    // The first buffer is exhausted and unsealed.
    assert_eq!(lex(&lexicon, &mut state).unwrap(), Lexed::NeedMore);

    state.append_str("b", true).unwrap();
    let Lexed::Token(second) = lex(&lexicon, &mut state).unwrap() else {
        panic!("expected 'b'");
    };
    assert_eq!(second.text(), "b");
    assert_eq!(second.loc[Unit::Byte].start, 1);
    assert_eq!(lex(&lexicon, &mut state).unwrap(), Lexed::Eof);
}

#[test]
fn state_clear_releases_chain_and_arena() {
    let lexicon = abc_lexicon();
    let mut state = State::new();
    state.append_str("abc", true).unwrap();
    assert!(matches!(
        lex(&lexicon, &mut state).unwrap(),
        Lexed::Token(_)
    ));

    state.clear();
    assert!(state.chain().is_empty());
    assert_eq!(state.arena().used(), 0);
    assert_eq!(lex(&lexicon, &mut state).unwrap(), Lexed::NeedMore);
}
