//! Multi definitions: sequences, alternations, sub-token capture.

use pretty_assertions::assert_eq;
use utf8lex::{
    lex, Cat, Error, Lexed, Lexicon, MultiKind, State, SubKey, Unit, MAX_SUB_TOKENS,
};

/// ID then one-or-more NUM, as a sequence multi.
fn id_num_lexicon() -> Lexicon {
    let mut lexicon = Lexicon::new();
    lexicon.regex("ID", r"[_\p{L}][_\p{L}\p{N}]*").unwrap();
    lexicon.regex("NUM", r"[\p{N}]+").unwrap();
    let pair = lexicon.multi("PAIR", MultiKind::Sequence).unwrap();
    lexicon.reference(pair, "ID", 1, Some(1)).unwrap();
    lexicon.reference(pair, "NUM", 1, None).unwrap();
    lexicon.rule("pair", "PAIR", "").unwrap();
    lexicon.resolve().unwrap();
    lexicon
}

#[test]
fn sequence_concedes_bytes_to_later_references() {
    let lexicon = id_num_lexicon();
    let mut state = State::new();
    state.append_str("x12 34", true).unwrap();

    let Lexed::Token(token) = lex(&lexicon, &mut state).unwrap() else {
        panic!("expected a token");
    };
    assert_eq!(token.text(), "x12");
    assert_eq!(token.len_bytes, 3);
    assert_eq!(token.subs.len(), 2);

    let id = state.sub_token(token.subs[0]).unwrap();
    assert_eq!(id.name, "ID");
    assert_eq!(id.text(), "x");

    let num = state.sub_token(token.subs[1]).unwrap();
    assert_eq!(num.name, "NUM");
    assert_eq!(num.text(), "12");
}

#[test]
fn sub_tokens_carry_absolute_starts() {
    let lexicon = id_num_lexicon();
    let mut state = State::new();
    state.append_str("x12", true).unwrap();

    let Lexed::Token(token) = lex(&lexicon, &mut state).unwrap() else {
        panic!("expected a token");
    };
    let num = state.sub_token(token.subs[1]).unwrap();
    assert_eq!(num.loc[Unit::Byte].start, 1);
    assert_eq!(num.loc[Unit::Char].start, 1);
    assert_eq!(num.loc[Unit::Line].start, 0);
}

#[test]
fn or_takes_the_first_matching_alternative_not_the_longest() {
    let mut lexicon = Lexicon::new();
    lexicon.literal("SHORT", "ab").unwrap();
    lexicon.literal("LONG", "abc").unwrap();
    let either = lexicon.multi("EITHER", MultiKind::Or).unwrap();
    lexicon.reference(either, "SHORT", 1, Some(1)).unwrap();
    lexicon.reference(either, "LONG", 1, Some(1)).unwrap();
    lexicon.rule("either", "EITHER", "").unwrap();
    lexicon.resolve().unwrap();

    let mut state = State::new();
    state.append_str("abc", true).unwrap();
    let Lexed::Token(token) = lex(&lexicon, &mut state).unwrap() else {
        panic!("expected a token");
    };
    assert_eq!(token.text(), "ab");
    assert_eq!(state.sub_token(token.subs[0]).unwrap().name, "SHORT");
}

#[test]
fn zero_min_reference_may_match_nothing() {
    let mut lexicon = Lexicon::new();
    lexicon.regex("SIGN", "[-+]").unwrap();
    lexicon.regex("NUM", "[0-9]+").unwrap();
    let signed = lexicon.multi("SIGNED", MultiKind::Sequence).unwrap();
    lexicon.reference(signed, "SIGN", 0, Some(1)).unwrap();
    lexicon.reference(signed, "NUM", 1, None).unwrap();
    lexicon.rule("signed", "SIGNED", "").unwrap();
    lexicon.resolve().unwrap();

    let mut state = State::new();
    state.append_str("42", true).unwrap();
    let Lexed::Token(token) = lex(&lexicon, &mut state).unwrap() else {
        panic!("expected a token");
    };
    assert_eq!(token.text(), "42");
    // The zero-width SIGN leaves no sub-token behind.
    assert_eq!(token.subs.len(), 1);
    assert_eq!(state.sub_token(token.subs[0]).unwrap().name, "NUM");

    let mut state = State::new();
    state.append_str("-7", true).unwrap();
    let Lexed::Token(token) = lex(&lexicon, &mut state).unwrap() else {
        panic!("expected a token");
    };
    assert_eq!(token.text(), "-7");
    assert_eq!(token.subs.len(), 2);
}

#[test]
fn nested_multis_capture_recursive_sub_tokens() {
    let mut lexicon = Lexicon::new();
    lexicon.regex("ID", r"[\p{L}]+").unwrap();
    lexicon.regex("NUM", r"[\p{N}]+").unwrap();
    let inner = lexicon.multi("INNER", MultiKind::Sequence).unwrap();
    lexicon.reference(inner, "ID", 1, Some(1)).unwrap();
    lexicon.reference(inner, "NUM", 1, Some(1)).unwrap();
    let outer = lexicon.multi("OUTER", MultiKind::Sequence).unwrap();
    lexicon.reference(outer, "INNER", 1, None).unwrap();
    lexicon.rule("outer", "OUTER", "").unwrap();
    lexicon.resolve().unwrap();

    let mut state = State::new();
    state.append_str("a1b2", true).unwrap();
    let Lexed::Token(token) = lex(&lexicon, &mut state).unwrap() else {
        panic!("expected a token");
    };
    assert_eq!(token.text(), "a1b2");
    assert_eq!(token.subs.len(), 2);

    let first = state.sub_token(token.subs[0]).unwrap();
    assert_eq!(first.name, "INNER");
    assert_eq!(first.text(), "a1");
    assert_eq!(first.children.len(), 2);

    let first_num = state.sub_token(first.children[1]).unwrap();
    assert_eq!(first_num.name, "NUM");
    assert_eq!(first_num.text(), "1");
    assert_eq!(first_num.parent, Some(token.subs[0]));
}

#[test]
fn sub_token_search_finds_the_nth_match_depth_first() {
    let mut lexicon = Lexicon::new();
    lexicon.regex("ID", r"[\p{L}]+").unwrap();
    lexicon.regex("NUM", r"[\p{N}]+").unwrap();
    let inner = lexicon.multi("INNER", MultiKind::Sequence).unwrap();
    lexicon.reference(inner, "ID", 1, Some(1)).unwrap();
    lexicon.reference(inner, "NUM", 1, Some(1)).unwrap();
    let outer = lexicon.multi("OUTER", MultiKind::Sequence).unwrap();
    lexicon.reference(outer, "INNER", 1, None).unwrap();
    lexicon.rule("outer", "OUTER", "").unwrap();
    lexicon.resolve().unwrap();

    let mut state = State::new();
    state.append_str("a1b2", true).unwrap();
    let Lexed::Token(token) = lex(&lexicon, &mut state).unwrap() else {
        panic!("expected a token");
    };

    let second_num = state
        .find_sub_token(&token.subs, &SubKey::Name("NUM"), 1)
        .unwrap()
        .expect("two NUM captures");
    assert_eq!(state.sub_token(second_num).unwrap().text(), "2");

    assert_eq!(
        state
            .find_sub_token(&token.subs, &SubKey::Name("NUM"), 2)
            .unwrap(),
        None
    );
}

#[test]
fn failed_multi_leaves_no_arena_residue() {
    let mut lexicon = Lexicon::new();
    lexicon.regex("ID", r"[\p{L}]+").unwrap();
    lexicon.regex("NUM", r"[\p{N}]+").unwrap();
    let pair = lexicon.multi("PAIR", MultiKind::Sequence).unwrap();
    lexicon.reference(pair, "ID", 1, Some(1)).unwrap();
    lexicon.reference(pair, "NUM", 1, Some(1)).unwrap();
    lexicon.category("ANY", Cat::ALL, 1, Some(1)).unwrap();
    lexicon.rule("pair", "PAIR", "").unwrap();
    lexicon.rule("any", "ANY", "").unwrap();
    lexicon.resolve().unwrap();

    let mut state = State::new();
    state.append_str("ab!", true).unwrap();
    // PAIR captures ID then fails on NUM; the catch-all wins instead.
    let Lexed::Token(token) = lex(&lexicon, &mut state).unwrap() else {
        panic!("expected a token");
    };
    assert_eq!(token.rule.0, 1);
    assert_eq!(token.text(), "a");
    assert_eq!(state.arena().used(), 0);
}

#[test]
fn arena_overflow_is_a_hard_error() {
    let mut lexicon = Lexicon::new();
    lexicon.category("G", Cat::ALL, 1, Some(1)).unwrap();
    let run = lexicon.multi("RUN", MultiKind::Sequence).unwrap();
    lexicon.reference(run, "G", 1, None).unwrap();
    lexicon.rule("run", "RUN", "").unwrap();
    lexicon.resolve().unwrap();

    let mut state = State::new();
    state
        .append_str(&"x".repeat(MAX_SUB_TOKENS + 1), true)
        .unwrap();
    assert_eq!(lex(&lexicon, &mut state), Err(Error::MaxLength));
}

#[test]
fn unresolved_multi_fails_at_lex_time() {
    let mut lexicon = Lexicon::new();
    let broken = lexicon.multi("BROKEN", MultiKind::Sequence).unwrap();
    lexicon.reference(broken, "MISSING", 1, Some(1)).unwrap();
    lexicon.rule("broken", "BROKEN", "").unwrap();
    // No resolve call.

    let mut state = State::new();
    state.append_str("x", true).unwrap();
    assert_eq!(
        lex(&lexicon, &mut state),
        Err(Error::UnresolvedDefinition("MISSING".to_owned()))
    );
}
