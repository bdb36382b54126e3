//! Driver-level lexing scenarios.

use pretty_assertions::assert_eq;
use tests::{assert_lex, starts};
use utf8lex::{lex, Cat, Lexed, Lexicon, State, Unit};

fn number_lexicon() -> Lexicon {
    let mut lexicon = Lexicon::new();
    lexicon.regex("NUMBER", "[0-9]+").unwrap();
    lexicon.rule("number", "NUMBER", "").unwrap();
    lexicon.resolve().unwrap();
    lexicon
}

#[test]
fn number_prefix_with_trailing_junk() {
    let lexicon = number_lexicon();
    let mut state = State::new();
    state.append_str("42x", true).unwrap();

    let Lexed::Token(token) = lex(&lexicon, &mut state).unwrap() else {
        panic!("expected a token");
    };
    assert_eq!(token.rule.0, 0);
    assert_eq!(token.text(), "42");
    assert_eq!(token.loc[Unit::Byte].length, 2);
    assert_eq!(token.loc[Unit::Char].length, 2);
    assert_eq!(token.loc[Unit::Grapheme].length, 2);
    assert_eq!(token.loc[Unit::Line].length, 0);

    // Nothing matches the trailing "x".
    assert_eq!(lex(&lexicon, &mut state).unwrap(), Lexed::NoMatch);
}

#[test]
fn unicode_letters_count_chars_not_bytes() {
    let mut lexicon = Lexicon::new();
    lexicon.regex("LETTER", r"[\p{L}]+").unwrap();
    lexicon.category("SPACE", Cat::WHITESPACE, 1, None).unwrap();
    lexicon.rule("letter", "LETTER", "").unwrap();
    lexicon.rule("space", "SPACE", "").unwrap();
    lexicon.resolve().unwrap();

    assert_lex(
        &lexicon,
        "héllo ",
        &[(0, "héllo", [6, 5, 5, 0]), (1, " ", [1, 1, 1, 0])],
    );
}

#[test]
fn crlf_resets_char_and_grapheme_counters() {
    let mut lexicon = Lexicon::new();
    lexicon.category("ANY", Cat::ALL, 1, Some(1)).unwrap();
    lexicon.rule("any", "ANY", "").unwrap();
    lexicon.resolve().unwrap();

    let mut state = State::new();
    state.append_str("a\r\nb", true).unwrap();

    let Lexed::Token(a) = lex(&lexicon, &mut state).unwrap() else {
        panic!("expected 'a'");
    };
    assert_eq!(a.text(), "a");
    assert_eq!(a.loc[Unit::Line].length, 0);

    let Lexed::Token(brk) = lex(&lexicon, &mut state).unwrap() else {
        panic!("expected the line break");
    };
    assert_eq!(brk.text(), "\r\n");
    assert_eq!(brk.loc[Unit::Line].length, 1);
    assert_eq!(brk.loc[Unit::Char].after, 0);
    assert_eq!(brk.loc[Unit::Grapheme].after, 0);
    assert_eq!(brk.loc[Unit::Byte].after, -1);
    assert_eq!(brk.loc[Unit::Line].after, -1);

    // "b" starts on line 1, char 0.
    let Lexed::Token(b) = lex(&lexicon, &mut state).unwrap() else {
        panic!("expected 'b'");
    };
    assert_eq!(b.text(), "b");
    assert_eq!(starts(&b), [3, 0, 0, 1]);

    assert_eq!(lex(&lexicon, &mut state).unwrap(), Lexed::Eof);
}

#[test]
fn rule_order_shadows_longer_matches() {
    // Rule A matches a prefix, rule B would match a longer one; A wins
    // by declaration order.
    let mut lexicon = Lexicon::new();
    lexicon.literal("AB", "ab").unwrap();
    lexicon.literal("ABC", "abc").unwrap();
    lexicon.rule("short", "AB", "").unwrap();
    lexicon.rule("long", "ABC", "").unwrap();
    lexicon.resolve().unwrap();

    let mut state = State::new();
    state.append_str("abc", true).unwrap();
    let Lexed::Token(token) = lex(&lexicon, &mut state).unwrap() else {
        panic!("expected a token");
    };
    assert_eq!(token.rule.0, 0);
    assert_eq!(token.text(), "ab");
}

#[test]
fn literal_token_covers_its_whole_string() {
    let mut lexicon = Lexicon::new();
    lexicon.literal("KW", "héllo").unwrap();
    lexicon.rule("kw", "KW", "").unwrap();
    lexicon.resolve().unwrap();

    assert_lex(&lexicon, "héllo", &[(0, "héllo", [6, 5, 5, 0])]);
}

#[test]
fn literal_containing_a_line_break_applies_its_reset() {
    let mut lexicon = Lexicon::new();
    lexicon.literal("BRK", "a\nb").unwrap();
    lexicon.literal("X", "x").unwrap();
    lexicon.rule("brk", "BRK", "").unwrap();
    lexicon.rule("x", "X", "").unwrap();
    lexicon.resolve().unwrap();

    let mut state = State::new();
    state.append_str("a\nbx", true).unwrap();

    let Lexed::Token(brk) = lex(&lexicon, &mut state).unwrap() else {
        panic!("expected the literal");
    };
    assert_eq!(brk.loc[Unit::Line].length, 1);
    assert_eq!(brk.loc[Unit::Char].after, 1);

    let Lexed::Token(x) = lex(&lexicon, &mut state).unwrap() else {
        panic!("expected 'x'");
    };
    // One char into line 1.
    assert_eq!(starts(&x), [3, 1, 1, 1]);
}

#[test]
fn category_rules_classify_by_group() {
    let mut lexicon = Lexicon::new();
    lexicon.category("LETTERS", Cat::LETTER, 1, None).unwrap();
    lexicon.category("DIGITS", Cat::NUM, 1, None).unwrap();
    lexicon.rule("letters", "LETTERS", "").unwrap();
    lexicon.rule("digits", "DIGITS", "").unwrap();
    lexicon.resolve().unwrap();

    assert_lex(
        &lexicon,
        "abc123",
        &[(0, "abc", [3, 3, 3, 0]), (1, "123", [3, 3, 3, 0])],
    );
}

#[test]
fn cat_quantifier_bounds_the_run() {
    let mut lexicon = Lexicon::new();
    lexicon.category("TWO", Cat::LETTER, 1, Some(2)).unwrap();
    lexicon.rule("two", "TWO", "").unwrap();
    lexicon.resolve().unwrap();

    assert_lex(
        &lexicon,
        "abcde",
        &[
            (0, "ab", [2, 2, 2, 0]),
            (0, "cd", [2, 2, 2, 0]),
            (0, "e", [1, 1, 1, 0]),
        ],
    );
}

#[test]
fn combining_marks_stay_inside_one_grapheme() {
    let mut lexicon = Lexicon::new();
    lexicon.category("G", Cat::ALL, 1, Some(1)).unwrap();
    lexicon.rule("g", "G", "").unwrap();
    lexicon.resolve().unwrap();

    // e + combining acute: one grapheme of two chars and three bytes.
    assert_lex(&lexicon, "e\u{0301}", &[(0, "e\u{0301}", [3, 2, 1, 0])]);
}

#[test]
fn empty_chain_wants_input_and_sealed_empty_chain_ends() {
    let lexicon = number_lexicon();

    let mut state = State::new();
    assert_eq!(lex(&lexicon, &mut state).unwrap(), Lexed::NeedMore);

    state.append_str("", true).unwrap();
    assert_eq!(lex(&lexicon, &mut state).unwrap(), Lexed::Eof);
}
