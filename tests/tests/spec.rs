//! Spec-file parsing and code generation, end to end.

use pretty_assertions::assert_eq;
use tests::rule_ids;
use utf8lex::{lex, Lexed, State};
use utf8lex_codegen::{generate, parse};

const CALC: &str = "\
NUMBER [0-9]+
SPACE \\h+
PLUS \"+\"
%%
NUMBER { return 1; }
PLUS { return 2; }
SPACE { }
%%
";

#[test]
fn parsed_spec_tokenizes_its_own_examples() {
    let db = parse(CALC, false).unwrap();
    assert_eq!(rule_ids(&db.lexicon, "1 + 23"), vec![0, 2, 1, 2, 0]);
}

#[test]
fn sub_tokens_surface_the_referenced_definition() {
    let db = parse(CALC, false).unwrap();
    let mut state = State::new();
    state.append_str("42", true).unwrap();
    let Lexed::Token(token) = lex(&db.lexicon, &mut state).unwrap() else {
        panic!("expected a token");
    };
    assert_eq!(token.subs.len(), 1);
    assert_eq!(state.sub_token(token.subs[0]).unwrap().name, "NUMBER");
}

#[test]
fn multi_rules_capture_reference_instances() {
    let spec = "\
ID [_\\p{L}][_\\p{L}\\p{N}]*
NUM [\\p{N}]+
%%
ID NUM+ { return 3; }
%%
";
    let db = parse(spec, false).unwrap();
    let mut state = State::new();
    state.append_str("x12 34", true).unwrap();

    let Lexed::Token(token) = lex(&db.lexicon, &mut state).unwrap() else {
        panic!("expected a token");
    };
    assert_eq!(token.text(), "x12");
    assert_eq!(token.len_bytes, 3);
    assert_eq!(token.subs.len(), 2);
    assert_eq!(state.sub_token(token.subs[0]).unwrap().text(), "x");
    assert_eq!(state.sub_token(token.subs[1]).unwrap().text(), "12");
}

#[test]
fn or_rules_try_alternatives_in_order() {
    let spec = "\
AAA \"aaa\"
A \"a\"
%%
AAA | A { }
%%
";
    let db = parse(spec, false).unwrap();
    assert_eq!(rule_ids(&db.lexicon, "aaaa"), vec![0, 0]);
}

#[test]
fn unicode_rules_work_from_spec_files() {
    let spec = "\
LETTER [\\p{L}]+
SPACE \\h+
%%
LETTER { return 1; }
SPACE { }
%%
";
    let db = parse(spec, false).unwrap();
    let mut state = State::new();
    state.append_str("héllo x", true).unwrap();
    let Lexed::Token(token) = lex(&db.lexicon, &mut state).unwrap() else {
        panic!("expected a token");
    };
    assert_eq!(token.text(), "héllo");
    assert_eq!(token.len_bytes, 6);
}

#[test]
fn generation_is_deterministic() {
    let first = generate(CALC, false).unwrap();
    let second = generate(CALC, false).unwrap();
    assert_eq!(first, second);
}

#[test]
fn generated_source_rebuilds_the_same_tables() {
    let source = generate(CALC, false).unwrap();
    assert!(source.contains("pub const DEFINITION_COUNT: usize = 6;"));
    assert!(source.contains("pub const RULE_COUNT: usize = 3;"));
    assert!(source.contains("lexicon.regex(\"NUMBER\", \"[0-9]+\")?;"));
    assert!(source.contains("lexicon.regex(\"SPACE\", \"\\\\h+\")?;"));
    assert!(source.contains("lexicon.literal(\"PLUS\", \"+\")?;"));
    assert!(source.contains("MultiKind::Sequence"));
    assert!(source.contains("lexicon.resolve()?;"));
    assert!(source.contains("pub fn yylex"));
}

#[test]
fn user_code_and_header_blocks_pass_through() {
    let spec = "\
%{
use std::collections::HashMap;
%}
A [a]
%%
A { }
%%
fn user_helper() -> u32 { 7 }
";
    let source = generate(spec, false).unwrap();
    assert!(source.contains("use std::collections::HashMap;"));
    assert!(source.contains("fn user_helper() -> u32 { 7 }"));
}

#[test]
fn empty_literal_definitions_are_rejected() {
    let spec = "E \"\"\n%%\nE { }\n%%\n";
    let err = generate(spec, false).unwrap_err();
    assert!(err.to_string().contains("empty definition"));
}

#[test]
fn zero_length_regex_matches_never_tokenize() {
    let spec = "MAYBE [a]*\nB \"b\"\n%%\nMAYBE { }\nB { }\n%%\n";
    let db = parse(spec, false).unwrap();
    // "b" must fall to the B rule; MAYBE matching zero bytes is skipped.
    assert_eq!(rule_ids(&db.lexicon, "ab"), vec![0, 1]);
}
