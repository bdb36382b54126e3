//! The error taxonomy at the crate boundaries.

use pretty_assertions::assert_eq;
use utf8lex::{Buffer, BufferId, Chain, Error, Lexicon, Str, MAX_NAME_BYTES};
use utf8lex_codegen::parse;

#[test]
fn chain_lookups_validate_ids() {
    let mut chain = Chain::new();
    chain
        .append(Buffer::new(Str::from("abc"), false))
        .unwrap();
    chain.append(Buffer::new(Str::from("y"), false)).unwrap();

    assert!(chain.get(BufferId(1)).is_ok());
    assert_eq!(chain.get(BufferId(9)).unwrap_err(), Error::BadId(9));
}

#[test]
fn oversized_names_are_rejected() {
    let mut lexicon = Lexicon::new();
    let long = "N".repeat(MAX_NAME_BYTES + 1);
    assert_eq!(
        lexicon.regex(&long, "[0-9]").unwrap_err(),
        Error::MaxLength
    );
}

#[test]
fn bad_regex_reports_the_pattern_problem() {
    let mut lexicon = Lexicon::new();
    let err = lexicon.regex("BAD", "[unclosed").unwrap_err();
    assert!(matches!(err, Error::Regex(_)));
}

#[test]
fn rules_must_point_at_existing_definitions() {
    let mut lexicon = Lexicon::new();
    assert_eq!(
        lexicon.rule("r", "MISSING", "").unwrap_err(),
        Error::NotFound("MISSING".to_owned())
    );
    assert_eq!(lexicon.rule_by_id("r", 7, "").unwrap_err(), Error::BadId(7));
}

#[test]
fn category_expressions_reject_unknown_names() {
    let mut lexicon = Lexicon::new();
    assert_eq!(
        lexicon.category_expr("C", "LETTER|BOGUS", 1, None).unwrap_err(),
        Error::Cat("BOGUS".to_owned())
    );
}

#[test]
fn error_codes_are_stable_process_exit_codes() {
    assert_eq!(Error::BadUtf8.code(), 12);
    assert_eq!(Error::MaxLength.code(), 22);
    assert_eq!(Error::UnresolvedDefinition(String::new()).code(), 31);
}

#[test]
fn parser_syntax_errors_visualize_the_line() {
    let spec = "X \"broken\n%%\n%%\n";
    let err = parse(spec, false).unwrap_err();
    let rendered = err.to_string();
    assert!(rendered.contains("line 1"));
    assert!(rendered.contains("X \"broken"));
    assert!(rendered.contains("ERROR"));
}

#[test]
fn definitions_without_bodies_are_syntax_errors() {
    let spec = "LONELY\n%%\n%%\n";
    assert!(parse(spec, false).is_err());
}
