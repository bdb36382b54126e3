// Generated by utf8lex. Do not edit.
#![allow(unused_imports, unused_variables, dead_code)]

use std::io::Read as _;

use utf8lex::{lex, Cat, Error, Lexed, Lexicon, MultiKind, State, Token};

/// Returned by `yylex` at end of input.
pub const YYEOF: i32 = -1;
/// Returned by `yylex` when dispatch fails.
pub const YYERROR: i32 = -2;
