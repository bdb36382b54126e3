//! The meta-lexicon: the lexer the spec parser uses on itself.
//!
//! Definition and rule bodies are tokenized by the runtime engine with
//! this small hard-coded rule list, so the parser exercises the same
//! machinery the generated code will.

use utf8lex::{Cat, Lexicon};

/// Meta rule ids, in declaration order. The body state machine
/// dispatches on these.
pub(crate) mod tok {
    pub const ID: u32 = 0;
    pub const SPACE: u32 = 1;
    pub const QUOTE: u32 = 2;
    pub const BACKSLASH: u32 = 3;
    pub const LBRACE: u32 = 4;
    pub const RBRACE: u32 = 5;
    pub const PIPE: u32 = 6;
    pub const STAR: u32 = 7;
    pub const PLUS: u32 = 8;
    pub const NEWLINE: u32 = 9;
    pub const ANY: u32 = 10;
}

/// Build the meta-lexicon. Identifiers follow `[_\p{L}][_\p{L}\p{N}]*`;
/// the newline rule consumes exactly one vertical-space grapheme, so a
/// CR LF pair arrives as a single token; a one-grapheme catch-all keeps
/// every other character flowing as its own token.
pub(crate) fn meta_lexicon() -> Result<Lexicon, utf8lex::Error> {
    let mut lexicon = Lexicon::new();

    lexicon.regex("META_ID", r"[_\p{L}][_\p{L}\p{N}]*")?;
    lexicon.regex("META_SPACE", r"\h+")?;
    lexicon.literal("META_QUOTE", "\"")?;
    lexicon.literal("META_BACKSLASH", "\\")?;
    lexicon.literal("META_LBRACE", "{")?;
    lexicon.literal("META_RBRACE", "}")?;
    lexicon.literal("META_PIPE", "|")?;
    lexicon.literal("META_STAR", "*")?;
    lexicon.literal("META_PLUS", "+")?;
    lexicon.category("META_NEWLINE", Cat::VSPACE, 1, Some(1))?;
    lexicon.category("META_ANY", Cat::ALL, 1, Some(1))?;

    lexicon.rule("id", "META_ID", "")?;
    lexicon.rule("space", "META_SPACE", "")?;
    lexicon.rule("quote", "META_QUOTE", "")?;
    lexicon.rule("backslash", "META_BACKSLASH", "")?;
    lexicon.rule("lbrace", "META_LBRACE", "")?;
    lexicon.rule("rbrace", "META_RBRACE", "")?;
    lexicon.rule("pipe", "META_PIPE", "")?;
    lexicon.rule("star", "META_STAR", "")?;
    lexicon.rule("plus", "META_PLUS", "")?;
    lexicon.rule("newline", "META_NEWLINE", "")?;
    lexicon.rule("any", "META_ANY", "")?;

    lexicon.resolve()?;
    Ok(lexicon)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use utf8lex::{lex, Lexed, State};

    use super::*;

    fn toks(line: &str) -> Vec<(u32, String)> {
        let lexicon = meta_lexicon().unwrap();
        let mut state = State::new();
        state.append_str(line, true).unwrap();
        let mut out = Vec::new();
        loop {
            match lex(&lexicon, &mut state).unwrap() {
                Lexed::Token(t) => out.push((t.rule.0, t.text().into_owned())),
                Lexed::Eof => break,
                other => panic!("unexpected {other:?}"),
            }
        }
        out
    }

    #[test]
    fn bodies_tokenize_in_declaration_order() {
        let tokens = toks("NUMBER [0-9]+\n");
        assert_eq!(tokens[0], (tok::ID, "NUMBER".to_owned()));
        assert_eq!(tokens[1], (tok::SPACE, " ".to_owned()));
        // "[0-9]" falls to the catch-all, one grapheme at a time.
        assert_eq!(tokens[2], (tok::ANY, "[".to_owned()));
        assert_eq!(tokens.last().unwrap(), &(tok::NEWLINE, "\n".to_owned()));
    }

    #[test]
    fn crlf_is_one_newline_token() {
        let tokens = toks("A B\r\n");
        assert_eq!(tokens.last().unwrap(), &(tok::NEWLINE, "\r\n".to_owned()));
    }

    #[test]
    fn identifiers_may_be_unicode() {
        let tokens = toks("héllo_1 x\n");
        assert_eq!(tokens[0], (tok::ID, "héllo_1".to_owned()));
    }
}
