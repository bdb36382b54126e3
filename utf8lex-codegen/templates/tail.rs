
/// Pull one token: the dispatch result and the token itself, `YYEOF`
/// at end of input, `YYERROR` when no rule matches.
pub fn yylex(lexicon: &Lexicon, state: &mut State) -> Result<(i32, Option<Token>), Error> {
    match lex(lexicon, state)? {
        Lexed::Token(token) => {
            let status = dispatch(&token, state);
            Ok((status, Some(token)))
        }
        Lexed::Eof => Ok((YYEOF, None)),
        Lexed::NoMatch => Ok((YYERROR, None)),
        // The whole input was buffered up front, so the engine can
        // only ask for more if the stream ended mid-sequence.
        Lexed::NeedMore => Err(Error::BadUtf8),
    }
}

fn run() -> Result<(), Error> {
    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .map_err(|err| Error::FileRead(err.to_string()))?;

    let lexicon = build_lexicon()?;
    let mut state = State::new();
    state.append_str(&input, true)?;

    loop {
        let (status, token) = yylex(&lexicon, &mut state)?;
        if status == YYEOF {
            break;
        }
        if status == YYERROR && token.is_none() {
            return Err(Error::Token);
        }
        let text = token.map(|t| t.text().into_owned()).unwrap_or_default();
        println!("{status}\t{text}");
    }
    Ok(())
}

fn main() -> std::process::ExitCode {
    match run() {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("utf8lex: {err}");
            std::process::ExitCode::from(err.code().clamp(0, 255) as u8)
        }
    }
}
