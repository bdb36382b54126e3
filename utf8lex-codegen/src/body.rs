//! The body state machine: one definition or rule line → its parsed
//! pieces.
//!
//! The machine consumes meta-lexicon tokens and follows an explicit
//! transition table. Section 1 lines start in `Definition` (leading
//! name plus space); Section 2 lines jump straight into
//! `DefinitionBody`. Invalid transitions land in `Error`, carrying the
//! recent state history for diagnosis.

use std::fmt;

use beef::lean::Cow;

use crate::meta::tok;
use utf8lex::MultiKind;
use utf8lex::{MAX_BODY_BYTES, MAX_RULE_CODE_BYTES};

/// Which spec section the line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Section {
    Definitions,
    Rules,
}

/// States of the body machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BodyState {
    Definition,
    DefinitionBody,
    MultiId,
    MultiSpace,
    MultiSequenceId,
    MultiStar,
    MultiPlus,
    MultiOr,
    Literal,
    LiteralBackslash,
    LiteralComplete,
    Regex,
    RegexSpace,
    Rule,
    RuleComplete,
    Complete,
    Error,
}

impl fmt::Display for BodyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BodyState::Definition => "DEFINITION",
            BodyState::DefinitionBody => "DEFINITION_BODY",
            BodyState::MultiId => "MULTI_ID",
            BodyState::MultiSpace => "MULTI_SPACE",
            BodyState::MultiSequenceId => "MULTI_SEQUENCE_ID",
            BodyState::MultiStar => "MULTI_STAR",
            BodyState::MultiPlus => "MULTI_PLUS",
            BodyState::MultiOr => "MULTI_OR",
            BodyState::Literal => "LITERAL",
            BodyState::LiteralBackslash => "LITERAL_BACKSLASH",
            BodyState::LiteralComplete => "LITERAL_COMPLETE",
            BodyState::Regex => "REGEX",
            BodyState::RegexSpace => "REGEX_SPACE",
            BodyState::Rule => "RULE",
            BodyState::RuleComplete => "RULE_COMPLETE",
            BodyState::Complete => "COMPLETE",
            BodyState::Error => "ERROR",
        };
        f.write_str(name)
    }
}

/// How many recent states the error history keeps.
const HISTORY: usize = 16;

/// One reference as parsed: name, min, max.
pub(crate) type ParsedRef = (String, usize, Option<usize>);

/// The right-hand side of a parsed line.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ParsedBody {
    Multi {
        kind: MultiKind,
        refs: Vec<ParsedRef>,
    },
    Literal(String),
    Regex(String),
}

/// A fully parsed definition or rule line.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ParsedLine {
    /// The definition name (Section 1 only).
    pub name: Option<String>,
    /// The right-hand side.
    pub body: ParsedBody,
    /// Trailing rule code (Section 2 only).
    pub code: Option<String>,
}

/// A syntax failure inside the machine; the parser adds line context.
#[derive(Debug)]
pub(crate) struct BodyError {
    pub message: Cow<'static, str>,
    pub history: String,
}

pub(crate) struct BodyMachine {
    section: Section,
    state: BodyState,
    history: Vec<BodyState>,
    name: Option<String>,
    multi_kind: MultiKind,
    refs: Vec<ParsedRef>,
    literal: String,
    regex: String,
    pending_space: String,
    code: String,
    has_code: bool,
    brace_depth: usize,
}

impl BodyMachine {
    pub(crate) fn new(section: Section) -> BodyMachine {
        let state = match section {
            Section::Definitions => BodyState::Definition,
            Section::Rules => BodyState::DefinitionBody,
        };
        BodyMachine {
            section,
            state,
            history: vec![state],
            name: None,
            multi_kind: MultiKind::Sequence,
            refs: Vec::new(),
            literal: String::new(),
            regex: String::new(),
            pending_space: String::new(),
            code: String::new(),
            has_code: false,
            brace_depth: 0,
        }
    }

    fn enter(&mut self, state: BodyState) {
        self.state = state;
        self.history.push(state);
    }

    fn fail(&mut self, message: impl Into<Cow<'static, str>>) -> BodyError {
        self.enter(BodyState::Error);
        let recent: Vec<String> = self
            .history
            .iter()
            .rev()
            .take(HISTORY)
            .map(BodyState::to_string)
            .collect();
        BodyError {
            message: message.into(),
            history: recent.join(" < "),
        }
    }

    fn push_reference(&mut self, name: String) {
        self.refs.push((name, 1, Some(1)));
    }

    fn requantify(&mut self, min: usize, max: Option<usize>) -> Result<(), BodyError> {
        match self.refs.last_mut() {
            Some(last) => {
                last.1 = min;
                last.2 = max;
                Ok(())
            }
            None => Err(self.fail("quantifier with no preceding reference")),
        }
    }

    fn grow_body(&mut self, which: Body, text: &str) -> Result<(), BodyError> {
        let target = match which {
            Body::Literal => &mut self.literal,
            Body::Regex => &mut self.regex,
        };
        target.push_str(text);
        if target.len() > MAX_BODY_BYTES {
            return Err(self.fail("definition body exceeds the byte cap"));
        }
        Ok(())
    }

    fn grow_code(&mut self, text: &str) -> Result<(), BodyError> {
        self.code.push_str(text);
        if self.code.len() > MAX_RULE_CODE_BYTES {
            return Err(self.fail("rule code exceeds the byte cap"));
        }
        Ok(())
    }

    fn begin_rule(&mut self) -> Result<(), BodyError> {
        if self.section != Section::Rules {
            return Err(self.fail("rule code is only allowed in the rules section"));
        }
        self.has_code = true;
        self.brace_depth = 1;
        self.enter(BodyState::Rule);
        Ok(())
    }

    /// Whether the machine has accepted the whole line.
    pub(crate) fn is_complete(&self) -> bool {
        self.state == BodyState::Complete
    }

    /// Feed one meta token.
    pub(crate) fn feed(&mut self, rule: u32, text: &str) -> Result<(), BodyError> {
        match self.state {
            BodyState::Definition => match rule {
                tok::ID if self.name.is_none() => {
                    self.name = Some(text.to_owned());
                    Ok(())
                }
                tok::SPACE if self.name.is_some() => {
                    self.enter(BodyState::DefinitionBody);
                    Ok(())
                }
                _ => Err(self.fail("expected a definition name")),
            },

            BodyState::DefinitionBody => match rule {
                tok::ID => {
                    self.push_reference(text.to_owned());
                    self.enter(BodyState::MultiId);
                    Ok(())
                }
                tok::QUOTE => {
                    self.enter(BodyState::Literal);
                    Ok(())
                }
                tok::SPACE => Ok(()),
                tok::NEWLINE => Err(self.fail("definition has no body")),
                // Anything else begins a regex, `{` included.
                _ => {
                    self.grow_body(Body::Regex, text)?;
                    self.enter(BodyState::Regex);
                    Ok(())
                }
            },

            BodyState::MultiId
            | BodyState::MultiSpace
            | BodyState::MultiSequenceId
            | BodyState::MultiStar
            | BodyState::MultiPlus
            | BodyState::MultiOr => match rule {
                tok::ID => {
                    self.push_reference(text.to_owned());
                    self.enter(BodyState::MultiSequenceId);
                    Ok(())
                }
                tok::STAR => {
                    self.requantify(0, None)?;
                    self.enter(BodyState::MultiStar);
                    Ok(())
                }
                tok::PLUS => {
                    self.requantify(1, None)?;
                    self.enter(BodyState::MultiPlus);
                    Ok(())
                }
                tok::PIPE => {
                    self.multi_kind = MultiKind::Or;
                    self.enter(BodyState::MultiOr);
                    Ok(())
                }
                tok::SPACE => {
                    self.enter(BodyState::MultiSpace);
                    Ok(())
                }
                tok::LBRACE => self.begin_rule(),
                tok::NEWLINE => {
                    self.enter(BodyState::Complete);
                    Ok(())
                }
                _ => Err(self.fail("unexpected token in a reference list")),
            },

            BodyState::Literal => match rule {
                tok::BACKSLASH => {
                    self.enter(BodyState::LiteralBackslash);
                    Ok(())
                }
                tok::QUOTE => {
                    self.enter(BodyState::LiteralComplete);
                    Ok(())
                }
                tok::NEWLINE => Err(self.fail("unterminated literal")),
                _ => self.grow_body(Body::Literal, text),
            },

            BodyState::LiteralBackslash => match rule {
                tok::NEWLINE => Err(self.fail("unterminated literal escape")),
                // The escaped character is concatenated raw.
                _ => {
                    self.grow_body(Body::Literal, text)?;
                    self.enter(BodyState::Literal);
                    Ok(())
                }
            },

            BodyState::LiteralComplete => match rule {
                tok::LBRACE => self.begin_rule(),
                tok::SPACE => Ok(()),
                tok::NEWLINE => {
                    self.enter(BodyState::Complete);
                    Ok(())
                }
                _ => Err(self.fail("unexpected token after a literal")),
            },

            BodyState::Regex => match rule {
                tok::SPACE => {
                    self.pending_space = text.to_owned();
                    self.enter(BodyState::RegexSpace);
                    Ok(())
                }
                tok::NEWLINE => {
                    self.enter(BodyState::Complete);
                    Ok(())
                }
                _ => self.grow_body(Body::Regex, text),
            },

            BodyState::RegexSpace => match rule {
                tok::LBRACE if self.section == Section::Rules => self.begin_rule(),
                tok::NEWLINE => {
                    self.enter(BodyState::Complete);
                    Ok(())
                }
                tok::SPACE => {
                    self.pending_space.push_str(text);
                    Ok(())
                }
                // The space was intra-regex after all.
                _ => {
                    let pending = std::mem::take(&mut self.pending_space);
                    self.grow_body(Body::Regex, &pending)?;
                    self.grow_body(Body::Regex, text)?;
                    self.enter(BodyState::Regex);
                    Ok(())
                }
            },

            BodyState::Rule => match rule {
                tok::LBRACE => {
                    self.brace_depth += 1;
                    self.grow_code(text)
                }
                tok::RBRACE => {
                    self.brace_depth -= 1;
                    if self.brace_depth == 0 {
                        self.enter(BodyState::RuleComplete);
                        Ok(())
                    } else {
                        self.grow_code(text)
                    }
                }
                tok::NEWLINE => Err(self.fail("rule code must close on one line")),
                _ => self.grow_code(text),
            },

            BodyState::RuleComplete => match rule {
                tok::SPACE => Ok(()),
                tok::NEWLINE => {
                    self.enter(BodyState::Complete);
                    Ok(())
                }
                _ => Err(self.fail("unexpected token after rule code")),
            },

            BodyState::Complete => Err(self.fail("token after end of line")),
            BodyState::Error => Err(self.fail("machine already failed")),
        }
    }

    /// Consume the machine into its parsed line.
    pub(crate) fn finish(mut self) -> Result<ParsedLine, BodyError> {
        if self.state != BodyState::Complete {
            return Err(self.fail("line ended mid-construct"));
        }
        let body = if !self.refs.is_empty() {
            ParsedBody::Multi {
                kind: self.multi_kind,
                refs: self.refs,
            }
        } else if !self.literal.is_empty() || self.history.contains(&BodyState::Literal) {
            ParsedBody::Literal(self.literal)
        } else {
            ParsedBody::Regex(self.regex)
        };
        Ok(ParsedLine {
            name: self.name,
            body,
            code: if self.has_code {
                Some(self.code.trim().to_owned())
            } else {
                None
            },
        })
    }
}

enum Body {
    Literal,
    Regex,
}
