//! Deterministic emission of the parsed database as Rust source.
//!
//! The output is head template, pass-through header code, count
//! declarations, a `build_lexicon` function that reconstructs every
//! definition and rule through the runtime's public constructors, a
//! `dispatch` function mapping matched rule ids to their verbatim host
//! code, the section-3 user code, and the tail template. Generating
//! twice from the same spec produces byte-identical output.

use std::fmt::Write;

use crate::error::{Error, Result};
use crate::parser::SpecDb;
use utf8lex::{Definition, DefinitionKind, MultiKind};

const HEAD: &str = include_str!("../templates/head.rs");
const TAIL: &str = include_str!("../templates/tail.rs");

/// Emit the generated source for a parsed spec database.
pub fn emit(db: &SpecDb) -> Result<String> {
    let mut out = String::with_capacity(HEAD.len() + TAIL.len() + 4096);
    out.push_str(HEAD);

    if !db.header.is_empty() {
        out.push('\n');
        out.push_str(&db.header);
    }

    // Emission order: categories first, then everything else in
    // declaration order. Ids shift accordingly, so rule lookups go
    // through the emitted-order map.
    let order: Vec<&Definition> = db
        .lexicon
        .definitions
        .iter()
        .filter(|d| matches!(d.kind, DefinitionKind::Cat(_)))
        .chain(
            db.lexicon
                .definitions
                .iter()
                .filter(|d| !matches!(d.kind, DefinitionKind::Cat(_))),
        )
        .collect();

    let emitted_id = |def: &Definition| -> Result<usize> {
        order
            .iter()
            .position(|candidate| candidate.id == def.id)
            .ok_or(Error::CountMismatch {
                kind: "total",
                declared: order.len(),
                emitted: 0,
            })
    };

    let counts = count_kinds(&order);
    let mut decl = String::new();
    writeln!(decl, "\n/// Category definitions in the generated table.").ok();
    writeln!(decl, "pub const CAT_DEFINITIONS: usize = {};", counts.0).ok();
    writeln!(decl, "/// Literal definitions in the generated table.").ok();
    writeln!(decl, "pub const LITERAL_DEFINITIONS: usize = {};", counts.1).ok();
    writeln!(decl, "/// Regex definitions in the generated table.").ok();
    writeln!(decl, "pub const REGEX_DEFINITIONS: usize = {};", counts.2).ok();
    writeln!(decl, "/// Multi definitions in the generated table.").ok();
    writeln!(decl, "pub const MULTI_DEFINITIONS: usize = {};", counts.3).ok();
    writeln!(decl, "/// All definitions in the generated table.").ok();
    writeln!(
        decl,
        "pub const DEFINITION_COUNT: usize = {};",
        order.len()
    )
    .ok();
    writeln!(
        decl,
        "/// Rules in the generated table.\npub const RULE_COUNT: usize = {};",
        db.lexicon.rules.len()
    )
    .ok();
    out.push_str(&decl);

    out.push_str("\n/// Rebuild the lexicon this source was generated from.\n");
    out.push_str("pub fn build_lexicon() -> Result<Lexicon, Error> {\n");
    out.push_str("    let mut lexicon = Lexicon::new();\n");

    let mut emitted = (0usize, 0usize, 0usize, 0usize);
    for def in &order {
        match &def.kind {
            DefinitionKind::Cat(cat) => {
                emitted.0 += 1;
                writeln!(
                    out,
                    "    lexicon.category_expr(\"{}\", \"{}\", {}, {})?;",
                    escape(&def.name),
                    escape(&cat.formatted),
                    cat.min,
                    quantifier(cat.max),
                )
                .ok();
            }
            DefinitionKind::Literal(literal) => {
                emitted.1 += 1;
                writeln!(
                    out,
                    "    lexicon.literal(\"{}\", \"{}\")?;",
                    escape(&def.name),
                    escape(&literal.text),
                )
                .ok();
            }
            DefinitionKind::Regex(regex) => {
                emitted.2 += 1;
                writeln!(
                    out,
                    "    lexicon.regex(\"{}\", \"{}\")?;",
                    escape(&def.name),
                    escape(&regex.pattern),
                )
                .ok();
            }
            DefinitionKind::Multi(multi) => {
                emitted.3 += 1;
                let var = format!("multi_{}", emitted_id(def)?);
                let kind = match multi.kind {
                    MultiKind::Sequence => "MultiKind::Sequence",
                    MultiKind::Or => "MultiKind::Or",
                };
                writeln!(
                    out,
                    "    let {} = lexicon.multi(\"{}\", {})?;",
                    var,
                    escape(&def.name),
                    kind,
                )
                .ok();
                for reference in &multi.refs {
                    writeln!(
                        out,
                        "    lexicon.reference({}, \"{}\", {}, {})?;",
                        var,
                        escape(&reference.name),
                        reference.min,
                        quantifier(reference.max),
                    )
                    .ok();
                }
            }
        }
    }

    check_counts(counts, emitted)?;

    out.push_str("    lexicon.resolve()?;\n");

    for rule in db.lexicon.rules.iter() {
        let def = db.lexicon.definitions.get(rule.def)?;
        writeln!(
            out,
            "    lexicon.rule_by_id(\"{}\", {}, \"{}\")?;",
            escape(&rule.name),
            emitted_id(def)?,
            escape(&rule.code),
        )
        .ok();
    }

    out.push_str(
        "    if lexicon.definitions.len() != DEFINITION_COUNT || lexicon.rules.len() != RULE_COUNT {\n",
    );
    out.push_str("        return Err(Error::BadError);\n");
    out.push_str("    }\n");
    out.push_str("    Ok(lexicon)\n");
    out.push_str("}\n");

    out.push_str("\n/// Run the host code attached to the matched rule.\n");
    out.push_str("pub fn dispatch(token: &Token, state: &mut State) -> i32 {\n");
    out.push_str("    let rule = token.rule.0 as i32;\n");
    out.push_str("    match token.rule.0 {\n");
    for rule in db.lexicon.rules.iter() {
        writeln!(out, "        {} => {{ {} }}", rule.id.0, rule.code).ok();
    }
    out.push_str("        _ => return YYERROR,\n");
    out.push_str("    }\n");
    out.push_str("    #[allow(unreachable_code)]\n");
    out.push_str("    rule\n");
    out.push_str("}\n");

    if !db.user_code.is_empty() {
        out.push('\n');
        out.push_str(&db.user_code);
    }

    out.push_str(TAIL);
    Ok(out)
}

fn count_kinds(order: &[&Definition]) -> (usize, usize, usize, usize) {
    let mut counts = (0usize, 0usize, 0usize, 0usize);
    for def in order {
        match def.kind {
            DefinitionKind::Cat(_) => counts.0 += 1,
            DefinitionKind::Literal(_) => counts.1 += 1,
            DefinitionKind::Regex(_) => counts.2 += 1,
            DefinitionKind::Multi(_) => counts.3 += 1,
        }
    }
    counts
}

fn check_counts(
    declared: (usize, usize, usize, usize),
    emitted: (usize, usize, usize, usize),
) -> Result<()> {
    for (kind, declared, emitted) in [
        ("cat", declared.0, emitted.0),
        ("literal", declared.1, emitted.1),
        ("regex", declared.2, emitted.2),
        ("multi", declared.3, emitted.3),
    ] {
        if declared != emitted {
            return Err(Error::CountMismatch {
                kind,
                declared,
                emitted,
            });
        }
    }
    Ok(())
}

fn quantifier(max: Option<usize>) -> String {
    match max {
        Some(max) => format!("Some({max})"),
        None => "None".to_owned(),
    }
}

/// Re-escape a string for emission inside a Rust double-quoted literal.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\u{7}' => out.push_str("\\u{7}"),
            '\u{8}' => out.push_str("\\u{8}"),
            '\u{c}' => out.push_str("\\u{c}"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{b}' => out.push_str("\\u{b}"),
            '"' => out.push_str("\\\""),
            c => out.push(c),
        }
    }
    out
}
