//! The per-kind matchers.
//!
//! Every matcher examines the chain from a given position and reports
//! what a token starting there would cover; none of them advance the
//! state. Cat, literal and regex matchers enumerate every viable prefix
//! they could consume; standing alone they take the longest. The multi
//! matcher walks its references depth first with backtracking: a
//! non-final reference concedes bytes to its successors (shortest
//! viable prefix first), the final reference is greedy. Each matched
//! instance is captured into the sub-token arena, and the arena rewinds
//! whenever an attempt fails, so partial captures leave no residue.

use crate::buffer::{Chain, Pos};
use crate::definition::{CatDef, DefId, DefinitionKind, DefinitionSet, LiteralDef};
use crate::error::{Error, Result};
use crate::multi::{MultiDef, MultiKind, Reference};
use crate::read::{read_grapheme, Next};
use crate::regex::{PrefixAll, RegexDef};
use crate::token::{sub_starts, SubId, SubToken, SubTokenArena};
use crate::unit::{Locations, Unit};
use crate::MAX_MULTI_DEPTH;

/// What a successful match would cover.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Attempt {
    /// The matched bytes.
    pub text: Vec<u8>,
    /// Per-unit lengths, resets and hashes; starts cleared.
    pub loc: Locations,
    /// Direct sub-token captures, in match order.
    pub subs: Vec<SubId>,
}

/// Outcome of one matcher invocation.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum MatchAttempt {
    Match(Attempt),
    NoMatch,
    NeedMore,
}

/// Match one definition against the chain at `pos`.
///
/// `base` carries the absolute starts of the match position, used to
/// give captured sub-tokens absolute locations. `depth` bounds
/// recursion through multi definitions.
pub(crate) fn match_definition(
    defs: &DefinitionSet,
    chain: &Chain,
    arena: &mut SubTokenArena,
    id: DefId,
    pos: Pos,
    base: &Locations,
    depth: usize,
) -> Result<MatchAttempt> {
    if depth > MAX_MULTI_DEPTH {
        return Err(Error::InfiniteLoop);
    }
    let def = defs.get(id)?;
    match &def.kind {
        DefinitionKind::Multi(multi) => match_multi(defs, chain, arena, multi, pos, base, depth),
        kind => {
            // Standing alone, a plain definition takes its longest fit.
            match plain_candidates(chain, kind, pos)? {
                Plain::NeedMore => Ok(MatchAttempt::NeedMore),
                Plain::List(fits) => Ok(match fits.last() {
                    Some(loc) => {
                        let len = loc[Unit::Byte].length.max(0) as usize;
                        MatchAttempt::Match(Attempt {
                            text: chain.copy_range(pos, len),
                            loc: *loc,
                            subs: Vec::new(),
                        })
                    }
                    None => MatchAttempt::NoMatch,
                }),
            }
        }
    }
}

/// Viable prefixes of one cat/literal/regex match, byte length
/// ascending, zero-length excluded.
enum Plain {
    NeedMore,
    List(Vec<Locations>),
}

fn plain_candidates(chain: &Chain, kind: &DefinitionKind, pos: Pos) -> Result<Plain> {
    match kind {
        DefinitionKind::Cat(def) => cat_candidates(chain, def, pos),
        DefinitionKind::Literal(def) => literal_candidates(chain, def, pos),
        DefinitionKind::Regex(def) => regex_candidates(chain, def, pos),
        DefinitionKind::Multi(_) => Err(Error::DefinitionType),
    }
}

/// Each count of consecutive matching graphemes within the quantifier.
fn cat_candidates(chain: &Chain, def: &CatDef, pos: Pos) -> Result<Plain> {
    let mut fits = Vec::new();
    let mut acc = Locations::extent();
    let mut cursor = pos;
    let mut count = 0usize;

    loop {
        if def.max.is_some_and(|max| count >= max) {
            break;
        }
        let mut probe = cursor;
        match read_grapheme(chain, &mut probe)? {
            Next::Grapheme(g) if g.cat.intersects(def.cat) => {
                acc.extend(&g.loc);
                cursor = probe;
                count += 1;
                if count >= def.min {
                    fits.push(acc);
                }
            }
            Next::Grapheme(_) | Next::Eof => break,
            Next::NeedMore => return Ok(Plain::NeedMore),
        }
    }

    Ok(Plain::List(fits))
}

/// A literal either fits whole or not at all.
fn literal_candidates(chain: &Chain, def: &LiteralDef, pos: Pos) -> Result<Plain> {
    for (i, &expected) in def.text.as_bytes().iter().enumerate() {
        match chain.byte_at(pos.advanced(i)) {
            Some(byte) if byte == expected => {}
            Some(_) => return Ok(Plain::List(Vec::new())),
            None => {
                return Ok(if chain.is_eof() {
                    Plain::List(Vec::new())
                } else {
                    Plain::NeedMore
                })
            }
        }
    }
    // The precomputed locations spare a grapheme re-count.
    Ok(Plain::List(vec![def.loc]))
}

/// Every anchored DFA match end, re-read through the grapheme reader to
/// recover char, grapheme and line geometry.
fn regex_candidates(chain: &Chain, def: &RegexDef, pos: Pos) -> Result<Plain> {
    let haystack = chain.copy_to_end(pos);
    let ends = match def.prefix_matches(&haystack, chain.is_eof())? {
        PrefixAll::NeedMore => return Ok(Plain::NeedMore),
        PrefixAll::Ends(ends) => ends,
    };
    let Some(&longest) = ends.last() else {
        return Ok(Plain::List(Vec::new()));
    };

    // One pass over the span; snapshot at every grapheme boundary.
    let mut snapshots = Vec::new();
    let mut acc = Locations::extent();
    let mut cursor = pos;
    while (acc[Unit::Byte].length.max(0) as usize) < longest {
        match read_grapheme(chain, &mut cursor)? {
            Next::Grapheme(g) => {
                acc.extend(&g.loc);
                snapshots.push(acc);
            }
            Next::NeedMore => return Ok(Plain::NeedMore),
            Next::Eof => break,
        }
    }

    let mut fits = Vec::with_capacity(ends.len());
    for end in ends {
        let snapshot = snapshots
            .iter()
            .find(|s| s[Unit::Byte].length.max(0) as usize >= end);
        match snapshot {
            Some(s) => {
                let covered = s[Unit::Byte].length.max(0) as usize;
                if covered != end {
                    eprintln!(
                        "utf8lex: warning: regex '{}' matched {} bytes but the grapheme \
                         re-read covered {}",
                        def.pattern, end, covered
                    );
                }
                if fits.last() != Some(s) {
                    fits.push(*s);
                }
            }
            None => {
                if let Some(s) = snapshots.last() {
                    eprintln!(
                        "utf8lex: warning: regex '{}' matched {} bytes but the grapheme \
                         re-read covered {}",
                        def.pattern,
                        end,
                        s[Unit::Byte].length.max(0)
                    );
                    if fits.last() != Some(s) {
                        fits.push(*s);
                    }
                }
            }
        }
    }
    Ok(Plain::List(fits))
}

/// The winning walk of a reference list.
struct SeqWin {
    acc: Locations,
    subs: Vec<SubId>,
}

enum DfsOut {
    Matched(SeqWin),
    NoMatch,
    NeedMore,
}

fn match_multi(
    defs: &DefinitionSet,
    chain: &Chain,
    arena: &mut SubTokenArena,
    def: &MultiDef,
    pos: Pos,
    base: &Locations,
    depth: usize,
) -> Result<MatchAttempt> {
    let mark = arena.mark();
    match def.kind {
        MultiKind::Sequence => {
            match seq_dfs(
                defs,
                chain,
                arena,
                &def.refs,
                0,
                0,
                pos,
                base,
                Locations::extent(),
                Vec::new(),
                depth,
            )? {
                DfsOut::Matched(win) if win.acc[Unit::Byte].length > 0 => {
                    let len = win.acc[Unit::Byte].length as usize;
                    Ok(MatchAttempt::Match(Attempt {
                        text: chain.copy_range(pos, len),
                        loc: win.acc,
                        subs: win.subs,
                    }))
                }
                DfsOut::Matched(_) | DfsOut::NoMatch => {
                    arena.rewind(mark);
                    Ok(MatchAttempt::NoMatch)
                }
                DfsOut::NeedMore => {
                    arena.rewind(mark);
                    Ok(MatchAttempt::NeedMore)
                }
            }
        }
        MultiKind::Or => {
            // First alternative that matches its quantifier with a
            // non-empty result wins; declared order, not longest.
            for reference in &def.refs {
                let single = std::slice::from_ref(reference);
                match seq_dfs(
                    defs,
                    chain,
                    arena,
                    single,
                    0,
                    0,
                    pos,
                    base,
                    Locations::extent(),
                    Vec::new(),
                    depth,
                )? {
                    DfsOut::Matched(win) if win.acc[Unit::Byte].length > 0 => {
                        let len = win.acc[Unit::Byte].length as usize;
                        return Ok(MatchAttempt::Match(Attempt {
                            text: chain.copy_range(pos, len),
                            loc: win.acc,
                            subs: win.subs,
                        }));
                    }
                    DfsOut::Matched(_) | DfsOut::NoMatch => arena.rewind(mark),
                    DfsOut::NeedMore => {
                        arena.rewind(mark);
                        return Ok(MatchAttempt::NeedMore);
                    }
                }
            }
            Ok(MatchAttempt::NoMatch)
        }
    }
}

/// Depth-first walk over `refs[idx..]` with `count` instances of
/// `refs[idx]` already consumed.
///
/// A non-final reference tries to stop first and concedes as little as
/// possible when it must consume; the final reference consumes
/// greedily. This is what lets `ID NUM+` split `x12` into an `ID` of
/// `x` and a `NUM` of `12` even though `ID` alone would swallow all
/// three bytes.
#[allow(clippy::too_many_arguments)]
fn seq_dfs(
    defs: &DefinitionSet,
    chain: &Chain,
    arena: &mut SubTokenArena,
    refs: &[Reference],
    idx: usize,
    count: usize,
    pos: Pos,
    base: &Locations,
    acc: Locations,
    subs: Vec<SubId>,
    depth: usize,
) -> Result<DfsOut> {
    if idx >= refs.len() {
        return Ok(DfsOut::Matched(SeqWin { acc, subs }));
    }
    let reference = &refs[idx];
    let is_final = idx + 1 == refs.len();
    let can_stop = count >= reference.min;
    let can_consume = reference.max.map_or(true, |max| count < max);

    if !is_final && can_stop {
        match seq_dfs(
            defs,
            chain,
            arena,
            refs,
            idx + 1,
            0,
            pos,
            base,
            acc,
            subs.clone(),
            depth,
        )? {
            DfsOut::NoMatch => {}
            out => return Ok(out),
        }
    }

    if can_consume {
        match consume_instance(
            defs, chain, arena, refs, idx, count, pos, base, acc, &subs, depth, is_final,
        )? {
            DfsOut::NoMatch => {}
            out => return Ok(out),
        }
    }

    if is_final && can_stop {
        return seq_dfs(
            defs,
            chain,
            arena,
            refs,
            idx + 1,
            0,
            pos,
            base,
            acc,
            subs,
            depth,
        );
    }

    Ok(DfsOut::NoMatch)
}

/// Try one more instance of `refs[idx]` at `pos`, then continue the
/// walk. Candidate order follows the reference's position: shortest
/// first for a conceding (non-final) reference, longest first for the
/// greedy final one.
#[allow(clippy::too_many_arguments)]
fn consume_instance(
    defs: &DefinitionSet,
    chain: &Chain,
    arena: &mut SubTokenArena,
    refs: &[Reference],
    idx: usize,
    count: usize,
    pos: Pos,
    base: &Locations,
    acc: Locations,
    subs: &[SubId],
    depth: usize,
    greedy: bool,
) -> Result<DfsOut> {
    let reference = &refs[idx];
    let target = reference
        .def
        .ok_or_else(|| Error::UnresolvedDefinition(reference.name.clone()))?;
    let instance_base = sub_starts(base, &acc);
    let def = defs.get(target)?;

    // A nested multi yields a single greedy candidate of its own.
    if let DefinitionKind::Multi(nested) = &def.kind {
        if depth + 1 > MAX_MULTI_DEPTH {
            return Err(Error::InfiniteLoop);
        }
        let mark = arena.mark();
        return match match_multi(defs, chain, arena, nested, pos, &instance_base, depth + 1)? {
            MatchAttempt::Match(att) if att.loc[Unit::Byte].length > 0 => {
                let out = apply_and_continue(
                    defs,
                    chain,
                    arena,
                    refs,
                    idx,
                    count,
                    pos,
                    base,
                    acc,
                    subs,
                    depth,
                    reference,
                    target,
                    &instance_base,
                    att.loc,
                    att.text,
                    att.subs,
                )?;
                if matches!(out, DfsOut::NoMatch) {
                    arena.rewind(mark);
                }
                Ok(out)
            }
            MatchAttempt::Match(_) | MatchAttempt::NoMatch => {
                arena.rewind(mark);
                Ok(DfsOut::NoMatch)
            }
            MatchAttempt::NeedMore => Ok(DfsOut::NeedMore),
        };
    }

    let fits = match plain_candidates(chain, &def.kind, pos)? {
        Plain::NeedMore => return Ok(DfsOut::NeedMore),
        Plain::List(fits) => fits,
    };

    let ordered: Vec<Locations> = if greedy {
        fits.into_iter().rev().collect()
    } else {
        fits
    };
    for fit in ordered {
        let len = fit[Unit::Byte].length.max(0) as usize;
        if len == 0 {
            continue;
        }
        let mark = arena.mark();
        let text = chain.copy_range(pos, len);
        let out = apply_and_continue(
            defs,
            chain,
            arena,
            refs,
            idx,
            count,
            pos,
            base,
            acc,
            subs,
            depth,
            reference,
            target,
            &instance_base,
            fit,
            text,
            Vec::new(),
        )?;
        match out {
            DfsOut::NoMatch => arena.rewind(mark),
            out => return Ok(out),
        }
    }
    Ok(DfsOut::NoMatch)
}

/// Capture one instance into the arena and recurse on the same
/// reference with one more instance consumed.
#[allow(clippy::too_many_arguments)]
fn apply_and_continue(
    defs: &DefinitionSet,
    chain: &Chain,
    arena: &mut SubTokenArena,
    refs: &[Reference],
    idx: usize,
    count: usize,
    pos: Pos,
    base: &Locations,
    acc: Locations,
    subs: &[SubId],
    depth: usize,
    reference: &Reference,
    target: DefId,
    instance_base: &Locations,
    fit: Locations,
    text: Vec<u8>,
    children: Vec<SubId>,
) -> Result<DfsOut> {
    let mut sub_loc = fit;
    for unit in Unit::ALL {
        sub_loc[unit].start = instance_base[unit].start;
    }
    let sid = arena.alloc(SubToken {
        def: target,
        name: reference.name.clone(),
        bytes: text,
        loc: sub_loc,
        parent: None,
        children: children.clone(),
    })?;
    for child in children {
        arena.get_mut(child)?.parent = Some(sid);
    }

    let mut next_acc = acc;
    next_acc.extend(&fit);
    let mut next_subs = subs.to_vec();
    next_subs.push(sid);
    let next_pos = pos.advanced(fit[Unit::Byte].length.max(0) as usize);

    seq_dfs(
        defs,
        chain,
        arena,
        refs,
        idx,
        count + 1,
        next_pos,
        base,
        next_acc,
        next_subs,
        depth,
    )
}
