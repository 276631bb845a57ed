// Tree reduction and scan metadata
//
// `reduce` rewrites the parsed tree into a semantically identical but
// flatter one before lowering. The analyzers below it derive the scan
// prefilters: a conservative first-character class, a leading anchor,
// and the minimum match length. Matching stays correct if all three are
// ignored; the scan driver only uses them to reject start offsets early.

use crate::charclass::{ClassSpec, CompiledClass};
use crate::syntax::ast::{AnchorKind, CondTest, LoopKind, RegexNode};

pub fn reduce(node: RegexNode) -> RegexNode {
    match node {
        RegexNode::Concat(children) => reduce_concat(children),
        RegexNode::Alternation(branches) => reduce_alternation(branches),
        RegexNode::Loop {
            child,
            min,
            max,
            kind,
        } => {
            let child = reduce(*child);
            if max == Some(0) || matches!(child, RegexNode::Empty) {
                return RegexNode::Empty;
            }
            if min == 1 && max == Some(1) {
                return if kind == LoopKind::Possessive {
                    RegexNode::Atomic(Box::new(child))
                } else {
                    child
                };
            }
            RegexNode::Loop {
                child: Box::new(child),
                min,
                max,
                kind,
            }
        }
        RegexNode::Capture {
            child,
            number,
            name,
        } => RegexNode::Capture {
            child: Box::new(reduce(*child)),
            number,
            name,
        },
        // a non-capturing group is semantically transparent
        RegexNode::Group(child) => reduce(*child),
        RegexNode::Atomic(child) => {
            let child = reduce(*child);
            if matches!(child, RegexNode::Empty) {
                RegexNode::Empty
            } else {
                RegexNode::Atomic(Box::new(child))
            }
        }
        RegexNode::Look {
            child,
            behind,
            negate,
        } => RegexNode::Look {
            child: Box::new(reduce(*child)),
            behind,
            negate,
        },
        RegexNode::Conditional { test, yes, no } => RegexNode::Conditional {
            test: match test {
                CondTest::Look(node) => CondTest::Look(Box::new(reduce(*node))),
                group => group,
            },
            yes: Box::new(reduce(*yes)),
            no: Box::new(reduce(*no)),
        },
        RegexNode::Balancing {
            child,
            number,
            name,
            uncap,
        } => RegexNode::Balancing {
            child: Box::new(reduce(*child)),
            number,
            name,
            uncap,
        },
        leaf => leaf,
    }
}

fn reduce_concat(children: Vec<RegexNode>) -> RegexNode {
    let mut out: Vec<RegexNode> = Vec::with_capacity(children.len());
    for child in children {
        let child = reduce(child);
        match child {
            RegexNode::Empty => {}
            RegexNode::Concat(inner) => {
                for node in inner {
                    push_merged(&mut out, node);
                }
            }
            node => push_merged(&mut out, node),
        }
    }
    RegexNode::concat(out)
}

/// Append to a concat body, merging adjacent literal runs with the same
/// folding.
fn push_merged(out: &mut Vec<RegexNode>, node: RegexNode) {
    if let RegexNode::Literal { chars, fold } = &node
        && let Some(RegexNode::Literal {
            chars: prev,
            fold: pfold,
        }) = out.last_mut()
        && *pfold == *fold
    {
        prev.extend_from_slice(chars);
        return;
    }
    out.push(node);
}

fn reduce_alternation(branches: Vec<RegexNode>) -> RegexNode {
    let mut out: Vec<RegexNode> = Vec::with_capacity(branches.len());
    for branch in branches {
        let branch = reduce(branch);
        match branch {
            RegexNode::Alternation(inner) => out.extend(inner),
            node => out.push(node),
        }
        // ordered choice: branches after one that always matches empty
        // are unreachable
        if matches!(out.last(), Some(RegexNode::Empty)) {
            break;
        }
    }
    match out.len() {
        0 => RegexNode::Empty,
        1 => out.pop().unwrap(),
        _ => RegexNode::Alternation(out),
    }
}

// ---------------------------------------------------------------------
// first-character analysis
// ---------------------------------------------------------------------

struct FirstInfo {
    /// Chars that can be consumed first. `None` means unrestricted.
    class: Option<CompiledClass>,
    /// Whether the subtree can match without consuming.
    nullable: bool,
}

/// Conservative set of characters that can begin a match, or `None`
/// when every offset has to be tried.
pub fn compute_first(node: &RegexNode) -> Option<CompiledClass> {
    let info = first(node);
    if info.nullable { None } else { info.class }
}

fn first(node: &RegexNode) -> FirstInfo {
    match node {
        RegexNode::Empty | RegexNode::Anchor(_) | RegexNode::Look { .. } => FirstInfo {
            class: Some(ClassSpec::new().compile()),
            nullable: true,
        },
        RegexNode::Literal { chars, fold } => match chars.first() {
            Some(&c) => FirstInfo {
                class: Some(ClassSpec::from_char(c, *fold).compile()),
                nullable: false,
            },
            None => FirstInfo {
                class: Some(ClassSpec::new().compile()),
                nullable: true,
            },
        },
        RegexNode::Class(class) => FirstInfo {
            class: Some(class.clone()),
            nullable: false,
        },
        RegexNode::Backref { .. } => FirstInfo {
            class: None,
            nullable: true,
        },
        RegexNode::Concat(children) => {
            let mut acc = Some(ClassSpec::new().compile());
            for child in children {
                let info = first(child);
                acc = union_opt(acc, info.class);
                if !info.nullable {
                    return FirstInfo {
                        class: acc,
                        nullable: false,
                    };
                }
            }
            FirstInfo {
                class: acc,
                nullable: true,
            }
        }
        RegexNode::Alternation(branches) => {
            let mut acc = Some(ClassSpec::new().compile());
            let mut nullable = false;
            for branch in branches {
                let info = first(branch);
                acc = union_opt(acc, info.class);
                nullable |= info.nullable;
            }
            FirstInfo {
                class: acc,
                nullable,
            }
        }
        RegexNode::Loop { child, min, .. } => {
            let info = first(child);
            FirstInfo {
                class: info.class,
                nullable: *min == 0 || info.nullable,
            }
        }
        RegexNode::Capture { child, .. }
        | RegexNode::Group(child)
        | RegexNode::Atomic(child)
        | RegexNode::Balancing { child, .. } => first(child),
        RegexNode::Conditional { yes, no, .. } => {
            let a = first(yes);
            let b = first(no);
            FirstInfo {
                class: union_opt(a.class, b.class),
                nullable: a.nullable || b.nullable,
            }
        }
    }
}

fn union_opt(
    a: Option<CompiledClass>,
    b: Option<CompiledClass>,
) -> Option<CompiledClass> {
    match (a, b) {
        (Some(a), Some(b)) => a.try_union(&b),
        _ => None,
    }
}

// ---------------------------------------------------------------------
// leading anchor and minimum length
// ---------------------------------------------------------------------

/// Anchor that must hold at the start offset of any match, when one can
/// be proven.
pub fn leading_anchor(node: &RegexNode) -> Option<AnchorKind> {
    match node {
        RegexNode::Anchor(
            kind @ (AnchorKind::BeginningOfString
            | AnchorKind::StartOfLine
            | AnchorKind::StartOfMatch),
        ) => Some(*kind),
        RegexNode::Concat(children) => leading_anchor(children.first()?),
        RegexNode::Alternation(branches) => {
            let first = leading_anchor(branches.first()?)?;
            branches[1..]
                .iter()
                .all(|b| leading_anchor(b) == Some(first))
                .then_some(first)
        }
        RegexNode::Capture { child, .. }
        | RegexNode::Group(child)
        | RegexNode::Atomic(child) => leading_anchor(child),
        RegexNode::Loop { child, min, .. } if *min >= 1 => leading_anchor(child),
        _ => None,
    }
}

/// Minimum number of characters any match must consume.
pub fn min_length(node: &RegexNode) -> usize {
    match node {
        RegexNode::Empty
        | RegexNode::Anchor(_)
        | RegexNode::Look { .. }
        | RegexNode::Backref { .. } => 0,
        RegexNode::Literal { chars, .. } => chars.len(),
        RegexNode::Class(_) => 1,
        RegexNode::Concat(children) => {
            children.iter().map(min_length).fold(0, usize::saturating_add)
        }
        RegexNode::Alternation(branches) => {
            branches.iter().map(min_length).min().unwrap_or(0)
        }
        RegexNode::Loop { child, min, .. } => {
            min_length(child).saturating_mul(*min as usize)
        }
        RegexNode::Capture { child, .. }
        | RegexNode::Group(child)
        | RegexNode::Atomic(child)
        | RegexNode::Balancing { child, .. } => min_length(child),
        RegexNode::Conditional { yes, no, .. } => min_length(yes).min(min_length(no)),
    }
}
