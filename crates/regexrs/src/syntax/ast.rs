// Regex AST
// Built once per parse, consumed by the reducer and the compiler.

use smol_str::SmolStr;

use crate::charclass::CompiledClass;

/// Zero-width position assertions. `^`/`$` are resolved against the
/// Multiline flag while parsing, so the tree carries only final kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorKind {
    /// `\A`, or `^` outside Multiline.
    BeginningOfString,
    /// `^` under Multiline.
    StartOfLine,
    /// `$` under Multiline.
    EndOfLine,
    /// `\Z`, or `$` outside Multiline: end, or before a final `\n`.
    EndOfStringOrNewline,
    /// `\z`.
    EndOfString,
    /// `\G`: where the current scan attempt started.
    StartOfMatch,
    /// `\b`.
    WordBoundary,
    /// `\B`.
    NonWordBoundary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopKind {
    Greedy,
    Lazy,
    Possessive,
}

/// Condition of a `(?(..)yes|no)` group.
#[derive(Debug, Clone, PartialEq)]
pub enum CondTest {
    /// Did the referenced group capture on the path so far?
    Group(u32),
    /// Zero-width expression test.
    Look(Box<RegexNode>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum RegexNode {
    Empty,
    /// A run of literal characters. `fold` marks IgnoreCase comparison.
    Literal { chars: Vec<char>, fold: bool },
    Class(CompiledClass),
    Concat(Vec<RegexNode>),
    /// Ordered choice: first matching branch wins.
    Alternation(Vec<RegexNode>),
    Loop {
        child: Box<RegexNode>,
        min: u32,
        /// `None` is unbounded.
        max: Option<u32>,
        kind: LoopKind,
    },
    Capture {
        child: Box<RegexNode>,
        number: u32,
        name: Option<SmolStr>,
    },
    /// Non-capturing `(?:..)`.
    Group(Box<RegexNode>),
    /// `(?>..)`: no backtracking into the child once it has matched.
    Atomic(Box<RegexNode>),
    Anchor(AnchorKind),
    Backref { group: u32, fold: bool },
    Look {
        child: Box<RegexNode>,
        behind: bool,
        negate: bool,
    },
    Conditional {
        test: CondTest,
        yes: Box<RegexNode>,
        no: Box<RegexNode>,
    },
    /// `(?<name1-name2>..)`: pops the last capture of `uncap`, and when
    /// `number` is set captures the transferred interval into it.
    Balancing {
        child: Box<RegexNode>,
        number: Option<u32>,
        name: Option<SmolStr>,
        uncap: u32,
    },
}

impl RegexNode {
    /// A concat with zero children is `Empty`, with one child the child
    /// itself.
    pub fn concat(mut children: Vec<RegexNode>) -> RegexNode {
        match children.len() {
            0 => RegexNode::Empty,
            1 => children.pop().unwrap(),
            _ => RegexNode::Concat(children),
        }
    }
}
