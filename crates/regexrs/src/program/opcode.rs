// VM instruction set
// Jump operands are absolute instruction indexes. `NONE` marks "no
// target": for LookAccept/LookFail it selects failure propagation
// instead of a jump.

use crate::syntax::ast::AnchorKind;

/// Sentinel for "no jump target".
pub const NONE: u32 = u32::MAX;

/// Unbounded loop maximum.
pub const UNBOUNDED: u32 = u32::MAX;

#[derive(Debug, Clone, PartialEq)]
pub enum Inst {
    /// Consume one char equal to the operand.
    Char(char),
    /// Consume one char whose folding equals the operand (pre-folded).
    CharCi(char),
    /// Consume a literal run, in reading order.
    Lit(Box<[char]>),
    /// Case-folded literal run (operand pre-folded).
    LitCi(Box<[char]>),
    /// Consume one char contained in the indexed class.
    Class(u16),
    /// Choice point: continue at the next instruction, backtrack to `alt`.
    Split { alt: u32 },
    Jump(u32),
    /// Push a fresh loop frame (count 0).
    LoopInit,
    /// Counted-loop decision point. `take`/`leave` are the backtrack
    /// stubs for one-more-iteration (lazy) and leave-loop (greedy).
    LoopBranch {
        min: u32,
        max: u32,
        greedy: bool,
        body: u32,
        exit: u32,
        take: u32,
        leave: u32,
    },
    /// Backtrack target: take one more lazy iteration.
    LoopTake { body: u32 },
    /// Backtrack target: pop the loop frame and leave.
    LoopLeave { exit: u32 },
    /// Record the cursor as the pending start of `group`.
    CapOpen(u32),
    /// Close the pending start of `group` into a capture span.
    CapClose(u32),
    /// Push the cursor onto the mark stack (balancing-group start).
    MarkPush,
    /// Balancing close: pop the last capture of `uncap`; when `group`
    /// is not NONE, capture the transferred interval into it. Fails
    /// when `uncap` has no capture.
    CapBalance { group: u32, uncap: u32 },
    /// Consume input equal to the last capture of `group`.
    Backref { group: u32, fold: bool },
    /// Zero-width test: jump to `no` when `group` never captured.
    TestRef { group: u32, no: u32 },
    /// Open a lookaround region; `fail` is its LookFail stub, pushed as
    /// a barrier backtrack record.
    LookOpen { behind: bool, fail: u32 },
    /// Region child matched. Positive: commit and jump `exit`.
    /// Negative: discard the region and jump `on_negate`, or fail when
    /// it is NONE.
    LookAccept { negate: bool, exit: u32, on_negate: u32 },
    /// Region child failed (reached by backtracking into the barrier).
    /// Jump `target`, or propagate the failure when it is NONE.
    LookFail { target: u32 },
    /// Remember the backtrack depth; AtomicClose discards records
    /// pushed since, committing the region.
    AtomicOpen,
    AtomicClose,
    /// Zero-width position assertion.
    Assert(AnchorKind),
    /// Match found.
    Accept,
}

impl std::fmt::Display for Inst {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fn run(chars: &[char]) -> String {
            chars.iter().collect()
        }
        match self {
            Inst::Char(c) => write!(f, "char {c:?}"),
            Inst::CharCi(c) => write!(f, "char-ci {c:?}"),
            Inst::Lit(chars) => write!(f, "lit {:?}", run(chars)),
            Inst::LitCi(chars) => write!(f, "lit-ci {:?}", run(chars)),
            Inst::Class(i) => write!(f, "class #{i}"),
            Inst::Split { alt } => write!(f, "split alt={alt}"),
            Inst::Jump(t) => write!(f, "jump {t}"),
            Inst::LoopInit => write!(f, "loop-init"),
            Inst::LoopBranch {
                min,
                max,
                greedy,
                body,
                exit,
                ..
            } => {
                let max: &dyn std::fmt::Display =
                    if *max == UNBOUNDED { &"inf" } else { max };
                let kind = if *greedy { "greedy" } else { "lazy" };
                write!(f, "loop-branch {kind} {{{min},{max}}} body={body} exit={exit}")
            }
            Inst::LoopTake { body } => write!(f, "loop-take body={body}"),
            Inst::LoopLeave { exit } => write!(f, "loop-leave exit={exit}"),
            Inst::CapOpen(g) => write!(f, "cap-open {g}"),
            Inst::CapClose(g) => write!(f, "cap-close {g}"),
            Inst::MarkPush => write!(f, "mark-push"),
            Inst::CapBalance { group, uncap } => {
                write!(f, "cap-balance group={group} uncap={uncap}")
            }
            Inst::Backref { group, fold } => {
                write!(f, "backref {group}{}", if *fold { " ci" } else { "" })
            }
            Inst::TestRef { group, no } => write!(f, "test-ref {group} no={no}"),
            Inst::LookOpen { behind, fail } => {
                write!(f, "look-open{} fail={fail}", if *behind { " behind" } else { "" })
            }
            Inst::LookAccept {
                negate,
                exit,
                on_negate,
            } => write!(
                f,
                "look-accept{} exit={exit} on-negate={on_negate}",
                if *negate { " neg" } else { "" }
            ),
            Inst::LookFail { target } => write!(f, "look-fail target={target}"),
            Inst::AtomicOpen => write!(f, "atomic-open"),
            Inst::AtomicClose => write!(f, "atomic-close"),
            Inst::Assert(kind) => write!(f, "assert {kind:?}"),
            Inst::Accept => write!(f, "accept"),
        }
    }
}
