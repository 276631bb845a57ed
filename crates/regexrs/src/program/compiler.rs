// AST lowering
//
// Ordered choice compiles to Split chains, counted loops to a
// LoopInit/LoopBranch header with backtrack stubs, lookaround to an
// inline region between LookOpen and its stubs, atomic regions to
// AtomicOpen/AtomicClose. Right-to-left compilation reverses
// concatenation order; lookbehind children are always compiled
// right-to-left and lookahead children left-to-right, whatever the
// outer direction.
//
// Jump fix-ups go through `patch`; a patch that finds the wrong opcode
// is a lowering bug and panics.

use crate::charclass::CompiledClass;
use crate::program::opcode::{Inst, NONE, UNBOUNDED};
use crate::program::Program;
use crate::syntax::ast::{AnchorKind, CondTest, LoopKind, RegexNode};
use crate::syntax::parser::GroupMap;
use crate::unicode;

/// Small finite loops whose unrolled body stays under this many
/// instructions are flattened instead of counted.
const UNROLL_BUDGET: usize = 32;

pub fn lower(
    node: &RegexNode,
    groups: GroupMap,
    rtl: bool,
    first: Option<CompiledClass>,
    anchor: Option<AnchorKind>,
    min_len: usize,
) -> Program {
    let mut c = Compiler {
        insts: Vec::new(),
        classes: Vec::new(),
        group_count: groups.count,
    };
    c.emit(Inst::CapOpen(0));
    c.node(node, rtl);
    c.emit(Inst::CapClose(0));
    c.emit(Inst::Accept);
    Program {
        insts: c.insts,
        classes: c.classes,
        group_count: groups.count,
        names: groups.by_name,
        rtl,
        first,
        anchor,
        min_len,
    }
}

struct Compiler {
    insts: Vec<Inst>,
    classes: Vec<CompiledClass>,
    group_count: u32,
}

impl Compiler {
    fn emit(&mut self, inst: Inst) -> usize {
        self.insts.push(inst);
        self.insts.len() - 1
    }

    fn here(&self) -> u32 {
        self.insts.len() as u32
    }

    fn patch(&mut self, at: usize, f: impl FnOnce(&mut Inst)) {
        f(&mut self.insts[at]);
    }

    /// Index a class into the table, reusing structurally equal entries.
    fn class_index(&mut self, class: &CompiledClass) -> u16 {
        if let Some(i) = self.classes.iter().position(|c| c == class) {
            return i as u16;
        }
        assert!(self.classes.len() < u16::MAX as usize, "class table overflow");
        self.classes.push(class.clone());
        (self.classes.len() - 1) as u16
    }

    fn check_group(&self, number: u32) {
        assert!(
            number < self.group_count,
            "lowering produced group {number} outside the declared {}",
            self.group_count
        );
    }

    fn node(&mut self, node: &RegexNode, rtl: bool) {
        match node {
            RegexNode::Empty => {}
            RegexNode::Literal { chars, fold } => self.literal(chars, *fold),
            RegexNode::Class(class) => {
                let idx = self.class_index(class);
                self.emit(Inst::Class(idx));
            }
            RegexNode::Concat(children) => {
                if rtl {
                    for child in children.iter().rev() {
                        self.node(child, rtl);
                    }
                } else {
                    for child in children {
                        self.node(child, rtl);
                    }
                }
            }
            RegexNode::Alternation(branches) => self.alternation(branches, rtl),
            RegexNode::Loop {
                child,
                min,
                max,
                kind,
            } => self.repeat(child, *min, *max, *kind, rtl),
            RegexNode::Capture { child, number, .. } => {
                self.check_group(*number);
                self.emit(Inst::CapOpen(*number));
                self.node(child, rtl);
                self.emit(Inst::CapClose(*number));
            }
            RegexNode::Group(child) => self.node(child, rtl),
            RegexNode::Atomic(child) => {
                self.emit(Inst::AtomicOpen);
                self.node(child, rtl);
                self.emit(Inst::AtomicClose);
            }
            RegexNode::Anchor(kind) => {
                self.emit(Inst::Assert(*kind));
            }
            RegexNode::Backref { group, fold } => {
                self.check_group(*group);
                self.emit(Inst::Backref {
                    group: *group,
                    fold: *fold,
                });
            }
            RegexNode::Look {
                child,
                behind,
                negate,
            } => {
                let open = self.emit(Inst::LookOpen {
                    behind: *behind,
                    fail: NONE,
                });
                self.node(child, *behind);
                let accept = self.emit(Inst::LookAccept {
                    negate: *negate,
                    exit: NONE,
                    on_negate: NONE,
                });
                let fail = self.emit(Inst::LookFail { target: NONE });
                let end = self.here();
                self.patch(open, |i| match i {
                    Inst::LookOpen { fail: f, .. } => *f = fail as u32,
                    _ => unreachable!(),
                });
                self.patch(accept, |i| match i {
                    Inst::LookAccept { exit, .. } => *exit = end,
                    _ => unreachable!(),
                });
                if *negate {
                    self.patch(fail, |i| match i {
                        Inst::LookFail { target } => *target = end,
                        _ => unreachable!(),
                    });
                }
            }
            RegexNode::Conditional { test, yes, no } => self.conditional(test, yes, no, rtl),
            RegexNode::Balancing {
                child,
                number,
                uncap,
                ..
            } => {
                self.check_group(*uncap);
                self.emit(Inst::MarkPush);
                self.node(child, rtl);
                if let Some(n) = number {
                    self.check_group(*n);
                }
                self.emit(Inst::CapBalance {
                    group: number.unwrap_or(NONE),
                    uncap: *uncap,
                });
            }
        }
    }

    fn literal(&mut self, chars: &[char], fold: bool) {
        match (chars.len(), fold) {
            (0, _) => {}
            (1, false) => {
                self.emit(Inst::Char(chars[0]));
            }
            (1, true) => {
                self.emit(Inst::CharCi(unicode::fold(chars[0])));
            }
            (_, false) => {
                self.emit(Inst::Lit(chars.to_vec().into_boxed_slice()));
            }
            (_, true) => {
                let folded: Vec<char> = chars.iter().map(|&c| unicode::fold(c)).collect();
                self.emit(Inst::LitCi(folded.into_boxed_slice()));
            }
        }
    }

    fn alternation(&mut self, branches: &[RegexNode], rtl: bool) {
        let mut joins = Vec::with_capacity(branches.len());
        for (i, branch) in branches.iter().enumerate() {
            if i + 1 < branches.len() {
                let split = self.emit(Inst::Split { alt: NONE });
                self.node(branch, rtl);
                joins.push(self.emit(Inst::Jump(NONE)));
                let alt = self.here();
                self.patch(split, |inst| match inst {
                    Inst::Split { alt: a } => *a = alt,
                    _ => unreachable!(),
                });
            } else {
                self.node(branch, rtl);
            }
        }
        let end = self.here();
        for at in joins {
            self.patch(at, |inst| match inst {
                Inst::Jump(t) => *t = end,
                _ => unreachable!(),
            });
        }
    }

    fn repeat(
        &mut self,
        child: &RegexNode,
        min: u32,
        max: Option<u32>,
        kind: LoopKind,
        rtl: bool,
    ) {
        if kind == LoopKind::Possessive {
            self.emit(Inst::AtomicOpen);
            self.repeat(child, min, max, LoopKind::Greedy, rtl);
            self.emit(Inst::AtomicClose);
            return;
        }

        // small finite loops unroll into mandatory copies plus a chain
        // of optional tails
        if let Some(m) = max
            && (kind == LoopKind::Greedy || min == m)
            && (m as usize).saturating_mul(emitted_size(child)) <= UNROLL_BUDGET
        {
            for _ in 0..min {
                self.node(child, rtl);
            }
            let mut splits = Vec::new();
            for _ in min..m {
                splits.push(self.emit(Inst::Split { alt: NONE }));
                self.node(child, rtl);
            }
            let end = self.here();
            for at in splits {
                self.patch(at, |inst| match inst {
                    Inst::Split { alt } => *alt = end,
                    _ => unreachable!(),
                });
            }
            return;
        }

        let greedy = kind == LoopKind::Greedy;
        self.emit(Inst::LoopInit);
        let branch = self.emit(Inst::LoopBranch {
            min,
            max: max.unwrap_or(UNBOUNDED),
            greedy,
            body: NONE,
            exit: NONE,
            take: NONE,
            leave: NONE,
        });
        let body = self.here();
        self.node(child, rtl);
        self.emit(Inst::Jump(branch as u32));
        let take = self.emit(Inst::LoopTake { body });
        let leave = self.emit(Inst::LoopLeave { exit: NONE });
        let exit = self.here();
        self.patch(branch, |inst| match inst {
            Inst::LoopBranch {
                body: b,
                exit: e,
                take: t,
                leave: l,
                ..
            } => {
                *b = body;
                *e = exit;
                *t = take as u32;
                *l = leave as u32;
            }
            _ => unreachable!(),
        });
        self.patch(leave, |inst| match inst {
            Inst::LoopLeave { exit: e } => *e = exit,
            _ => unreachable!(),
        });
    }

    fn conditional(
        &mut self,
        test: &CondTest,
        yes: &RegexNode,
        no: &RegexNode,
        rtl: bool,
    ) {
        match test {
            CondTest::Group(number) => {
                self.check_group(*number);
                let t = self.emit(Inst::TestRef {
                    group: *number,
                    no: NONE,
                });
                self.node(yes, rtl);
                let join = self.emit(Inst::Jump(NONE));
                let no_start = self.here();
                self.node(no, rtl);
                let end = self.here();
                self.patch(t, |inst| match inst {
                    Inst::TestRef { no, .. } => *no = no_start,
                    _ => unreachable!(),
                });
                self.patch(join, |inst| match inst {
                    Inst::Jump(t) => *t = end,
                    _ => unreachable!(),
                });
            }
            CondTest::Look(look) => {
                let RegexNode::Look {
                    child,
                    behind,
                    negate,
                } = look.as_ref()
                else {
                    unreachable!("conditional test is always a lookaround");
                };
                let open = self.emit(Inst::LookOpen {
                    behind: *behind,
                    fail: NONE,
                });
                self.node(child, *behind);
                let accept = self.emit(Inst::LookAccept {
                    negate: *negate,
                    exit: NONE,
                    on_negate: NONE,
                });
                let fail = self.emit(Inst::LookFail { target: NONE });
                let yes_start = self.here();
                self.node(yes, rtl);
                let join = self.emit(Inst::Jump(NONE));
                let no_start = self.here();
                self.node(no, rtl);
                let end = self.here();

                self.patch(open, |inst| match inst {
                    Inst::LookOpen { fail: f, .. } => *f = fail as u32,
                    _ => unreachable!(),
                });
                self.patch(accept, |inst| match inst {
                    Inst::LookAccept {
                        exit, on_negate, ..
                    } => {
                        *exit = yes_start;
                        *on_negate = no_start;
                    }
                    _ => unreachable!(),
                });
                let fail_target = if *negate { yes_start } else { no_start };
                self.patch(fail, |inst| match inst {
                    Inst::LookFail { target } => *target = fail_target,
                    _ => unreachable!(),
                });
                self.patch(join, |inst| match inst {
                    Inst::Jump(t) => *t = end,
                    _ => unreachable!(),
                });
            }
        }
    }
}

/// Rough emitted-instruction count, used only by the unroll budget.
fn emitted_size(node: &RegexNode) -> usize {
    match node {
        RegexNode::Empty => 0,
        RegexNode::Literal { .. } | RegexNode::Class(_) | RegexNode::Anchor(_) => 1,
        RegexNode::Backref { .. } => 1,
        RegexNode::Concat(children) => children.iter().map(emitted_size).sum(),
        RegexNode::Alternation(branches) => {
            branches.iter().map(emitted_size).sum::<usize>() + 2 * branches.len()
        }
        RegexNode::Loop { child, .. } => emitted_size(child) + 6,
        RegexNode::Capture { child, .. } | RegexNode::Balancing { child, .. } => {
            emitted_size(child) + 2
        }
        RegexNode::Group(child) => emitted_size(child),
        RegexNode::Atomic(child) => emitted_size(child) + 2,
        RegexNode::Look { child, .. } => emitted_size(child) + 3,
        RegexNode::Conditional { yes, no, .. } => emitted_size(yes) + emitted_size(no) + 4,
    }
}
