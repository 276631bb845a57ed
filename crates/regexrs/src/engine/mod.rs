// Backtracking execution engine
//
// One iterative dispatch loop over the compiled program. Choice points
// push (resume ip, cursor, journal mark) records onto an explicit heap
// stack; failure pops the newest record and rewinds the journal. There
// is no recursion anywhere, so pathological nesting depth is bounded by
// the configured backtrack limit, not the call stack.
//
// The deadline is polled once per `TIMEOUT_POLL_MASK + 1` executed
// instructions and aborts the attempt with a timeout, which callers
// must keep distinguishable from an ordinary failed attempt.

mod state;

use std::time::{Duration, Instant};

use crate::program::opcode::{Inst, NONE};
use crate::program::Program;
use crate::syntax::ast::AnchorKind;
use crate::unicode;
use state::{Backtrack, ExecutionState, LookFrame, LoopFrame};

/// Deadline poll interval mask; checked when `(executed & mask) == 0`.
const TIMEOUT_POLL_MASK: u64 = 1023;

/// Default cap on simultaneously live backtrack records.
pub const DEFAULT_BACKTRACK_LIMIT: usize = 1 << 21;

/// Match-time abort. Distinct from both "no match" and a rejected
/// pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchError {
    /// The configured deadline elapsed before the attempt resolved.
    Timeout(Duration),
    /// The backtrack stack outgrew the configured limit.
    BacktrackLimit(usize),
}

impl std::fmt::Display for MatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchError::Timeout(limit) => {
                write!(f, "match attempt exceeded its {limit:?} timeout")
            }
            MatchError::BacktrackLimit(limit) => {
                write!(f, "match attempt exceeded {limit} backtrack records")
            }
        }
    }
}

impl std::error::Error for MatchError {}

/// Capture spans per group at the accepting state, in push order.
#[derive(Debug, Clone)]
pub struct MatchSnapshot {
    pub spans: Vec<Vec<(usize, usize)>>,
}

pub struct Engine<'a> {
    prog: &'a Program,
    input: &'a [char],
    timeout: Option<Duration>,
    backtrack_limit: usize,
}

impl<'a> Engine<'a> {
    pub fn new(
        prog: &'a Program,
        input: &'a [char],
        timeout: Option<Duration>,
        backtrack_limit: usize,
    ) -> Engine<'a> {
        Engine {
            prog,
            input,
            timeout,
            backtrack_limit,
        }
    }

    /// Run one attempt anchored at `start`. `scan_start` is where the
    /// enclosing find operation began, for `\G`.
    pub fn run(
        &self,
        start: usize,
        scan_start: usize,
    ) -> Result<Option<MatchSnapshot>, MatchError> {
        let mut st = ExecutionState::new(self.prog.group_count);
        let deadline = self.timeout.map(|t| (Instant::now() + t, t));
        let insts = &self.prog.insts;

        let mut ip: u32 = 0;
        let mut pos = start;
        let mut executed: u64 = 0;

        macro_rules! fail {
            () => {
                match st.backtrack() {
                    Some((r_ip, r_pos)) => {
                        ip = r_ip;
                        pos = r_pos;
                        continue;
                    }
                    None => return Ok(None),
                }
            };
        }

        loop {
            executed += 1;
            if executed & TIMEOUT_POLL_MASK == 0
                && let Some((at, limit)) = deadline
                && Instant::now() >= at
            {
                return Err(MatchError::Timeout(limit));
            }

            let rtl = st.looks.last().map(|f| f.rtl).unwrap_or(self.prog.rtl);
            match &insts[ip as usize] {
                Inst::Char(c) => {
                    match self.next_char(pos, rtl) {
                        Some(ch) if ch == *c => pos = step(pos, 1, rtl),
                        _ => fail!(),
                    }
                    ip += 1;
                }
                Inst::CharCi(c) => {
                    match self.next_char(pos, rtl) {
                        Some(ch) if unicode::fold(ch) == *c => pos = step(pos, 1, rtl),
                        _ => fail!(),
                    }
                    ip += 1;
                }
                Inst::Lit(run) => {
                    if !self.match_run(pos, run, false, rtl) {
                        fail!();
                    }
                    pos = step(pos, run.len(), rtl);
                    ip += 1;
                }
                Inst::LitCi(run) => {
                    if !self.match_run(pos, run, true, rtl) {
                        fail!();
                    }
                    pos = step(pos, run.len(), rtl);
                    ip += 1;
                }
                Inst::Class(idx) => {
                    let class = &self.prog.classes[*idx as usize];
                    match self.next_char(pos, rtl) {
                        Some(ch) if class.contains(ch) => pos = step(pos, 1, rtl),
                        _ => fail!(),
                    }
                    ip += 1;
                }
                Inst::Split { alt } => {
                    self.push_bt(&mut st, *alt, pos)?;
                    ip += 1;
                }
                Inst::Jump(target) => ip = *target,
                Inst::LoopInit => {
                    st.loops.push(LoopFrame {
                        count: 0,
                        last_pos: usize::MAX,
                    });
                    st.journal.push(state::Undo::LoopPushed);
                    ip += 1;
                }
                Inst::LoopBranch {
                    min,
                    max,
                    greedy,
                    body,
                    exit,
                    take,
                    leave,
                } => {
                    let frame = *st.loops.last().expect("loop frame");
                    let progressed = frame.last_pos != pos;
                    if frame.count < *min {
                        self.loop_step(&mut st, pos);
                        ip = *body;
                    } else if frame.count == *max || !progressed {
                        self.loop_pop(&mut st);
                        ip = *exit;
                    } else if *greedy {
                        self.push_bt(&mut st, *leave, pos)?;
                        self.loop_step(&mut st, pos);
                        ip = *body;
                    } else {
                        self.push_bt(&mut st, *take, pos)?;
                        self.loop_pop(&mut st);
                        ip = *exit;
                    }
                }
                Inst::LoopTake { body } => {
                    self.loop_step(&mut st, pos);
                    ip = *body;
                }
                Inst::LoopLeave { exit } => {
                    self.loop_pop(&mut st);
                    ip = *exit;
                }
                Inst::CapOpen(group) => {
                    st.open[*group as usize].push(pos);
                    st.journal.push(state::Undo::CapOpened(*group));
                    ip += 1;
                }
                Inst::CapClose(group) => {
                    let g = *group as usize;
                    let open_pos = st.open[g].pop().expect("unbalanced capture");
                    st.caps[g].push((open_pos.min(pos), open_pos.max(pos)));
                    st.journal.push(state::Undo::CapClosed {
                        group: *group,
                        open_pos,
                    });
                    ip += 1;
                }
                Inst::MarkPush => {
                    st.marks.push(pos);
                    st.journal.push(state::Undo::MarkPushed);
                    ip += 1;
                }
                Inst::CapBalance { group, uncap } => {
                    let u = *uncap as usize;
                    let Some(span2) = st.caps[u].pop() else { fail!() };
                    st.journal.push(state::Undo::CapPopped {
                        group: *uncap,
                        span: span2,
                    });
                    let mark = st.marks.pop().expect("unbalanced mark");
                    st.journal.push(state::Undo::MarkPopped(mark));
                    if *group != NONE {
                        let span = transfer_span((mark, pos), span2);
                        st.caps[*group as usize].push(span);
                        st.journal.push(state::Undo::CapBalanced(*group));
                    }
                    ip += 1;
                }
                Inst::Backref { group, fold } => {
                    let Some(&(lo, hi)) = st.caps[*group as usize].last() else {
                        fail!()
                    };
                    let len = hi - lo;
                    if !self.match_span(pos, lo, len, *fold, rtl) {
                        fail!();
                    }
                    pos = step(pos, len, rtl);
                    ip += 1;
                }
                Inst::TestRef { group, no } => {
                    if st.caps[*group as usize].is_empty() {
                        ip = *no;
                    } else {
                        ip += 1;
                    }
                }
                Inst::LookOpen { behind, fail } => {
                    let frame = LookFrame {
                        pos,
                        bt_depth: st.bt.len(),
                        mark: st.journal.len(),
                        rtl: *behind,
                    };
                    st.looks.push(frame);
                    st.journal.push(state::Undo::LookPushed);
                    self.push_bt(&mut st, *fail, pos)?;
                    ip += 1;
                }
                Inst::LookAccept {
                    negate,
                    exit,
                    on_negate,
                } => {
                    let frame = *st.looks.last().expect("look frame");
                    st.bt.truncate(frame.bt_depth);
                    if !*negate {
                        pos = frame.pos;
                        st.looks.pop();
                        st.journal.push(state::Undo::LookPopped(frame));
                        ip = *exit;
                    } else {
                        // the region succeeded, so the negative
                        // assertion fails: discard its side effects
                        st.rewind(frame.mark);
                        pos = frame.pos;
                        if *on_negate == NONE {
                            fail!();
                        }
                        ip = *on_negate;
                    }
                }
                Inst::LookFail { target } => {
                    let frame = *st.looks.last().expect("look frame");
                    st.rewind(frame.mark);
                    pos = frame.pos;
                    if *target == NONE {
                        fail!();
                    }
                    ip = *target;
                }
                Inst::AtomicOpen => {
                    st.atomics.push(st.bt.len());
                    st.journal.push(state::Undo::AtomicPushed);
                    ip += 1;
                }
                Inst::AtomicClose => {
                    let depth = st.atomics.pop().expect("unbalanced atomic");
                    st.journal.push(state::Undo::AtomicPopped(depth));
                    st.bt.truncate(depth);
                    ip += 1;
                }
                Inst::Assert(kind) => {
                    if !self.assert(*kind, pos, scan_start) {
                        fail!();
                    }
                    ip += 1;
                }
                Inst::Accept => {
                    return Ok(Some(MatchSnapshot {
                        spans: st.caps.clone(),
                    }));
                }
            }
        }
    }

    fn push_bt(
        &self,
        st: &mut ExecutionState,
        ip: u32,
        pos: usize,
    ) -> Result<(), MatchError> {
        if st.bt.len() >= self.backtrack_limit {
            return Err(MatchError::BacktrackLimit(self.backtrack_limit));
        }
        st.bt.push(Backtrack {
            ip,
            pos,
            mark: st.journal.len(),
        });
        Ok(())
    }

    fn loop_step(&self, st: &mut ExecutionState, pos: usize) {
        let frame = *st.loops.last().expect("loop frame");
        st.journal.push(state::Undo::LoopStepped {
            count: frame.count,
            last_pos: frame.last_pos,
        });
        let top = st.loops.last_mut().unwrap();
        top.count += 1;
        top.last_pos = pos;
    }

    fn loop_pop(&self, st: &mut ExecutionState) {
        let frame = st.loops.pop().expect("loop frame");
        st.journal.push(state::Undo::LoopPopped(frame));
    }

    /// Next consumable char at `pos` in the current direction.
    #[inline]
    fn next_char(&self, pos: usize, rtl: bool) -> Option<char> {
        if rtl {
            if pos == 0 { None } else { Some(self.input[pos - 1]) }
        } else {
            self.input.get(pos).copied()
        }
    }

    /// Compare a literal run against the input at `pos`. Runs are
    /// stored in reading order; right-to-left matches the text that
    /// ends at `pos`.
    fn match_run(&self, pos: usize, run: &[char], fold: bool, rtl: bool) -> bool {
        let Some(window) = self.window(pos, run.len(), rtl) else {
            return false;
        };
        if fold {
            window
                .iter()
                .zip(run)
                .all(|(&a, &b)| unicode::fold(a) == b)
        } else {
            window == run
        }
    }

    /// Compare input at `pos` against the already-matched span starting
    /// at `lo`.
    fn match_span(&self, pos: usize, lo: usize, len: usize, fold: bool, rtl: bool) -> bool {
        let Some(window) = self.window(pos, len, rtl) else {
            return false;
        };
        let span = &self.input[lo..lo + len];
        if fold {
            window
                .iter()
                .zip(span)
                .all(|(&a, &b)| unicode::fold(a) == unicode::fold(b))
        } else {
            window == span
        }
    }

    fn window(&self, pos: usize, len: usize, rtl: bool) -> Option<&[char]> {
        if rtl {
            (pos >= len).then(|| &self.input[pos - len..pos])
        } else {
            (pos + len <= self.input.len()).then(|| &self.input[pos..pos + len])
        }
    }

    fn assert(&self, kind: AnchorKind, pos: usize, scan_start: usize) -> bool {
        let len = self.input.len();
        match kind {
            AnchorKind::BeginningOfString => pos == 0,
            AnchorKind::StartOfLine => pos == 0 || self.input[pos - 1] == '\n',
            AnchorKind::EndOfLine => pos == len || self.input[pos] == '\n',
            AnchorKind::EndOfStringOrNewline => {
                pos == len || (pos + 1 == len && self.input[pos] == '\n')
            }
            AnchorKind::EndOfString => pos == len,
            AnchorKind::StartOfMatch => pos == scan_start,
            AnchorKind::WordBoundary => self.word_boundary(pos),
            AnchorKind::NonWordBoundary => !self.word_boundary(pos),
        }
    }

    fn word_boundary(&self, pos: usize) -> bool {
        let before = pos > 0 && unicode::is_word(self.input[pos - 1]);
        let after = pos < self.input.len() && unicode::is_word(self.input[pos]);
        before != after
    }
}

#[inline]
fn step(pos: usize, n: usize, rtl: bool) -> usize {
    if rtl { pos - n } else { pos + n }
}

/// Interval a balancing group captures: the innermost interval between
/// the popped capture and the current group's extent.
fn transfer_span(current: (usize, usize), popped: (usize, usize)) -> (usize, usize) {
    let (s1, e1) = (current.0.min(current.1), current.0.max(current.1));
    let (s2, e2) = popped;
    if s1 >= e2 {
        (e2, s1)
    } else if e1 <= s2 {
        (e1, s2)
    } else {
        let lo = s1.max(s2);
        let hi = e1.min(e2);
        (lo.min(hi), lo.max(hi))
    }
}
