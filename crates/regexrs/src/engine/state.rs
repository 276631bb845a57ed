// Per-attempt execution state
//
// All auxiliary stacks (captures, marks, loop frames, look frames,
// atomic marks) record their mutations in one undo journal. A
// backtrack record is (resume ip, cursor, journal mark); popping it
// rewinds the journal LIFO, which restores every stack exactly.

/// Counter frame of one active counted loop.
#[derive(Debug, Clone, Copy)]
pub(crate) struct LoopFrame {
    pub count: u32,
    /// Cursor at the start of the latest iteration; `usize::MAX` before
    /// the first one. Equal cursor means the iteration consumed nothing.
    pub last_pos: usize,
}

/// One active lookaround region.
#[derive(Debug, Clone, Copy)]
pub(crate) struct LookFrame {
    /// Cursor to restore when the region resolves.
    pub pos: usize,
    /// Backtrack depth before the region's barrier record.
    pub bt_depth: usize,
    /// Journal length before the frame was pushed.
    pub mark: usize,
    /// Direction inside the region.
    pub rtl: bool,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Backtrack {
    pub ip: u32,
    pub pos: usize,
    pub mark: usize,
}

#[derive(Debug)]
pub(crate) enum Undo {
    CapOpened(u32),
    CapClosed { group: u32, open_pos: usize },
    /// A balancing transfer capture; no pending start to restore.
    CapBalanced(u32),
    CapPopped { group: u32, span: (usize, usize) },
    MarkPushed,
    MarkPopped(usize),
    LoopPushed,
    LoopStepped { count: u32, last_pos: usize },
    LoopPopped(LoopFrame),
    LookPushed,
    LookPopped(LookFrame),
    AtomicPushed,
    AtomicPopped(usize),
}

#[derive(Debug)]
pub(crate) struct ExecutionState {
    /// Pending capture starts, one stack per group.
    pub open: Vec<Vec<usize>>,
    /// Closed capture spans per group, in the order they were pushed.
    pub caps: Vec<Vec<(usize, usize)>>,
    /// Balancing-group start marks.
    pub marks: Vec<usize>,
    pub loops: Vec<LoopFrame>,
    pub looks: Vec<LookFrame>,
    pub atomics: Vec<usize>,
    pub bt: Vec<Backtrack>,
    pub journal: Vec<Undo>,
}

impl ExecutionState {
    pub fn new(group_count: u32) -> ExecutionState {
        let n = group_count as usize;
        ExecutionState {
            open: vec![Vec::new(); n],
            caps: vec![Vec::new(); n],
            marks: Vec::new(),
            loops: Vec::new(),
            looks: Vec::new(),
            atomics: Vec::new(),
            bt: Vec::new(),
            journal: Vec::new(),
        }
    }

    /// Undo every journaled mutation past `mark`.
    pub fn rewind(&mut self, mark: usize) {
        while self.journal.len() > mark {
            match self.journal.pop().unwrap() {
                Undo::CapOpened(g) => {
                    self.open[g as usize].pop();
                }
                Undo::CapClosed { group, open_pos } => {
                    self.caps[group as usize].pop();
                    self.open[group as usize].push(open_pos);
                }
                Undo::CapBalanced(g) => {
                    self.caps[g as usize].pop();
                }
                Undo::CapPopped { group, span } => {
                    self.caps[group as usize].push(span);
                }
                Undo::MarkPushed => {
                    self.marks.pop();
                }
                Undo::MarkPopped(pos) => {
                    self.marks.push(pos);
                }
                Undo::LoopPushed => {
                    self.loops.pop();
                }
                Undo::LoopStepped { count, last_pos } => {
                    let top = self.loops.last_mut().unwrap();
                    top.count = count;
                    top.last_pos = last_pos;
                }
                Undo::LoopPopped(frame) => {
                    self.loops.push(frame);
                }
                Undo::LookPushed => {
                    self.looks.pop();
                }
                Undo::LookPopped(frame) => {
                    self.looks.push(frame);
                }
                Undo::AtomicPushed => {
                    self.atomics.pop();
                }
                Undo::AtomicPopped(depth) => {
                    self.atomics.push(depth);
                }
            }
        }
    }

    /// Pop one backtrack record and restore its state. `None` when the
    /// stack is exhausted (the attempt fails).
    pub fn backtrack(&mut self) -> Option<(u32, usize)> {
        let record = self.bt.pop()?;
        self.rewind(record.mark);
        Some((record.ip, record.pos))
    }
}
