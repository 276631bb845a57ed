// Compiled program: instruction stream, class table, group metadata and
// the scan prefilters derived by the analyzer.

mod compiler;
pub mod opcode;

pub use opcode::{Inst, NONE, UNBOUNDED};

use ahash::AHashMap;
use smol_str::SmolStr;

use crate::charclass::CompiledClass;
use crate::options::RegexOptions;
use crate::syntax::ast::AnchorKind;
use crate::syntax::error::PatternError;
use crate::syntax::{parse, reducer};

#[derive(Debug)]
pub struct Program {
    pub insts: Vec<Inst>,
    pub classes: Vec<CompiledClass>,
    /// Capture slots, including slot 0.
    pub group_count: u32,
    pub names: AHashMap<SmolStr, u32>,
    pub rtl: bool,
    /// Conservative class of chars a match can start with.
    pub first: Option<CompiledClass>,
    /// Anchor every match start must satisfy, when provable.
    pub anchor: Option<AnchorKind>,
    /// Minimum chars any match consumes.
    pub min_len: usize,
}

impl Program {
    /// Parse, reduce, analyze and lower a pattern. Options are assumed
    /// validated.
    pub fn compile(pattern: &str, options: RegexOptions) -> Result<Program, PatternError> {
        let (node, groups) = parse(pattern, options)?;
        let node = reducer::reduce(node);
        let rtl = options.contains(RegexOptions::RIGHT_TO_LEFT);
        let first = if rtl { None } else { reducer::compute_first(&node) };
        let anchor = if rtl { None } else { reducer::leading_anchor(&node) };
        let min_len = reducer::min_length(&node);
        Ok(compiler::lower(&node, groups, rtl, first, anchor, min_len))
    }

    /// Group names in slot order: numbered groups get their decimal
    /// name, named groups their declared one.
    pub fn group_names(&self) -> Vec<SmolStr> {
        let mut names: Vec<SmolStr> = Vec::with_capacity(self.group_count as usize);
        let mut buf = itoa::Buffer::new();
        for n in 0..self.group_count {
            names.push(SmolStr::new(buf.format(n)));
        }
        for (name, &n) in &self.names {
            names[n as usize] = name.clone();
        }
        names
    }

    /// Resolve a group name or decimal number to its slot.
    pub fn group_number(&self, name: &str) -> Option<u32> {
        if let Some(&n) = self.names.get(name) {
            return Some(n);
        }
        match name.parse::<u32>() {
            Ok(n) if n < self.group_count => Some(n),
            _ => None,
        }
    }

    /// Human-readable program listing.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        let mut buf = itoa::Buffer::new();
        for (i, inst) in self.insts.iter().enumerate() {
            let idx = buf.format(i);
            for _ in idx.len()..4 {
                out.push(' ');
            }
            out.push_str(idx);
            out.push_str(": ");
            out.push_str(&inst.to_string());
            out.push('\n');
        }
        for (i, class) in self.classes.iter().enumerate() {
            out.push_str(&format!("class #{i}: {} ranges\n", class.ranges().len()));
        }
        out
    }
}
