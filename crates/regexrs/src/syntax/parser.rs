// Recursive-descent pattern parser
//
// Two passes over the pattern, the way the original engine counts
// captures before scanning: a light pre-scan assigns every capturing
// group its number (unnamed groups first, then named ones), and the main
// descent builds the tree. The pre-scan is what lets `\12` be resolved
// as backreference-or-octal from the number of groups declared to its
// left, and lets `\k<name>` and conditionals reference groups declared
// later.

use ahash::{AHashMap, AHashSet};
use smol_str::SmolStr;

use crate::charclass::ClassSpec;
use crate::options::RegexOptions;
use crate::syntax::ast::{AnchorKind, CondTest, LoopKind, RegexNode};
use crate::syntax::error::{PatternError, PatternErrorKind};
use crate::unicode::CategoryClass;

/// Capture-group metadata shared by the compiler and the result model.
#[derive(Debug, Clone, Default)]
pub struct GroupMap {
    /// Capture slots, including slot 0 for the overall match.
    pub count: u32,
    pub by_name: AHashMap<SmolStr, u32>,
}

pub fn parse(
    pattern: &str,
    options: RegexOptions,
) -> Result<(RegexNode, GroupMap), PatternError> {
    let chars: Vec<char> = pattern.chars().collect();
    let scan = pre_scan(&chars, options);
    let mut parser = Parser {
        chars,
        pos: 0,
        options,
        scan,
    };
    let node = parser.parse_alternation()?;
    if parser.pos < parser.chars.len() {
        // the descent only ever stops early on a stray ')'
        return Err(PatternError::new(
            PatternErrorKind::UnbalancedParenthesis,
            parser.pos,
        ));
    }
    let map = GroupMap {
        count: parser.scan.count,
        by_name: std::mem::take(&mut parser.scan.by_name),
    };
    Ok((node, map))
}

// ---------------------------------------------------------------------
// pre-scan
// ---------------------------------------------------------------------

#[derive(Debug)]
enum Decl {
    Unnamed,
    Named(SmolStr),
    Numbered(u32),
}

#[derive(Debug, Default)]
struct ScanInfo {
    /// '(' offset of a capturing group -> its assigned number.
    by_offset: AHashMap<usize, u32>,
    by_name: AHashMap<SmolStr, u32>,
    /// group number -> earliest declaration offset.
    declared_at: AHashMap<u32, usize>,
    /// offsets of every capturing declaration, ascending.
    decl_offsets: Vec<usize>,
    count: u32,
}

fn is_flag_char(c: char) -> bool {
    matches!(c, 'i' | 'm' | 'n' | 's' | 'x' | '-')
}

/// Locate every capturing-group declaration and assign numbers. Purely
/// structural; anything malformed is left for the main descent to
/// reject with a precise offset.
fn pre_scan(chars: &[char], options: RegexOptions) -> ScanInfo {
    let mut decls: Vec<(usize, Decl)> = Vec::new();
    let mut explicit = options.contains(RegexOptions::EXPLICIT_CAPTURE);
    let mut scope: Vec<bool> = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '\\' => i += 2,
            '[' => i = skip_class(chars, i),
            ')' => {
                if let Some(prev) = scope.pop() {
                    explicit = prev;
                }
                i += 1;
            }
            '(' if chars.get(i + 1) == Some(&'?') => match chars.get(i + 2) {
                Some(':') | Some('=') | Some('!') | Some('>') => {
                    scope.push(explicit);
                    i += 3;
                }
                Some('#') => {
                    while i < chars.len() && chars[i] != ')' {
                        i += 1;
                    }
                    i += 1;
                }
                Some('(') => {
                    scope.push(explicit);
                    i += 3;
                    if chars.get(i) != Some(&'?') {
                        // name/number condition, consume through its ')'
                        while i < chars.len() && chars[i] != ')' {
                            i += 1;
                        }
                        i += 1;
                    }
                }
                Some('<') | Some('\'') => {
                    let quote = chars[i + 2];
                    if quote == '<' && matches!(chars.get(i + 3), Some('=') | Some('!')) {
                        scope.push(explicit);
                        i += 4;
                    } else {
                        let term = if quote == '<' { '>' } else { '\'' };
                        let mut j = i + 3;
                        let mut name = String::new();
                        while j < chars.len() && chars[j] != term && chars[j] != '-' {
                            name.push(chars[j]);
                            j += 1;
                        }
                        if !name.is_empty() {
                            decls.push((i, classify_name(&name)));
                        }
                        if chars.get(j) == Some(&'-') {
                            j += 1;
                            while j < chars.len() && chars[j] != term {
                                j += 1;
                            }
                        }
                        if j < chars.len() {
                            j += 1;
                        }
                        scope.push(explicit);
                        i = j;
                    }
                }
                Some(&c2) if is_flag_char(c2) => {
                    let mut j = i + 2;
                    let mut neg = false;
                    let mut new_explicit = explicit;
                    loop {
                        match chars.get(j) {
                            Some('-') => neg = true,
                            Some('n') => new_explicit = !neg,
                            Some(&f) if is_flag_char(f) => {}
                            Some(':') => {
                                scope.push(explicit);
                                explicit = new_explicit;
                                j += 1;
                                break;
                            }
                            Some(')') => {
                                explicit = new_explicit;
                                j += 1;
                                break;
                            }
                            _ => break,
                        }
                        j += 1;
                    }
                    i = j;
                }
                _ => i += 2,
            },
            '(' => {
                if !explicit {
                    decls.push((i, Decl::Unnamed));
                }
                scope.push(explicit);
                i += 1;
            }
            _ => i += 1,
        }
    }

    assign_numbers(decls)
}

fn classify_name(name: &str) -> Decl {
    if name.chars().all(|c| c.is_ascii_digit()) {
        match name.parse::<u32>() {
            Ok(n) if n > 0 => Decl::Numbered(n),
            _ => Decl::Named(SmolStr::new(name)), // 0 or overflow, rejected later
        }
    } else {
        Decl::Named(SmolStr::new(name))
    }
}

/// Skip a `[..]` set, honoring escapes. `[` is literal inside a set
/// unless it follows `-` (subtraction), which is the same rule the main
/// descent applies, so both passes agree on where a class ends.
fn skip_class(chars: &[char], start: usize) -> usize {
    let mut i = start + 1;
    let mut depth = 1usize;
    if chars.get(i) == Some(&'^') {
        i += 1;
    }
    let mut prev = '\0';
    while i < chars.len() && depth > 0 {
        let c = chars[i];
        match c {
            '\\' => {
                i += 2;
                prev = '\0';
                continue;
            }
            '[' if prev == '-' => depth += 1,
            ']' => depth -= 1,
            _ => {}
        }
        prev = c;
        i += 1;
    }
    i
}

fn assign_numbers(decls: Vec<(usize, Decl)>) -> ScanInfo {
    let mut info = ScanInfo::default();
    let unnamed = decls
        .iter()
        .filter(|(_, d)| matches!(d, Decl::Unnamed))
        .count() as u32;

    let mut taken: AHashSet<u32> = (1..=unnamed).collect();
    for (_, decl) in &decls {
        if let Decl::Numbered(n) = decl {
            taken.insert(*n);
        }
    }

    let mut next_unnamed = 1u32;
    let mut next_named = unnamed + 1;
    let mut max = 0u32;
    for (offset, decl) in decls {
        let number = match decl {
            Decl::Unnamed => {
                let n = next_unnamed;
                next_unnamed += 1;
                n
            }
            Decl::Numbered(n) => n,
            Decl::Named(name) => match info.by_name.get(&name) {
                Some(&n) => n,
                None => {
                    while taken.contains(&next_named) {
                        next_named += 1;
                    }
                    let n = next_named;
                    taken.insert(n);
                    info.by_name.insert(name, n);
                    n
                }
            },
        };
        max = max.max(number);
        info.by_offset.insert(offset, number);
        info.declared_at.entry(number).or_insert(offset);
        info.decl_offsets.push(offset);
    }
    info.count = max + 1;
    info
}

// ---------------------------------------------------------------------
// main descent
// ---------------------------------------------------------------------

struct Parser {
    chars: Vec<char>,
    pos: usize,
    /// Effective flags at the current position; inline groups mutate
    /// this and group exits restore it.
    options: RegexOptions,
    scan: ScanInfo,
}

/// One element while scanning a `[..]` body.
enum ClassElem {
    Char(char),
    Class(ClassSpec),
}

impl Parser {
    #[inline]
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    #[inline]
    fn peek_at(&self, pos: usize) -> Option<char> {
        self.chars.get(pos).copied()
    }

    #[inline]
    fn err<T>(&self, kind: PatternErrorKind, pos: usize) -> Result<T, PatternError> {
        Err(PatternError::new(kind, pos))
    }

    fn fold(&self) -> bool {
        self.options.contains(RegexOptions::IGNORE_CASE)
    }

    fn ecma(&self) -> bool {
        self.options.contains(RegexOptions::ECMA_SCRIPT)
    }

    fn skip_x_whitespace(&mut self) {
        if !self.options.contains(RegexOptions::IGNORE_PATTERN_WHITESPACE) {
            return;
        }
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.pos += 1;
            } else if c == '#' {
                while let Some(c) = self.peek()
                    && c != '\n'
                {
                    self.pos += 1;
                }
            } else {
                break;
            }
        }
    }

    fn parse_alternation(&mut self) -> Result<RegexNode, PatternError> {
        let mut branches = vec![self.parse_concat()?];
        while self.peek() == Some('|') {
            self.pos += 1;
            branches.push(self.parse_concat()?);
        }
        if branches.len() == 1 {
            Ok(branches.pop().unwrap())
        } else {
            Ok(RegexNode::Alternation(branches))
        }
    }

    fn parse_concat(&mut self) -> Result<RegexNode, PatternError> {
        let mut seq: Vec<RegexNode> = Vec::new();
        loop {
            self.skip_x_whitespace();
            let Some(c) = self.peek() else { break };
            match c {
                '|' | ')' => break,
                '*' | '+' | '?' => {
                    let qpos = self.pos;
                    self.pos += 1;
                    let (min, max) = match c {
                        '*' => (0, None),
                        '+' => (1, None),
                        _ => (0, Some(1)),
                    };
                    self.finish_quantifier(&mut seq, min, max, qpos)?;
                }
                '{' => {
                    let qpos = self.pos;
                    if let Some((min, max)) = self.try_scan_repetition()? {
                        self.finish_quantifier(&mut seq, min, max, qpos)?;
                    } else {
                        self.pos += 1;
                        seq.push(RegexNode::Literal {
                            chars: vec!['{'],
                            fold: self.fold(),
                        });
                    }
                }
                _ => {
                    if let Some(node) = self.parse_atom()? {
                        seq.push(node);
                    }
                }
            }
        }
        Ok(RegexNode::concat(seq))
    }

    /// Attach a quantifier to the most recent atom.
    fn finish_quantifier(
        &mut self,
        seq: &mut Vec<RegexNode>,
        min: u32,
        max: Option<u32>,
        qpos: usize,
    ) -> Result<(), PatternError> {
        self.skip_x_whitespace();
        let kind = match self.peek() {
            Some('?') => {
                self.pos += 1;
                LoopKind::Lazy
            }
            Some('+') => {
                self.pos += 1;
                LoopKind::Possessive
            }
            _ => LoopKind::Greedy,
        };
        let Some(target) = seq.pop() else {
            return self.err(PatternErrorKind::QuantifierWithoutOperand, qpos);
        };
        if matches!(target, RegexNode::Loop { .. }) {
            return self.err(PatternErrorKind::NestedQuantifier, qpos);
        }
        seq.push(RegexNode::Loop {
            child: Box::new(target),
            min,
            max,
            kind,
        });
        Ok(())
    }

    /// `{m}`, `{m,}` or `{m,n}` starting at `{`. Leaves the position
    /// untouched and returns None when the braces do not form a
    /// repetition, in which case `{` is an ordinary literal.
    fn try_scan_repetition(&mut self) -> Result<Option<(u32, Option<u32>)>, PatternError> {
        let start = self.pos;
        let mut i = self.pos + 1;
        let min = match self.scan_decimal_at(&mut i) {
            Some(v) => v,
            None => return Ok(None),
        };
        let max = match self.peek_at(i) {
            Some('}') => Some(min),
            Some(',') => {
                i += 1;
                match self.peek_at(i) {
                    Some('}') => None,
                    _ => match self.scan_decimal_at(&mut i) {
                        Some(v) => Some(v),
                        None => return Ok(None),
                    },
                }
            }
            _ => return Ok(None),
        };
        if self.peek_at(i) != Some('}') {
            return Ok(None);
        }
        if let Some(m) = max
            && m < min
        {
            return self.err(PatternErrorKind::InvalidQuantifierRange, start);
        }
        self.pos = i + 1;
        Ok(Some((min, max)))
    }

    fn scan_decimal_at(&self, i: &mut usize) -> Option<u32> {
        let mut v: u64 = 0;
        let start = *i;
        while let Some(c) = self.peek_at(*i)
            && c.is_ascii_digit()
        {
            v = (v * 10 + (c as u64 - '0' as u64)).min(u32::MAX as u64);
            *i += 1;
        }
        if *i == start { None } else { Some(v as u32) }
    }

    fn parse_atom(&mut self) -> Result<Option<RegexNode>, PatternError> {
        let c = self.peek().expect("caller checked");
        match c {
            '(' => self.parse_group(),
            '[' => {
                let mut spec = self.parse_class_spec()?;
                if self.fold() {
                    spec.case_fold();
                }
                Ok(Some(RegexNode::Class(spec.compile())))
            }
            '.' => {
                self.pos += 1;
                let singleline = self.options.contains(RegexOptions::SINGLELINE);
                Ok(Some(RegexNode::Class(ClassSpec::dot(singleline).compile())))
            }
            '^' => {
                self.pos += 1;
                let kind = if self.options.contains(RegexOptions::MULTILINE) {
                    AnchorKind::StartOfLine
                } else {
                    AnchorKind::BeginningOfString
                };
                Ok(Some(RegexNode::Anchor(kind)))
            }
            '$' => {
                self.pos += 1;
                let kind = if self.options.contains(RegexOptions::MULTILINE) {
                    AnchorKind::EndOfLine
                } else {
                    AnchorKind::EndOfStringOrNewline
                };
                Ok(Some(RegexNode::Anchor(kind)))
            }
            '\\' => self.parse_escape_atom(),
            _ => {
                self.pos += 1;
                Ok(Some(RegexNode::Literal {
                    chars: vec![c],
                    fold: self.fold(),
                }))
            }
        }
    }

    // ----- groups -----

    fn parse_group(&mut self) -> Result<Option<RegexNode>, PatternError> {
        let open = self.pos;
        self.pos += 1;
        if self.peek() != Some('?') {
            let number = if self.options.contains(RegexOptions::EXPLICIT_CAPTURE) {
                None
            } else {
                Some(self.group_number_at(open))
            };
            let child = self.parse_group_body(open)?;
            return Ok(Some(match number {
                Some(number) => RegexNode::Capture {
                    child: Box::new(child),
                    number,
                    name: None,
                },
                None => RegexNode::Group(Box::new(child)),
            }));
        }

        self.pos += 1; // past '?'
        match self.peek() {
            None => self.err(PatternErrorKind::UnterminatedGroup, open),
            Some(':') => {
                self.pos += 1;
                let child = self.parse_group_body(open)?;
                Ok(Some(RegexNode::Group(Box::new(child))))
            }
            Some('=') | Some('!') => {
                let negate = self.peek() == Some('!');
                self.pos += 1;
                let child = self.parse_group_body(open)?;
                Ok(Some(RegexNode::Look {
                    child: Box::new(child),
                    behind: false,
                    negate,
                }))
            }
            Some('>') => {
                self.pos += 1;
                let child = self.parse_group_body(open)?;
                Ok(Some(RegexNode::Atomic(Box::new(child))))
            }
            Some('#') => {
                while let Some(c) = self.peek() {
                    if c == ')' {
                        self.pos += 1;
                        return Ok(None);
                    }
                    self.pos += 1;
                }
                self.err(PatternErrorKind::UnterminatedGroup, open)
            }
            Some('(') => self.parse_conditional(open).map(Some),
            Some(q @ ('<' | '\'')) => {
                if q == '<' && matches!(self.peek_at(self.pos + 1), Some('=') | Some('!')) {
                    let negate = self.peek_at(self.pos + 1) == Some('!');
                    self.pos += 2;
                    let child = self.parse_group_body(open)?;
                    Ok(Some(RegexNode::Look {
                        child: Box::new(child),
                        behind: true,
                        negate,
                    }))
                } else {
                    self.parse_named_group(open, q).map(Some)
                }
            }
            Some(c) if is_flag_char(c) => self.parse_inline_options(open),
            Some(_) => self.err(PatternErrorKind::UnrecognizedGrouping, open),
        }
    }

    /// Body of any `(..)` construct: alternation, closing `)`, option
    /// scope restore.
    fn parse_group_body(&mut self, open: usize) -> Result<RegexNode, PatternError> {
        let saved = self.options;
        let node = self.parse_alternation()?;
        if self.peek() != Some(')') {
            return self.err(PatternErrorKind::UnterminatedGroup, open);
        }
        self.pos += 1;
        self.options = saved;
        Ok(node)
    }

    fn group_number_at(&self, open: usize) -> u32 {
        match self.scan.by_offset.get(&open) {
            Some(&n) => n,
            None => unreachable!("group table out of sync at offset {open}"),
        }
    }

    /// `(?<name>..)`, `(?'name'..)`, `(?<name1-name2>..)`, `(?<-name2>..)`.
    fn parse_named_group(
        &mut self,
        open: usize,
        quote: char,
    ) -> Result<RegexNode, PatternError> {
        if self.ecma() {
            return self.err(PatternErrorKind::UnsupportedConstruct, open);
        }
        let term = if quote == '<' { '>' } else { '\'' };
        self.pos += 1; // past the quote
        let name1 = self.scan_group_name();
        match self.peek() {
            Some('-') => {
                self.pos += 1;
                let uncap_pos = self.pos;
                let name2 = self.scan_group_name();
                if name2.is_empty() || self.peek() != Some(term) {
                    return self.err(PatternErrorKind::InvalidGroupName, open);
                }
                self.pos += 1;
                let uncap = self.resolve_group_name(&name2, uncap_pos)?;
                let (number, name) = if name1.is_empty() {
                    (None, None)
                } else {
                    self.check_group_name(&name1, open)?;
                    let n = self.group_number_at(open);
                    let stored = if name1.chars().all(|c| c.is_ascii_digit()) {
                        None
                    } else {
                        Some(SmolStr::new(&name1))
                    };
                    (Some(n), stored)
                };
                let child = self.parse_group_body(open)?;
                Ok(RegexNode::Balancing {
                    child: Box::new(child),
                    number,
                    name,
                    uncap,
                })
            }
            Some(c) if c == term => {
                if name1.is_empty() {
                    return self.err(PatternErrorKind::InvalidGroupName, open);
                }
                self.check_group_name(&name1, open)?;
                self.pos += 1;
                let number = self.group_number_at(open);
                let name = if name1.chars().all(|c| c.is_ascii_digit()) {
                    None
                } else {
                    Some(SmolStr::new(&name1))
                };
                let child = self.parse_group_body(open)?;
                Ok(RegexNode::Capture {
                    child: Box::new(child),
                    number,
                    name,
                })
            }
            _ => self.err(PatternErrorKind::InvalidGroupName, open),
        }
    }

    fn scan_group_name(&mut self) -> String {
        let mut name = String::new();
        while let Some(c) = self.peek()
            && (c.is_alphanumeric() || c == '_')
        {
            name.push(c);
            self.pos += 1;
        }
        name
    }

    /// Names are word-shaped; a leading digit is only allowed when the
    /// whole name is a number, and 0 cannot be redeclared.
    fn check_group_name(&self, name: &str, errpos: usize) -> Result<(), PatternError> {
        let all_digits = name.chars().all(|c| c.is_ascii_digit());
        let starts_digit = name.chars().next().is_some_and(|c| c.is_ascii_digit());
        if starts_digit && !all_digits {
            return self.err(PatternErrorKind::InvalidGroupName, errpos);
        }
        if all_digits && !matches!(name.parse::<u32>(), Ok(n) if n > 0) {
            return self.err(PatternErrorKind::InvalidGroupName, errpos);
        }
        Ok(())
    }

    fn resolve_group_name(&self, name: &str, errpos: usize) -> Result<u32, PatternError> {
        if name.chars().all(|c| c.is_ascii_digit()) {
            if let Ok(n) = name.parse::<u32>()
                && self.scan.declared_at.contains_key(&n)
            {
                return Ok(n);
            }
        } else if let Some(&n) = self.scan.by_name.get(name) {
            return Ok(n);
        }
        self.err(PatternErrorKind::UnknownGroupReference, errpos)
    }

    /// `(?(cond)yes|no)`; `self.pos` is at the inner `(`.
    fn parse_conditional(&mut self, open: usize) -> Result<RegexNode, PatternError> {
        if self.ecma() {
            return self.err(PatternErrorKind::UnsupportedConstruct, open);
        }
        let saved = self.options;
        let cond_open = self.pos;
        self.pos += 1;

        let test = if self.peek() == Some('?') {
            // expression condition, parsed as a lookaround group
            self.pos = cond_open;
            match self.parse_group()? {
                Some(RegexNode::Look {
                    child,
                    behind,
                    negate,
                }) => CondTest::Look(Box::new(RegexNode::Look {
                    child,
                    behind,
                    negate,
                })),
                _ => return self.err(PatternErrorKind::UnrecognizedGrouping, open),
            }
        } else {
            // group reference, or failing that an implicit lookahead
            let name_start = self.pos;
            let name = self.scan_group_name();
            if !name.is_empty()
                && self.peek() == Some(')')
                && let Ok(number) = self.resolve_group_name(&name, name_start)
            {
                self.pos += 1;
                CondTest::Group(number)
            } else {
                self.pos = name_start;
                let expr = self.parse_alternation()?;
                if self.peek() != Some(')') {
                    return self.err(PatternErrorKind::UnterminatedGroup, open);
                }
                self.pos += 1;
                CondTest::Look(Box::new(RegexNode::Look {
                    child: Box::new(expr),
                    behind: false,
                    negate: false,
                }))
            }
        };

        let yes = self.parse_concat()?;
        let no = if self.peek() == Some('|') {
            self.pos += 1;
            let no = self.parse_concat()?;
            if self.peek() == Some('|') {
                return self.err(PatternErrorKind::TooManyAlternates, self.pos);
            }
            no
        } else {
            RegexNode::Empty
        };
        if self.peek() != Some(')') {
            return self.err(PatternErrorKind::UnterminatedGroup, open);
        }
        self.pos += 1;
        self.options = saved;
        Ok(RegexNode::Conditional {
            test,
            yes: Box::new(yes),
            no: Box::new(no),
        })
    }

    /// `(?flags)` and `(?flags:..)` with an optional `-` section.
    fn parse_inline_options(
        &mut self,
        open: usize,
    ) -> Result<Option<RegexNode>, PatternError> {
        let saved = self.options;
        let mut neg = false;
        let mut bits = self.options;
        loop {
            let flag = match self.peek() {
                Some('-') => {
                    neg = true;
                    self.pos += 1;
                    continue;
                }
                Some(':') => {
                    self.pos += 1;
                    self.options = bits;
                    let child = {
                        let node = self.parse_alternation()?;
                        if self.peek() != Some(')') {
                            return self.err(PatternErrorKind::UnterminatedGroup, open);
                        }
                        self.pos += 1;
                        node
                    };
                    self.options = saved;
                    return Ok(Some(RegexNode::Group(Box::new(child))));
                }
                Some(')') => {
                    self.pos += 1;
                    // setter form: stays in effect to the end of the
                    // enclosing group
                    self.options = bits;
                    return Ok(None);
                }
                Some('i') => RegexOptions::IGNORE_CASE,
                Some('m') => RegexOptions::MULTILINE,
                Some('n') => RegexOptions::EXPLICIT_CAPTURE,
                Some('s') => RegexOptions::SINGLELINE,
                Some('x') => RegexOptions::IGNORE_PATTERN_WHITESPACE,
                _ => return self.err(PatternErrorKind::UnrecognizedGrouping, open),
            };
            self.pos += 1;
            bits = if neg {
                RegexOptions::from_bits(bits.bits() & !flag.bits()).unwrap()
            } else {
                bits | flag
            };
        }
    }

    // ----- escapes -----

    fn parse_escape_atom(&mut self) -> Result<Option<RegexNode>, PatternError> {
        let epos = self.pos;
        self.pos += 1;
        let Some(c) = self.peek() else {
            return self.err(PatternErrorKind::TrailingBackslash, epos);
        };
        let anchor = |p: &mut Parser, kind| {
            p.pos += 1;
            Ok(Some(RegexNode::Anchor(kind)))
        };
        match c {
            'A' => anchor(self, AnchorKind::BeginningOfString),
            'Z' => anchor(self, AnchorKind::EndOfStringOrNewline),
            'z' => anchor(self, AnchorKind::EndOfString),
            'G' => anchor(self, AnchorKind::StartOfMatch),
            'b' => anchor(self, AnchorKind::WordBoundary),
            'B' => anchor(self, AnchorKind::NonWordBoundary),
            'd' | 'D' | 'w' | 'W' | 's' | 'S' => {
                self.pos += 1;
                let mut spec = match c.to_ascii_lowercase() {
                    'd' => ClassSpec::digit(self.ecma()),
                    'w' => ClassSpec::word(self.ecma()),
                    _ => ClassSpec::space(self.ecma()),
                };
                if c.is_ascii_uppercase() {
                    spec.negate();
                }
                Ok(Some(RegexNode::Class(spec.compile())))
            }
            'p' | 'P' => {
                self.pos += 1;
                let spec = self.parse_category(c == 'P', epos)?;
                Ok(Some(RegexNode::Class(spec.compile())))
            }
            '1'..='9' => self.parse_numeric_escape(epos).map(Some),
            '0' => {
                self.pos += 1;
                let v = self.scan_octal(2);
                Ok(Some(RegexNode::Literal {
                    chars: vec![char_from(v)],
                    fold: self.fold(),
                }))
            }
            'k' => self.parse_named_backref(epos).map(Some),
            _ => {
                let lit = self.parse_char_escape(epos)?;
                Ok(Some(RegexNode::Literal {
                    chars: vec![lit],
                    fold: self.fold(),
                }))
            }
        }
    }

    /// `\NN` after the pre-scan: a backreference when at least that many
    /// groups are declared to the left, an octal literal otherwise.
    fn parse_numeric_escape(&mut self, epos: usize) -> Result<RegexNode, PatternError> {
        let dstart = self.pos;
        let mut num: u64 = 0;
        while let Some(c) = self.peek()
            && c.is_ascii_digit()
        {
            num = (num * 10 + (c as u64 - '0' as u64)).min(u32::MAX as u64);
            self.pos += 1;
        }
        let num = num as u32;
        let declared_left = self.scan.decl_offsets.partition_point(|&o| o < epos) as u32;

        if num >= 1 && num <= declared_left {
            if !self.scan.declared_at.contains_key(&num) {
                return self.err(PatternErrorKind::UnknownGroupReference, epos);
            }
            return Ok(RegexNode::Backref {
                group: num,
                fold: self.fold(),
            });
        }

        // octal fallback
        self.pos = dstart;
        match self.peek() {
            Some('8') | Some('9') => self.err(PatternErrorKind::UnrecognizedEscape, epos),
            _ => {
                let v = self.scan_octal(3);
                Ok(RegexNode::Literal {
                    chars: vec![char_from(v)],
                    fold: self.fold(),
                })
            }
        }
    }

    fn scan_octal(&mut self, max_digits: usize) -> u32 {
        let mut v = 0u32;
        let mut k = 0;
        while k < max_digits
            && let Some(c) = self.peek()
            && ('0'..='7').contains(&c)
        {
            v = v * 8 + (c as u32 - '0' as u32);
            self.pos += 1;
            k += 1;
        }
        v & 0xFF
    }

    fn parse_named_backref(&mut self, epos: usize) -> Result<RegexNode, PatternError> {
        self.pos += 1; // past 'k'
        let term = match self.peek() {
            Some('<') => '>',
            Some('\'') => '\'',
            _ => return self.err(PatternErrorKind::MalformedReference, epos),
        };
        self.pos += 1;
        let name_start = self.pos;
        let name = self.scan_group_name();
        if name.is_empty() || self.peek() != Some(term) {
            return self.err(PatternErrorKind::MalformedReference, epos);
        }
        self.pos += 1;
        let group = self.resolve_group_name(&name, name_start)?;
        Ok(RegexNode::Backref {
            group,
            fold: self.fold(),
        })
    }

    /// `\p{Name}` / `\P{Name}`.
    fn parse_category(
        &mut self,
        negated: bool,
        epos: usize,
    ) -> Result<ClassSpec, PatternError> {
        if self.peek() != Some('{') {
            return self.err(PatternErrorKind::InvalidCharacterClass, epos);
        }
        self.pos += 1;
        let mut name = String::new();
        while let Some(c) = self.peek()
            && c != '}'
        {
            name.push(c);
            self.pos += 1;
        }
        if self.peek() != Some('}') {
            return self.err(PatternErrorKind::InvalidCharacterClass, epos);
        }
        self.pos += 1;
        let Some(class) = CategoryClass::from_name(&name) else {
            return self.err(PatternErrorKind::InvalidCharacterClass, epos);
        };
        let mut spec = ClassSpec::new();
        spec.add_category(class, negated);
        Ok(spec)
    }

    /// Single-character escapes valid both as atoms and inside classes
    /// (`\b` is handled by each context before reaching here).
    fn parse_char_escape(&mut self, epos: usize) -> Result<char, PatternError> {
        let Some(c) = self.peek() else {
            return self.err(PatternErrorKind::TrailingBackslash, epos);
        };
        self.pos += 1;
        let lit = match c {
            'a' => '\u{7}',
            't' => '\t',
            'r' => '\r',
            'v' => '\u{B}',
            'f' => '\u{C}',
            'n' => '\n',
            'e' => '\u{1B}',
            'x' => char_from(self.scan_hex(2, epos)?),
            'u' => char_from(self.scan_hex(4, epos)?),
            'c' => {
                let Some(ctrl) = self.peek() else {
                    return self.err(PatternErrorKind::UnrecognizedEscape, epos);
                };
                if !ctrl.is_ascii_alphabetic() {
                    return self.err(PatternErrorKind::UnrecognizedEscape, epos);
                }
                self.pos += 1;
                char_from(ctrl.to_ascii_uppercase() as u32 - 'A' as u32 + 1)
            }
            _ if c.is_ascii_alphanumeric() => {
                return self.err(PatternErrorKind::UnrecognizedEscape, epos);
            }
            _ => c,
        };
        Ok(lit)
    }

    fn scan_hex(&mut self, digits: usize, epos: usize) -> Result<u32, PatternError> {
        let mut v = 0u32;
        for _ in 0..digits {
            let Some(d) = self.peek().and_then(|c| c.to_digit(16)) else {
                return self.err(PatternErrorKind::UnrecognizedEscape, epos);
            };
            v = v * 16 + d;
            self.pos += 1;
        }
        Ok(v)
    }

    // ----- character classes -----

    /// Full `[..]` body starting at `[`. Folding and compilation happen
    /// in the caller, so subtraction classes recurse through here.
    fn parse_class_spec(&mut self) -> Result<ClassSpec, PatternError> {
        let open = self.pos;
        self.pos += 1;
        let mut spec = ClassSpec::new();
        if self.peek() == Some('^') {
            spec.negate();
            self.pos += 1;
        }

        let mut pending: Option<char> = None;
        let mut in_range = false;
        let mut any = false;

        loop {
            let Some(c) = self.peek() else {
                return self.err(PatternErrorKind::UnterminatedClass, open);
            };
            if c == ']' {
                if !any && pending.is_none() {
                    return self.err(PatternErrorKind::UnterminatedClass, open);
                }
                if in_range {
                    // trailing "x-": both literal
                    spec.add_char(pending.take().unwrap());
                    spec.add_char('-');
                } else if let Some(p) = pending.take() {
                    spec.add_char(p);
                }
                self.pos += 1;
                return Ok(spec);
            }
            if c == '-' && !in_range {
                if self.peek_at(self.pos + 1) == Some('[') {
                    // subtraction: must be the final element
                    if let Some(p) = pending.take() {
                        spec.add_char(p);
                    }
                    self.pos += 1;
                    let sub = self.parse_class_spec()?;
                    spec.set_subtract(sub);
                    if self.peek() != Some(']') {
                        return self.err(PatternErrorKind::InvalidCharacterClass, self.pos);
                    }
                    self.pos += 1;
                    return Ok(spec);
                }
                if pending.is_some() {
                    in_range = true;
                } else {
                    spec.add_char('-');
                    any = true;
                }
                self.pos += 1;
                continue;
            }

            let elem = if c == '\\' {
                self.parse_class_escape()?
            } else {
                self.pos += 1;
                ClassElem::Char(c)
            };
            any = true;
            match elem {
                ClassElem::Char(ch) => {
                    if in_range {
                        let lo = pending.take().unwrap();
                        if (ch as u32) < (lo as u32) {
                            return self
                                .err(PatternErrorKind::InvalidCharacterClass, self.pos - 1);
                        }
                        spec.add_range(lo, ch);
                        in_range = false;
                    } else if let Some(p) = pending.replace(ch) {
                        spec.add_char(p);
                    }
                }
                ClassElem::Class(sub) => {
                    if in_range {
                        // a shorthand cannot terminate a range
                        return self.err(PatternErrorKind::InvalidCharacterClass, self.pos - 1);
                    }
                    if let Some(p) = pending.take() {
                        spec.add_char(p);
                    }
                    spec.add_class(&sub);
                }
            }
        }
    }

    fn parse_class_escape(&mut self) -> Result<ClassElem, PatternError> {
        let epos = self.pos;
        self.pos += 1;
        let Some(c) = self.peek() else {
            return self.err(PatternErrorKind::TrailingBackslash, epos);
        };
        match c {
            'd' | 'D' | 'w' | 'W' | 's' | 'S' => {
                self.pos += 1;
                let base = match c.to_ascii_lowercase() {
                    'd' => ClassSpec::digit(self.ecma()),
                    'w' => ClassSpec::word(self.ecma()),
                    _ => ClassSpec::space(self.ecma()),
                };
                let spec = if c.is_ascii_uppercase() {
                    base.shorthand_complement()
                } else {
                    base
                };
                Ok(ClassElem::Class(spec))
            }
            'p' | 'P' => {
                self.pos += 1;
                let spec = self.parse_category(c == 'P', epos)?;
                Ok(ClassElem::Class(spec))
            }
            'b' => {
                self.pos += 1;
                Ok(ClassElem::Char('\u{8}'))
            }
            '0'..='7' => Ok(ClassElem::Char(char_from(self.scan_octal(3)))),
            '8' | '9' => self.err(PatternErrorKind::UnrecognizedEscape, epos),
            _ => self.parse_char_escape(epos).map(ClassElem::Char),
        }
    }
}

#[inline]
fn char_from(v: u32) -> char {
    char::from_u32(v).unwrap_or('\u{FFFD}')
}

/// Resolve pattern escapes in `s` back to literal text; the inverse of
/// `Regex::escape`.
pub fn unescape(s: &str) -> Result<String, PatternError> {
    let mut p = Parser {
        chars: s.chars().collect(),
        pos: 0,
        options: RegexOptions::NONE,
        scan: ScanInfo::default(),
    };
    let mut out = String::new();
    while let Some(c) = p.peek() {
        if c != '\\' {
            out.push(c);
            p.pos += 1;
            continue;
        }
        let epos = p.pos;
        p.pos += 1;
        match p.peek() {
            None => return Err(PatternError::new(PatternErrorKind::TrailingBackslash, epos)),
            Some('0'..='7') => out.push(char_from(p.scan_octal(3))),
            Some('8') | Some('9') => {
                return Err(PatternError::new(PatternErrorKind::UnrecognizedEscape, epos));
            }
            Some('b') => {
                p.pos += 1;
                out.push('\u{8}');
            }
            Some(_) => out.push(p.parse_char_escape(epos)?),
        }
    }
    Ok(out)
}
