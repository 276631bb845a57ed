// Facade and scan driver
//
// `Regex` owns the validated options and a shared compiled program.
// Compilation goes through a process-wide bounded cache keyed by
// (pattern, options): concurrent racing compiles of the same pattern
// are tolerated, the map itself is guarded by a mutex.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;

use ahash::AHashMap;
use smol_str::SmolStr;

use crate::captures::{Match, build_match};
use crate::engine::{DEFAULT_BACKTRACK_LIMIT, Engine, MatchError};
use crate::options::{OptionsError, RegexOptions};
use crate::program::Program;
use crate::substitution::Substitution;
use crate::syntax::ast::AnchorKind;
use crate::syntax::error::PatternError;
use crate::syntax::parser;

/// Construction-time rejection: bad pattern or bad option set.
#[derive(Debug, Clone, PartialEq)]
pub enum RegexError {
    Pattern(PatternError),
    Options(OptionsError),
}

impl std::fmt::Display for RegexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegexError::Pattern(e) => write!(f, "invalid pattern: {e}"),
            RegexError::Options(e) => write!(f, "invalid options: {e}"),
        }
    }
}

impl std::error::Error for RegexError {}

impl From<PatternError> for RegexError {
    fn from(e: PatternError) -> RegexError {
        RegexError::Pattern(e)
    }
}

impl From<OptionsError> for RegexError {
    fn from(e: OptionsError) -> RegexError {
        RegexError::Options(e)
    }
}

const CACHE_SIZE: usize = 16;

struct ProgramCache {
    map: AHashMap<(String, u16), Arc<Program>>,
    order: VecDeque<(String, u16)>,
}

fn cached_program(
    pattern: &str,
    options: RegexOptions,
) -> Result<Arc<Program>, PatternError> {
    static CACHE: OnceLock<Mutex<ProgramCache>> = OnceLock::new();
    let cache = CACHE.get_or_init(|| {
        Mutex::new(ProgramCache {
            map: AHashMap::new(),
            order: VecDeque::new(),
        })
    });

    let key = (pattern.to_string(), options.bits());
    {
        let guard = cache.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(prog) = guard.map.get(&key) {
            return Ok(prog.clone());
        }
    }

    // compiled outside the lock; a racing thread may compile the same
    // pattern redundantly
    let prog = Arc::new(Program::compile(pattern, options)?);

    let mut guard = cache.lock().unwrap_or_else(|e| e.into_inner());
    if let Some(existing) = guard.map.get(&key) {
        return Ok(existing.clone());
    }
    if guard.order.len() >= CACHE_SIZE
        && let Some(oldest) = guard.order.pop_front()
    {
        guard.map.remove(&oldest);
    }
    guard.order.push_back(key.clone());
    guard.map.insert(key, prog.clone());
    Ok(prog)
}

/// A compiled regular expression.
#[derive(Debug, Clone)]
pub struct Regex {
    pattern: String,
    options: RegexOptions,
    timeout: Option<Duration>,
    backtrack_limit: usize,
    program: Arc<Program>,
    names: Vec<SmolStr>,
}

impl Regex {
    pub fn new(pattern: &str) -> Result<Regex, RegexError> {
        Regex::with_options(pattern, RegexOptions::NONE)
    }

    pub fn with_options(pattern: &str, options: RegexOptions) -> Result<Regex, RegexError> {
        options.validate()?;
        let program = cached_program(pattern, options)?;
        let names = program.group_names();
        Ok(Regex {
            pattern: pattern.to_string(),
            options,
            timeout: None,
            backtrack_limit: DEFAULT_BACKTRACK_LIMIT,
            program,
            names,
        })
    }

    /// Every match-time call against this regex polls the deadline and
    /// aborts with [`MatchError::Timeout`] once `timeout` elapses.
    pub fn with_options_and_timeout(
        pattern: &str,
        options: RegexOptions,
        timeout: Duration,
    ) -> Result<Regex, RegexError> {
        let mut re = Regex::with_options(pattern, options)?;
        re.timeout = Some(timeout);
        Ok(re)
    }

    /// Cap on live backtrack records per attempt.
    pub fn with_backtrack_limit(mut self, limit: usize) -> Regex {
        self.backtrack_limit = limit;
        self
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn options(&self) -> RegexOptions {
        self.options
    }

    /// Group names in slot order ("0" first).
    pub fn group_names(&self) -> &[SmolStr] {
        &self.names
    }

    /// Resolve a group name or decimal number to its slot.
    pub fn group_number(&self, name: &str) -> Option<u32> {
        self.program.group_number(name)
    }

    /// Listing of the compiled program, for diagnostics.
    pub fn program_listing(&self) -> String {
        self.program.dump()
    }

    // ----- matching -----

    pub fn is_match(&self, text: &str) -> Result<bool, MatchError> {
        Ok(self.find(text)?.is_some())
    }

    /// First match in scan order (leftmost, or rightmost under
    /// RightToLeft). `Ok(None)` is "no match"; a timeout is an error.
    pub fn find<'t>(&self, text: &'t str) -> Result<Option<Match<'t>>, MatchError> {
        let from = if self.program.rtl { usize::MAX } else { 0 };
        self.scan(text, from)
    }

    /// First match scanning from `from` (a char offset; the right scan
    /// boundary under RightToLeft).
    pub fn find_from<'t>(
        &self,
        text: &'t str,
        from: usize,
    ) -> Result<Option<Match<'t>>, MatchError> {
        self.scan(text, from)
    }

    /// Lazy sequence of non-overlapping matches. Restartable: each call
    /// to `find_iter` starts a fresh scan.
    pub fn find_iter<'r, 't>(&'r self, text: &'t str) -> Matches<'r, 't> {
        let char_len = text.chars().count();
        Matches {
            re: self,
            text,
            char_len,
            next_from: if self.program.rtl { char_len } else { 0 },
            done: false,
        }
    }

    fn scan<'t>(
        &self,
        text: &'t str,
        from: usize,
    ) -> Result<Option<Match<'t>>, MatchError> {
        let (chars, byte_map) = decompose(text);
        let len = chars.len();
        let from = from.min(len);
        let prog = &*self.program;
        let engine = Engine::new(prog, &chars, self.timeout, self.backtrack_limit);

        if prog.rtl {
            let mut start = from;
            loop {
                if start < prog.min_len {
                    return Ok(None);
                }
                if let Some(snapshot) = engine.run(start, from)? {
                    return Ok(Some(build_match(snapshot, text, &byte_map, &self.names, true)));
                }
                if start == 0 {
                    return Ok(None);
                }
                start -= 1;
            }
        }

        let mut start = from;
        while start + prog.min_len <= len {
            match prog.anchor {
                Some(AnchorKind::BeginningOfString) if start > 0 => return Ok(None),
                Some(AnchorKind::StartOfMatch) if start > from => return Ok(None),
                Some(AnchorKind::StartOfLine)
                    if start > 0 && chars[start - 1] != '\n' =>
                {
                    start += 1;
                    continue;
                }
                _ => {}
            }
            if let Some(first) = &prog.first {
                match chars.get(start) {
                    Some(&c) if first.contains(c) => {}
                    Some(_) => {
                        start += 1;
                        continue;
                    }
                    None => return Ok(None),
                }
            }
            if let Some(snapshot) = engine.run(start, from)? {
                return Ok(Some(build_match(snapshot, text, &byte_map, &self.names, false)));
            }
            start += 1;
        }
        Ok(None)
    }

    // ----- split -----

    /// Split around matches, keeping the text of every participating
    /// capture group in document order.
    pub fn split<'t>(&self, text: &'t str) -> Result<Vec<&'t str>, MatchError> {
        self.split_limited(text, 0, false)
    }

    /// `max_pieces` bounds the number of split segments (0 means
    /// unlimited); `omit_empty` drops empty entries from the result.
    /// Pieces come back in document order; under RightToLeft a limit
    /// consumes the rightmost separators first.
    pub fn split_limited<'t>(
        &self,
        text: &'t str,
        max_pieces: usize,
        omit_empty: bool,
    ) -> Result<Vec<&'t str>, MatchError> {
        let max_splits = if max_pieces == 0 {
            usize::MAX
        } else {
            max_pieces - 1
        };
        let matches = self.collect_matches(text, max_splits)?;

        let mut out: Vec<&'t str> = Vec::with_capacity(matches.len() * 2 + 1);
        let mut prev = 0;
        for m in &matches {
            out.push(&text[prev..m.byte_start()]);
            for group in &m.groups()[1..] {
                if group.success() {
                    out.push(group.as_str().unwrap_or(""));
                }
            }
            prev = m.byte_end();
        }
        out.push(&text[prev..]);
        if omit_empty {
            out.retain(|piece| !piece.is_empty());
        }
        Ok(out)
    }

    // ----- replace -----

    /// Replace every match with the expanded template.
    pub fn replace(&self, text: &str, template: &str) -> Result<String, MatchError> {
        self.replace_limited(text, template, 0)
    }

    /// Replace at most `count` matches (0 means all). Under RightToLeft
    /// the rightmost matches are replaced first.
    pub fn replace_limited(
        &self,
        text: &str,
        template: &str,
        count: usize,
    ) -> Result<String, MatchError> {
        let sub = Substitution::parse(template);
        self.replace_impl(text, count, |m, out| sub.expand(m, out))
    }

    /// Replace with a per-match function.
    pub fn replace_with<F>(&self, text: &str, mut f: F) -> Result<String, MatchError>
    where
        F: FnMut(&Match<'_>) -> String,
    {
        self.replace_impl(text, 0, |m, out| out.push_str(&f(m)))
    }

    fn replace_impl(
        &self,
        text: &str,
        count: usize,
        mut emit: impl FnMut(&Match<'_>, &mut String),
    ) -> Result<String, MatchError> {
        let limit = if count == 0 { usize::MAX } else { count };
        let matches = self.collect_matches(text, limit)?;
        let mut out = String::with_capacity(text.len());
        let mut prev = 0;
        for m in &matches {
            out.push_str(&text[prev..m.byte_start()]);
            emit(m, &mut out);
            prev = m.byte_end();
        }
        out.push_str(&text[prev..]);
        Ok(out)
    }

    /// Up to `limit` matches in ascending document order.
    fn collect_matches<'t>(
        &self,
        text: &'t str,
        limit: usize,
    ) -> Result<Vec<Match<'t>>, MatchError> {
        let mut matches = Vec::new();
        for result in self.find_iter(text) {
            if matches.len() >= limit {
                break;
            }
            matches.push(result?);
        }
        if self.program.rtl {
            matches.sort_by_key(|m| m.byte_start());
        }
        Ok(matches)
    }

    // ----- escaping -----

    /// Escape `text` so it matches itself literally inside a pattern.
    pub fn escape(text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        for c in text.chars() {
            match c {
                '\\' | '*' | '+' | '?' | '|' | '{' | '[' | '(' | ')' | '^' | '$' | '.'
                | '#' | ' ' => {
                    out.push('\\');
                    out.push(c);
                }
                '\t' => out.push_str("\\t"),
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                '\u{C}' => out.push_str("\\f"),
                '\u{B}' => out.push_str("\\v"),
                _ => out.push(c),
            }
        }
        out
    }

    /// Inverse of [`Regex::escape`].
    pub fn unescape(text: &str) -> Result<String, PatternError> {
        parser::unescape(text)
    }
}

/// Lazy non-overlapping match sequence. Empty matches advance one extra
/// position so the sequence always terminates.
pub struct Matches<'r, 't> {
    re: &'r Regex,
    text: &'t str,
    char_len: usize,
    next_from: usize,
    done: bool,
}

impl<'r, 't> Iterator for Matches<'r, 't> {
    type Item = Result<Match<'t>, MatchError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.re.scan(self.text, self.next_from) {
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
            Ok(None) => {
                self.done = true;
                None
            }
            Ok(Some(m)) => {
                if self.re.program.rtl {
                    if m.is_empty() {
                        if m.start() == 0 {
                            self.done = true;
                        } else {
                            self.next_from = m.start() - 1;
                        }
                    } else {
                        self.next_from = m.start();
                    }
                } else {
                    self.next_from = m.end() + usize::from(m.is_empty());
                    if self.next_from > self.char_len {
                        self.done = true;
                    }
                }
                Some(Ok(m))
            }
        }
    }
}

fn decompose(text: &str) -> (Vec<char>, Vec<usize>) {
    let mut chars = Vec::with_capacity(text.len());
    let mut bytes = Vec::with_capacity(text.len() + 1);
    for (offset, c) in text.char_indices() {
        bytes.push(offset);
        chars.push(c);
    }
    bytes.push(text.len());
    (chars, bytes)
}
