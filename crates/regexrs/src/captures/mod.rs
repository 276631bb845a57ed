// Match result model
// Immutable Match/Group/Capture values built from one engine snapshot.
// They borrow only the input text; offsets and lengths are in chars.

use smol_str::SmolStr;

use crate::engine::MatchSnapshot;

/// One span a group captured on the accepted path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capture<'t> {
    start: usize,
    len: usize,
    text: &'t str,
}

impl<'t> Capture<'t> {
    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.start + self.len
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_str(&self) -> &'t str {
        self.text
    }
}

/// A capture group's result: every capture it accumulated, in the order
/// they occurred (earliest first, also under right-to-left scanning).
#[derive(Debug, Clone)]
pub struct Group<'t> {
    number: u32,
    name: SmolStr,
    captures: Vec<Capture<'t>>,
}

impl<'t> Group<'t> {
    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the group captured at all on the accepted path.
    pub fn success(&self) -> bool {
        !self.captures.is_empty()
    }

    pub fn captures(&self) -> &[Capture<'t>] {
        &self.captures
    }

    /// The last capture, which is the group's value.
    pub fn last(&self) -> Option<&Capture<'t>> {
        self.captures.last()
    }

    /// Text of the group's value; `None` when the group never captured.
    pub fn as_str(&self) -> Option<&'t str> {
        self.captures.last().map(|c| c.text)
    }
}

/// One successful match. Group 0 is the overall span.
#[derive(Debug, Clone)]
pub struct Match<'t> {
    text: &'t str,
    start: usize,
    len: usize,
    byte_start: usize,
    byte_end: usize,
    groups: Vec<Group<'t>>,
}

impl<'t> Match<'t> {
    /// Start offset in chars.
    pub fn start(&self) -> usize {
        self.start
    }

    /// End offset in chars, exclusive.
    pub fn end(&self) -> usize {
        self.start + self.len
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_str(&self) -> &'t str {
        &self.text[self.byte_start..self.byte_end]
    }

    /// The full input the match was found in.
    pub fn input(&self) -> &'t str {
        self.text
    }

    pub(crate) fn byte_start(&self) -> usize {
        self.byte_start
    }

    pub(crate) fn byte_end(&self) -> usize {
        self.byte_end
    }

    pub fn groups(&self) -> &[Group<'t>] {
        &self.groups
    }

    /// Group by number; `None` only for out-of-range numbers. A group
    /// that did not participate is returned with `success() == false`.
    pub fn group(&self, number: u32) -> Option<&Group<'t>> {
        self.groups.get(number as usize)
    }

    /// Group by declared name or decimal number.
    pub fn group_by_name(&self, name: &str) -> Option<&Group<'t>> {
        self.groups.iter().find(|g| g.name == name)
    }

    /// The highest-numbered group that captured, for `$+` substitution.
    pub fn last_successful_group(&self) -> Option<&Group<'t>> {
        self.groups[1..].iter().rev().find(|g| g.success())
    }
}

/// Build the immutable result from an accepting snapshot.
///
/// `byte_map[i]` is the byte offset of char `i`, with one extra entry
/// for the end of input. Right-to-left runs push captures in reverse
/// reading order, so their sequences are flipped back here.
pub(crate) fn build_match<'t>(
    snapshot: MatchSnapshot,
    text: &'t str,
    byte_map: &[usize],
    names: &[SmolStr],
    rtl: bool,
) -> Match<'t> {
    let slice = |lo: usize, hi: usize| -> Capture<'t> {
        Capture {
            start: lo,
            len: hi - lo,
            text: &text[byte_map[lo]..byte_map[hi]],
        }
    };

    let mut groups = Vec::with_capacity(snapshot.spans.len());
    for (number, spans) in snapshot.spans.iter().enumerate() {
        let mut captures: Vec<Capture<'t>> =
            spans.iter().map(|&(lo, hi)| slice(lo, hi)).collect();
        if rtl {
            captures.reverse();
        }
        groups.push(Group {
            number: number as u32,
            name: names[number].clone(),
            captures,
        });
    }

    let overall = groups[0].captures[0];
    Match {
        text,
        start: overall.start,
        len: overall.len,
        byte_start: byte_map[overall.start],
        byte_end: byte_map[overall.end()],
        groups,
    }
}
