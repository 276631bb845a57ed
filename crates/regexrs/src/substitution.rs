// Replacement templates
// Parsed once per replace call into segments, expanded per match.
// `$n`, `${name}`, `$$`, `$&`, `$` + backquote, `$'`, `$+` and `$_`
// follow the usual substitution language; an unrecognized `$` sequence
// stays literal.

use smol_str::SmolStr;

use crate::captures::Match;

#[derive(Debug)]
enum Segment {
    Text(String),
    Group(u32),
    Named(SmolStr),
    /// `$&`
    WholeMatch,
    /// `` $` ``: input before the match.
    Before,
    /// `$'`: input after the match.
    After,
    /// `$+`: the last group that captured.
    LastGroup,
    /// `$_`: the entire input.
    Input,
}

#[derive(Debug)]
pub(crate) struct Substitution {
    segments: Vec<Segment>,
}

impl Substitution {
    pub fn parse(template: &str) -> Substitution {
        let chars: Vec<char> = template.chars().collect();
        let mut segments = Vec::new();
        let mut text = String::new();
        let mut i = 0;

        let flush = |segments: &mut Vec<Segment>, text: &mut String| {
            if !text.is_empty() {
                segments.push(Segment::Text(std::mem::take(text)));
            }
        };

        while i < chars.len() {
            let c = chars[i];
            if c != '$' {
                text.push(c);
                i += 1;
                continue;
            }
            match chars.get(i + 1) {
                Some('$') => {
                    text.push('$');
                    i += 2;
                }
                Some('&') => {
                    flush(&mut segments, &mut text);
                    segments.push(Segment::WholeMatch);
                    i += 2;
                }
                Some('`') => {
                    flush(&mut segments, &mut text);
                    segments.push(Segment::Before);
                    i += 2;
                }
                Some('\'') => {
                    flush(&mut segments, &mut text);
                    segments.push(Segment::After);
                    i += 2;
                }
                Some('+') => {
                    flush(&mut segments, &mut text);
                    segments.push(Segment::LastGroup);
                    i += 2;
                }
                Some('_') => {
                    flush(&mut segments, &mut text);
                    segments.push(Segment::Input);
                    i += 2;
                }
                Some(d) if d.is_ascii_digit() => {
                    let mut j = i + 1;
                    let mut n: u32 = 0;
                    while let Some(c) = chars.get(j).filter(|c| c.is_ascii_digit()) {
                        n = n.saturating_mul(10).saturating_add(*c as u32 - '0' as u32);
                        j += 1;
                    }
                    flush(&mut segments, &mut text);
                    segments.push(Segment::Group(n));
                    i = j;
                }
                Some('{') => {
                    let mut j = i + 2;
                    let mut name = String::new();
                    while let Some(&c) = chars.get(j).filter(|c| **c != '}') {
                        name.push(c);
                        j += 1;
                    }
                    if chars.get(j) == Some(&'}') && !name.is_empty() {
                        flush(&mut segments, &mut text);
                        if name.chars().all(|c| c.is_ascii_digit()) {
                            segments.push(Segment::Group(name.parse().unwrap_or(u32::MAX)));
                        } else {
                            segments.push(Segment::Named(SmolStr::new(&name)));
                        }
                        i = j + 1;
                    } else {
                        text.push('$');
                        i += 1;
                    }
                }
                _ => {
                    text.push('$');
                    i += 1;
                }
            }
        }
        flush(&mut segments, &mut text);
        Substitution { segments }
    }

    /// Expand against one match. Groups that did not participate
    /// substitute the empty string.
    pub fn expand(&self, m: &Match<'_>, out: &mut String) {
        for segment in &self.segments {
            match segment {
                Segment::Text(t) => out.push_str(t),
                Segment::Group(n) => {
                    if let Some(s) = m.group(*n).and_then(|g| g.as_str()) {
                        out.push_str(s);
                    }
                }
                Segment::Named(name) => {
                    if let Some(s) = m.group_by_name(name).and_then(|g| g.as_str()) {
                        out.push_str(s);
                    }
                }
                Segment::WholeMatch => out.push_str(m.as_str()),
                Segment::Before => out.push_str(&m.input()[..m.byte_start()]),
                Segment::After => out.push_str(&m.input()[m.byte_end()..]),
                Segment::LastGroup => {
                    if let Some(s) = m.last_successful_group().and_then(|g| g.as_str()) {
                        out.push_str(s);
                    }
                }
                Segment::Input => out.push_str(m.input()),
            }
        }
    }
}
