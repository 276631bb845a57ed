// Character-class engine
// A class is a set of Unicode scalar values: inclusive ranges, category
// items and an optional subtracted class. Set operations are composed
// while building; membership at match time is a binary search plus
// category lookups through the classifier.
//
// The engine matches scalar values, never UTF-16 units, so negation is
// complement within scalar-value space.

use crate::unicode::{self, CategoryClass};

pub const MAX_SCALAR: u32 = 0x10FFFF;

/// One category item inside a class: `\p{..}` or `\P{..}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryItem {
    pub class: CategoryClass,
    pub negated: bool,
}

/// Mutable class under construction. Finalized into a [`CompiledClass`]
/// with [`ClassSpec::compile`].
#[derive(Debug, Clone, Default)]
pub struct ClassSpec {
    ranges: Vec<(u32, u32)>,
    categories: Vec<CategoryItem>,
    negated: bool,
    fold: bool,
    subtract: Option<Box<ClassSpec>>,
}

/// Immutable compiled class. Ranges are sorted and coalesced; a negation
/// over pure ranges has already been flattened into complement ranges.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledClass {
    ranges: Vec<(u32, u32)>,
    categories: Vec<CategoryItem>,
    negated: bool,
    fold: bool,
    subtract: Option<Box<CompiledClass>>,
}

impl ClassSpec {
    pub fn new() -> ClassSpec {
        ClassSpec::default()
    }

    pub fn add_char(&mut self, c: char) {
        self.ranges.push((c as u32, c as u32));
    }

    /// Add an inclusive range. The parser has already rejected `hi < lo`.
    pub fn add_range(&mut self, lo: char, hi: char) {
        self.ranges.push((lo as u32, hi as u32));
    }

    pub fn add_category(&mut self, class: CategoryClass, negated: bool) {
        self.categories.push(CategoryItem { class, negated });
    }

    /// Union another spec into this one. Used for shorthand classes
    /// appearing inside `[..]`. The other spec must not itself be negated
    /// or carry a subtraction (shorthands never are).
    pub fn add_class(&mut self, other: &ClassSpec) {
        debug_assert!(!other.negated && other.subtract.is_none());
        self.ranges.extend_from_slice(&other.ranges);
        self.categories.extend_from_slice(&other.categories);
    }

    pub fn negate(&mut self) {
        self.negated = !self.negated;
    }

    pub fn set_subtract(&mut self, sub: ClassSpec) {
        self.subtract = Some(Box::new(sub));
    }

    /// Prepare the class for IgnoreCase matching: ASCII letter ranges are
    /// widened to both cases and the membership probe is folded.
    pub fn case_fold(&mut self) {
        let mut extra = Vec::new();
        for &(lo, hi) in &self.ranges {
            // a-z and A-Z counterparts
            let (alo, ahi) = (lo.max(b'A' as u32), hi.min(b'Z' as u32));
            if alo <= ahi {
                extra.push((alo + 32, ahi + 32));
            }
            let (blo, bhi) = (lo.max(b'a' as u32), hi.min(b'z' as u32));
            if blo <= bhi {
                extra.push((blo - 32, bhi - 32));
            }
        }
        self.ranges.extend(extra);
        self.fold = true;
        if let Some(sub) = &mut self.subtract {
            sub.case_fold();
        }
    }

    pub fn compile(self) -> CompiledClass {
        let mut ranges = coalesce(self.ranges);
        let mut negated = self.negated;
        let mut subtract = self.subtract.map(|s| Box::new(s.compile()));

        if negated && self.categories.is_empty() {
            ranges = complement(&ranges);
            negated = false;
        }
        // A pure-range subtraction folds into the ranges themselves.
        if let Some(sub) = &subtract
            && !negated
            && self.categories.is_empty()
            && sub.is_pure_ranges()
            && self.fold == sub.fold
        {
            ranges = difference(&ranges, &sub.ranges);
            subtract = None;
        }
        CompiledClass {
            ranges,
            categories: self.categories,
            negated,
            fold: self.fold,
            subtract,
        }
    }

    // ----- canned classes -----

    /// `\d`. The ECMAScript dialect narrows it to ASCII digits.
    pub fn digit(ecma: bool) -> ClassSpec {
        let mut s = ClassSpec::new();
        if ecma {
            s.add_range('0', '9');
        } else {
            s.add_category(CategoryClass::Digit, false);
        }
        s
    }

    /// `\w`. ECMAScript narrows it to `[a-zA-Z0-9_]`.
    pub fn word(ecma: bool) -> ClassSpec {
        let mut s = ClassSpec::new();
        if ecma {
            s.add_range('a', 'z');
            s.add_range('A', 'Z');
            s.add_range('0', '9');
            s.add_char('_');
        } else {
            s.add_category(CategoryClass::Word, false);
        }
        s
    }

    /// `\s`. ECMAScript keeps the ASCII white-space set only.
    pub fn space(ecma: bool) -> ClassSpec {
        let mut s = ClassSpec::new();
        if ecma {
            s.add_range('\u{9}', '\u{D}');
            s.add_char(' ');
        } else {
            s.add_category(CategoryClass::Space, false);
        }
        s
    }

    /// Negated shorthand as a single class item for use inside `[..]`:
    /// ECMAScript range sets complement eagerly, category items flip
    /// their own negation flag.
    pub fn shorthand_complement(mut self) -> ClassSpec {
        if self.categories.is_empty() {
            self.ranges = complement(&coalesce(std::mem::take(&mut self.ranges)));
        } else {
            for item in &mut self.categories {
                item.negated = !item.negated;
            }
            // [\D] must OR a complement in, so a multi-item shorthand
            // would be wrong here; the canned sets are all single-item.
            debug_assert!(self.categories.len() == 1 && self.ranges.is_empty());
        }
        self
    }

    /// `.`: everything, or everything but `\n` unless Singleline.
    pub fn dot(singleline: bool) -> ClassSpec {
        let mut s = ClassSpec::new();
        if singleline {
            s.ranges.push((0, MAX_SCALAR));
        } else {
            s.ranges.push((0, 0x09));
            s.ranges.push((0x0B, MAX_SCALAR));
        }
        s
    }

    /// Single-character class, used by the first-character analyzer.
    pub fn from_char(c: char, fold: bool) -> ClassSpec {
        let mut s = ClassSpec::new();
        if fold {
            s.add_char(unicode::fold(c));
            s.case_fold();
        } else {
            s.add_char(c);
        }
        s
    }
}

impl CompiledClass {
    #[inline]
    pub fn contains(&self, c: char) -> bool {
        let mut inside = self.in_positive(c);
        if self.negated {
            inside = !inside;
        }
        if inside && let Some(sub) = &self.subtract {
            inside = !sub.contains(c);
        }
        inside
    }

    fn in_positive(&self, c: char) -> bool {
        let probe = if self.fold { unicode::fold(c) as u32 } else { c as u32 };
        if in_ranges(&self.ranges, probe) {
            return true;
        }
        // Category items test the unfolded character.
        self.categories.iter().any(|item| {
            let hit = item.class.contains(c);
            if item.negated { !hit } else { hit }
        })
    }

    pub fn is_pure_ranges(&self) -> bool {
        !self.negated && self.categories.is_empty() && self.subtract.is_none()
    }

    pub fn ranges(&self) -> &[(u32, u32)] {
        &self.ranges
    }

    /// Conservative union for the first-character prefilter. `None` when
    /// either side is too complex to merge exactly.
    pub fn try_union(&self, other: &CompiledClass) -> Option<CompiledClass> {
        if self.negated
            || other.negated
            || self.subtract.is_some()
            || other.subtract.is_some()
            || self.fold != other.fold
        {
            return None;
        }
        let mut ranges = self.ranges.clone();
        ranges.extend_from_slice(&other.ranges);
        let mut categories = self.categories.clone();
        categories.extend_from_slice(&other.categories);
        Some(CompiledClass {
            ranges: coalesce(ranges),
            categories,
            negated: false,
            fold: self.fold,
            subtract: None,
        })
    }
}

#[inline]
fn in_ranges(ranges: &[(u32, u32)], probe: u32) -> bool {
    ranges
        .binary_search_by(|&(lo, hi)| {
            if probe < lo {
                std::cmp::Ordering::Greater
            } else if probe > hi {
                std::cmp::Ordering::Less
            } else {
                std::cmp::Ordering::Equal
            }
        })
        .is_ok()
}

/// Sort and coalesce adjacent or overlapping ranges.
fn coalesce(mut ranges: Vec<(u32, u32)>) -> Vec<(u32, u32)> {
    if ranges.len() <= 1 {
        return ranges;
    }
    ranges.sort_unstable();
    let mut out: Vec<(u32, u32)> = Vec::with_capacity(ranges.len());
    for (lo, hi) in ranges {
        match out.last_mut() {
            Some(last) if lo <= last.1.saturating_add(1) => {
                last.1 = last.1.max(hi);
            }
            _ => out.push((lo, hi)),
        }
    }
    out
}

/// Complement of a coalesced range set over the scalar-value space.
fn complement(ranges: &[(u32, u32)]) -> Vec<(u32, u32)> {
    let mut out = Vec::with_capacity(ranges.len() + 1);
    let mut next = 0u32;
    for &(lo, hi) in ranges {
        if lo > next {
            out.push((next, lo - 1));
        }
        next = hi.saturating_add(1);
        if next > MAX_SCALAR {
            return out;
        }
    }
    out.push((next, MAX_SCALAR));
    out
}

/// `a` minus `b`, both coalesced.
fn difference(a: &[(u32, u32)], b: &[(u32, u32)]) -> Vec<(u32, u32)> {
    let not_b = complement(b);
    // intersection of a with not_b by merged walk
    let mut out = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < not_b.len() {
        let (alo, ahi) = a[i];
        let (blo, bhi) = not_b[j];
        let lo = alo.max(blo);
        let hi = ahi.min(bhi);
        if lo <= hi {
            out.push((lo, hi));
        }
        if ahi < bhi {
            i += 1;
        } else {
            j += 1;
        }
    }
    out
}
