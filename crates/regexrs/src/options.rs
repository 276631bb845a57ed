// Regex option flags, validated once at construction

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Composable option flags.
///
/// ```
/// use regexrs::RegexOptions;
/// let opts = RegexOptions::IGNORE_CASE | RegexOptions::MULTILINE;
/// assert!(opts.contains(RegexOptions::IGNORE_CASE));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RegexOptions(u16);

impl RegexOptions {
    pub const NONE: RegexOptions = RegexOptions(0);
    /// Case-insensitive matching.
    pub const IGNORE_CASE: RegexOptions = RegexOptions(1 << 0);
    /// `^` and `$` also match at line boundaries.
    pub const MULTILINE: RegexOptions = RegexOptions(1 << 1);
    /// Plain `(..)` groups do not capture; only named groups do.
    pub const EXPLICIT_CAPTURE: RegexOptions = RegexOptions(1 << 2);
    /// `.` also matches `\n`.
    pub const SINGLELINE: RegexOptions = RegexOptions(1 << 3);
    /// Unescaped white space in the pattern is ignored and `#` starts a
    /// comment running to end of line.
    pub const IGNORE_PATTERN_WHITESPACE: RegexOptions = RegexOptions(1 << 4);
    /// Scan the input from the right end leftward.
    pub const RIGHT_TO_LEFT: RegexOptions = RegexOptions(1 << 5);
    /// Restricted dialect: ASCII shorthand classes, octal-leaning escape
    /// resolution, no named/balancing/conditional groups.
    pub const ECMA_SCRIPT: RegexOptions = RegexOptions(1 << 6);
    /// Case folding uses ordinal rules. Accepted for surface
    /// compatibility; the default folding is already culture-independent.
    pub const CULTURE_INVARIANT: RegexOptions = RegexOptions(1 << 7);

    const ALL: u16 = (1 << 8) - 1;

    #[inline]
    pub const fn bits(self) -> u16 {
        self.0
    }

    /// Rebuild from raw bits, rejecting unknown ones.
    pub const fn from_bits(bits: u16) -> Option<RegexOptions> {
        if bits & !Self::ALL != 0 {
            None
        } else {
            Some(RegexOptions(bits))
        }
    }

    #[inline]
    pub const fn contains(self, other: RegexOptions) -> bool {
        self.0 & other.0 == other.0
    }

    /// Reject combinations the engine does not define.
    pub fn validate(self) -> Result<(), OptionsError> {
        if self.0 & !Self::ALL != 0 {
            return Err(OptionsError::UnknownBits(self.0 & !Self::ALL));
        }
        if self.contains(Self::ECMA_SCRIPT) {
            for (flag, name) in [
                (Self::RIGHT_TO_LEFT, "RightToLeft"),
                (Self::EXPLICIT_CAPTURE, "ExplicitCapture"),
                (Self::SINGLELINE, "Singleline"),
            ] {
                if self.contains(flag) {
                    return Err(OptionsError::InvalidCombination(name));
                }
            }
        }
        Ok(())
    }
}

impl BitOr for RegexOptions {
    type Output = RegexOptions;
    #[inline]
    fn bitor(self, rhs: RegexOptions) -> RegexOptions {
        RegexOptions(self.0 | rhs.0)
    }
}

impl BitOrAssign for RegexOptions {
    #[inline]
    fn bitor_assign(&mut self, rhs: RegexOptions) {
        self.0 |= rhs.0;
    }
}

/// Construction-time option rejection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionsError {
    UnknownBits(u16),
    /// The named option cannot be combined with the ECMAScript dialect.
    InvalidCombination(&'static str),
}

impl fmt::Display for OptionsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionsError::UnknownBits(bits) => {
                write!(f, "unrecognized option bits: {bits:#x}")
            }
            OptionsError::InvalidCombination(name) => {
                write!(f, "option {name} cannot be combined with EcmaScript")
            }
        }
    }
}

impl std::error::Error for OptionsError {}
