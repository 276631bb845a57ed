// Code-point classification used by the character-class engine
// Fast path for Basic Latin, general path over std char predicates

/// Unicode general category. 29 assigned categories plus `Unassigned`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Category {
    UppercaseLetter,      // Lu
    LowercaseLetter,      // Ll
    TitlecaseLetter,      // Lt
    ModifierLetter,       // Lm
    OtherLetter,          // Lo
    NonSpacingMark,       // Mn
    SpacingCombiningMark, // Mc
    EnclosingMark,        // Me
    DecimalDigitNumber,   // Nd
    LetterNumber,         // Nl
    OtherNumber,          // No
    SpaceSeparator,       // Zs
    LineSeparator,        // Zl
    ParagraphSeparator,   // Zp
    Control,              // Cc
    Format,               // Cf
    Surrogate,            // Cs
    PrivateUse,           // Co
    ConnectorPunctuation, // Pc
    DashPunctuation,      // Pd
    OpenPunctuation,      // Ps
    ClosePunctuation,     // Pe
    InitialQuotePunctuation, // Pi
    FinalQuotePunctuation,   // Pf
    OtherPunctuation,     // Po
    MathSymbol,           // Sm
    CurrencySymbol,       // Sc
    ModifierSymbol,       // Sk
    OtherSymbol,          // So
    Unassigned,           // Cn
}

/// Top-level category group (the one-letter form of `\p{..}`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryGroup {
    Letter,      // L
    Mark,        // M
    Number,      // N
    Punctuation, // P
    Symbol,      // S
    Separator,   // Z
    Other,       // C
}

impl Category {
    pub fn group(self) -> CategoryGroup {
        use Category::*;
        match self {
            UppercaseLetter | LowercaseLetter | TitlecaseLetter | ModifierLetter
            | OtherLetter => CategoryGroup::Letter,
            NonSpacingMark | SpacingCombiningMark | EnclosingMark => CategoryGroup::Mark,
            DecimalDigitNumber | LetterNumber | OtherNumber => CategoryGroup::Number,
            SpaceSeparator | LineSeparator | ParagraphSeparator => CategoryGroup::Separator,
            Control | Format | Surrogate | PrivateUse | Unassigned => CategoryGroup::Other,
            ConnectorPunctuation | DashPunctuation | OpenPunctuation | ClosePunctuation
            | InitialQuotePunctuation | FinalQuotePunctuation | OtherPunctuation => {
                CategoryGroup::Punctuation
            }
            MathSymbol | CurrencySymbol | ModifierSymbol | OtherSymbol => CategoryGroup::Symbol,
        }
    }
}

/// A category test as written in a pattern: one exact category
/// (`\p{Lu}`), a whole group (`\p{L}`), or one of the composite sets
/// behind the shorthand classes, which need a single negatable item so
/// `\W`-style negation stays expressible inside `[..]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryClass {
    One(Category),
    Group(CategoryGroup),
    /// `\w`: letters, non-spacing marks, decimal digits, connectors.
    Word,
    /// `\s`: white space.
    Space,
    /// `\d`: decimal digits.
    Digit,
}

impl CategoryClass {
    /// Resolve a category name as written between the braces of `\p{..}`.
    pub fn from_name(name: &str) -> Option<CategoryClass> {
        use Category::*;
        use CategoryGroup::*;
        let class = match name {
            "L" => CategoryClass::Group(Letter),
            "M" => CategoryClass::Group(Mark),
            "N" => CategoryClass::Group(Number),
            "P" => CategoryClass::Group(Punctuation),
            "S" => CategoryClass::Group(Symbol),
            "Z" => CategoryClass::Group(Separator),
            "C" => CategoryClass::Group(Other),
            "Lu" => CategoryClass::One(UppercaseLetter),
            "Ll" => CategoryClass::One(LowercaseLetter),
            "Lt" => CategoryClass::One(TitlecaseLetter),
            "Lm" => CategoryClass::One(ModifierLetter),
            "Lo" => CategoryClass::One(OtherLetter),
            "Mn" => CategoryClass::One(NonSpacingMark),
            "Mc" => CategoryClass::One(SpacingCombiningMark),
            "Me" => CategoryClass::One(EnclosingMark),
            "Nd" => CategoryClass::One(DecimalDigitNumber),
            "Nl" => CategoryClass::One(LetterNumber),
            "No" => CategoryClass::One(OtherNumber),
            "Zs" => CategoryClass::One(SpaceSeparator),
            "Zl" => CategoryClass::One(LineSeparator),
            "Zp" => CategoryClass::One(ParagraphSeparator),
            "Cc" => CategoryClass::One(Control),
            "Cf" => CategoryClass::One(Format),
            "Cs" => CategoryClass::One(Surrogate),
            "Co" => CategoryClass::One(PrivateUse),
            "Cn" => CategoryClass::One(Unassigned),
            "Pc" => CategoryClass::One(ConnectorPunctuation),
            "Pd" => CategoryClass::One(DashPunctuation),
            "Ps" => CategoryClass::One(OpenPunctuation),
            "Pe" => CategoryClass::One(ClosePunctuation),
            "Pi" => CategoryClass::One(InitialQuotePunctuation),
            "Pf" => CategoryClass::One(FinalQuotePunctuation),
            "Po" => CategoryClass::One(OtherPunctuation),
            "Sm" => CategoryClass::One(MathSymbol),
            "Sc" => CategoryClass::One(CurrencySymbol),
            "Sk" => CategoryClass::One(ModifierSymbol),
            "So" => CategoryClass::One(OtherSymbol),
            _ => return None,
        };
        Some(class)
    }

    #[inline]
    pub fn contains(self, c: char) -> bool {
        match self {
            CategoryClass::One(want) => classify(c) == want,
            CategoryClass::Group(group) => classify(c).group() == group,
            CategoryClass::Word => is_word(c),
            CategoryClass::Space => is_whitespace(c),
            CategoryClass::Digit => classify(c) == Category::DecimalDigitNumber,
        }
    }
}

// Basic Latin categories, indexed by code point
const LATIN: [Category; 128] = {
    use Category::*;
    let mut t = [Control; 128];
    let mut i = 0x21;
    while i < 0x7F {
        t[i] = OtherPunctuation; // overwritten below where needed
        i += 1;
    }
    t[0x20] = SpaceSeparator;
    t[b'$' as usize] = CurrencySymbol;
    t[b'(' as usize] = OpenPunctuation;
    t[b')' as usize] = ClosePunctuation;
    t[b'+' as usize] = MathSymbol;
    t[b'-' as usize] = DashPunctuation;
    let mut d = b'0' as usize;
    while d <= b'9' as usize {
        t[d] = DecimalDigitNumber;
        d += 1;
    }
    t[b'<' as usize] = MathSymbol;
    t[b'=' as usize] = MathSymbol;
    t[b'>' as usize] = MathSymbol;
    let mut u = b'A' as usize;
    while u <= b'Z' as usize {
        t[u] = UppercaseLetter;
        u += 1;
    }
    t[b'[' as usize] = OpenPunctuation;
    t[b']' as usize] = ClosePunctuation;
    t[b'^' as usize] = ModifierSymbol;
    t[b'_' as usize] = ConnectorPunctuation;
    t[b'`' as usize] = ModifierSymbol;
    let mut l = b'a' as usize;
    while l <= b'z' as usize {
        t[l] = LowercaseLetter;
        l += 1;
    }
    t[b'{' as usize] = OpenPunctuation;
    t[b'|' as usize] = MathSymbol;
    t[b'}' as usize] = ClosePunctuation;
    t[b'~' as usize] = MathSymbol;
    t
};

/// Classify one Unicode scalar value.
///
/// Exact for Basic Latin. Outside it, the classification is derived from
/// std char predicates: titlecase letters, marks and a few symbol
/// subclasses collapse into their nearest neighbor category. The engine
/// only requires this function to be pure and total.
pub fn classify(c: char) -> Category {
    let cp = c as u32;
    if cp < 128 {
        return LATIN[cp as usize];
    }
    if c.is_uppercase() {
        return Category::UppercaseLetter;
    }
    if c.is_lowercase() {
        return Category::LowercaseLetter;
    }
    if c.is_alphabetic() {
        return Category::OtherLetter;
    }
    if c.is_numeric() {
        // Nl and No collapse into Nd here; telling them apart needs the
        // full category tables this classifier deliberately does without.
        return Category::DecimalDigitNumber;
    }
    if c.is_control() {
        return Category::Control;
    }
    match c {
        '\u{2028}' => return Category::LineSeparator,
        '\u{2029}' => return Category::ParagraphSeparator,
        _ => {}
    }
    if c.is_whitespace() {
        return Category::SpaceSeparator;
    }
    if matches!(cp, 0xE000..=0xF8FF | 0xF0000..=0xFFFFD | 0x100000..=0x10FFFD) {
        return Category::PrivateUse;
    }
    if matches!(cp, 0x200B..=0x200F | 0x202A..=0x202E | 0x2060..=0x2064 | 0xFEFF) {
        return Category::Format;
    }
    // Remaining assigned code points are overwhelmingly punctuation,
    // symbols and marks; report them as OtherSymbol rather than guessing
    // a finer split without tables.
    Category::OtherSymbol
}

/// White-space test (`\s` outside the ECMAScript dialect).
#[inline]
pub fn is_whitespace(c: char) -> bool {
    if (c as u32) < 128 {
        matches!(c, ' ' | '\t' | '\n' | '\x0B' | '\x0C' | '\r')
    } else {
        c.is_whitespace()
    }
}

/// Word-character test used by `\b`, `\B` and backstopping `\w`.
#[inline]
pub fn is_word(c: char) -> bool {
    if c.is_ascii() {
        c.is_ascii_alphanumeric() || c == '_'
    } else {
        c.is_alphanumeric()
    }
}

/// Simple one-to-one case folding used for IgnoreCase comparisons.
/// Multi-char lowercase expansions keep their first scalar.
#[inline]
pub fn fold(c: char) -> char {
    if c.is_ascii() {
        c.to_ascii_lowercase()
    } else {
        let mut it = c.to_lowercase();
        let first = it.next().unwrap_or(c);
        if it.next().is_none() { first } else { c }
    }
}
