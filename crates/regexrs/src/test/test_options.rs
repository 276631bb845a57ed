// Tests for option flags: case folding, multiline, explicit capture,
// pattern whitespace, right-to-left, dialect restrictions, inline groups
use crate::*;

#[test]
fn test_ignore_case_literals_and_classes() {
    let re = Regex::with_options("hello", RegexOptions::IGNORE_CASE).unwrap();
    assert!(re.is_match("say HeLLo").unwrap());
    assert!(!Regex::new("hello").unwrap().is_match("HeLLo").unwrap());

    let re = Regex::with_options("[a-z]+", RegexOptions::IGNORE_CASE).unwrap();
    assert_eq!(re.find("12ABc3").unwrap().unwrap().as_str(), "ABc");
}

#[test]
fn test_multiline_anchors() {
    let re = Regex::with_options("^b$", RegexOptions::MULTILINE).unwrap();
    assert!(re.is_match("a\nb\nc").unwrap());
    assert!(!Regex::new("^b$").unwrap().is_match("a\nb\nc").unwrap());

    // \A and \z keep their absolute meaning under Multiline
    let re = Regex::with_options("\\Ab", RegexOptions::MULTILINE).unwrap();
    assert!(!re.is_match("a\nb").unwrap());
}

#[test]
fn test_explicit_capture() {
    let re =
        Regex::with_options("(\\w+) (?<num>\\d+)", RegexOptions::EXPLICIT_CAPTURE).unwrap();
    let names: Vec<&str> = re.group_names().iter().map(|n| n.as_str()).collect();
    assert_eq!(names, ["0", "num"]);

    let m = re.find("abc 42").unwrap().unwrap();
    assert_eq!(m.groups().len(), 2);
    assert_eq!(m.group_by_name("num").unwrap().as_str(), Some("42"));
}

#[test]
fn test_ignore_pattern_whitespace() {
    let re = Regex::with_options(
        "\\d+ # leading digits\n - \\d+",
        RegexOptions::IGNORE_PATTERN_WHITESPACE,
    )
    .unwrap();
    assert!(re.is_match("12-34").unwrap());
    assert!(!re.is_match("12 - 34").unwrap());

    // an escaped space still matches a space
    let re =
        Regex::with_options("a\\ b", RegexOptions::IGNORE_PATTERN_WHITESPACE).unwrap();
    assert!(re.is_match("a b").unwrap());

    // whitespace inside a class is literal
    let re = Regex::with_options("[ x]+", RegexOptions::IGNORE_PATTERN_WHITESPACE).unwrap();
    assert_eq!(re.find("ax xb").unwrap().unwrap().as_str(), "x x");
}

#[test]
fn test_right_to_left_finds_rightmost_first() {
    let re = Regex::with_options("\\d+", RegexOptions::RIGHT_TO_LEFT).unwrap();
    let m = re.find("ab 12 cd 34").unwrap().unwrap();
    assert_eq!(m.as_str(), "34");

    let starts: Vec<usize> = re
        .find_iter("ab 12 cd 34")
        .map(|r| r.unwrap().start())
        .collect();
    assert_eq!(starts, [9, 3]);
}

#[test]
fn test_right_to_left_captures_stay_earliest_first() {
    let re = Regex::with_options("(a)+", RegexOptions::RIGHT_TO_LEFT).unwrap();
    let m = re.find("aaa").unwrap().unwrap();
    let spans: Vec<(usize, usize)> = m
        .group(1)
        .unwrap()
        .captures()
        .iter()
        .map(|c| (c.start(), c.end()))
        .collect();
    assert_eq!(spans, [(0, 1), (1, 2), (2, 3)]);
    // the group's value is still the last capture
    assert_eq!(m.group(1).unwrap().last().unwrap().start(), 2);
}

#[test]
fn test_right_to_left_backreference() {
    // the program runs right to left, so the reference sits left of the
    // group that feeds it
    let re =
        Regex::with_options("\\k<w> (?<w>\\w+)", RegexOptions::RIGHT_TO_LEFT).unwrap();
    assert!(re.is_match("hi hi").unwrap());
    assert!(!re.is_match("hi ho").unwrap());
}

#[test]
fn test_ecma_script_rejects_invalid_combinations() {
    for bad in [
        RegexOptions::RIGHT_TO_LEFT,
        RegexOptions::EXPLICIT_CAPTURE,
        RegexOptions::SINGLELINE,
    ] {
        match Regex::with_options("a", RegexOptions::ECMA_SCRIPT | bad) {
            Err(RegexError::Options(OptionsError::InvalidCombination(_))) => {}
            other => panic!("expected option rejection, got {other:?}"),
        }
    }
    // the dialect alone is fine
    assert!(Regex::with_options("a", RegexOptions::ECMA_SCRIPT).is_ok());
}

#[test]
fn test_ecma_script_restricts_constructs() {
    for pattern in ["(?<n>a)", "(x)(?(1)a|b)", "(?<o>a)(?<-o>b)"] {
        match Regex::with_options(pattern, RegexOptions::ECMA_SCRIPT) {
            Err(RegexError::Pattern(e)) => {
                assert_eq!(e.kind, PatternErrorKind::UnsupportedConstruct)
            }
            other => panic!("expected rejection of {pattern:?}, got {other:?}"),
        }
    }
}

#[test]
fn test_ecma_script_narrows_shorthand_classes() {
    // U+0663 is a decimal digit outside ASCII
    assert!(Regex::new("\\d").unwrap().is_match("\u{663}").unwrap());
    let re = Regex::with_options("\\d", RegexOptions::ECMA_SCRIPT).unwrap();
    assert!(!re.is_match("\u{663}").unwrap());
    assert!(re.is_match("7").unwrap());
}

#[test]
fn test_unknown_option_bits_are_rejected() {
    assert!(RegexOptions::from_bits(0x100).is_none());
    assert_eq!(
        RegexOptions::from_bits(0b11),
        Some(RegexOptions::IGNORE_CASE | RegexOptions::MULTILINE)
    );
}

#[test]
fn test_culture_invariant_is_accepted() {
    let re = Regex::with_options(
        "istanbul",
        RegexOptions::IGNORE_CASE | RegexOptions::CULTURE_INVARIANT,
    )
    .unwrap();
    assert!(re.is_match("ISTANBUL").unwrap());
    assert!(re.options().contains(RegexOptions::CULTURE_INVARIANT));
}

#[test]
fn test_inline_option_setter() {
    assert!(Regex::new("(?i)abc").unwrap().is_match("ABC").unwrap());

    // a setter stays in effect to the end of its enclosing group
    let re = Regex::new("(?:(?i)a)b").unwrap();
    assert!(re.is_match("Ab").unwrap());
    assert!(!re.is_match("aB").unwrap());
}

#[test]
fn test_inline_option_scope_group() {
    let re = Regex::new("(?i:ab)c").unwrap();
    assert!(re.is_match("ABc").unwrap());
    assert!(!re.is_match("ABC").unwrap());
}

#[test]
fn test_inline_option_removal() {
    let re = Regex::with_options("a(?-i)b", RegexOptions::IGNORE_CASE).unwrap();
    assert!(re.is_match("Ab").unwrap());
    assert!(!re.is_match("aB").unwrap());
}
