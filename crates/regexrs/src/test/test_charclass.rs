// Tests for character classes: sets, ranges, negation, subtraction,
// categories
use crate::*;

#[test]
fn test_simple_set_and_negation() {
    let re = Regex::new("[abc]+").unwrap();
    assert_eq!(re.find("xxcabz").unwrap().unwrap().as_str(), "cab");

    let re = Regex::new("[^abc]+").unwrap();
    assert_eq!(re.find("abXYab").unwrap().unwrap().as_str(), "XY");
}

#[test]
fn test_ranges() {
    let re = Regex::new("[a-fA-F0-9]+").unwrap();
    assert_eq!(re.find("zz1aF9gz").unwrap().unwrap().as_str(), "1aF9");
}

#[test]
fn test_reversed_range_is_rejected() {
    match Regex::new("[z-a]") {
        Err(RegexError::Pattern(e)) => {
            assert_eq!(e.kind, PatternErrorKind::InvalidCharacterClass)
        }
        other => panic!("expected class error, got {other:?}"),
    }
}

#[test]
fn test_literal_bracket_and_dash() {
    // '[' is literal inside a set, '-' is literal at the edges
    let re = Regex::new("[[a]+").unwrap();
    assert!(re.is_match("a[a").unwrap());

    let re = Regex::new("[-a]+").unwrap();
    assert_eq!(re.find("x-a-x").unwrap().unwrap().as_str(), "-a-");

    let re = Regex::new("[a-]+").unwrap();
    assert_eq!(re.find("x-a-x").unwrap().unwrap().as_str(), "-a-");
}

#[test]
fn test_shorthand_classes() {
    let re = Regex::new("\\d+").unwrap();
    assert_eq!(re.find("abc123xyz").unwrap().unwrap().as_str(), "123");

    let re = Regex::new("\\w+").unwrap();
    assert_eq!(re.find("!hi_there!").unwrap().unwrap().as_str(), "hi_there");

    let re = Regex::new("\\S+").unwrap();
    assert_eq!(re.find("  ab  ").unwrap().unwrap().as_str(), "ab");
}

#[test]
fn test_shorthand_inside_set() {
    let re = Regex::new("[\\d,]+").unwrap();
    assert_eq!(re.find("a1,2,3b").unwrap().unwrap().as_str(), "1,2,3");

    // negated shorthand inside a set
    let re = Regex::new("[\\D]+").unwrap();
    assert_eq!(re.find("12ab34").unwrap().unwrap().as_str(), "ab");
}

#[test]
fn test_class_subtraction() {
    let re = Regex::new("[a-z-[aeiou]]+").unwrap();
    assert_eq!(re.find("strength").unwrap().unwrap().as_str(), "str");

    // subtracting the complement leaves exactly the digits
    let re = Regex::new("[\\d-[\\D]]+").unwrap();
    assert_eq!(re.find("azAZ1024689").unwrap().unwrap().as_str(), "1024689");

    // subtraction of everything matches nothing
    let re = Regex::new("[a-[a]]").unwrap();
    assert!(!re.is_match("a").unwrap());
}

#[test]
fn test_dot() {
    let re = Regex::new("a.c").unwrap();
    assert!(re.is_match("axc").unwrap());
    assert!(!re.is_match("a\nc").unwrap());

    let re = Regex::with_options("a.c", RegexOptions::SINGLELINE).unwrap();
    assert!(re.is_match("a\nc").unwrap());
}

#[test]
fn test_unicode_categories() {
    let re = Regex::new("\\p{Lu}+").unwrap();
    assert_eq!(re.find("abCDef").unwrap().unwrap().as_str(), "CD");

    let re = Regex::new("\\p{L}+").unwrap();
    assert_eq!(re.find("1abc2").unwrap().unwrap().as_str(), "abc");

    let re = Regex::new("\\P{L}+").unwrap();
    assert_eq!(re.find("ab123cd").unwrap().unwrap().as_str(), "123");
}

#[test]
fn test_unknown_category_is_rejected() {
    match Regex::new("\\p{Zz}") {
        Err(RegexError::Pattern(e)) => {
            assert_eq!(e.kind, PatternErrorKind::InvalidCharacterClass)
        }
        other => panic!("expected class error, got {other:?}"),
    }
}

#[test]
fn test_class_escapes() {
    let re = Regex::new("[\\]\\[]+").unwrap();
    assert!(re.is_match("[]").unwrap());

    let re = Regex::new("[\\b]").unwrap();
    assert!(re.is_match("\u{8}").unwrap());

    let re = Regex::new("[\\x41-\\x43]+").unwrap();
    assert_eq!(re.find("zABCz").unwrap().unwrap().as_str(), "ABC");
}

#[test]
fn test_non_ascii_digits_match_digit_class() {
    // U+0663 ARABIC-INDIC DIGIT THREE is Nd
    assert!(Regex::new("\\d").unwrap().is_match("\u{663}").unwrap());
}
