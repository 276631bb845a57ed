// Tests for backreferences, lookaround, atomic groups and conditionals
use crate::*;

#[test]
fn test_backreference() {
    let re = Regex::new("(\\w+) \\1").unwrap();
    let m = re.find("hi hi").unwrap().unwrap();
    assert_eq!(m.group(1).unwrap().as_str(), Some("hi"));
    assert!(!re.is_match("hi ho").unwrap());
}

#[test]
fn test_named_backreference() {
    let re = Regex::new("(?<word>\\w+) \\k<word>").unwrap();
    assert!(re.is_match("go go").unwrap());
    assert!(!re.is_match("go stop").unwrap());

    // \k can also reference by number
    let re = Regex::new("(\\w+) \\k<1>").unwrap();
    assert!(re.is_match("go go").unwrap());
}

#[test]
fn test_backreference_to_uncaptured_group_fails() {
    let re = Regex::new("(?:(a)|b)\\1").unwrap();
    assert!(re.is_match("aa").unwrap());
    // group 1 never captured on the b path, so the backreference fails
    assert!(!re.is_match("bb").unwrap());
}

#[test]
fn test_case_insensitive_backreference() {
    let re = Regex::with_options("(hello) \\1", RegexOptions::IGNORE_CASE).unwrap();
    assert!(re.is_match("Hello HELLO").unwrap());
}

#[test]
fn test_backreference_of_repeated_group_uses_last_capture() {
    let re = Regex::new("(?:(\\w);)+\\1").unwrap();
    assert!(re.is_match("a;b;b").unwrap());
    assert!(!re.is_match("a;b;a").unwrap());
}

#[test]
fn test_lookahead() {
    let re = Regex::new("\\d+(?=px)").unwrap();
    let m = re.find("100px").unwrap().unwrap();
    assert_eq!(m.as_str(), "100");
    assert!(re.find("100em").unwrap().is_none());
}

#[test]
fn test_negative_lookahead() {
    let re = Regex::new("a(?!b)").unwrap();
    assert!(re.find("ab").unwrap().is_none());
    assert_eq!(re.find("ac").unwrap().unwrap().as_str(), "a");
}

#[test]
fn test_lookbehind() {
    let re = Regex::new("(?<=\\$)\\d+").unwrap();
    let m = re.find("price $100 today").unwrap().unwrap();
    assert_eq!((m.start(), m.as_str()), (7, "100"));
    assert!(re.find("price 100").unwrap().is_none());
}

#[test]
fn test_negative_lookbehind() {
    let re = Regex::new("(?<!u)q").unwrap();
    let m = re.find("uq aq").unwrap().unwrap();
    assert_eq!(m.start(), 4);
}

#[test]
fn test_multichar_lookbehind() {
    let re = Regex::new("(?<=ab)c").unwrap();
    assert_eq!(re.find("abc").unwrap().unwrap().start(), 2);
    assert!(re.find("xbc").unwrap().is_none());
}

#[test]
fn test_lookaround_is_zero_width() {
    // both lookarounds inspect without consuming
    let re = Regex::new("(?<=a)(?=c)").unwrap();
    let m = re.find("ac").unwrap().unwrap();
    assert_eq!((m.start(), m.len()), (1, 0));
}

#[test]
fn test_atomic_group_commits() {
    // the backtracking variant can give a character back, the atomic
    // one cannot
    assert!(Regex::new("a+ab").unwrap().is_match("aaab").unwrap());
    assert!(!Regex::new("(?>a+)ab").unwrap().is_match("aaab").unwrap());
}

#[test]
fn test_possessive_quantifier() {
    assert!(Regex::new("a*a").unwrap().is_match("aaa").unwrap());
    assert!(!Regex::new("a*+a").unwrap().is_match("aaa").unwrap());
    assert!(Regex::new("a*+b").unwrap().is_match("aaab").unwrap());
}

#[test]
fn test_conditional_on_group() {
    let re = Regex::new("(a)?(?(1)b|c)").unwrap();
    assert_eq!(re.find("ab").unwrap().unwrap().as_str(), "ab");
    assert_eq!(re.find("c").unwrap().unwrap().as_str(), "c");
    assert!(!re.is_match("b").unwrap());
}

#[test]
fn test_conditional_on_named_group() {
    let re = Regex::new("(?<sign>-)?(?(sign)\\d+|0)").unwrap();
    assert_eq!(re.find("-25").unwrap().unwrap().as_str(), "-25");
    assert_eq!(re.find("075").unwrap().unwrap().as_str(), "0");
}

#[test]
fn test_conditional_on_expression() {
    let re = Regex::new("(?(?=\\d)\\d+|[a-z]+)").unwrap();
    assert_eq!(re.find("123").unwrap().unwrap().as_str(), "123");
    assert_eq!(re.find("abc").unwrap().unwrap().as_str(), "abc");
}

#[test]
fn test_conditional_without_no_branch() {
    let re = Regex::new("(a)?(?(1)b)").unwrap();
    assert_eq!(re.find("ab").unwrap().unwrap().as_str(), "ab");
    // without the group the yes branch is skipped and the conditional
    // matches empty
    let m = re.find("x").unwrap().unwrap();
    assert!(m.is_empty());
}
