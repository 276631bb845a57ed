// Tests for the match result model: groups, repeated captures,
// balancing groups
use crate::*;

#[test]
fn test_group_zero_is_the_overall_match() {
    let re = Regex::new("l+").unwrap();
    let m = re.find("hello").unwrap().unwrap();
    let g0 = m.group(0).unwrap();
    assert_eq!(g0.captures().len(), 1);
    assert_eq!(g0.as_str(), Some(m.as_str()));
    assert_eq!(g0.captures()[0].start(), m.start());
}

#[test]
fn test_named_groups() {
    let re = Regex::new("(?<first>\\S+)\\s(?<last>\\S+)").unwrap();
    let m = re.find("David Bau").unwrap().unwrap();
    assert_eq!(m.group_by_name("first").unwrap().as_str(), Some("David"));
    assert_eq!(m.group_by_name("last").unwrap().as_str(), Some("Bau"));
    assert_eq!(m.group(1).unwrap().as_str(), Some("David"));
    assert_eq!(m.group(2).unwrap().as_str(), Some("Bau"));
}

#[test]
fn test_quoted_group_name_syntax() {
    let re = Regex::new("(?'word'\\w+)").unwrap();
    let m = re.find("hi").unwrap().unwrap();
    assert_eq!(m.group_by_name("word").unwrap().as_str(), Some("hi"));
}

#[test]
fn test_repeated_captures_accumulate() {
    let re = Regex::new("(ab)+").unwrap();
    let m = re.find("ababab").unwrap().unwrap();
    let g = m.group(1).unwrap();
    assert_eq!(g.captures().len(), 3);
    let spans: Vec<(usize, usize)> =
        g.captures().iter().map(|c| (c.start(), c.end())).collect();
    assert_eq!(spans, [(0, 2), (2, 4), (4, 6)]);
    // the group's value is its last capture
    assert_eq!(g.as_str(), Some("ab"));
    assert_eq!(g.last().unwrap().start(), 4);
}

#[test]
fn test_final_empty_iteration_is_kept() {
    let re = Regex::new("(a?)*").unwrap();
    let m = re.find("aa").unwrap().unwrap();
    let texts: Vec<&str> = m
        .group(1)
        .unwrap()
        .captures()
        .iter()
        .map(|c| c.as_str())
        .collect();
    assert_eq!(texts, ["a", "a", ""]);
}

#[test]
fn test_unmatched_group_is_undefined() {
    let re = Regex::new("(a)|(b)").unwrap();
    let m = re.find("b").unwrap().unwrap();
    let g1 = m.group(1).unwrap();
    assert!(!g1.success());
    assert_eq!(g1.as_str(), None);
    assert!(g1.captures().is_empty());
    assert_eq!(m.group(2).unwrap().as_str(), Some("b"));
}

#[test]
fn test_out_of_range_group_is_none() {
    let re = Regex::new("(a)").unwrap();
    let m = re.find("a").unwrap().unwrap();
    assert!(m.group(7).is_none());
    assert!(m.group_by_name("nope").is_none());
}

#[test]
fn test_backtracking_unwinds_captures() {
    // the first greedy attempt captures too much and must give it back
    let re = Regex::new("(\\w+)\\s(\\w+)").unwrap();
    let m = re.find("one two").unwrap().unwrap();
    assert_eq!(m.group(1).unwrap().as_str(), Some("one"));
    assert_eq!(m.group(2).unwrap().as_str(), Some("two"));
}

#[test]
fn test_lookahead_captures_are_kept_on_success() {
    let re = Regex::new("(?=(\\w))x").unwrap();
    let m = re.find("x").unwrap().unwrap();
    assert_eq!(m.group(1).unwrap().as_str(), Some("x"));
}

#[test]
fn test_failed_lookaround_leaves_no_captures() {
    let re = Regex::new("(?!(b))a").unwrap();
    let m = re.find("a").unwrap().unwrap();
    assert!(!m.group(1).unwrap().success());
}

#[test]
fn test_balancing_group_transfer() {
    // the close group captures the span between the popped capture and
    // its own match
    let re = Regex::new("(?<Open>\\()[^()]*(?<Close-Open>\\))").unwrap();
    let m = re.find("(abc)").unwrap().unwrap();
    assert_eq!(m.group_by_name("Close").unwrap().as_str(), Some("abc"));
    // the popped capture is gone
    assert!(!m.group_by_name("Open").unwrap().success());
}

#[test]
fn test_balancing_group_pop_without_capture_fails() {
    let re = Regex::new("(?<o>a)?(?<-o>b)").unwrap();
    assert!(re.is_match("ab").unwrap());
    assert!(!re.is_match("b").unwrap());
}

#[test]
fn test_balanced_parentheses_pattern() {
    let re =
        Regex::new("^(?:[^()]|(?<o>\\()|(?<-o>\\)))*(?(o)(?!))$").unwrap();
    assert!(re.is_match("(a(b))").unwrap());
    assert!(re.is_match("no parens").unwrap());
    assert!(!re.is_match("(a))").unwrap());
    assert!(!re.is_match("((a)").unwrap());
}
