// Tests for core matching semantics: literals, alternation order,
// quantifiers, anchors, scan behavior
use crate::*;

#[test]
fn test_literal_contains_at_correct_offset() {
    let re = Regex::new("ell").unwrap();
    let m = re.find("hello").unwrap().unwrap();
    assert_eq!((m.start(), m.end(), m.as_str()), (1, 4, "ell"));

    assert!(Regex::new("xyz").unwrap().find("hello").unwrap().is_none());
}

#[test]
fn test_alternation_is_ordered_choice() {
    // first alternative wins even when a later one also matches
    let m = Regex::new("ab|a").unwrap().find("ab").unwrap().unwrap();
    assert_eq!(m.as_str(), "ab");

    let m = Regex::new("a|ab").unwrap().find("ab").unwrap().unwrap();
    assert_eq!(m.as_str(), "a");
}

#[test]
fn test_greedy_vs_lazy() {
    let m = Regex::new("a.*b").unwrap().find("axbxb").unwrap().unwrap();
    assert_eq!(m.as_str(), "axbxb");

    let m = Regex::new("a.*?b").unwrap().find("axbxb").unwrap().unwrap();
    assert_eq!(m.as_str(), "axb");
}

#[test]
fn test_counted_repetition() {
    let m = Regex::new("a{2,4}").unwrap().find("aaaaa").unwrap().unwrap();
    assert_eq!(m.as_str(), "aaaa");

    let m = Regex::new("a{2,4}?").unwrap().find("aaaaa").unwrap().unwrap();
    assert_eq!(m.as_str(), "aa");

    assert!(!Regex::new("a{3}").unwrap().is_match("aa").unwrap());

    // wide enough bound to take the counted-loop path
    let m = Regex::new("a{2,50}").unwrap().find("aaa").unwrap().unwrap();
    assert_eq!(m.as_str(), "aaa");

    let m = Regex::new("(?:ab){2}").unwrap().find("ababab").unwrap().unwrap();
    assert_eq!(m.as_str(), "abab");
}

#[test]
fn test_optional_and_star() {
    let m = Regex::new("colou?r").unwrap().find("color colour").unwrap().unwrap();
    assert_eq!(m.as_str(), "color");

    let m = Regex::new("ba*").unwrap().find("xbaaay").unwrap().unwrap();
    assert_eq!(m.as_str(), "baaa");
}

#[test]
fn test_empty_body_loop_terminates() {
    // the loop exits once an iteration stops consuming
    let m = Regex::new("(?:a?)*").unwrap().find("aab").unwrap().unwrap();
    assert_eq!(m.as_str(), "aa");
}

#[test]
fn test_string_anchors() {
    assert!(Regex::new("^a").unwrap().is_match("ab").unwrap());
    assert!(!Regex::new("^b").unwrap().is_match("ab").unwrap());
    assert!(Regex::new("b$").unwrap().is_match("ab").unwrap());
    assert!(!Regex::new("a$").unwrap().is_match("ab").unwrap());

    // $ tolerates one final newline, \z does not
    assert!(Regex::new("a$").unwrap().is_match("a\n").unwrap());
    assert!(Regex::new("a\\Z").unwrap().is_match("a\n").unwrap());
    assert!(!Regex::new("a\\z").unwrap().is_match("a\n").unwrap());
    assert!(Regex::new("a\\z").unwrap().is_match("a").unwrap());
}

#[test]
fn test_word_boundaries() {
    let m = Regex::new("\\bcat\\b").unwrap().find("the cat sat").unwrap().unwrap();
    assert_eq!(m.start(), 4);
    assert!(!Regex::new("\\bcat\\b").unwrap().is_match("scatter").unwrap());
    assert!(Regex::new("\\Bcat").unwrap().is_match("scatter").unwrap());
}

#[test]
fn test_scan_start_anchor() {
    let re = Regex::new("\\Ga").unwrap();
    assert_eq!(re.find_from("aab", 1).unwrap().unwrap().start(), 1);
    assert!(re.find_from("aab", 2).unwrap().is_none());
}

#[test]
fn test_empty_pattern() {
    let m = Regex::new("").unwrap().find("ab").unwrap().unwrap();
    assert_eq!((m.start(), m.len()), (0, 0));

    let count = Regex::new("")
        .unwrap()
        .find_iter("ab")
        .map(|r| r.unwrap())
        .count();
    assert_eq!(count, 3);
}

#[test]
fn test_empty_alternation_branch() {
    let m = Regex::new("a|").unwrap().find("b").unwrap().unwrap();
    assert!(m.is_empty());
}

#[test]
fn test_find_iter_is_non_overlapping() {
    let starts: Vec<usize> = Regex::new("aa")
        .unwrap()
        .find_iter("aaaa")
        .map(|r| r.unwrap().start())
        .collect();
    assert_eq!(starts, [0, 2]);
}

#[test]
fn test_find_iter_advances_past_empty_matches() {
    let spans: Vec<(usize, usize)> = Regex::new("a*")
        .unwrap()
        .find_iter("aab")
        .map(|r| {
            let m = r.unwrap();
            (m.start(), m.end())
        })
        .collect();
    assert_eq!(spans, [(0, 2), (2, 2), (3, 3)]);
}

#[test]
fn test_find_iter_is_restartable() {
    let re = Regex::new("\\d").unwrap();
    let first: Vec<String> = re
        .find_iter("a1b2")
        .map(|r| r.unwrap().as_str().to_string())
        .collect();
    let second: Vec<String> = re
        .find_iter("a1b2")
        .map(|r| r.unwrap().as_str().to_string())
        .collect();
    assert_eq!(first, second);
    assert_eq!(first, ["1", "2"]);
}

#[test]
fn test_multichar_literal_run() {
    // adjacent literals merge into one run instruction
    let re = Regex::new("foobar").unwrap();
    let m = re.find("xxfoobarxx").unwrap().unwrap();
    assert_eq!(m.start(), 2);
}

#[test]
fn test_non_ascii_input_offsets() {
    let re = Regex::new("é+").unwrap();
    let m = re.find("aééb").unwrap().unwrap();
    assert_eq!((m.start(), m.end()), (1, 3));
    assert_eq!(m.as_str(), "éé");
}
