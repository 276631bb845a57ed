// Tests for split, replacement templates and pattern escaping
use crate::*;

#[test]
fn test_split_plain() {
    let re = Regex::new(",").unwrap();
    assert_eq!(re.split("one,two,,three").unwrap(), ["one", "two", "", "three"]);
    assert_eq!(
        re.split_limited("one,two,,three", 0, true).unwrap(),
        ["one", "two", "three"]
    );
}

#[test]
fn test_split_keeps_captured_separators() {
    let re = Regex::new("(\\s)?(-)").unwrap();
    assert_eq!(
        re.split("once -upon-a time").unwrap(),
        ["once", " ", "-", "upon", "-", "a time"]
    );
}

#[test]
fn test_split_skips_unmatched_groups() {
    // only groups that participated contribute a separator entry
    let re = Regex::new("(x)|,").unwrap();
    assert_eq!(re.split("a,bxc").unwrap(), ["a", "b", "x", "c"]);
}

#[test]
fn test_split_max_pieces() {
    let re = Regex::new(",").unwrap();
    assert_eq!(re.split_limited("a,b,c", 2, false).unwrap(), ["a", "b,c"]);
    assert_eq!(re.split_limited("a,b,c", 1, false).unwrap(), ["a,b,c"]);
}

#[test]
fn test_split_right_to_left() {
    // pieces stay in document order; a limit consumes the rightmost
    // separators first
    let re = Regex::with_options(",", RegexOptions::RIGHT_TO_LEFT).unwrap();
    assert_eq!(re.split("a,b,c").unwrap(), ["a", "b", "c"]);
    assert_eq!(re.split_limited("a,b,c", 2, false).unwrap(), ["a,b", "c"]);
}

#[test]
fn test_replace_numbered_groups() {
    let re = Regex::new("(\\d+)-(\\d+)").unwrap();
    assert_eq!(re.replace("call 555-1234 now", "$2-$1").unwrap(), "call 1234-555 now");
}

#[test]
fn test_replace_named_groups() {
    let re = Regex::new("(?<user>\\w+)@(?<host>\\w+)").unwrap();
    assert_eq!(re.replace("bob@example", "${host}/${user}").unwrap(), "example/bob");
    // ${n} addresses groups by number too
    assert_eq!(re.replace("bob@example", "${2}").unwrap(), "example");
}

#[test]
fn test_replace_special_tokens() {
    let re = Regex::new("b+").unwrap();
    assert_eq!(re.replace("abc", "[$&]").unwrap(), "a[b]c");
    assert_eq!(re.replace("abc", "$`").unwrap(), "aac");
    assert_eq!(re.replace("abc", "$'").unwrap(), "acc");
    assert_eq!(re.replace("abc", "$_").unwrap(), "aabcc");
    assert_eq!(re.replace("abc", "$$").unwrap(), "a$c");
}

#[test]
fn test_replace_last_captured_group() {
    let re = Regex::new("(a)|(b)").unwrap();
    assert_eq!(re.replace("ab", "<$+>").unwrap(), "<a><b>");
}

#[test]
fn test_replace_unmatched_group_is_empty() {
    let re = Regex::new("(a)|(b)").unwrap();
    assert_eq!(re.replace("b", "[$1]").unwrap(), "[]");
}

#[test]
fn test_unrecognized_dollar_stays_literal() {
    let re = Regex::new("a").unwrap();
    assert_eq!(re.replace("a", "$x").unwrap(), "$x");
    assert_eq!(re.replace("a", "${unterminated").unwrap(), "${unterminated");
}

#[test]
fn test_replace_limited() {
    let re = Regex::new("a").unwrap();
    assert_eq!(re.replace_limited("aaa", "x", 2).unwrap(), "xxa");

    // right-to-left replaces the rightmost matches first
    let re = Regex::with_options("a", RegexOptions::RIGHT_TO_LEFT).unwrap();
    assert_eq!(re.replace_limited("aaa", "x", 2).unwrap(), "axx");
}

#[test]
fn test_replace_with_function() {
    let re = Regex::new("\\d+").unwrap();
    let out = re
        .replace_with("a1 b22", |m| format!("<{}>", m.as_str()))
        .unwrap();
    assert_eq!(out, "a<1> b<22>");
}

#[test]
fn test_escape_round_trip() {
    let specials = "#$^*+(){}<>\\|. ";
    assert_eq!(Regex::unescape(&Regex::escape(specials)).unwrap(), specials);

    let mixed = "plain\ttext\nwith #$^*+(){}<>\\|. inside";
    assert_eq!(Regex::unescape(&Regex::escape(mixed)).unwrap(), mixed);
}

#[test]
fn test_escaped_text_matches_literally() {
    let raw = "3.14 * (2+2)?";
    let re = Regex::new(&Regex::escape(raw)).unwrap();
    assert!(re.is_match("value 3.14 * (2+2)? end").unwrap());
    assert!(!re.is_match("3x14 * (2+2)?").unwrap());
}

#[test]
fn test_unescape_rejects_bad_input() {
    assert_eq!(
        Regex::unescape("oops\\").unwrap_err().kind,
        PatternErrorKind::TrailingBackslash
    );
    assert_eq!(
        Regex::unescape("\\8").unwrap_err().kind,
        PatternErrorKind::UnrecognizedEscape
    );
}
