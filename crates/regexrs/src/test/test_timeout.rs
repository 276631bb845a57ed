// Tests for the resource model: timeouts, backtrack limits, program
// cache idempotence and cross-thread sharing
use crate::*;
use std::time::Duration;

#[test]
fn test_catastrophic_backtracking_times_out() {
    let re = Regex::with_options_and_timeout(
        "(a|aa)+$",
        RegexOptions::NONE,
        Duration::from_millis(25),
    )
    .unwrap();
    let input = "a".repeat(34) + "b";
    match re.find(&input) {
        Err(MatchError::Timeout(limit)) => assert_eq!(limit, Duration::from_millis(25)),
        other => panic!("expected timeout, got {other:?}"),
    }
}

#[test]
fn test_atomic_guard_bounds_the_search() {
    // the possessive form of the same pattern fails fast instead of
    // exploring the exponential split space
    let re = Regex::with_options_and_timeout(
        "(?>a+)+$",
        RegexOptions::NONE,
        Duration::from_secs(5),
    )
    .unwrap();
    let input = "a".repeat(34) + "b";
    assert!(re.find(&input).unwrap().is_none());
}

#[test]
fn test_fast_match_is_unaffected_by_timeout() {
    let re = Regex::with_options_and_timeout(
        "\\w+",
        RegexOptions::NONE,
        Duration::from_secs(5),
    )
    .unwrap();
    assert_eq!(re.find("hello").unwrap().unwrap().as_str(), "hello");
}

#[test]
fn test_no_match_is_not_an_error() {
    let re = Regex::with_options_and_timeout(
        "\\d+",
        RegexOptions::NONE,
        Duration::from_secs(5),
    )
    .unwrap();
    // "no match", "timed out" and "pattern rejected" stay distinct
    assert!(re.find("letters only").unwrap().is_none());
}

#[test]
fn test_regex_stays_usable_after_timeout() {
    let re = Regex::with_options_and_timeout(
        "(a|aa)+$",
        RegexOptions::NONE,
        Duration::from_millis(20),
    )
    .unwrap();
    let bad = "a".repeat(34) + "b";
    assert!(matches!(re.find(&bad), Err(MatchError::Timeout(_))));
    assert_eq!(re.find("aaa").unwrap().unwrap().as_str(), "aaa");
}

#[test]
fn test_find_iter_surfaces_timeout() {
    let re = Regex::with_options_and_timeout(
        "(a|aa)+$",
        RegexOptions::NONE,
        Duration::from_millis(20),
    )
    .unwrap();
    let bad = "a".repeat(34) + "b";
    let mut it = re.find_iter(&bad);
    assert!(matches!(it.next(), Some(Err(MatchError::Timeout(_)))));
    // the sequence ends after the abort
    assert!(it.next().is_none());
}

#[test]
fn test_backtrack_limit() {
    let re = Regex::new("a*b").unwrap().with_backtrack_limit(50);
    let input = "a".repeat(200);
    match re.find(&input) {
        Err(MatchError::BacktrackLimit(50)) => {}
        other => panic!("expected backtrack limit, got {other:?}"),
    }

    // a shallow search stays under the same limit
    assert!(re.find("aaab").unwrap().is_some());
}

#[test]
fn test_deep_nesting_is_heap_bounded() {
    let depth = 256;
    let pattern = format!("{}a{}", "(".repeat(depth), ")".repeat(depth));
    let re = Regex::new(&pattern).unwrap();
    let m = re.find("a").unwrap().unwrap();
    assert_eq!(m.as_str(), "a");
    assert_eq!(m.groups().len(), depth + 1);
}

#[test]
fn test_recompilation_is_idempotent() {
    // the second construction is served by the program cache; both must
    // behave identically
    let a = Regex::new("(x+)(y*)").unwrap();
    let b = Regex::new("(x+)(y*)").unwrap();
    assert_eq!(a.group_names(), b.group_names());

    let ma = a.find("zxxy").unwrap().unwrap();
    let mb = b.find("zxxy").unwrap().unwrap();
    assert_eq!((ma.start(), ma.end()), (mb.start(), mb.end()));
    assert_eq!(
        ma.group(1).unwrap().as_str(),
        mb.group(1).unwrap().as_str()
    );
}

#[test]
fn test_same_pattern_different_options_are_distinct() {
    let plain = Regex::new("abc").unwrap();
    let folded = Regex::with_options("abc", RegexOptions::IGNORE_CASE).unwrap();
    assert!(!plain.is_match("ABC").unwrap());
    assert!(folded.is_match("ABC").unwrap());
}

#[test]
fn test_shared_across_threads() {
    let re = Regex::new("(?<user>\\w+)@(\\w+)").unwrap();
    std::thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| {
                for _ in 0..50 {
                    let m = re.find("mail bob@example now").unwrap().unwrap();
                    assert_eq!(m.group_by_name("user").unwrap().as_str(), Some("bob"));
                    assert_eq!(m.group(2).unwrap().as_str(), Some("example"));
                }
            });
        }
    });
}
