//! Property-based tests for linkscout using proptest
//!
//! These tests generate random inputs to check that extraction and merging
//! behave as set operations regardless of input.

use assert_cmd::prelude::*;
use linkscout::{MatchSet, extract};
use proptest::prelude::*;
use std::collections::HashSet;
use std::fs;
use std::process::Command;

const NAME: &str = "linkscout";

/// Root-relative paths that always satisfy the extraction rule
fn path_strategy() -> impl Strategy<Value = String> {
    (
        "[a-z]{2,8}",
        prop::collection::vec("[a-z0-9_]{1,8}", 0..4),
    )
        .prop_map(|(first, rest)| {
            let mut path = format!("/{first}");
            for segment in rest {
                path.push('/');
                path.push_str(&segment);
            }
            path
        })
}

/// Absolute URLs that always satisfy the extraction rule
fn url_strategy() -> impl Strategy<Value = String> {
    (
        prop_oneof![Just("http"), Just("https"), Just("wss")],
        "[a-z]{3,10}",
        prop_oneof![Just("com"), Just("org"), Just("io")],
        prop::collection::vec("[a-z0-9]{1,8}", 0..3),
    )
        .prop_map(|(scheme, host, tld, segments)| {
            let mut url = format!("{scheme}://{host}.{tld}");
            for segment in segments {
                url.push('/');
                url.push_str(&segment);
            }
            url
        })
}

/// Bare filenames with an extension the rule knows
fn filename_strategy() -> impl Strategy<Value = String> {
    (
        "[a-zA-Z0-9_]{1,12}",
        prop_oneof![Just("js"), Just("json"), Just("php"), Just("html"), Just("xml")],
    )
        .prop_map(|(stem, ext)| format!("{stem}.{ext}"))
}

fn link_strategy() -> impl Strategy<Value = String> {
    prop_oneof![path_strategy(), url_strategy(), filename_strategy()]
}

/// Source-like text with links in varying quote styles and surrounding code
fn content_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            link_strategy().prop_map(|link| format!("fetch(\"{link}\");")),
            link_strategy().prop_map(|link| format!("var u = '{link}';")),
            link_strategy().prop_map(|link| format!("<a href=\"{link}\">x</a>")),
            Just("// just a comment".to_string()),
            Just("let x = 1 + 2;".to_string()),
            "[a-z ]{0,30}",
        ],
        0..20,
    )
    .prop_map(|lines| lines.join("\n"))
}

fn set_strategy() -> impl Strategy<Value = MatchSet> {
    prop::collection::vec(link_strategy(), 0..10).prop_map(|items| items.into_iter().collect())
}

proptest! {
    #[test]
    fn extraction_is_deterministic(content in content_strategy()) {
        prop_assert_eq!(extract(&content), extract(&content));
    }

    #[test]
    fn extraction_never_panics(content in "\\PC{0,300}") {
        let _ = extract(&content);
    }

    #[test]
    fn quoted_links_are_found(link in link_strategy()) {
        let content = format!("call(\"{link}\")");
        let found = extract(&content);

        prop_assert!(found.contains(&link), "{} not found in {:?}", link, found.sorted());
    }

    #[test]
    fn repeated_link_is_reported_once(link in link_strategy(), repeats in 2..6usize) {
        let content: String = (0..repeats)
            .map(|i| if i % 2 == 0 { format!("a(\"{link}\"); ") } else { format!("b('{link}'); ") })
            .collect();

        let found = extract(&content);

        prop_assert_eq!(found.len(), 1);
        prop_assert!(found.contains(&link));
    }

    #[test]
    fn quoted_words_are_never_emitted(words in prop::collection::vec("[a-zA-Z ]{1,20}", 1..10)) {
        let content: String = words
            .iter()
            .map(|w| format!("say(\"{w}\"); "))
            .collect();

        prop_assert!(extract(&content).is_empty());
    }

    #[test]
    fn union_is_commutative(a in set_strategy(), b in set_strategy()) {
        let mut ab = a.clone();
        ab.merge(b.clone());
        let mut ba = b.clone();
        ba.merge(a.clone());

        prop_assert_eq!(ab, ba);
    }

    #[test]
    fn union_is_idempotent(a in set_strategy(), b in set_strategy()) {
        let mut once = a.clone();
        once.merge(b.clone());
        let mut twice = once.clone();
        twice.merge(b.clone());
        twice.merge(a.clone());

        prop_assert_eq!(once, twice);
    }

    #[test]
    fn extraction_distributes_over_concatenation(a in content_strategy(), b in content_strategy()) {
        // Joined with a newline so no quote pairs across the boundary
        let mut separate = extract(&a);
        separate.merge(extract(&b));

        prop_assert_eq!(extract(&format!("{a}\n{b}")), separate);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(8))]

    #[test]
    fn directory_output_has_no_duplicates(
        shared in prop::collection::vec(link_strategy(), 1..5),
        unique in prop::collection::vec(link_strategy(), 0..5),
    ) {
        let temp_dir = tempfile::tempdir().unwrap();
        let as_source = |links: &[String]| {
            links.iter().map(|l| format!("load(\"{l}\");\n")).collect::<String>()
        };
        fs::write(temp_dir.path().join("a.js"), as_source(&shared)).unwrap();
        fs::write(
            temp_dir.path().join("b.js"),
            as_source(&[shared.clone(), unique.clone()].concat()),
        )
        .unwrap();

        let output = Command::cargo_bin(NAME)
            .unwrap()
            .args(["--no-config", "-d"])
            .arg(temp_dir.path())
            .output()
            .unwrap();
        prop_assert!(output.status.success());

        let stdout = String::from_utf8(output.stdout).unwrap();
        let lines: Vec<&str> = stdout.lines().collect();
        let distinct: HashSet<&str> = lines.iter().copied().collect();
        let expected: HashSet<&str> = shared.iter().chain(unique.iter()).map(String::as_str).collect();

        prop_assert_eq!(lines.len(), distinct.len());
        prop_assert_eq!(distinct, expected);
    }
}
