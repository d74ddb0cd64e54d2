//! Line differ integration tests.

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use smartdiff_core::{diff_lines, LineDiffSettings, LineStatus};

fn statuses(text_a: &str, text_b: &str, settings: Option<&LineDiffSettings>) -> Vec<LineStatus> {
    diff_lines(text_a, text_b, settings)
        .records
        .iter()
        .map(|r| r.status)
        .collect()
}

// ============================================================================
// BASIC LINE DIFFS
// ============================================================================

#[test]
fn ld001_config_file_edit() {
    let old = "host = localhost\nport = 8080\ndebug = false\n";
    let new = "host = localhost\nport = 9090\ndebug = false\nworkers = 4\n";

    let result = diff_lines(old, new, None);

    assert_eq!(
        result.records.iter().map(|r| r.status).collect::<Vec<_>>(),
        vec![
            LineStatus::Unchanged,
            LineStatus::Removed,
            LineStatus::Added,
            LineStatus::Unchanged,
            LineStatus::Added
        ]
    );
    assert_eq!(result.stats.total, 5);
    assert_eq!(result.stats.unchanged, 2);
    assert_eq!(result.similarity_percentage, 40);
}

#[test]
fn ld002_moved_block_is_removed_and_added() {
    let old = "a\nb\nc\nd";
    let new = "c\nd\na\nb";

    let result = diff_lines(old, new, None);

    assert_eq!(result.stats.unchanged, 2);
    assert_eq!(result.stats.removed, 2);
    assert_eq!(result.stats.added, 2);
}

#[test]
fn ld003_trailing_newline_is_not_a_line() {
    assert_eq!(
        statuses("one\ntwo\n", "one\ntwo", None),
        vec![LineStatus::Unchanged, LineStatus::Unchanged]
    );
}

#[test]
fn ld004_pairing_is_opt_in() {
    let old = "title\nfirst draft\nend";
    let new = "title\nsecond draft\nend";

    assert!(!statuses(old, new, None).contains(&LineStatus::Modified));

    let settings = LineDiffSettings::new().with_pair_modified(true);
    assert_eq!(
        statuses(old, new, Some(&settings)),
        vec![LineStatus::Unchanged, LineStatus::Modified, LineStatus::Unchanged]
    );
}

#[test]
fn ld005_result_serializes_with_wire_names() {
    let result = diff_lines("a", "b", None);
    let wire: serde_json::Value = serde_json::from_str(&result.to_json()).unwrap();

    assert_eq!(wire["records"][0]["status"], "removed");
    assert_eq!(wire["records"][0]["lineNumber"], 1);
    assert_eq!(wire["records"][1]["newLine"], 1);
    assert_eq!(wire["similarityPercentage"], 0);
}

#[test]
fn ld006_keeps_longest_common_subsequence_over_longest_block() {
    let old = "X\nY\nZ\na\n1\nb\n2\nc\n3\nd";
    let new = "a\nb\nc\nd\nX\nY\nZ";

    let result = diff_lines(old, new, None);
    let unchanged: Vec<&str> = result
        .records
        .iter()
        .filter(|r| r.status == LineStatus::Unchanged)
        .map(|r| r.content.as_str())
        .collect();

    assert_eq!(unchanged, vec!["a", "b", "c", "d"]);
    assert_eq!(result.stats.removed, 6);
    assert_eq!(result.stats.added, 3);
}

// ============================================================================
// PROPERTIES
// ============================================================================

fn arb_text() -> impl Strategy<Value = String> {
    prop::collection::vec("[a-c ]{0,3}", 0..10).prop_map(|lines| lines.join("\n"))
}

fn lcs_len(a: &[&str], b: &[&str]) -> usize {
    let mut table = vec![vec![0usize; b.len() + 1]; a.len() + 1];
    for i in 1..=a.len() {
        for j in 1..=b.len() {
            table[i][j] = if a[i - 1] == b[j - 1] {
                table[i - 1][j - 1] + 1
            } else {
                table[i - 1][j].max(table[i][j - 1])
            };
        }
    }
    table[a.len()][b.len()]
}

proptest! {
    #[test]
    fn ld100_rows_rebuild_both_inputs(a in arb_text(), b in arb_text(), pair in any::<bool>()) {
        let settings = LineDiffSettings::new().with_pair_modified(pair);
        let result = diff_lines(&a, &b, Some(&settings));

        prop_assert_eq!(result.old_lines(), a.lines().collect::<Vec<_>>());
        prop_assert_eq!(result.new_lines(), b.lines().collect::<Vec<_>>());
    }

    #[test]
    fn ld101_round_trip_survives_normalization(a in arb_text(), b in arb_text()) {
        let settings = LineDiffSettings::new().with_ignore_whitespace(true).with_ignore_case(true);
        let result = diff_lines(&a, &b, Some(&settings));

        prop_assert_eq!(result.old_lines(), a.lines().collect::<Vec<_>>());
        prop_assert_eq!(result.new_lines(), b.lines().collect::<Vec<_>>());
        prop_assert_eq!(result.stats.total, result.records.len());
    }

    #[test]
    fn ld102_unchanged_rows_are_a_longest_common_subsequence(a in arb_text(), b in arb_text()) {
        let result = diff_lines(&a, &b, None);
        let lines_a: Vec<&str> = a.lines().collect();
        let lines_b: Vec<&str> = b.lines().collect();

        prop_assert_eq!(result.stats.unchanged, lcs_len(&lines_a, &lines_b));
    }
}
