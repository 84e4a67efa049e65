//! Boundary behaviors and cross-cutting invariants from spec.md §8 that
//! aren't tied to one of the named scenarios.

use diffmove::record::{BodyInfo, DiffInfo, GroupType, Info};
use diffmove::{mover, process_lines_with_threshold};

fn lines(text: &str) -> Vec<&str> {
    text.lines().collect()
}

#[test]
fn empty_input_produces_no_groups() {
    let groups = process_lines_with_threshold(Vec::<&str>::new(), 0.3).unwrap();
    assert!(groups.is_empty());
}

#[test]
fn non_diff_input_is_a_single_group() {
    let groups = process_lines_with_threshold(lines("just some prose\nmore prose\n"), 0.3).unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].group_type, GroupType::NonDiff);
}

#[test]
fn interleaved_diff_and_non_diff_groups_stay_ordered() {
    let diff = lines(concat!(
        "preamble\n",
        "diff --git a/x b/x\n",
        "--- a/x\n",
        "+++ b/x\n",
        "@@ -1,1 +0,0 @@\n",
        "-hello world\n",
        "\n",
        "between files\n",
        "\n",
        "diff --git a/y b/y\n",
        "--- a/y\n",
        "+++ b/y\n",
        "@@ -0,0 +1,1 @@\n",
        "+hello world\n",
    ));
    let groups = process_lines_with_threshold(diff, 0.3).unwrap();
    let types: Vec<_> = groups.iter().map(|g| g.group_type).collect();
    assert_eq!(
        types,
        vec![
            GroupType::NonDiff,
            GroupType::Diff,
            GroupType::NonDiff,
            GroupType::Diff,
        ]
    );
    // Moves don't cross group boundaries: each file's diff is its own
    // group, so the removed/added pair above never gets paired up.
    for g in &groups {
        assert!(
            g.items
                .iter()
                .all(|r| !matches!(r.info, Info::Diff(DiffInfo::Comment(_))))
        );
    }
}

#[test]
fn every_body_item_has_a_ref_with_a_populated_file_header() {
    let diff = lines(concat!(
        "diff --git a/x b/x\n",
        "--- a/x\n",
        "+++ b/x\n",
        "@@ -1,2 +1,2 @@\n",
        " context line\n",
        "-removed line\n",
        "+added line\n",
        "\\ No newline at end of file\n",
    ));
    let groups = process_lines_with_threshold(diff, 0.3).unwrap();
    let group = &groups[0];
    for item in &group.items {
        if let Info::Diff(DiffInfo::Body(body)) = &item.info
            && !matches!(body, BodyInfo::HunkLines)
        {
            let link = item.diff_ref.as_ref().expect("body item needs a ref");
            assert!(!link.file_header.is_empty());
        }
    }
}

#[test]
fn no_newline_marker_is_excluded_from_move_detection() {
    // A removed line and a "\ No newline" marker with identical payload
    // text must not be paired by the Mover; only `added`/`removed` feed it.
    let diff = lines(concat!(
        "diff --git a/x b/x\n",
        "--- a/x\n",
        "+++ b/x\n",
        "@@ -1,1 +1,1 @@\n",
        "-same text\n",
        "+same text\n",
        "\\ No newline at end of file\n",
    ));
    let groups = process_lines_with_threshold(diff, 0.3).unwrap();
    let group = &groups[0];
    let comments = group
        .items
        .iter()
        .filter(|r| matches!(r.info, Info::Diff(DiffInfo::Comment(_))))
        .count();
    assert_eq!(comments, 2);
}

#[test]
fn env_threshold_falls_back_to_default_when_unset_or_malformed() {
    // SAFETY: test runs single-threaded within this process for this var;
    // no other test in this binary reads or writes `T`.
    unsafe {
        std::env::remove_var("T");
    }
    assert_eq!(mover::threshold_from_env(), mover::DEFAULT_THRESHOLD);

    unsafe {
        std::env::set_var("T", "not-a-number");
    }
    assert_eq!(mover::threshold_from_env(), mover::DEFAULT_THRESHOLD);

    unsafe {
        std::env::set_var("T", "0.75");
    }
    assert_eq!(mover::threshold_from_env(), 0.75);

    unsafe {
        std::env::remove_var("T");
    }
}
