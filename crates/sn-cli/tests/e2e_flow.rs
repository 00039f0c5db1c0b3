//! End-to-end tests for the journal flow: record, browse, graph, and the
//! CSV round trip, driving the real binary against a scratch database.

use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn sn_binary() -> String {
    env!("CARGO_BIN_EXE_sn").to_string()
}

fn run(home: &Path, db: &Path, args: &[&str]) -> Output {
    Command::new(sn_binary())
        .env("HOME", home)
        // dirs consults XDG_CONFIG_HOME before HOME on Linux, so a
        // developer's real config.toml must not leak into these runs.
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env("SN_DATABASE_PATH", db)
        .args(args)
        .output()
        .expect("failed to run sn")
}

fn run_ok(home: &Path, db: &Path, args: &[&str]) -> String {
    let output = run(home, db, args);
    assert!(
        output.status.success(),
        "sn {args:?} should succeed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).expect("stdout should be UTF-8")
}

#[test]
fn default_note_is_created_on_first_use() {
    let temp = TempDir::new().unwrap();
    let db = temp.path().join("journal.db");

    let listing = run_ok(temp.path(), &db, &["notes", "list"]);
    assert!(listing.contains("ノート1"), "got: {listing}");
}

#[test]
fn recorded_stamps_show_up_newest_first() {
    let temp = TempDir::new().unwrap();
    let db = temp.path().join("journal.db");

    run_ok(
        temp.path(),
        &db,
        &["stamp", "add", "ねる", "--at", "2024-03-05 21:00"],
    );
    run_ok(
        temp.path(),
        &db,
        &["stamp", "add", "WAKE_UP", "--at", "2024-03-06 06:30"],
    );

    let timeline = run_ok(temp.path(), &db, &["timeline", "--month", "2024-03"]);
    let lines: Vec<&str> = timeline.lines().collect();
    assert_eq!(lines.len(), 2, "got: {timeline}");
    assert!(lines[0].contains("おきる"));
    assert!(lines[1].contains("ねる"));

    // Another month is empty.
    let empty = run_ok(temp.path(), &db, &["timeline", "--month", "2024-04"]);
    assert!(empty.contains("no stamps"), "got: {empty}");
}

#[test]
fn graph_reconstructs_a_night_of_sleep() {
    let temp = TempDir::new().unwrap();
    let db = temp.path().join("journal.db");

    run_ok(
        temp.path(),
        &db,
        &["stamp", "add", "SLEEP", "--at", "2024-03-05 21:00"],
    );
    run_ok(
        temp.path(),
        &db,
        &["stamp", "add", "WAKE_UP", "--at", "2024-03-06 06:30"],
    );

    let graph = run_ok(temp.path(), &db, &["graph", "--month", "2024-03"]);
    // The closed interval lands on the wake day, spanning midnight.
    assert!(graph.contains("2024-03-06  21:00-06:30"), "got: {graph}");
}

#[test]
fn review_groups_diary_entries_by_day() {
    let temp = TempDir::new().unwrap();
    let db = temp.path().join("journal.db");

    run_ok(
        temp.path(),
        &db,
        &["stamp", "add", "おくすり", "2ml", "--at", "2024-03-05 08:00"],
    );
    run_ok(
        temp.path(),
        &db,
        &["stamp", "add", "メモ", "検診", "--at", "2024-03-05 10:30"],
    );
    run_ok(
        temp.path(),
        &db,
        &["stamp", "add", "たのしい", "公園", "--at", "2024-03-06 09:00"],
    );
    // Blank free text is not a diary entry.
    run_ok(
        temp.path(),
        &db,
        &["stamp", "add", "ねる", "--at", "2024-03-06 12:00"],
    );

    let review = run_ok(temp.path(), &db, &["review", "--month", "2024-03"]);
    assert!(review.contains("2024-03-05"), "got: {review}");
    assert!(review.contains("2024-03-06"), "got: {review}");
    assert!(review.contains("2ml"), "got: {review}");
    assert!(review.contains("検診"), "got: {review}");
    assert!(review.contains("公園"), "got: {review}");
    assert!(!review.contains("ねる"), "got: {review}");

    // Day grouping: both day-5 entries sit under one header.
    let day5 = review.lines().position(|l| l == "2024-03-05").unwrap();
    let day6 = review.lines().position(|l| l == "2024-03-06").unwrap();
    assert_eq!(day6 - day5, 3, "got: {review}");

    // Kind filter narrows to matching stamps only.
    let filtered = run_ok(
        temp.path(),
        &db,
        &["review", "--month", "2024-03", "--kind", "メモ"],
    );
    assert!(filtered.contains("検診"), "got: {filtered}");
    assert!(!filtered.contains("2ml"), "got: {filtered}");

    // A month with no entries says so.
    let empty = run_ok(temp.path(), &db, &["review", "--month", "2024-04"]);
    assert!(empty.contains("no diary entries"), "got: {empty}");
}

#[test]
fn export_import_round_trip() {
    let temp = TempDir::new().unwrap();
    let db = temp.path().join("journal.db");
    let csv_path = temp.path().join("export.csv");

    run_ok(
        temp.path(),
        &db,
        &["stamp", "add", "おくすり", "2ml", "--at", "2024-03-05 08:00"],
    );
    run_ok(
        temp.path(),
        &db,
        &["stamp", "add", "メモ", "検診", "--at", "2024-03-05 10:30"],
    );
    run_ok(
        temp.path(),
        &db,
        &["export", "--output", csv_path.to_str().unwrap()],
    );

    let csv = std::fs::read_to_string(&csv_path).unwrap();
    assert!(csv.starts_with("date,kind,note,operator\n"), "got: {csv}");
    assert!(csv.contains("おくすり,2ml"), "got: {csv}");

    // Import into a fresh database.
    let other_db = temp.path().join("other.db");
    let imported = run_ok(
        temp.path(),
        &other_db,
        &["import", csv_path.to_str().unwrap()],
    );
    assert!(imported.contains("imported 2 stamps"), "got: {imported}");

    let timeline = run_ok(temp.path(), &other_db, &["timeline", "--month", "2024-03"]);
    assert!(timeline.contains("2ml"), "got: {timeline}");
    assert!(timeline.contains("検診"), "got: {timeline}");
}

#[test]
fn note_management_round_trip() {
    let temp = TempDir::new().unwrap();
    let db = temp.path().join("journal.db");

    // Bootstrap the default note first so it stays the unnamed target.
    run_ok(temp.path(), &db, &["notes", "list"]);
    run_ok(temp.path(), &db, &["notes", "create", "daytime"]);
    run_ok(temp.path(), &db, &["notes", "rename", "daytime", "nursery"]);

    let listing = run_ok(temp.path(), &db, &["notes", "list"]);
    assert!(listing.contains("nursery"), "got: {listing}");
    assert!(!listing.contains("daytime"), "got: {listing}");

    // Stamps go to the named note, not the default one.
    run_ok(
        temp.path(),
        &db,
        &[
            "stamp", "add", "たのしい", "公園", "--at", "2024-03-02 10:00", "--note", "nursery",
        ],
    );
    let timeline = run_ok(
        temp.path(),
        &db,
        &["timeline", "--month", "2024-03", "--note", "nursery"],
    );
    assert!(timeline.contains("公園"), "got: {timeline}");
    let default = run_ok(temp.path(), &db, &["timeline", "--month", "2024-03"]);
    assert!(default.contains("no stamps"), "got: {default}");

    run_ok(temp.path(), &db, &["notes", "delete", "nursery"]);
    let listing = run_ok(temp.path(), &db, &["notes", "list"]);
    assert!(!listing.contains("nursery"), "got: {listing}");
}

#[test]
fn suggestions_reflect_recent_texts() {
    let temp = TempDir::new().unwrap();
    let db = temp.path().join("journal.db");

    run_ok(
        temp.path(),
        &db,
        &["stamp", "add", "MEDICATION", "2ml", "--at", "2024-03-05 08:00"],
    );
    run_ok(
        temp.path(),
        &db,
        &["stamp", "add", "MEDICATION", "3ml", "--at", "2024-03-06 08:00"],
    );

    let suggestions = run_ok(temp.path(), &db, &["stamp", "suggest", "MEDICATION"]);
    let lines: Vec<&str> = suggestions.lines().collect();
    assert_eq!(lines, vec!["3ml", "2ml"]);
}

#[test]
fn kinds_lists_identifiers_and_labels() {
    let temp = TempDir::new().unwrap();
    let db = temp.path().join("journal.db");

    let kinds = run_ok(temp.path(), &db, &["kinds"]);
    assert_eq!(kinds.lines().count(), 10);
    assert!(kinds.contains("SLEEP  ねる"));
    assert!(kinds.contains("OUTING  おでかけ"));
}

#[test]
fn unknown_kind_fails_with_a_clear_message() {
    let temp = TempDir::new().unwrap();
    let db = temp.path().join("journal.db");

    let output = run(temp.path(), &db, &["stamp", "add", "NAP"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown stamp kind"), "got: {stderr}");
}
