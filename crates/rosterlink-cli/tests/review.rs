use std::io::Cursor;

use insta::assert_json_snapshot;
use rosterlink_cli::review::{ReviewExit, review_session};
use rosterlink_cli::summary::summary_table;
use rosterlink_cli::types::MatchReport;
use rosterlink_map::{MatchResolver, MatchThresholds, ReconcileSession, SourceStatus};

fn names(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

fn session(sources: &[&str], targets: &[&str]) -> ReconcileSession {
    ReconcileSession::new(
        "physical",
        names(sources),
        "wyscout",
        names(targets),
        MatchResolver::new(MatchThresholds::relaxed()),
    )
}

fn run(session: &mut ReconcileSession, script: &str) -> (ReviewExit, String) {
    let mut input = Cursor::new(script.as_bytes().to_vec());
    let mut out = Vec::new();
    let exit = review_session(session, &mut input, &mut out).unwrap();
    (exit, String::from_utf8(out).unwrap())
}

#[test]
fn report_after_auto_match() {
    let mut session = session(&["Mo Salah", "Trialist"], &["Mohamed Salah"]);
    let applied = session.auto_match().unwrap();
    let report = MatchReport::from_session(&session, applied.len()).unwrap();

    assert_json_snapshot!(report, @r#"
    {
      "label": "physical",
      "target_label": "wyscout",
      "sources": 2,
      "auto": 1,
      "confirmed": 1,
      "rejected": 0,
      "suggested": 0,
      "unmatched": 1,
      "unresolved": [
        {
          "name": "Trialist",
          "classification": "Unmatched",
          "suggestion": null,
          "score_percent": 0
        }
      ]
    }
    "#);

    let rendered = summary_table(&[report]).to_string();
    assert!(rendered.contains("physical -> wyscout"));
    assert!(rendered.contains("TOTAL"));
}

#[test]
fn review_confirms_undoes_and_rejects() {
    let mut session = session(&["Mo Salah", "Trialist 7"], &["Mohamed Salah", "Kyle Walker"]);
    let (exit, output) = run(&mut session, "a\nu\n=Mohamed Salah\nr\n");

    assert_eq!(exit, ReviewExit::Finished);
    assert!(output.contains("matched Mo Salah -> Mohamed Salah"));
    assert!(output.contains("undid decision for Mo Salah"));
    assert!(output.contains("rejected Trialist 7"));
    assert!(output.contains("review complete"));

    let mapping = session.snapshot();
    assert_eq!(mapping.target_for("Mo Salah"), Some("Mohamed Salah"));
    assert_eq!(mapping.rejected, vec!["Trialist 7".to_string()]);
    assert_eq!(session.summary().history, 2);
    assert_eq!(session.available_targets(), vec!["Kyle Walker"]);
}

#[test]
fn review_reports_errors_and_keeps_going() {
    let mut session = session(&["Mo Salah"], &["Mohamed Salah"]);
    let (exit, output) = run(&mut session, "u\n=Nobody\n7\nwhat\n");

    // Input ran out before a decision was made.
    assert_eq!(exit, ReviewExit::Quit);
    assert!(output.contains("error: nothing to undo"));
    assert!(output.contains("error: unknown target name: Nobody"));
    assert!(output.contains("no option 7"));
    assert!(output.contains("unrecognized input"));
    assert_eq!(session.status("Mo Salah"), SourceStatus::Pending);
}

#[test]
fn skipped_names_stay_pending() {
    let mut session = session(&["Mo Salah", "Trialist 7"], &["Mohamed Salah"]);
    let (exit, _) = run(&mut session, "s\nr\n");

    assert_eq!(exit, ReviewExit::Finished);
    assert_eq!(session.status("Mo Salah"), SourceStatus::Pending);
    assert_eq!(session.status("Trialist 7"), SourceStatus::Rejected);
}

#[test]
fn quit_stops_immediately() {
    let mut session = session(&["Mo Salah", "Trialist 7"], &["Mohamed Salah"]);
    let (exit, _) = run(&mut session, "q\nr\n");

    assert_eq!(exit, ReviewExit::Quit);
    assert_eq!(session.pending().len(), 2);
}
