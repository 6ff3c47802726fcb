use chrono::{NaiveDate, NaiveDateTime};
use recurrence::editor::{Edit, Editor, Outcome};
use recurrence::rule::{SessionLimits, TerminationMode};

fn anchor() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 1, 6)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

fn limits() -> SessionLimits {
    SessionLimits::new(anchor())
}

#[test]
fn after_count_awaits_a_value_then_emits_count() {
    let mut editor = Editor::new("", limits());
    // selecting "After" alone leaves the previously emitted value in force
    let silent = editor.apply(Edit::TerminationMode(TerminationMode::AfterCount));
    assert!(matches!(silent, Outcome::Unchanged));
    // supplying the count emits exactly once
    let rule = editor
        .apply(Edit::Count(10))
        .emitted()
        .expect("count edit emits")
        .to_string();
    assert!(rule.contains("COUNT=10"), "got {}", rule);
    assert!(!rule.contains("UNTIL"), "got {}", rule);
}

#[test]
fn until_awaits_a_value_then_emits_until() {
    let mut editor = Editor::new("", limits());
    let silent = editor.apply(Edit::TerminationMode(TerminationMode::UntilDate));
    assert!(matches!(silent, Outcome::Unchanged));
    let until = NaiveDate::from_ymd_opt(2025, 6, 1).expect("valid date");
    let rule = editor
        .apply(Edit::Until(until))
        .emitted()
        .expect("until edit emits")
        .to_string();
    assert!(rule.contains("UNTIL=20250601T000000Z"), "got {}", rule);
    assert!(!rule.contains("COUNT"), "got {}", rule);
}

#[test]
fn never_clears_an_active_count() {
    let mut editor = Editor::new("FREQ=WEEKLY;COUNT=10", limits());
    assert_eq!(editor.mode(), TerminationMode::AfterCount);
    // "Never" takes effect immediately, no value needed
    let rule = editor
        .apply(Edit::TerminationMode(TerminationMode::Never))
        .emitted()
        .expect("never emits")
        .to_string();
    assert!(!rule.contains("COUNT"), "got {}", rule);
    assert!(!rule.contains("UNTIL"), "got {}", rule);
}

#[test]
fn count_and_until_are_never_emitted_together() {
    let mut editor = Editor::new("", limits());
    let mut emitted: Vec<String> = Vec::new();
    let mut record = |outcome: Outcome| {
        if let Some(rule) = outcome.emitted() {
            emitted.push(rule.to_string());
        }
    };

    record(editor.apply(Edit::TerminationMode(TerminationMode::AfterCount)));
    record(editor.apply(Edit::Count(10)));
    record(editor.apply(Edit::TerminationMode(TerminationMode::UntilDate)));
    record(editor.apply(Edit::Until(
        NaiveDate::from_ymd_opt(2025, 6, 1).expect("valid date"),
    )));
    record(editor.apply(Edit::TerminationMode(TerminationMode::Never)));
    record(editor.apply(Edit::TerminationMode(TerminationMode::AfterCount)));
    record(editor.apply(Edit::Count(3)));

    assert!(!emitted.is_empty());
    for rule in &emitted {
        assert!(
            !(rule.contains("COUNT") && rule.contains("UNTIL")),
            "both terminations in {}",
            rule
        );
    }
    let last = emitted.last().expect("at least one emission");
    assert!(last.contains("COUNT=3"), "got {}", last);
}

#[test]
fn a_stale_count_is_not_revived_by_unrelated_edits() {
    let mut editor = Editor::new("FREQ=WEEKLY;COUNT=10", limits());
    // switch to "On date" but never supply the date
    editor.apply(Edit::TerminationMode(TerminationMode::UntilDate));
    // an unrelated edit emits under the new mode: no termination at all
    let rule = editor
        .apply(Edit::Interval(4))
        .emitted()
        .expect("interval edit emits")
        .to_string();
    assert!(!rule.contains("COUNT"), "got {}", rule);
    assert!(!rule.contains("UNTIL"), "got {}", rule);
}
