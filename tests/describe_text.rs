use chrono::{NaiveDate, NaiveDateTime};
use recurrence::codec::{decode, describe};

fn anchor() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 1, 6)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

#[test]
fn biweekly_monday_wednesday() {
    // the canonical example from the legacy forms
    let text = "FREQ=WEEKLY;INTERVAL=2;BYDAY=MO,WE";
    let parts = decode(text, anchor()).expect("decode ok");
    assert_eq!(
        parts.by_weekday.iter().map(|w| w.index()).collect::<Vec<u8>>(),
        vec![1, 3]
    );
    let description = describe(text).expect("description");
    assert!(description.contains("every 2 weeks"), "got {}", description);
    assert!(description.contains("Monday"), "got {}", description);
    assert!(description.contains("Wednesday"), "got {}", description);
}

#[test]
fn singular_units_read_naturally() {
    assert_eq!(describe("FREQ=DAILY").as_deref(), Some("every day"));
    assert_eq!(describe("FREQ=WEEKLY").as_deref(), Some("every week"));
    assert_eq!(describe("FREQ=MONTHLY;INTERVAL=1").as_deref(), Some("every month"));
    assert_eq!(describe("FREQ=YEARLY").as_deref(), Some("every year"));
    assert_eq!(describe("FREQ=DAILY;INTERVAL=3").as_deref(), Some("every 3 days"));
}

#[test]
fn month_days_are_spelled_as_ordinals() {
    let description =
        describe("FREQ=MONTHLY;BYMONTHDAY=1,2,3,21").expect("description");
    assert_eq!(description, "every month on the 1st, 2nd, 3rd and 21st");
}

#[test]
fn yearly_rules_name_their_months() {
    let description =
        describe("FREQ=YEARLY;BYMONTH=1,6;BYMONTHDAY=15").expect("description");
    assert_eq!(description, "every year in January and June on the 15th");
}

#[test]
fn count_and_until_phrasing() {
    assert_eq!(
        describe("FREQ=WEEKLY;COUNT=10").as_deref(),
        Some("every week for 10 times")
    );
    assert_eq!(
        describe("FREQ=WEEKLY;COUNT=1").as_deref(),
        Some("every week once")
    );
    assert_eq!(
        describe("FREQ=WEEKLY;UNTIL=20260130T000000Z").as_deref(),
        Some("every week until January 30, 2026")
    );
}

#[test]
fn week_start_does_not_change_the_sentence() {
    assert_eq!(
        describe("FREQ=WEEKLY;WKST=SU"),
        describe("FREQ=WEEKLY;WKST=MO")
    );
}
