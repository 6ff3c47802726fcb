use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// The editable form caps both the interval and the occurrence count,
// matching the limits of the legacy appointment forms.
pub const MAX_INTERVAL: u32 = 999;
pub const DEFAULT_MAX_COUNT: u32 = 999;

// ------------- Frequency -------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    pub const ALL: [Frequency; 4] = [
        Frequency::Daily,
        Frequency::Weekly,
        Frequency::Monthly,
        Frequency::Yearly,
    ];
    /// The keyword used in the canonical rule text.
    pub fn token(&self) -> &'static str {
        match self {
            Frequency::Daily => "DAILY",
            Frequency::Weekly => "WEEKLY",
            Frequency::Monthly => "MONTHLY",
            Frequency::Yearly => "YEARLY",
        }
    }
    pub fn from_token(token: &str) -> Option<Frequency> {
        Frequency::ALL.iter().find(|f| f.token() == token).copied()
    }
    /// The singular unit used in human readable descriptions ("every 2 weeks").
    pub fn unit(&self) -> &'static str {
        match self {
            Frequency::Daily => "day",
            Frequency::Weekly => "week",
            Frequency::Monthly => "month",
            Frequency::Yearly => "year",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.token())
    }
}

// ------------- Weekday -------------
// Ordinals follow the convention of the legacy forms: 0 = Sunday .. 6 = Saturday.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(into = "u8", try_from = "u8")]
pub enum Weekday {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Sunday,
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
    ];
    pub fn index(&self) -> u8 {
        *self as u8
    }
    pub fn from_index(index: u8) -> Option<Weekday> {
        Weekday::ALL.get(index as usize).copied()
    }
    /// The two letter keyword used in the canonical rule text.
    pub fn token(&self) -> &'static str {
        match self {
            Weekday::Sunday => "SU",
            Weekday::Monday => "MO",
            Weekday::Tuesday => "TU",
            Weekday::Wednesday => "WE",
            Weekday::Thursday => "TH",
            Weekday::Friday => "FR",
            Weekday::Saturday => "SA",
        }
    }
    pub fn from_token(token: &str) -> Option<Weekday> {
        Weekday::ALL.iter().find(|w| w.token() == token).copied()
    }
    pub fn name(&self) -> &'static str {
        match self {
            Weekday::Sunday => "Sunday",
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
            Weekday::Saturday => "Saturday",
        }
    }
}

impl From<Weekday> for u8 {
    fn from(w: Weekday) -> u8 {
        w.index()
    }
}

impl TryFrom<u8> for Weekday {
    type Error = String;
    fn try_from(index: u8) -> std::result::Result<Self, Self::Error> {
        Weekday::from_index(index).ok_or_else(|| format!("no weekday with ordinal {}", index))
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ------------- Termination -------------
/// Which of the three mutually exclusive end conditions governs a rule.
/// The mode is UI session state: the raw count and until fields live in
/// [RuleParts] and only the field selected by the mode is ever encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminationMode {
    #[serde(rename = "never")]
    Never,
    #[serde(rename = "count")]
    AfterCount,
    #[serde(rename = "until")]
    UntilDate,
}

/// The fully resolved end condition of a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Termination {
    Never,
    AfterCount(u32),
    UntilDate(NaiveDate),
}

// ------------- RuleParts -------------
/// The decoded, field addressable form of a canonical rule. Ephemeral:
/// it is rebuilt from the canonical text whenever that text changes and
/// is never shared across editing sessions.
///
/// By-selections irrelevant to the current frequency are retained rather
/// than cleared; the encoder gates emission on the frequency instead, so
/// they never reach the canonical text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleParts {
    pub frequency: Frequency,
    pub interval: u32,
    pub by_weekday: Vec<Weekday>,
    pub by_month_day: Vec<u32>,
    pub by_month: Vec<u32>,
    pub week_start: Weekday,
    pub count: Option<u32>,
    pub until: Option<NaiveDate>,
    /// The reference start used for interval and weekday computations.
    /// Not part of the rule itself, but required to encode one.
    pub anchor: NaiveDateTime,
}

impl RuleParts {
    /// The structured defaults: what an empty or unparsable canonical
    /// rule decodes to.
    pub fn defaults(anchor: NaiveDateTime) -> Self {
        Self {
            frequency: Frequency::Weekly,
            interval: 1,
            by_weekday: Vec::new(),
            by_month_day: Vec::new(),
            by_month: Vec::new(),
            week_start: Weekday::Monday,
            count: None,
            until: None,
            anchor,
        }
    }
    /// Resolve the end condition as selected by the given mode. A mode
    /// whose value has not been supplied yet resolves to Never, which is
    /// also what the encoder emits in that situation.
    pub fn termination(&self, mode: TerminationMode) -> Termination {
        match mode {
            TerminationMode::AfterCount => match self.count {
                Some(count) => Termination::AfterCount(count),
                None => Termination::Never,
            },
            TerminationMode::UntilDate => match self.until {
                Some(until) => Termination::UntilDate(until),
                None => Termination::Never,
            },
            TerminationMode::Never => Termination::Never,
        }
    }
    /// The mode implied by the decoded fields, used when (re)loading a
    /// canonical value: a count wins over an until date, absence of both
    /// falls back to the given mode.
    pub fn implied_mode(&self, fallback: TerminationMode) -> TerminationMode {
        if self.count.is_some() {
            TerminationMode::AfterCount
        } else if self.until.is_some() {
            TerminationMode::UntilDate
        } else {
            fallback
        }
    }
}

// ------------- SessionLimits -------------
/// Caller supplied session configuration, immutable for the lifetime of
/// one editing session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionLimits {
    pub anchor: NaiveDateTime,
    pub max_count: u32,
    pub max_until: Option<NaiveDate>,
    /// When set the advanced options (week start) are never surfaced,
    /// so edits to them are ignored rather than applied invisibly.
    pub hide_advanced: bool,
}

impl SessionLimits {
    pub fn new(anchor: NaiveDateTime) -> Self {
        Self {
            anchor,
            max_count: DEFAULT_MAX_COUNT,
            max_until: None,
            hide_advanced: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn anchor() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 6)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn weekday_ordinals_follow_sunday_first_convention() {
        assert_eq!(Weekday::Sunday.index(), 0);
        assert_eq!(Weekday::Monday.index(), 1);
        assert_eq!(Weekday::Saturday.index(), 6);
        assert_eq!(Weekday::from_index(3), Some(Weekday::Wednesday));
        assert_eq!(Weekday::from_index(7), None);
    }

    #[test]
    fn weekday_tokens_round_trip() {
        for weekday in Weekday::ALL {
            assert_eq!(Weekday::from_token(weekday.token()), Some(weekday));
        }
        assert_eq!(Weekday::from_token("XX"), None);
    }

    #[test]
    fn frequency_tokens_round_trip() {
        for frequency in Frequency::ALL {
            assert_eq!(Frequency::from_token(frequency.token()), Some(frequency));
        }
        assert_eq!(Frequency::from_token("HOURLY"), None);
    }

    #[test]
    fn termination_resolves_by_mode_not_by_field_presence() {
        let mut parts = RuleParts::defaults(anchor());
        parts.count = Some(10);
        parts.until = NaiveDate::from_ymd_opt(2026, 1, 1);
        assert_eq!(
            parts.termination(TerminationMode::AfterCount),
            Termination::AfterCount(10)
        );
        assert_eq!(
            parts.termination(TerminationMode::Never),
            Termination::Never
        );
        // A selected mode without a supplied value resolves to Never.
        parts.count = None;
        assert_eq!(
            parts.termination(TerminationMode::AfterCount),
            Termination::Never
        );
    }

    #[test]
    fn implied_mode_prefers_count_over_until() {
        let mut parts = RuleParts::defaults(anchor());
        assert_eq!(
            parts.implied_mode(TerminationMode::Never),
            TerminationMode::Never
        );
        parts.until = NaiveDate::from_ymd_opt(2026, 1, 1);
        assert_eq!(
            parts.implied_mode(TerminationMode::Never),
            TerminationMode::UntilDate
        );
        parts.count = Some(3);
        assert_eq!(
            parts.implied_mode(TerminationMode::Never),
            TerminationMode::AfterCount
        );
    }
}
