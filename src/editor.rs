//! The editing session state machine.
//!
//! An [Editor] owns the structured form of one canonical rule for the
//! lifetime of an editing session. Every accepted field edit merges a
//! single field into the last known [RuleParts], re-encodes with the
//! active termination mode and yields the new canonical text - one
//! synchronous emission per edit, no intermediate invalid states. The
//! canonical text received back is the source of truth: a successful
//! emission reloads the structured form from it, exactly as the hosting
//! form would feed the value back in.

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::codec;
use crate::error::RecurrenceError;
use crate::rule::{Frequency, RuleParts, SessionLimits, TerminationMode, Weekday};

/// A single field edit, as produced by one user interaction.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum Edit {
    Frequency(Frequency),
    Interval(u32),
    ByWeekday(Vec<Weekday>),
    ByMonthDay(Vec<u32>),
    ByMonth(Vec<u32>),
    WeekStart(Weekday),
    Count(u32),
    Until(NaiveDate),
    TerminationMode(TerminationMode),
    ToggleAdvanced,
}

/// What a single edit produced.
///
/// `Unchanged` covers the deliberately silent interactions: switching to
/// a termination mode that still awaits its value, toggling the advanced
/// panel, and edits the session configuration suppresses. `Failed` is the
/// explicit form of what the legacy contract reported as an empty string;
/// [Outcome::legacy_value] recovers that contract for callers that want it.
#[derive(Debug)]
pub enum Outcome {
    Emitted { rule: String },
    Unchanged,
    Failed(RecurrenceError),
}

impl Outcome {
    /// The newly emitted canonical text, if any.
    pub fn emitted(&self) -> Option<&str> {
        match self {
            Outcome::Emitted { rule } => Some(rule),
            _ => None,
        }
    }
    /// The value the legacy change callback would have received:
    /// the new text on success, an empty string on encode failure, and
    /// nothing at all for silent interactions.
    pub fn legacy_value(&self) -> Option<&str> {
        match self {
            Outcome::Emitted { rule } => Some(rule),
            Outcome::Failed(_) => Some(""),
            Outcome::Unchanged => None,
        }
    }
}

pub struct Editor {
    limits: SessionLimits,
    parts: RuleParts,
    mode: TerminationMode,
    // UI-only disclosure state, never affects the rule value
    advanced: bool,
}

impl Editor {
    /// Start an editing session from a canonical value ("" for no rule
    /// yet). Malformed input degrades to the structured defaults; the
    /// caller sees that only through the description fallback.
    pub fn new(value: &str, limits: SessionLimits) -> Self {
        let parts = codec::parse_or_default(value, limits.anchor);
        let mode = parts.implied_mode(TerminationMode::Never);
        Self {
            limits,
            parts,
            mode,
            advanced: false,
        }
    }

    /// External value change (e.g. a form reset): re-derive everything
    /// from scratch, discarding any in-progress edit.
    pub fn load(&mut self, value: &str) {
        self.parts = codec::parse_or_default(value, self.limits.anchor);
        self.mode = self.parts.implied_mode(TerminationMode::Never);
    }

    pub fn parts(&self) -> &RuleParts {
        &self.parts
    }
    pub fn mode(&self) -> TerminationMode {
        self.mode
    }
    pub fn advanced(&self) -> bool {
        self.advanced
    }
    pub fn limits(&self) -> &SessionLimits {
        &self.limits
    }

    /// Apply one field edit. At most one emission results. The edit is
    /// merged into a copy of the last known structured form; a failed
    /// encode discards the merge, so bad field values never linger.
    pub fn apply(&mut self, edit: Edit) -> Outcome {
        debug!(?edit, "applying edit");
        let mut merged = self.parts.clone();
        match edit {
            Edit::Frequency(frequency) => {
                // by-selections of other frequencies are retained, the
                // encoder keeps them out of the canonical text
                merged.frequency = frequency;
            }
            Edit::Interval(interval) => {
                // the form coerces an empty or zero entry back to 1
                merged.interval = if interval == 0 { 1 } else { interval };
            }
            Edit::ByWeekday(weekdays) => {
                merged.by_weekday = weekdays;
            }
            Edit::ByMonthDay(days) => {
                merged.by_month_day = days;
            }
            Edit::ByMonth(months) => {
                merged.by_month = months;
            }
            Edit::WeekStart(weekday) => {
                if self.limits.hide_advanced {
                    // the control is never surfaced in this session
                    return Outcome::Unchanged;
                }
                merged.week_start = weekday;
            }
            Edit::Count(count) => {
                if self.mode != TerminationMode::AfterCount {
                    return Outcome::Unchanged;
                }
                merged.count = Some(if count == 0 { 1 } else { count });
            }
            Edit::Until(until) => {
                if self.mode != TerminationMode::UntilDate {
                    return Outcome::Unchanged;
                }
                merged.until = Some(until);
            }
            Edit::TerminationMode(mode) => {
                self.mode = mode;
                match mode {
                    // "Never" takes effect immediately
                    TerminationMode::Never => {
                        merged.count = None;
                        merged.until = None;
                    }
                    // "After" and "On date" await a concrete value; the
                    // previously emitted rule stays in force until then
                    TerminationMode::AfterCount | TerminationMode::UntilDate => {
                        return Outcome::Unchanged;
                    }
                }
            }
            Edit::ToggleAdvanced => {
                self.advanced = !self.advanced;
                return Outcome::Unchanged;
            }
        }
        self.emit(merged)
    }

    fn emit(&mut self, merged: RuleParts) -> Outcome {
        match codec::encode(&merged, self.mode, &self.limits) {
            Ok(rule) => {
                // the emitted text is authoritative for the next edit
                self.parts = codec::parse_or_default(&rule, self.limits.anchor);
                self.mode = self.parts.implied_mode(self.mode);
                Outcome::Emitted { rule }
            }
            Err(error) => {
                warn!(%error, "encode failed, keeping prior state");
                Outcome::Failed(error)
            }
        }
    }
}
