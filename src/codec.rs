//! Bidirectional mapping between the canonical rule text and [RuleParts],
//! plus the read only human description used by list and detail views.
//!
//! The lexical structure lives in `rrule.pest`; everything key or value
//! specific is validated here so that the grammar stays small. Decoding is
//! strict ([decode]) with a forgiving wrapper ([parse_or_default]) that
//! implements the editor contract: bad input degrades to the structured
//! defaults instead of surfacing an error.

use std::collections::HashSet;

use chrono::{NaiveDate, NaiveDateTime};
use lazy_static::lazy_static;
use pest::Parser;
use pest_derive::Parser;
use regex::Regex;
use tracing::warn;

use crate::error::{RecurrenceError, Result};
use crate::rule::{Frequency, RuleParts, SessionLimits, Termination, TerminationMode, Weekday};
use crate::rule::MAX_INTERVAL;

/// The fixed sentinel returned by [describe] for unparsable input.
pub const INVALID_RULE: &str = "Invalid rule";
/// The description shown when no rule has been defined yet.
pub const DEFAULT_PLACEHOLDER: &str = "Select recurrence pattern...";

#[derive(Parser)]
#[grammar = "rrule.pest"]
struct RuleText;

lazy_static! {
    // 20250106 or 20250106T000000 with an optional trailing Z
    static ref STAMP: Regex =
        Regex::new(r"^(\d{4})(\d{2})(\d{2})(?:T(\d{2})(\d{2})(\d{2})Z?)?$").unwrap();
}

fn decode_err(message: impl Into<String>) -> RecurrenceError {
    RecurrenceError::Decode {
        message: message.into(),
    }
}

fn encode_err(message: impl Into<String>) -> RecurrenceError {
    RecurrenceError::Encode {
        message: message.into(),
    }
}

/// Parse a compact timestamp literal into a date and time. A date-only
/// literal gets midnight.
fn parse_stamp(literal: &str) -> Result<NaiveDateTime> {
    let captures = STAMP
        .captures(literal)
        .ok_or_else(|| decode_err(format!("malformed timestamp '{}'", literal)))?;
    let number = |i: usize| -> u32 {
        // the regex guarantees digit groups, absent groups default to zero
        captures
            .get(i)
            .map(|m| m.as_str().parse().unwrap_or(0))
            .unwrap_or(0)
    };
    let date = NaiveDate::from_ymd_opt(number(1) as i32, number(2), number(3))
        .ok_or_else(|| decode_err(format!("timestamp '{}' is not a valid date", literal)))?;
    let time = date
        .and_hms_opt(number(4), number(5), number(6))
        .ok_or_else(|| decode_err(format!("timestamp '{}' is not a valid time", literal)))?;
    Ok(time)
}

fn format_stamp(moment: &NaiveDateTime) -> String {
    moment.format("%Y%m%dT%H%M%SZ").to_string()
}

/// Strictly decode canonical rule text. Unknown or duplicated keys,
/// malformed values and unsupported combinations are all [RecurrenceError::Decode]
/// errors; the forgiving fallback behaviour lives in [parse_or_default].
pub fn decode(text: &str, anchor: NaiveDateTime) -> Result<RuleParts> {
    let trimmed = text.trim();
    let mut pairs = RuleText::parse(Rule::rule_text, trimmed)
        .map_err(|e| decode_err(e.to_string()))?;
    let rule_text = pairs
        .next()
        .ok_or_else(|| RecurrenceError::Invariant("empty parse result".into()))?;

    let mut parts = RuleParts::defaults(anchor);
    let mut frequency: Option<Frequency> = None;
    let mut seen: HashSet<String> = HashSet::new();

    for section in rule_text.into_inner() {
        match section.as_rule() {
            Rule::dtstart => {
                for inner in section.into_inner() {
                    if inner.as_rule() == Rule::stamp {
                        parts.anchor = parse_stamp(inner.as_str())?;
                    }
                }
            }
            Rule::rrule => {
                for part in section.into_inner() {
                    let mut kv = part.into_inner();
                    let key = kv
                        .next()
                        .ok_or_else(|| RecurrenceError::Invariant("part without key".into()))?
                        .as_str();
                    let value = kv
                        .next()
                        .ok_or_else(|| RecurrenceError::Invariant("part without value".into()))?
                        .as_str();
                    if !seen.insert(key.to_string()) {
                        return Err(decode_err(format!("duplicate part '{}'", key)));
                    }
                    apply_part(&mut parts, &mut frequency, key, value)?;
                }
            }
            Rule::EOI => (),
            _ => (),
        }
    }

    parts.frequency =
        frequency.ok_or_else(|| decode_err("missing required part 'FREQ'"))?;
    parts.by_weekday.sort();
    parts.by_weekday.dedup();
    parts.by_month_day.sort();
    parts.by_month_day.dedup();
    parts.by_month.sort();
    parts.by_month.dedup();
    Ok(parts)
}

fn apply_part(
    parts: &mut RuleParts,
    frequency: &mut Option<Frequency>,
    key: &str,
    value: &str,
) -> Result<()> {
    match key {
        "FREQ" => {
            *frequency = Some(
                Frequency::from_token(value)
                    .ok_or_else(|| decode_err(format!("unsupported frequency '{}'", value)))?,
            );
        }
        "INTERVAL" => {
            let interval: u32 = value
                .parse()
                .map_err(|_| decode_err(format!("malformed interval '{}'", value)))?;
            if interval == 0 {
                return Err(decode_err("interval must be positive"));
            }
            // legacy values may carry intervals beyond the form cap; clamp
            // so that loaded parts always re-encode
            parts.interval = interval.min(MAX_INTERVAL);
        }
        "BYDAY" => {
            for token in value.split(',') {
                let weekday = Weekday::from_token(token).ok_or_else(|| {
                    decode_err(format!("unsupported weekday '{}'", token))
                })?;
                parts.by_weekday.push(weekday);
            }
        }
        "BYMONTHDAY" => {
            for token in value.split(',') {
                let day: u32 = token
                    .parse()
                    .map_err(|_| decode_err(format!("malformed month day '{}'", token)))?;
                if !(1..=31).contains(&day) {
                    return Err(decode_err(format!("month day {} out of range", day)));
                }
                parts.by_month_day.push(day);
            }
        }
        "BYMONTH" => {
            for token in value.split(',') {
                let month: u32 = token
                    .parse()
                    .map_err(|_| decode_err(format!("malformed month '{}'", token)))?;
                if !(1..=12).contains(&month) {
                    return Err(decode_err(format!("month {} out of range", month)));
                }
                parts.by_month.push(month);
            }
        }
        "COUNT" => {
            let count: u32 = value
                .parse()
                .map_err(|_| decode_err(format!("malformed count '{}'", value)))?;
            if count == 0 {
                return Err(decode_err("count must be positive"));
            }
            parts.count = Some(count);
        }
        "UNTIL" => {
            parts.until = Some(parse_stamp(value)?.date());
        }
        "WKST" => {
            parts.week_start = Weekday::from_token(value)
                .ok_or_else(|| decode_err(format!("unsupported week start '{}'", value)))?;
        }
        other => {
            return Err(decode_err(format!("unsupported part '{}'", other)));
        }
    }
    Ok(())
}

/// The editor facing parse: empty input yields the structured defaults
/// without attempting to decode, and decode failures degrade to the same
/// defaults. The degraded state is only visible through the description
/// fallback, never as an error value.
pub fn parse_or_default(text: &str, anchor: NaiveDateTime) -> RuleParts {
    if text.trim().is_empty() {
        return RuleParts::defaults(anchor);
    }
    match decode(text, anchor) {
        Ok(parts) => parts,
        Err(error) => {
            warn!(%error, rule = text, "invalid canonical rule, falling back to defaults");
            RuleParts::defaults(anchor)
        }
    }
}

/// Build canonical rule text from structured fields.
///
/// By-selections are emitted only when non-empty and relevant to the
/// current frequency, so stale selections retained across frequency
/// switches never leak into the canonical text. Exactly one termination
/// field is emitted, chosen by `mode`; a mode whose value has not been
/// supplied yet emits neither.
pub fn encode(parts: &RuleParts, mode: TerminationMode, limits: &SessionLimits) -> Result<String> {
    if parts.interval == 0 || parts.interval > MAX_INTERVAL {
        return Err(encode_err(format!(
            "interval {} outside 1..={}",
            parts.interval, MAX_INTERVAL
        )));
    }
    if parts.by_month_day.iter().any(|d| !(1..=31).contains(d)) {
        return Err(encode_err("month day out of range"));
    }
    if parts.by_month.iter().any(|m| !(1..=12).contains(m)) {
        return Err(encode_err("month out of range"));
    }

    let mut fields: Vec<String> = vec![
        format!("FREQ={}", parts.frequency.token()),
        format!("INTERVAL={}", parts.interval),
    ];

    // Emission of by-selections is gated on the current frequency, not on
    // the fields having been cleared.
    match parts.frequency {
        Frequency::Daily => (),
        Frequency::Weekly => {
            if !parts.by_weekday.is_empty() {
                let mut weekdays = parts.by_weekday.clone();
                weekdays.sort();
                weekdays.dedup();
                let tokens: Vec<&str> = weekdays.iter().map(|w| w.token()).collect();
                fields.push(format!("BYDAY={}", tokens.join(",")));
            }
        }
        Frequency::Monthly => {
            if !parts.by_month_day.is_empty() {
                fields.push(format!("BYMONTHDAY={}", joined(&parts.by_month_day)));
            }
        }
        Frequency::Yearly => {
            if !parts.by_month.is_empty() {
                fields.push(format!("BYMONTH={}", joined(&parts.by_month)));
                // month days only make sense once months are selected
                if !parts.by_month_day.is_empty() {
                    fields.push(format!("BYMONTHDAY={}", joined(&parts.by_month_day)));
                }
            }
        }
    }

    match parts.termination(mode) {
        Termination::Never => (),
        Termination::AfterCount(count) => {
            if count == 0 || count > limits.max_count {
                return Err(encode_err(format!(
                    "count {} outside 1..={}",
                    count, limits.max_count
                )));
            }
            fields.push(format!("COUNT={}", count));
        }
        Termination::UntilDate(until) => {
            if until < limits.anchor.date() {
                return Err(encode_err(format!(
                    "until date {} is before the anchor start {}",
                    until,
                    limits.anchor.date()
                )));
            }
            if let Some(max_until) = limits.max_until {
                if until > max_until {
                    return Err(encode_err(format!(
                        "until date {} is past the allowed maximum {}",
                        until, max_until
                    )));
                }
            }
            fields.push(format!("UNTIL={}T000000Z", until.format("%Y%m%d")));
        }
    }

    fields.push(format!("WKST={}", parts.week_start.token()));

    // the anchor is stamped from the session configuration on every
    // serialization, the grammar needs it for weekday and interval math
    Ok(format!(
        "DTSTART:{}\nRRULE:{}",
        format_stamp(&limits.anchor),
        fields.join(";")
    ))
}

fn joined(values: &[u32]) -> String {
    let mut values: Vec<u32> = values.to_vec();
    values.sort();
    values.dedup();
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<String>>()
        .join(",")
}

/// Render canonical rule text as a natural language sentence. `None`
/// signals empty input, for which the caller supplies its own placeholder
/// (see [describe_or]). Unparsable input yields the fixed sentinel
/// [INVALID_RULE] rather than an error.
pub fn describe(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    match decode(trimmed, NaiveDateTime::default()) {
        Ok(parts) => Some(sentence(&parts)),
        Err(_) => Some(INVALID_RULE.to_string()),
    }
}

/// The read path used by list and detail views: always yields a sentence,
/// substituting `placeholder` when no rule has been defined yet.
pub fn describe_or(text: &str, placeholder: &str) -> String {
    describe(text).unwrap_or_else(|| placeholder.to_string())
}

fn sentence(parts: &RuleParts) -> String {
    let mut sentence = if parts.interval == 1 {
        format!("every {}", parts.frequency.unit())
    } else {
        format!("every {} {}s", parts.interval, parts.frequency.unit())
    };

    match parts.frequency {
        Frequency::Daily => (),
        Frequency::Weekly => {
            if !parts.by_weekday.is_empty() {
                let names: Vec<&str> = parts.by_weekday.iter().map(|w| w.name()).collect();
                sentence.push_str(&format!(" on {}", listed(&names)));
            }
        }
        Frequency::Monthly => {
            if !parts.by_month_day.is_empty() {
                let ordinals: Vec<String> =
                    parts.by_month_day.iter().map(|d| ordinal(*d)).collect();
                let ordinals: Vec<&str> = ordinals.iter().map(|o| o.as_str()).collect();
                sentence.push_str(&format!(" on the {}", listed(&ordinals)));
            }
        }
        Frequency::Yearly => {
            if !parts.by_month.is_empty() {
                let names: Vec<&str> = parts
                    .by_month
                    .iter()
                    .filter_map(|m| month_name(*m))
                    .collect();
                sentence.push_str(&format!(" in {}", listed(&names)));
                if !parts.by_month_day.is_empty() {
                    let ordinals: Vec<String> =
                        parts.by_month_day.iter().map(|d| ordinal(*d)).collect();
                    let ordinals: Vec<&str> = ordinals.iter().map(|o| o.as_str()).collect();
                    sentence.push_str(&format!(" on the {}", listed(&ordinals)));
                }
            }
        }
    }

    if let Some(count) = parts.count {
        if count == 1 {
            sentence.push_str(" once");
        } else {
            sentence.push_str(&format!(" for {} times", count));
        }
    } else if let Some(until) = parts.until {
        sentence.push_str(&format!(" until {}", until.format("%B %-d, %Y")));
    }

    sentence
}

// "Monday", "Monday and Wednesday", "Monday, Wednesday and Friday"
fn listed(items: &[&str]) -> String {
    match items.len() {
        0 => String::new(),
        1 => items[0].to_string(),
        n => format!("{} and {}", items[..n - 1].join(", "), items[n - 1]),
    }
}

fn ordinal(n: u32) -> String {
    let suffix = match (n % 10, n % 100) {
        (1, 11) | (2, 12) | (3, 13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{}{}", n, suffix)
}

fn month_name(month: u32) -> Option<&'static str> {
    const NAMES: [&str; 12] = [
        "January",
        "February",
        "March",
        "April",
        "May",
        "June",
        "July",
        "August",
        "September",
        "October",
        "November",
        "December",
    ];
    NAMES.get(month.checked_sub(1)? as usize).copied()
}
