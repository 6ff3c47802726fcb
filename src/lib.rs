//! Recurrence – the recurrence-rule editing subsystem of the appointments
//! module, extracted as a standalone service.
//!
//! The crate centers on two cooperating pieces:
//! * The codec (see [`codec`]) maps the canonical textual rule encoding
//!   (`DTSTART:...` / `RRULE:FREQ=...;INTERVAL=...;...`) to the structured
//!   in-memory form [`rule::RuleParts`] and back, and derives the human
//!   readable description used by read only views.
//! * The editor (see [`editor`]) owns one editing session: it merges single
//!   field edits into the last known structured form, re-encodes with the
//!   active termination mode and emits the new canonical text - exactly one
//!   synchronous emission per accepted edit.
//!
//! ## Modules
//! * [`rule`] – Core constructs: frequency, weekday, termination, the
//!   structured rule and the per-session limits.
//! * [`codec`] – The pest based parser/serializer plus the description
//!   renderer. Grammar details live in `rrule.pest`.
//! * [`editor`] – The editing session state machine.
//! * [`interface`] – Session registry: open/edit/reset/close by id, with a
//!   keep-last-good-value guard around encode failures.
//! * [`server`] – A thin axum surface over the registry and the read path.
//! * [`config`] – Runtime settings for the service binary.
//! * [`error`] – The crate error taxonomy.
//!
//! ## Failure policy
//! No error crosses the editor boundary as a panic. Malformed canonical
//! text degrades to structured defaults plus the fixed "Invalid rule"
//! description; encode failures are explicit [`error::RecurrenceError`]
//! values that the registry translates into "keep the last good value".
//!
//! ## Quick Start
//! ```
//! use recurrence::rule::SessionLimits;
//! use recurrence::editor::{Edit, Editor};
//! use chrono::NaiveDate;
//!
//! let anchor = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap().and_hms_opt(0, 0, 0).unwrap();
//! let mut editor = Editor::new("", SessionLimits::new(anchor));
//! let outcome = editor.apply(Edit::Interval(2));
//! assert!(outcome.emitted().unwrap().contains("INTERVAL=2"));
//! ```

pub mod codec;
pub mod config;
pub mod editor;
pub mod error;
pub mod interface;
pub mod rule;
pub mod server;
