//! # Tempo Core Library
//!
//! The recurrence engine behind Tempo: expands recurring task templates into
//! the occurrences that fall in a date range and reconciles them with the
//! occurrences that were already completed or edited.
//!
//! ## Features
//!
//! - **Calendar Stepping**: daily, weekly (with weekday sets), monthly and
//!   yearly rules with arbitrary intervals and an O(1) fast-forward
//! - **Occurrence Matching**: a single predicate decides whether a day
//!   belongs to a series, including end dates and occurrence limits
//! - **Deterministic Identity**: every occurrence has a stable id derived
//!   from its template and day
//! - **Reconciliation**: persisted exceptions always win over generated
//!   occurrences, and no occurrence is returned twice
//! - **Explicit Calendars**: all day arithmetic runs in a caller-supplied
//!   timezone; the library never reads the system clock
//!
//! ## Core Modules
//!
//! - [`models`]: Tasks, recurrence rules and weekday sets
//! - [`timezone`]: Calendar context and date arithmetic helpers
//! - [`recurrence`]: Stepper, matcher, range generator and `RecurrenceManager`
//! - [`identity`]: Instance id encoding and decoding
//! - [`reconcile`]: Merging persisted rows with virtual occurrences
//! - [`materialization`]: Promoting virtual occurrences to persisted rows
//! - [`error`]: Error types
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::{NaiveDate, TimeZone, Utc};
//! use tempo_core::{
//!     models::{RecurrenceRule, Task},
//!     reconcile::merge,
//!     timezone::CalendarContext,
//! };
//!
//! let ctx = CalendarContext::from_name("Europe/Berlin").unwrap();
//! let now = Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap();
//! let standup = Task::new("Standup", now, now).recurring(RecurrenceRule::daily(1));
//!
//! let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let end = NaiveDate::from_ymd_opt(2024, 1, 7).unwrap();
//! let agenda = merge(vec![standup.clone()], &[standup], start, end, &ctx);
//!
//! // The template itself plus six generated occurrences
//! assert_eq!(agenda.len(), 7);
//! ```

pub mod error;
pub mod identity;
pub mod materialization;
pub mod models;
pub mod reconcile;
pub mod recurrence;
pub mod timezone;
