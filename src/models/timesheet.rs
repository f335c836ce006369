//! The timesheet aggregate.
//!
//! A [`Timesheet`] exclusively owns its [`TimesheetEntry`] children. Entries
//! only enter or leave through the aggregate, and every such mutation
//! recomputes `total_hours`, so the total can never drift from the entries.

use chrono::{DateTime, Days, NaiveDate, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Fractional digits kept for hours and totals.
pub const HOURS_SCALE: u32 = 2;

const DAYS_PER_WEEK: u64 = 7;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(type_name = "timesheet_status", rename_all = "UPPERCASE")]
pub enum TimesheetStatus {
    #[default]
    Open,
    Submitted,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimesheetEntry {
    pub id: Uuid,
    /// Back-reference to the owning timesheet, for lookups only.
    #[serde(skip)]
    pub timesheet_id: Uuid,
    pub work_date: NaiveDate,
    pub project_code: String,
    pub task_code: Option<String>,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub hours: Decimal,
    pub description: Option<String>,
}

/// A validated entry that has not been attached to a timesheet yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEntry {
    pub work_date: NaiveDate,
    pub project_code: String,
    pub task_code: Option<String>,
    pub hours: Decimal,
    pub description: Option<String>,
}

/// Entry payload as received from a client.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryInput {
    pub work_date: Option<String>,
    pub project_code: Option<String>,
    pub task_code: Option<String>,
    pub hours: Option<Decimal>,
    pub description: Option<String>,
}

/// Timesheet payload for create and update. On update every field is
/// optional and `entries`, when present, replaces the existing entries.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimesheetInput {
    pub week_start: Option<String>,
    pub status: Option<TimesheetStatus>,
    pub entries: Option<Vec<EntryInput>>,
}

impl EntryInput {
    pub fn validate(&self) -> AppResult<NewEntry> {
        let work_date = match self.work_date.as_deref() {
            None => return Err(AppError::Validation("Entry workDate is required".into())),
            Some(raw) if raw.trim().is_empty() => {
                return Err(AppError::Validation("Entry workDate is required".into()));
            }
            Some(raw) => parse_iso_date(raw).ok_or_else(|| {
                AppError::Validation("Invalid entry workDate format, expected yyyy-MM-dd".into())
            })?,
        };

        let project_code = self
            .project_code
            .as_deref()
            .map(str::trim)
            .filter(|code| !code.is_empty())
            .ok_or_else(|| AppError::Validation("Entry projectCode is required".into()))?
            .to_string();

        let hours = self
            .hours
            .ok_or_else(|| AppError::Validation("Entry hours is required".into()))?;
        if hours < Decimal::ZERO || hours > max_entry_hours() {
            return Err(AppError::Validation(
                "Entry hours must be between 0.00 and 24.00".into(),
            ));
        }

        Ok(NewEntry {
            work_date,
            project_code,
            task_code: self.task_code.clone(),
            hours: to_hours_scale(hours),
            description: self.description.clone(),
        })
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Timesheet {
    id: Uuid,
    user_id: Uuid,
    week_start: NaiveDate,
    status: TimesheetStatus,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    total_hours: Decimal,
    entries: Vec<TimesheetEntry>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Timesheet {
    /// Start an empty timesheet for `user_id`. The id is assigned here.
    pub fn new(
        user_id: Uuid,
        week_start: NaiveDate,
        status: TimesheetStatus,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            user_id,
            week_start,
            status,
            total_hours: to_hours_scale(Decimal::ZERO),
            entries: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Rebuild an aggregate loaded from storage. The total is recomputed
    /// from `entries`; a stored total is never trusted.
    pub fn restore(
        id: Uuid,
        user_id: Uuid,
        week_start: NaiveDate,
        status: TimesheetStatus,
        entries: Vec<TimesheetEntry>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        let mut timesheet = Self {
            id,
            user_id,
            week_start,
            status,
            total_hours: Decimal::ZERO,
            entries,
            created_at,
            updated_at,
        };
        for entry in &mut timesheet.entries {
            entry.timesheet_id = id;
        }
        timesheet.recalc_total_hours();
        timesheet
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn week_start(&self) -> NaiveDate {
        self.week_start
    }

    /// Last day of the reporting week (`week_start + 6`).
    pub fn week_end(&self) -> NaiveDate {
        self.week_start
            .checked_add_days(Days::new(DAYS_PER_WEEK - 1))
            .unwrap_or(NaiveDate::MAX)
    }

    pub fn status(&self) -> TimesheetStatus {
        self.status
    }

    pub fn total_hours(&self) -> Decimal {
        self.total_hours
    }

    pub fn entries(&self) -> &[TimesheetEntry] {
        &self.entries
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn set_week_start(&mut self, week_start: NaiveDate) {
        self.week_start = week_start;
    }

    pub fn set_status(&mut self, status: TimesheetStatus) {
        self.status = status;
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }

    /// Attach a validated entry and return its new id.
    pub fn add_entry(&mut self, entry: NewEntry) -> Uuid {
        let id = Uuid::now_v7();
        self.entries.push(TimesheetEntry {
            id,
            timesheet_id: self.id,
            work_date: entry.work_date,
            project_code: entry.project_code,
            task_code: entry.task_code,
            hours: entry.hours,
            description: entry.description,
        });
        self.recalc_total_hours();
        id
    }

    pub fn remove_entry(&mut self, entry_id: Uuid) -> Option<TimesheetEntry> {
        let index = self.entries.iter().position(|e| e.id == entry_id)?;
        let removed = self.entries.remove(index);
        self.recalc_total_hours();
        Some(removed)
    }

    /// Discard every current entry and attach `entries` in order.
    pub fn replace_entries(&mut self, entries: Vec<NewEntry>) {
        self.entries.clear();
        for entry in entries {
            self.add_entry(entry);
        }
        self.recalc_total_hours();
    }

    /// Every entry must fall within `[week_start, week_start + 6]`.
    pub fn ensure_entries_within_week(&self) -> AppResult<()> {
        let (start, end) = (self.week_start, self.week_end());
        match self
            .entries
            .iter()
            .find(|e| e.work_date < start || e.work_date > end)
        {
            Some(entry) => Err(AppError::Validation(format!(
                "Entry workDate {} is outside the week starting {start}",
                entry.work_date
            ))),
            None => Ok(()),
        }
    }

    fn recalc_total_hours(&mut self) {
        let sum: Decimal = self.entries.iter().map(|e| e.hours).sum();
        self.total_hours = to_hours_scale(sum);
    }
}

/// Parse a strict `YYYY-MM-DD` calendar date.
pub fn parse_iso_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.len() != 10 {
        return None;
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

/// Parse the `weekStart` field of a request.
pub fn parse_week_start(raw: Option<&str>) -> AppResult<NaiveDate> {
    let raw = raw
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| AppError::Validation("weekStart is required".into()))?;
    parse_iso_date(raw).ok_or_else(|| {
        AppError::Validation("Invalid weekStart format, expected yyyy-MM-dd".into())
    })
}

fn max_entry_hours() -> Decimal {
    Decimal::new(2400, HOURS_SCALE)
}

fn to_hours_scale(value: Decimal) -> Decimal {
    let mut scaled = value.round_dp_with_strategy(HOURS_SCALE, RoundingStrategy::MidpointAwayFromZero);
    scaled.rescale(HOURS_SCALE);
    scaled
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        parse_iso_date(s).unwrap()
    }

    fn entry(work_date: &str, hours: &str) -> NewEntry {
        NewEntry {
            work_date: date(work_date),
            project_code: "P1".into(),
            task_code: None,
            hours: dec(hours),
            description: None,
        }
    }

    fn input(work_date: Option<&str>, project: Option<&str>, hours: Option<&str>) -> EntryInput {
        EntryInput {
            work_date: work_date.map(Into::into),
            project_code: project.map(Into::into),
            hours: hours.map(dec),
            ..Default::default()
        }
    }

    fn week(start: &str) -> Timesheet {
        Timesheet::new(Uuid::now_v7(), date(start), TimesheetStatus::Open, Utc::now())
    }

    #[test]
    fn empty_timesheet_totals_zero_with_two_decimals() {
        let ts = week("2025-01-06");
        assert_eq!(ts.total_hours(), Decimal::ZERO);
        assert_eq!(ts.total_hours().to_string(), "0.00");
    }

    #[test]
    fn total_is_exact_sum_of_entries() {
        let mut ts = week("2025-01-06");
        ts.add_entry(entry("2025-01-06", "1.25"));
        ts.add_entry(entry("2025-01-07", "2.75"));
        ts.add_entry(entry("2025-01-08", "0.10"));
        assert_eq!(ts.total_hours(), dec("4.10"));
        assert_eq!(ts.total_hours().to_string(), "4.10");
    }

    #[test]
    fn add_then_remove_restores_total() {
        let mut ts = week("2025-01-06");
        ts.add_entry(entry("2025-01-06", "2.50"));
        ts.add_entry(entry("2025-01-08", "3.25"));
        let before = ts.total_hours();

        let id = ts.add_entry(entry("2025-01-09", "7.75"));
        assert_eq!(ts.total_hours(), dec("13.50"));

        let removed = ts.remove_entry(id).expect("entry present");
        assert_eq!(removed.hours, dec("7.75"));
        assert_eq!(ts.total_hours(), before);
        assert_eq!(ts.entries().len(), 2);
    }

    #[test]
    fn removing_unknown_entry_is_a_no_op() {
        let mut ts = week("2025-01-06");
        ts.add_entry(entry("2025-01-06", "1.00"));
        assert!(ts.remove_entry(Uuid::now_v7()).is_none());
        assert_eq!(ts.total_hours(), dec("1.00"));
    }

    #[test]
    fn replace_entries_discards_previous_ones() {
        let mut ts = week("2025-01-06");
        let old = ts.add_entry(entry("2025-01-06", "2.50"));
        ts.add_entry(entry("2025-01-08", "3.25"));

        ts.replace_entries(vec![entry("2025-01-07", "1.00")]);

        assert_eq!(ts.entries().len(), 1);
        assert!(ts.entries().iter().all(|e| e.id != old));
        assert_eq!(ts.total_hours(), dec("1.00"));
    }

    #[test]
    fn entries_point_back_to_their_timesheet() {
        let mut ts = week("2025-01-06");
        ts.add_entry(entry("2025-01-06", "1.00"));
        assert!(ts.entries().iter().all(|e| e.timesheet_id == ts.id()));
    }

    #[test]
    fn restore_recomputes_total_and_back_references() {
        let id = Uuid::now_v7();
        let now = Utc::now();
        let stale = TimesheetEntry {
            id: Uuid::now_v7(),
            timesheet_id: Uuid::nil(),
            work_date: date("2025-01-06"),
            project_code: "P".into(),
            task_code: None,
            hours: dec("4.5"),
            description: None,
        };
        let ts = Timesheet::restore(
            id,
            Uuid::now_v7(),
            date("2025-01-06"),
            TimesheetStatus::Submitted,
            vec![stale],
            now,
            now,
        );
        assert_eq!(ts.total_hours().to_string(), "4.50");
        assert_eq!(ts.entries()[0].timesheet_id, id);
    }

    #[test]
    fn hour_boundaries_are_inclusive() {
        for ok in ["0.00", "24.00", "0", "24"] {
            let valid = input(Some("2025-01-06"), Some("P"), Some(ok)).validate();
            assert!(valid.is_ok(), "{ok} should be accepted");
        }
        for bad in ["-0.25", "24.25", "24.001", "-0.01"] {
            let err = input(Some("2025-01-06"), Some("P"), Some(bad))
                .validate()
                .unwrap_err();
            assert!(matches!(err, AppError::Validation(_)), "{bad} should be rejected");
        }
    }

    #[test]
    fn missing_hours_are_rejected() {
        let err = input(Some("2025-01-06"), Some("P"), None).validate().unwrap_err();
        assert!(err.to_string().contains("hours is required"));
    }

    #[test]
    fn hours_are_normalised_to_two_decimals() {
        let e = input(Some("2025-01-06"), Some("P"), Some("2.5")).validate().unwrap();
        assert_eq!(e.hours.to_string(), "2.50");
        let e = input(Some("2025-01-06"), Some("P"), Some("1.005")).validate().unwrap();
        assert_eq!(e.hours.to_string(), "1.01");
    }

    #[test]
    fn work_date_is_mandatory_and_strict() {
        for raw in [None, Some(""), Some("06-01-2025"), Some("2025-1-6"), Some("2025-02-30")] {
            let err = input(raw, Some("P"), Some("1.00")).validate().unwrap_err();
            assert!(matches!(err, AppError::Validation(_)), "{raw:?} should be rejected");
        }
    }

    #[test]
    fn project_code_is_trimmed_and_required() {
        let err = input(Some("2025-01-06"), Some("   "), Some("1.00")).validate().unwrap_err();
        assert!(err.to_string().contains("projectCode"));

        let e = input(Some("2025-01-06"), Some("  ACME "), Some("1.00")).validate().unwrap();
        assert_eq!(e.project_code, "ACME");
    }

    #[test]
    fn entries_must_fall_inside_the_week() {
        let mut ts = week("2025-01-06");
        ts.add_entry(entry("2025-01-06", "1.00"));
        ts.add_entry(entry("2025-01-12", "1.00"));
        assert!(ts.ensure_entries_within_week().is_ok());

        ts.add_entry(entry("2025-01-14", "1.00"));
        let err = ts.ensure_entries_within_week().unwrap_err();
        assert!(err.to_string().contains("2025-01-14"));
    }

    #[test]
    fn week_start_parsing() {
        assert_eq!(parse_week_start(Some("2025-01-06")).unwrap(), date("2025-01-06"));
        assert!(parse_week_start(None).unwrap_err().to_string().contains("required"));
        assert!(parse_week_start(Some(" ")).unwrap_err().to_string().contains("required"));
        assert!(parse_week_start(Some("Jan 6")).unwrap_err().to_string().contains("format"));
    }

    #[test]
    fn hours_serialize_as_numbers_with_two_decimals() {
        let mut ts = week("2025-01-06");
        ts.add_entry(entry("2025-01-06", "2.5"));
        ts.add_entry(entry("2025-01-07", "1.6"));

        let json = serde_json::to_value(&ts).unwrap();
        assert!(json["totalHours"].is_number());
        assert_eq!(json["totalHours"].to_string(), "4.10");
        assert!(json["entries"][0]["hours"].is_number());
        assert_eq!(json["entries"][0]["hours"].to_string(), "2.50");
    }

    #[test]
    fn entry_hours_accept_numbers_and_strings() {
        let from_number: EntryInput = serde_json::from_str(r#"{"hours": 2.5}"#).unwrap();
        let from_string: EntryInput = serde_json::from_str(r#"{"hours": "2.5"}"#).unwrap();
        assert_eq!(from_number.hours, Some(dec("2.5")));
        assert_eq!(from_string.hours, Some(dec("2.5")));

        let missing: EntryInput = serde_json::from_str("{}").unwrap();
        assert_eq!(missing.hours, None);
    }
}
