//! Timesheet use cases. Every call takes the authenticated caller explicitly.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::auth::access;
use crate::error::{AppError, AppResult};
use crate::models::timesheet::{parse_week_start, EntryInput, NewEntry};
use crate::models::{Timesheet, TimesheetInput, User};
use crate::repository::TimesheetRepository;

pub struct TimesheetService {
    timesheets: Arc<dyn TimesheetRepository>,
}

fn validate_entries(entries: &[EntryInput]) -> AppResult<Vec<NewEntry>> {
    entries.iter().map(EntryInput::validate).collect()
}

impl TimesheetService {
    pub fn new(timesheets: Arc<dyn TimesheetRepository>) -> Self {
        Self { timesheets }
    }

    /// The caller's own timesheets: the one for `week_start` if given,
    /// otherwise all of them, most recent week first. A blank week counts
    /// as not given.
    pub async fn list(&self, current: &User, week_start: Option<&str>) -> AppResult<Vec<Timesheet>> {
        match week_start.filter(|raw| !raw.trim().is_empty()) {
            Some(raw) => {
                let week_start = parse_week_start(Some(raw))?;
                let found = self
                    .timesheets
                    .find_by_owner_and_week(current.id, week_start)
                    .await?;
                Ok(found.into_iter().collect())
            }
            None => self.timesheets.list_by_owner(current.id).await,
        }
    }

    pub async fn get(&self, current: &User, id: Uuid) -> AppResult<Timesheet> {
        let timesheet = self
            .timesheets
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Timesheet not found: id={id}")))?;
        access::authorize(current, timesheet.user_id())?;
        Ok(timesheet)
    }

    pub async fn create(&self, current: &User, input: &TimesheetInput) -> AppResult<Timesheet> {
        let week_start = parse_week_start(input.week_start.as_deref())?;
        if self
            .timesheets
            .find_by_owner_and_week(current.id, week_start)
            .await?
            .is_some()
        {
            return Err(AppError::Validation(format!(
                "Timesheet already exists for week start {week_start}"
            )));
        }

        let entries = validate_entries(input.entries.as_deref().unwrap_or_default())?;
        let mut timesheet = Timesheet::new(
            current.id,
            week_start,
            input.status.unwrap_or_default(),
            Utc::now(),
        );
        timesheet.replace_entries(entries);
        timesheet.ensure_entries_within_week()?;

        self.timesheets.insert(&timesheet).await?;
        tracing::info!(
            timesheet_id = %timesheet.id(),
            user_id = %current.id,
            %week_start,
            "Timesheet created"
        );
        Ok(timesheet)
    }

    /// Apply the supplied fields. `entries`, when present, replaces every
    /// existing entry.
    pub async fn update(
        &self,
        current: &User,
        id: Uuid,
        input: &TimesheetInput,
    ) -> AppResult<Timesheet> {
        let mut timesheet = self.get(current, id).await?;

        if input.week_start.is_some() {
            let week_start = parse_week_start(input.week_start.as_deref())?;
            if week_start != timesheet.week_start() {
                let clash = self
                    .timesheets
                    .find_by_owner_and_week(timesheet.user_id(), week_start)
                    .await?;
                if clash.is_some_and(|other| other.id() != id) {
                    return Err(AppError::Validation(format!(
                        "Another timesheet already exists for week start {week_start}"
                    )));
                }
                timesheet.set_week_start(week_start);
            }
        }

        if let Some(status) = input.status {
            timesheet.set_status(status);
        }

        if let Some(entries) = &input.entries {
            timesheet.replace_entries(validate_entries(entries)?);
        }

        timesheet.ensure_entries_within_week()?;
        timesheet.touch(Utc::now());

        self.timesheets.update(&timesheet).await?;
        tracing::info!(timesheet_id = %id, user_id = %current.id, "Timesheet updated");
        Ok(timesheet)
    }

    pub async fn delete(&self, current: &User, id: Uuid) -> AppResult<()> {
        let timesheet = self.get(current, id).await?;
        self.timesheets.delete(timesheet.id()).await?;
        tracing::info!(timesheet_id = %id, user_id = %current.id, "Timesheet deleted");
        Ok(())
    }
}
