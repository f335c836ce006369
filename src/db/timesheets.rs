use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgConnection;
use uuid::Uuid;

use super::{constraint_error, PgStore};
use crate::error::{AppError, AppResult};
use crate::models::{Timesheet, TimesheetEntry, TimesheetStatus};
use crate::repository::TimesheetRepository;

#[derive(sqlx::FromRow)]
struct TimesheetRow {
    id: Uuid,
    user_id: Uuid,
    week_start: NaiveDate,
    status: TimesheetStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

const TIMESHEET_COLUMNS: &str = "id, user_id, week_start, status, created_at, updated_at";

impl PgStore {
    async fn load_entries(&self, ids: &[Uuid]) -> AppResult<HashMap<Uuid, Vec<TimesheetEntry>>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let entries = sqlx::query_as::<_, TimesheetEntry>(
            "SELECT id, timesheet_id, work_date, project_code, task_code, hours, description
             FROM timesheet_entries
             WHERE timesheet_id = ANY($1)
             ORDER BY timesheet_id, position",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_timesheet: HashMap<Uuid, Vec<TimesheetEntry>> = HashMap::new();
        for entry in entries {
            by_timesheet.entry(entry.timesheet_id).or_default().push(entry);
        }
        Ok(by_timesheet)
    }

    async fn assemble(&self, rows: Vec<TimesheetRow>) -> AppResult<Vec<Timesheet>> {
        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let mut entries = self.load_entries(&ids).await?;
        Ok(rows
            .into_iter()
            .map(|row| {
                Timesheet::restore(
                    row.id,
                    row.user_id,
                    row.week_start,
                    row.status,
                    entries.remove(&row.id).unwrap_or_default(),
                    row.created_at,
                    row.updated_at,
                )
            })
            .collect())
    }

    async fn fetch_one_assembled(&self, row: Option<TimesheetRow>) -> AppResult<Option<Timesheet>> {
        match row {
            Some(row) => Ok(self.assemble(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }
}

async fn insert_entries(conn: &mut PgConnection, timesheet: &Timesheet) -> Result<(), sqlx::Error> {
    for (position, entry) in timesheet.entries().iter().enumerate() {
        sqlx::query(
            "INSERT INTO timesheet_entries
                (id, timesheet_id, position, work_date, project_code, task_code, hours, description)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(entry.id)
        .bind(timesheet.id())
        .bind(position as i32)
        .bind(entry.work_date)
        .bind(&entry.project_code)
        .bind(&entry.task_code)
        .bind(entry.hours)
        .bind(&entry.description)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

#[async_trait]
impl TimesheetRepository for PgStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Timesheet>> {
        let row = sqlx::query_as::<_, TimesheetRow>(&format!(
            "SELECT {TIMESHEET_COLUMNS} FROM timesheets WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        self.fetch_one_assembled(row).await
    }

    async fn find_by_owner_and_week(
        &self,
        user_id: Uuid,
        week_start: NaiveDate,
    ) -> AppResult<Option<Timesheet>> {
        let row = sqlx::query_as::<_, TimesheetRow>(&format!(
            "SELECT {TIMESHEET_COLUMNS} FROM timesheets WHERE user_id = $1 AND week_start = $2"
        ))
        .bind(user_id)
        .bind(week_start)
        .fetch_optional(&self.pool)
        .await?;
        self.fetch_one_assembled(row).await
    }

    async fn list_by_owner(&self, user_id: Uuid) -> AppResult<Vec<Timesheet>> {
        let rows = sqlx::query_as::<_, TimesheetRow>(&format!(
            "SELECT {TIMESHEET_COLUMNS} FROM timesheets WHERE user_id = $1 ORDER BY week_start DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        self.assemble(rows).await
    }

    async fn insert(&self, timesheet: &Timesheet) -> AppResult<()> {
        let week_start = timesheet.week_start();
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO timesheets (id, user_id, week_start, status, total_hours, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(timesheet.id())
        .bind(timesheet.user_id())
        .bind(week_start)
        .bind(timesheet.status())
        .bind(timesheet.total_hours())
        .bind(timesheet.created_at())
        .bind(timesheet.updated_at())
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            constraint_error(e, |constraint| {
                (constraint == "timesheets_user_week_key")
                    .then(|| format!("Timesheet already exists for week start {week_start}"))
            })
        })?;

        insert_entries(&mut *tx, timesheet).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn update(&self, timesheet: &Timesheet) -> AppResult<()> {
        let week_start = timesheet.week_start();
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            "UPDATE timesheets SET week_start = $2, status = $3, total_hours = $4, updated_at = $5
             WHERE id = $1",
        )
        .bind(timesheet.id())
        .bind(week_start)
        .bind(timesheet.status())
        .bind(timesheet.total_hours())
        .bind(timesheet.updated_at())
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            constraint_error(e, |constraint| {
                (constraint == "timesheets_user_week_key")
                    .then(|| format!("Another timesheet already exists for week start {week_start}"))
            })
        })?;
        if updated.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Timesheet not found: id={}",
                timesheet.id()
            )));
        }

        sqlx::query("DELETE FROM timesheet_entries WHERE timesheet_id = $1")
            .bind(timesheet.id())
            .execute(&mut *tx)
            .await?;
        insert_entries(&mut *tx, timesheet).await?;

        tx.commit().await?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        // Entries go with the row (ON DELETE CASCADE).
        let result = sqlx::query("DELETE FROM timesheets WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
