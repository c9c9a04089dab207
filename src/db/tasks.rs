use chrono::{NaiveDateTime, Utc};
use rusqlite::{params, Row};

use super::{CrmDb, DbError, Task, TaskStatus};

/// Storage format for `scheduled_at`; SQLite's date()/datetime() functions
/// parse it directly, which the due-date queries rely on.
const SCHEDULED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

impl CrmDb {
    // =========================================================================
    // Tasks
    // =========================================================================

    /// Total, field-by-field row mapping with enum and date fallbacks.
    fn map_task_row(row: &Row) -> rusqlite::Result<Task> {
        let task_type: String = row.get(3)?;
        let scheduled_at: String = row.get(4)?;
        let status: String = row.get(5)?;
        let priority: String = row.get(6)?;
        Ok(Task {
            id: row.get(0)?,
            customer_id: row.get(1)?,
            description: row.get(2)?,
            task_type: task_type.parse().unwrap_or_default(),
            scheduled_at: NaiveDateTime::parse_from_str(&scheduled_at, SCHEDULED_AT_FORMAT).ok(),
            status: status.parse().unwrap_or_default(),
            priority: priority.parse().unwrap_or_default(),
            notes: row.get(7)?,
            created_at: row.get(8)?,
            completed_at: row.get(9)?,
        })
    }

    const TASK_COLUMNS: &'static str =
        "id, customer_id, description, type, scheduled_at, status, priority,
         notes, created_at, completed_at";

    fn format_scheduled_at(task: &Task) -> Option<String> {
        task.scheduled_at
            .map(|t| t.format(SCHEDULED_AT_FORMAT).to_string())
    }

    /// Insert a task and return the new id.
    pub fn insert_task(&self, task: &Task) -> Result<i64, DbError> {
        let now = Utc::now().to_rfc3339();
        self.conn_ref().execute(
            "INSERT INTO tasks (
                customer_id, description, type, scheduled_at, status, priority,
                notes, created_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                task.customer_id,
                task.description,
                task.task_type.as_str(),
                Self::format_scheduled_at(task),
                task.status.as_str(),
                task.priority.as_str(),
                task.notes,
                now,
            ],
        )?;
        Ok(self.conn_ref().last_insert_rowid())
    }

    /// Update every caller-supplied column of an existing task.
    pub fn update_task(&self, task: &Task) -> Result<(), DbError> {
        self.conn_ref().execute(
            "UPDATE tasks SET
                customer_id = ?1, description = ?2, type = ?3, scheduled_at = ?4,
                status = ?5, priority = ?6, notes = ?7
             WHERE id = ?8",
            params![
                task.customer_id,
                task.description,
                task.task_type.as_str(),
                Self::format_scheduled_at(task),
                task.status.as_str(),
                task.priority.as_str(),
                task.notes,
                task.id,
            ],
        )?;
        Ok(())
    }

    /// Set status = Done and stamp the completion time with now.
    /// Re-stamps if the task was already done.
    pub fn mark_task_done(&self, id: i64) -> Result<(), DbError> {
        let now = Utc::now().to_rfc3339();
        self.conn_ref().execute(
            "UPDATE tasks SET status = 'Done', completed_at = ?1 WHERE id = ?2",
            params![now, id],
        )?;
        Ok(())
    }

    /// Get a single task by id.
    pub fn get_task(&self, id: i64) -> Result<Option<Task>, DbError> {
        let mut stmt = self.conn_ref().prepare(&format!(
            "SELECT {} FROM tasks WHERE id = ?1",
            Self::TASK_COLUMNS
        ))?;
        let mut rows = stmt.query_map(params![id], Self::map_task_row)?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    /// List all tasks, newest first.
    pub fn list_tasks(&self) -> Result<Vec<Task>, DbError> {
        let mut stmt = self.conn_ref().prepare(&format!(
            "SELECT {} FROM tasks ORDER BY id DESC",
            Self::TASK_COLUMNS
        ))?;
        let rows = stmt.query_map([], Self::map_task_row)?;

        let mut tasks = Vec::new();
        for row in rows {
            tasks.push(row?);
        }
        Ok(tasks)
    }

    /// Tasks belonging to one customer, latest scheduled first.
    pub fn tasks_by_customer(&self, customer_id: i64) -> Result<Vec<Task>, DbError> {
        let mut stmt = self.conn_ref().prepare(&format!(
            "SELECT {} FROM tasks WHERE customer_id = ?1 ORDER BY scheduled_at DESC",
            Self::TASK_COLUMNS
        ))?;
        let rows = stmt.query_map(params![customer_id], Self::map_task_row)?;

        let mut tasks = Vec::new();
        for row in rows {
            tasks.push(row?);
        }
        Ok(tasks)
    }

    /// Tasks in one status, earliest scheduled first.
    pub fn tasks_by_status(&self, status: TaskStatus) -> Result<Vec<Task>, DbError> {
        let mut stmt = self.conn_ref().prepare(&format!(
            "SELECT {} FROM tasks WHERE status = ?1 ORDER BY scheduled_at",
            Self::TASK_COLUMNS
        ))?;
        let rows = stmt.query_map(params![status.as_str()], Self::map_task_row)?;

        let mut tasks = Vec::new();
        for row in rows {
            tasks.push(row?);
        }
        Ok(tasks)
    }

    /// Pending tasks scheduled for today (UTC).
    pub fn tasks_pending_today(&self) -> Result<Vec<Task>, DbError> {
        let mut stmt = self.conn_ref().prepare(&format!(
            "SELECT {} FROM tasks
             WHERE status = 'Pending' AND date(scheduled_at) = date('now')
             ORDER BY scheduled_at",
            Self::TASK_COLUMNS
        ))?;
        let rows = stmt.query_map([], Self::map_task_row)?;

        let mut tasks = Vec::new();
        for row in rows {
            tasks.push(row?);
        }
        Ok(tasks)
    }

    /// Pending tasks whose scheduled time is already past.
    pub fn tasks_overdue(&self) -> Result<Vec<Task>, DbError> {
        let mut stmt = self.conn_ref().prepare(&format!(
            "SELECT {} FROM tasks
             WHERE status = 'Pending' AND datetime(scheduled_at) < datetime('now')
             ORDER BY scheduled_at",
            Self::TASK_COLUMNS
        ))?;
        let rows = stmt.query_map([], Self::map_task_row)?;

        let mut tasks = Vec::new();
        for row in rows {
            tasks.push(row?);
        }
        Ok(tasks)
    }

    /// Delete a task. Returns true if a row went.
    pub fn delete_task(&self, id: i64) -> Result<bool, DbError> {
        let affected = self
            .conn_ref()
            .execute("DELETE FROM tasks WHERE id = ?1", params![id])?;
        Ok(affected > 0)
    }
}
