//! Follow-up task service.
//!
//! Creation and completion log to the interaction history; a plain update
//! does not. Completion is not idempotent: marking a done task done again
//! re-stamps the completion time and appends another entry.

use crate::db::{CrmDb, Task, TaskStatus};
use crate::error::ServiceError;
use crate::interactions::{self, kind};

pub struct TaskService<'a> {
    db: &'a CrmDb,
}

impl<'a> TaskService<'a> {
    pub fn new(db: &'a CrmDb) -> Self {
        Self { db }
    }

    /// Create a task. Returns the new id.
    pub fn create(&self, task: &Task) -> Result<i64, ServiceError> {
        if task.description.trim().is_empty() {
            return Err(ServiceError::validation("Description is required"));
        }
        if task.customer_id <= 0 {
            return Err(ServiceError::validation("Customer is required"));
        }
        if task.scheduled_at.is_none() {
            return Err(ServiceError::validation("Scheduled date and time are required"));
        }

        let id = self.db.insert_task(task)?;
        interactions::record(
            self.db,
            task.customer_id,
            kind::TASK_CREATED,
            format!("Task '{}' was created", task.description),
        )?;
        Ok(id)
    }

    /// Update an existing task. Checks id and description only; no log entry.
    pub fn update(&self, task: &Task) -> Result<(), ServiceError> {
        if task.id.is_none() {
            return Err(ServiceError::validation("Task id is required"));
        }
        if task.description.trim().is_empty() {
            return Err(ServiceError::validation("Description is required"));
        }
        Ok(self.db.update_task(task)?)
    }

    /// Mark a task done, stamping the completion time with now.
    ///
    /// Returns false if the task does not exist. Calling this on an
    /// already-done task re-stamps and logs again.
    pub fn mark_done(&self, id: i64) -> Result<bool, ServiceError> {
        self.db
            .with_transaction(|db| {
                let Some(task) = db.get_task(id)? else {
                    return Ok(false);
                };

                db.mark_task_done(id)?;
                interactions::record(
                    db,
                    task.customer_id,
                    kind::TASK_COMPLETED,
                    format!("Task '{}' was completed", task.description),
                )?;
                Ok(true)
            })
            .map_err(Into::into)
    }

    pub fn get(&self, id: i64) -> Option<Task> {
        self.db.get_task(id).unwrap_or_else(|e| {
            log::error!("Failed to get task {}: {}", id, e);
            None
        })
    }

    pub fn list_all(&self) -> Vec<Task> {
        self.db.list_tasks().unwrap_or_else(|e| {
            log::error!("Failed to list tasks: {}", e);
            Vec::new()
        })
    }

    pub fn by_customer(&self, customer_id: i64) -> Vec<Task> {
        self.db.tasks_by_customer(customer_id).unwrap_or_else(|e| {
            log::error!("Failed to list tasks for customer {}: {}", customer_id, e);
            Vec::new()
        })
    }

    pub fn by_status(&self, status: TaskStatus) -> Vec<Task> {
        self.db.tasks_by_status(status).unwrap_or_else(|e| {
            log::error!("Failed to list tasks with status {}: {}", status, e);
            Vec::new()
        })
    }

    /// Pending tasks scheduled for today.
    pub fn pending_today(&self) -> Vec<Task> {
        self.db.tasks_pending_today().unwrap_or_else(|e| {
            log::error!("Failed to list today's pending tasks: {}", e);
            Vec::new()
        })
    }

    /// Pending tasks already past their scheduled time.
    pub fn overdue(&self) -> Vec<Task> {
        self.db.tasks_overdue().unwrap_or_else(|e| {
            log::error!("Failed to list overdue tasks: {}", e);
            Vec::new()
        })
    }

    /// Delete a task. Returns false if missing. No log entry.
    pub fn delete(&self, id: i64) -> Result<bool, ServiceError> {
        Ok(self.db.delete_task(id)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::customers::CustomerService;
    use crate::db::{Customer, TaskType};
    use crate::interactions::InteractionService;
    use chrono::{Duration, Utc};

    fn db_with_customer() -> (CrmDb, i64) {
        let db = CrmDb::open_in_memory().expect("db");
        let customer_id = CustomerService::new(&db)
            .create(&Customer {
                name: "Ana Silva".to_string(),
                ..Customer::default()
            })
            .expect("customer");
        (db, customer_id)
    }

    fn sample(customer_id: i64, description: &str, offset: Duration) -> Task {
        Task {
            customer_id,
            description: description.to_string(),
            task_type: TaskType::Call,
            scheduled_at: Some(Utc::now().naive_utc() + offset),
            ..Task::default()
        }
    }

    #[test]
    fn test_create_validations() {
        let (db, customer_id) = db_with_customer();
        let service = TaskService::new(&db);

        let blank = sample(customer_id, "   ", Duration::hours(1));
        assert_eq!(service.create(&blank).unwrap_err().to_string(), "Description is required");

        let orphan = sample(0, "Call", Duration::hours(1));
        assert_eq!(service.create(&orphan).unwrap_err().to_string(), "Customer is required");

        let mut unscheduled = sample(customer_id, "Call", Duration::hours(1));
        unscheduled.scheduled_at = None;
        assert_eq!(
            service.create(&unscheduled).unwrap_err().to_string(),
            "Scheduled date and time are required"
        );
    }

    #[test]
    fn test_create_logs_task_created() {
        let (db, customer_id) = db_with_customer();
        let service = TaskService::new(&db);

        service
            .create(&sample(customer_id, "Call about renewal", Duration::hours(1)))
            .expect("create");

        let history = InteractionService::new(&db).by_customer(customer_id);
        assert_eq!(history[0].kind, kind::TASK_CREATED);
        assert!(history[0].description.contains("Call about renewal"));
    }

    #[test]
    fn test_update_validates_id_and_description_only_and_never_logs() {
        let (db, customer_id) = db_with_customer();
        let service = TaskService::new(&db);

        let no_id = sample(customer_id, "Call", Duration::hours(1));
        assert_eq!(service.update(&no_id).unwrap_err().to_string(), "Task id is required");

        let id = service
            .create(&sample(customer_id, "Call", Duration::hours(1)))
            .expect("create");
        let entries_after_create = InteractionService::new(&db).by_customer(customer_id).len();

        let mut task = service.get(id).expect("exists");
        task.notes = "left voicemail".to_string();
        service.update(&task).expect("update");

        assert_eq!(
            InteractionService::new(&db).by_customer(customer_id).len(),
            entries_after_create,
            "a plain update appends nothing"
        );
    }

    #[test]
    fn test_mark_done_missing_returns_false() {
        let (db, _) = db_with_customer();
        let service = TaskService::new(&db);
        assert!(!service.mark_done(404).expect("mark done"));
    }

    #[test]
    fn test_mark_done_stamps_and_logs() {
        let (db, customer_id) = db_with_customer();
        let service = TaskService::new(&db);

        let id = service
            .create(&sample(customer_id, "Call", Duration::hours(1)))
            .expect("create");

        assert!(service.mark_done(id).expect("mark done"));

        let task = service.get(id).expect("exists");
        assert_eq!(task.status, TaskStatus::Done);
        assert!(task.completed_at.is_some());

        let history = InteractionService::new(&db).by_customer(customer_id);
        assert_eq!(history[0].kind, kind::TASK_COMPLETED);
    }

    #[test]
    fn test_mark_done_is_not_idempotent() {
        let (db, customer_id) = db_with_customer();
        let service = TaskService::new(&db);

        let id = service
            .create(&sample(customer_id, "Call", Duration::hours(1)))
            .expect("create");

        assert!(service.mark_done(id).expect("first"));
        assert!(service.mark_done(id).expect("second call also reports true"));

        let completions = InteractionService::new(&db)
            .by_customer(customer_id)
            .into_iter()
            .filter(|e| e.kind == kind::TASK_COMPLETED)
            .count();
        assert_eq!(completions, 2, "repeat completion logs again");
    }

    /// Scenario: an overdue pending task leaves both due lists once done.
    #[test]
    fn test_overdue_scenario() {
        let (db, customer_id) = db_with_customer();
        let service = TaskService::new(&db);

        let id = service
            .create(&sample(customer_id, "Call", -Duration::days(1)))
            .expect("create");

        let overdue_ids: Vec<i64> = service.overdue().into_iter().filter_map(|t| t.id).collect();
        assert!(overdue_ids.contains(&id));

        assert!(service.mark_done(id).expect("mark done"));

        let overdue_ids: Vec<i64> = service.overdue().into_iter().filter_map(|t| t.id).collect();
        assert!(!overdue_ids.contains(&id));
        let today_ids: Vec<i64> = service.pending_today().into_iter().filter_map(|t| t.id).collect();
        assert!(!today_ids.contains(&id));
    }
}
