//! Append-only interaction history.
//!
//! Every state change the domain services consider noteworthy lands here as
//! one entry: a kind tag from the declared vocabulary below plus a
//! human-readable description. Which operations log is a per-operation
//! policy, deliberately asymmetric:
//!
//! | operation            | logs? | kind                        |
//! |----------------------|-------|-----------------------------|
//! | customer create      | yes   | `customer_created`          |
//! | customer update      | yes   | `customer_edited`           |
//! | customer delete      | yes   | `customer_deleted`          |
//! | opportunity create   | yes   | `opportunity_created`       |
//! | opportunity update   | on stage change | `opportunity_stage_changed` |
//! | opportunity move     | always | `opportunity_stage_changed` |
//! | opportunity delete   | no    |                             |
//! | task create          | yes   | `task_created`              |
//! | task update          | no    |                             |
//! | task complete        | yes   | `task_completed`            |
//! | task delete          | no    |                             |

use crate::db::{CrmDb, DbError, InteractionLogEntry};

/// The declared kind vocabulary.
pub mod kind {
    pub const CUSTOMER_CREATED: &str = "customer_created";
    pub const CUSTOMER_EDITED: &str = "customer_edited";
    pub const CUSTOMER_DELETED: &str = "customer_deleted";
    pub const OPPORTUNITY_CREATED: &str = "opportunity_created";
    pub const OPPORTUNITY_STAGE_CHANGED: &str = "opportunity_stage_changed";
    pub const TASK_CREATED: &str = "task_created";
    pub const TASK_COMPLETED: &str = "task_completed";
}

/// Append one entry. Shared by every domain service.
pub(crate) fn record(
    db: &CrmDb,
    customer_id: i64,
    kind: &str,
    description: String,
) -> Result<(), DbError> {
    db.insert_interaction(&InteractionLogEntry {
        id: None,
        customer_id,
        kind: kind.to_string(),
        description,
        created_at: None,
    })?;
    Ok(())
}

/// Read access to the interaction history.
pub struct InteractionService<'a> {
    db: &'a CrmDb,
}

impl<'a> InteractionService<'a> {
    pub fn new(db: &'a CrmDb) -> Self {
        Self { db }
    }

    /// A customer's history, newest first. Storage failures degrade to an
    /// empty list, as everywhere on the read side.
    pub fn by_customer(&self, customer_id: i64) -> Vec<InteractionLogEntry> {
        match self.db.interactions_by_customer(customer_id) {
            Ok(entries) => entries,
            Err(e) => {
                log::error!("Failed to read interaction history for customer {}: {}", customer_id, e);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Customer;

    #[test]
    fn test_record_and_read_back() {
        let db = CrmDb::open_in_memory().expect("db");
        let customer_id = db
            .insert_customer(&Customer {
                name: "Acme".to_string(),
                ..Customer::default()
            })
            .expect("customer");

        record(&db, customer_id, kind::CUSTOMER_CREATED, "Customer Acme was registered".to_string())
            .expect("record");

        let service = InteractionService::new(&db);
        let history = service.by_customer(customer_id);
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].kind, kind::CUSTOMER_CREATED);
        assert_eq!(history[0].description, "Customer Acme was registered");
        assert!(history[0].created_at.is_some());
    }

    #[test]
    fn test_unknown_customer_has_empty_history() {
        let db = CrmDb::open_in_memory().expect("db");
        let service = InteractionService::new(&db);
        assert!(service.by_customer(404).is_empty());
    }
}
