use chrono::Utc;
use rusqlite::{params, Row};

use super::{CrmDb, DbError, InteractionLogEntry};

impl CrmDb {
    // =========================================================================
    // Interaction log (append-only)
    // =========================================================================

    fn map_interaction_row(row: &Row) -> rusqlite::Result<InteractionLogEntry> {
        Ok(InteractionLogEntry {
            id: row.get(0)?,
            customer_id: row.get(1)?,
            kind: row.get(2)?,
            description: row.get(3)?,
            created_at: row.get(4)?,
        })
    }

    /// Append an interaction-log entry and return the new id.
    /// Entries are never updated or deleted.
    pub fn insert_interaction(&self, entry: &InteractionLogEntry) -> Result<i64, DbError> {
        let now = Utc::now().to_rfc3339();
        self.conn_ref().execute(
            "INSERT INTO interaction_log (customer_id, kind, description, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![entry.customer_id, entry.kind, entry.description, now],
        )?;
        Ok(self.conn_ref().last_insert_rowid())
    }

    /// Interaction history for a customer, newest first. The id tiebreak
    /// keeps same-instant entries (one user action, several appends) in
    /// deterministic order.
    pub fn interactions_by_customer(
        &self,
        customer_id: i64,
    ) -> Result<Vec<InteractionLogEntry>, DbError> {
        let mut stmt = self.conn_ref().prepare(
            "SELECT id, customer_id, kind, description, created_at
             FROM interaction_log
             WHERE customer_id = ?1
             ORDER BY created_at DESC, id DESC",
        )?;
        let rows = stmt.query_map(params![customer_id], Self::map_interaction_row)?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?);
        }
        Ok(entries)
    }
}
