//! Schema creation.
//!
//! Each table's DDL is applied independently with `IF NOT EXISTS`, so opening
//! an existing database is a no-op and a failure on one table does not stop
//! the others from being created. Schema application succeeds as long as at
//! least one table could be created or verified.

use rusqlite::Connection;

use crate::db::DbError;

struct TableDef {
    name: &'static str,
    sql: &'static str,
}

const TABLES: &[TableDef] = &[
    TableDef {
        name: "customers",
        sql: "CREATE TABLE IF NOT EXISTS customers (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                email TEXT NOT NULL DEFAULT '',
                phone TEXT NOT NULL DEFAULT '',
                company TEXT NOT NULL DEFAULT '',
                tax_id TEXT NOT NULL DEFAULT '',
                street TEXT NOT NULL DEFAULT '',
                number TEXT NOT NULL DEFAULT '',
                district TEXT NOT NULL DEFAULT '',
                city TEXT NOT NULL DEFAULT '',
                state TEXT NOT NULL DEFAULT '',
                postal_code TEXT NOT NULL DEFAULT '',
                notes TEXT NOT NULL DEFAULT '',
                created_at TEXT NOT NULL DEFAULT (datetime('now')),
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            );
            CREATE INDEX IF NOT EXISTS idx_customers_name ON customers(name);
            CREATE INDEX IF NOT EXISTS idx_customers_email ON customers(email);
            CREATE INDEX IF NOT EXISTS idx_customers_company ON customers(company);
            CREATE INDEX IF NOT EXISTS idx_customers_city ON customers(city);",
    },
    TableDef {
        name: "opportunities",
        sql: "CREATE TABLE IF NOT EXISTS opportunities (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                customer_id INTEGER NOT NULL
                    REFERENCES customers(id) ON DELETE CASCADE,
                title TEXT NOT NULL,
                stage TEXT NOT NULL DEFAULT 'Lead'
                    CHECK (stage IN ('Lead', 'Qualification', 'Proposal',
                                     'Negotiation', 'Won', 'Lost')),
                value REAL NOT NULL DEFAULT 0,
                probability INTEGER NOT NULL DEFAULT 0
                    CHECK (probability BETWEEN 0 AND 100),
                expected_close_date TEXT,
                owner TEXT NOT NULL DEFAULT '',
                notes TEXT NOT NULL DEFAULT '',
                created_at TEXT NOT NULL DEFAULT (datetime('now')),
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            );
            CREATE INDEX IF NOT EXISTS idx_opportunities_customer ON opportunities(customer_id);
            CREATE INDEX IF NOT EXISTS idx_opportunities_stage ON opportunities(stage);
            CREATE INDEX IF NOT EXISTS idx_opportunities_close_date ON opportunities(expected_close_date);",
    },
    TableDef {
        name: "tasks",
        sql: "CREATE TABLE IF NOT EXISTS tasks (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                customer_id INTEGER NOT NULL
                    REFERENCES customers(id) ON DELETE CASCADE,
                description TEXT NOT NULL,
                type TEXT NOT NULL DEFAULT 'Other'
                    CHECK (type IN ('Call', 'Email', 'Meeting', 'Chat', 'Visit', 'Other')),
                scheduled_at TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'Pending'
                    CHECK (status IN ('Pending', 'Done')),
                priority TEXT NOT NULL DEFAULT 'Medium'
                    CHECK (priority IN ('Low', 'Medium', 'High')),
                notes TEXT NOT NULL DEFAULT '',
                created_at TEXT NOT NULL DEFAULT (datetime('now')),
                completed_at TEXT
            );
            CREATE INDEX IF NOT EXISTS idx_tasks_customer ON tasks(customer_id);
            CREATE INDEX IF NOT EXISTS idx_tasks_scheduled_at ON tasks(scheduled_at);
            CREATE INDEX IF NOT EXISTS idx_tasks_status ON tasks(status);
            CREATE INDEX IF NOT EXISTS idx_tasks_priority ON tasks(priority);",
    },
    // No FK on customer_id: the audit trail records customer deletion, so
    // entries must be able to outlive the customer row they describe.
    TableDef {
        name: "interaction_log",
        sql: "CREATE TABLE IF NOT EXISTS interaction_log (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                customer_id INTEGER NOT NULL,
                kind TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            );
            CREATE INDEX IF NOT EXISTS idx_interaction_log_customer ON interaction_log(customer_id);
            CREATE INDEX IF NOT EXISTS idx_interaction_log_kind ON interaction_log(kind);
            CREATE INDEX IF NOT EXISTS idx_interaction_log_created_at ON interaction_log(created_at);",
    },
    TableDef {
        name: "users",
        sql: "CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                access_level TEXT NOT NULL DEFAULT 'Seller'
                    CHECK (access_level IN ('Admin', 'Seller', 'Viewer')),
                active INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            );",
    },
];

/// Create every table that does not yet exist.
///
/// Tables are created independently: a failure on one is logged and the rest
/// are still attempted. Returns the number of tables created/verified, or an
/// error if none could be.
pub fn apply_schema(conn: &Connection) -> Result<usize, DbError> {
    let mut verified = 0;
    let mut failed: Vec<&str> = Vec::new();

    for table in TABLES {
        match conn.execute_batch(table.sql) {
            Ok(()) => verified += 1,
            Err(e) => {
                log::error!("Failed to create table '{}': {}", table.name, e);
                failed.push(table.name);
            }
        }
    }

    if verified == 0 {
        return Err(DbError::Migration(format!(
            "no tables could be created (failed: {})",
            failed.join(", ")
        )));
    }
    if !failed.is_empty() {
        log::warn!(
            "Schema applied with errors. Created/verified: {}, failed: {}",
            verified,
            failed.join(", ")
        );
    }

    Ok(verified)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    fn mem_db() -> Connection {
        Connection::open_in_memory().expect("in-memory db")
    }

    #[test]
    fn test_fresh_db_creates_all_tables() {
        let conn = mem_db();
        let verified = apply_schema(&conn).expect("schema should apply");
        assert_eq!(verified, 5);

        for table in ["customers", "opportunities", "tasks", "interaction_log", "users"] {
            let count: i64 = conn
                .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                    row.get(0)
                })
                .unwrap_or_else(|e| panic!("table {} should exist: {}", table, e));
            assert_eq!(count, 0);
        }
    }

    #[test]
    fn test_apply_schema_is_idempotent() {
        let conn = mem_db();
        apply_schema(&conn).expect("first application");

        conn.execute(
            "INSERT INTO customers (name) VALUES ('Existing')",
            [],
        )
        .expect("seed row");

        apply_schema(&conn).expect("second application should not fail");

        let name: String = conn
            .query_row("SELECT name FROM customers WHERE id = 1", [], |row| {
                row.get(0)
            })
            .expect("existing data should be preserved");
        assert_eq!(name, "Existing");
    }

    #[test]
    fn test_one_bad_table_does_not_abort_the_rest() {
        let conn = mem_db();
        // Squat a table on one of the tasks index names. CREATE INDEX IF NOT
        // EXISTS only no-ops when an *index* of that name exists, so the
        // tasks DDL batch fails while the other four proceed.
        conn.execute_batch("CREATE TABLE idx_tasks_status (x INTEGER);")
            .expect("name squatter");

        let verified = apply_schema(&conn).expect("schema should still apply");
        assert_eq!(verified, 4, "four of five table batches succeed");

        // Tables ordered after the failing one still come up
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
            .expect("users must exist despite the tasks failure");
        assert_eq!(count, 0);
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM customers", [], |row| row.get(0))
            .expect("customers must exist despite the tasks failure");
        assert_eq!(count, 0);
    }

    #[test]
    fn test_probability_check_constraint() {
        let conn = mem_db();
        apply_schema(&conn).expect("schema");
        conn.execute("INSERT INTO customers (name) VALUES ('Acme')", [])
            .expect("customer");

        let err = conn.execute(
            "INSERT INTO opportunities (customer_id, title, probability) VALUES (1, 'Deal', 150)",
            [],
        );
        assert!(err.is_err(), "probability outside 0..=100 must be rejected by the schema");
    }

    #[test]
    fn test_stage_check_constraint() {
        let conn = mem_db();
        apply_schema(&conn).expect("schema");
        conn.execute("INSERT INTO customers (name) VALUES ('Acme')", [])
            .expect("customer");

        let err = conn.execute(
            "INSERT INTO opportunities (customer_id, title, stage) VALUES (1, 'Deal', 'Closed')",
            [],
        );
        assert!(err.is_err(), "unknown stage text must be rejected by the schema");
    }
}
