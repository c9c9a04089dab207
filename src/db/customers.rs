use chrono::Utc;
use rusqlite::{params, Row};

use super::{CrmDb, Customer, DbError};

impl CrmDb {
    // =========================================================================
    // Customers
    // =========================================================================

    /// Total, field-by-field row mapping. Every display column defaults to
    /// empty text at the schema level, so this never observes NULL there.
    fn map_customer_row(row: &Row) -> rusqlite::Result<Customer> {
        Ok(Customer {
            id: row.get(0)?,
            name: row.get(1)?,
            email: row.get(2)?,
            phone: row.get(3)?,
            company: row.get(4)?,
            tax_id: row.get(5)?,
            street: row.get(6)?,
            number: row.get(7)?,
            district: row.get(8)?,
            city: row.get(9)?,
            state: row.get(10)?,
            postal_code: row.get(11)?,
            notes: row.get(12)?,
            created_at: row.get(13)?,
            updated_at: row.get(14)?,
        })
    }

    const CUSTOMER_COLUMNS: &'static str =
        "id, name, email, phone, company, tax_id, street, number, district,
         city, state, postal_code, notes, created_at, updated_at";

    /// Insert a customer and return the new id.
    pub fn insert_customer(&self, customer: &Customer) -> Result<i64, DbError> {
        let now = Utc::now().to_rfc3339();
        self.conn_ref().execute(
            "INSERT INTO customers (
                name, email, phone, company, tax_id, street, number, district,
                city, state, postal_code, notes, created_at, updated_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?13)",
            params![
                customer.name,
                customer.email,
                customer.phone,
                customer.company,
                customer.tax_id,
                customer.street,
                customer.number,
                customer.district,
                customer.city,
                customer.state,
                customer.postal_code,
                customer.notes,
                now,
            ],
        )?;
        Ok(self.conn_ref().last_insert_rowid())
    }

    /// Update every caller-supplied column of an existing customer.
    pub fn update_customer(&self, customer: &Customer) -> Result<(), DbError> {
        let now = Utc::now().to_rfc3339();
        self.conn_ref().execute(
            "UPDATE customers SET
                name = ?1, email = ?2, phone = ?3, company = ?4, tax_id = ?5,
                street = ?6, number = ?7, district = ?8, city = ?9, state = ?10,
                postal_code = ?11, notes = ?12, updated_at = ?13
             WHERE id = ?14",
            params![
                customer.name,
                customer.email,
                customer.phone,
                customer.company,
                customer.tax_id,
                customer.street,
                customer.number,
                customer.district,
                customer.city,
                customer.state,
                customer.postal_code,
                customer.notes,
                now,
                customer.id,
            ],
        )?;
        Ok(())
    }

    /// Get a single customer by id.
    pub fn get_customer(&self, id: i64) -> Result<Option<Customer>, DbError> {
        let mut stmt = self.conn_ref().prepare(&format!(
            "SELECT {} FROM customers WHERE id = ?1",
            Self::CUSTOMER_COLUMNS
        ))?;
        let mut rows = stmt.query_map(params![id], Self::map_customer_row)?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    /// List all customers, newest first.
    pub fn list_customers(&self) -> Result<Vec<Customer>, DbError> {
        let mut stmt = self.conn_ref().prepare(&format!(
            "SELECT {} FROM customers ORDER BY id DESC",
            Self::CUSTOMER_COLUMNS
        ))?;
        let rows = stmt.query_map([], Self::map_customer_row)?;

        let mut customers = Vec::new();
        for row in rows {
            customers.push(row?);
        }
        Ok(customers)
    }

    /// Case-insensitive substring search over name, email, company, or city.
    pub fn search_customers(&self, term: &str) -> Result<Vec<Customer>, DbError> {
        let mut stmt = self.conn_ref().prepare(&format!(
            "SELECT {} FROM customers
             WHERE name LIKE ?1 OR email LIKE ?1 OR company LIKE ?1 OR city LIKE ?1
             ORDER BY name",
            Self::CUSTOMER_COLUMNS
        ))?;
        let like = format!("%{}%", term);
        let rows = stmt.query_map(params![like], Self::map_customer_row)?;

        let mut customers = Vec::new();
        for row in rows {
            customers.push(row?);
        }
        Ok(customers)
    }

    /// Delete a customer. Opportunities and tasks cascade at the storage
    /// layer; interaction-log entries are kept. Returns true if a row went.
    pub fn delete_customer(&self, id: i64) -> Result<bool, DbError> {
        let affected = self
            .conn_ref()
            .execute("DELETE FROM customers WHERE id = ?1", params![id])?;
        Ok(affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_customer(name: &str) -> Customer {
        Customer {
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
            phone: "(11) 98765-4321".to_string(),
            company: "Tech Solutions".to_string(),
            city: "Sao Paulo".to_string(),
            state: "SP".to_string(),
            ..Customer::default()
        }
    }

    #[test]
    fn test_insert_and_get_round_trip() {
        let db = CrmDb::open_in_memory().expect("db");

        let mut customer = sample_customer("Ana Silva");
        customer.tax_id = "529.982.247-25".to_string();
        customer.street = "Rua A".to_string();
        customer.number = "42".to_string();
        customer.district = "Centro".to_string();
        customer.postal_code = "01310-100".to_string();
        customer.notes = "key account".to_string();

        let id = db.insert_customer(&customer).expect("insert");
        assert!(id > 0);

        let fetched = db.get_customer(id).expect("get").expect("should exist");
        assert_eq!(fetched.id, Some(id));
        assert_eq!(fetched.name, customer.name);
        assert_eq!(fetched.email, customer.email);
        assert_eq!(fetched.phone, customer.phone);
        assert_eq!(fetched.company, customer.company);
        assert_eq!(fetched.tax_id, customer.tax_id);
        assert_eq!(fetched.street, customer.street);
        assert_eq!(fetched.number, customer.number);
        assert_eq!(fetched.district, customer.district);
        assert_eq!(fetched.city, customer.city);
        assert_eq!(fetched.state, customer.state);
        assert_eq!(fetched.postal_code, customer.postal_code);
        assert_eq!(fetched.notes, customer.notes);
        assert!(fetched.created_at.is_some());
        assert!(fetched.updated_at.is_some());
    }

    #[test]
    fn test_get_missing_returns_none() {
        let db = CrmDb::open_in_memory().expect("db");
        assert!(db.get_customer(999).expect("get").is_none());
    }

    #[test]
    fn test_list_orders_newest_first() {
        let db = CrmDb::open_in_memory().expect("db");
        db.insert_customer(&sample_customer("First")).expect("insert");
        db.insert_customer(&sample_customer("Second")).expect("insert");

        let all = db.list_customers().expect("list");
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].name, "Second");
        assert_eq!(all[1].name, "First");
    }

    #[test]
    fn test_update_overwrites_fields() {
        let db = CrmDb::open_in_memory().expect("db");
        let id = db.insert_customer(&sample_customer("Ana Silva")).expect("insert");

        let mut updated = db.get_customer(id).expect("get").expect("exists");
        updated.company = "Inova Digital".to_string();
        updated.notes = "moved companies".to_string();
        db.update_customer(&updated).expect("update");

        let fetched = db.get_customer(id).expect("get").expect("exists");
        assert_eq!(fetched.company, "Inova Digital");
        assert_eq!(fetched.notes, "moved companies");
    }

    #[test]
    fn test_search_matches_all_four_fields_case_insensitively() {
        let db = CrmDb::open_in_memory().expect("db");

        let mut by_name = sample_customer("Carlos Souza");
        by_name.company = String::new();
        by_name.city = String::new();
        by_name.email = String::new();
        db.insert_customer(&by_name).expect("insert");

        let mut by_email = sample_customer("X");
        by_email.email = "carlos@beta.com".to_string();
        by_email.company = String::new();
        by_email.city = String::new();
        db.insert_customer(&by_email).expect("insert");

        let mut by_company = sample_customer("Y");
        by_company.email = String::new();
        by_company.company = "Carlos Ltda".to_string();
        by_company.city = String::new();
        db.insert_customer(&by_company).expect("insert");

        let mut by_city = sample_customer("Z");
        by_city.email = String::new();
        by_city.company = String::new();
        by_city.city = "San Carlos".to_string();
        db.insert_customer(&by_city).expect("insert");

        db.insert_customer(&sample_customer("Unrelated")).expect("insert");

        let hits = db.search_customers("CARLOS").expect("search");
        assert_eq!(hits.len(), 4, "name, email, company, and city should all match");
    }

    #[test]
    fn test_delete_reports_whether_a_row_went() {
        let db = CrmDb::open_in_memory().expect("db");
        let id = db.insert_customer(&sample_customer("Gone")).expect("insert");

        assert!(db.delete_customer(id).expect("delete"));
        assert!(!db.delete_customer(id).expect("second delete"));
        assert!(db.get_customer(id).expect("get").is_none());
    }
}
