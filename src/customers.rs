//! Customer domain service.
//!
//! Validates, persists through the gateway, and appends interaction-log
//! entries. Mutations surface `ServiceError`; reads degrade to empty results
//! after logging, so a flaky disk never blanks a form with an error dialog.

use crate::db::{CrmDb, Customer};
use crate::error::ServiceError;
use crate::interactions::{self, kind};
use crate::validators;

pub struct CustomerService<'a> {
    db: &'a CrmDb,
}

impl<'a> CustomerService<'a> {
    pub fn new(db: &'a CrmDb) -> Self {
        Self { db }
    }

    fn validate(customer: &Customer) -> Result<(), ServiceError> {
        if customer.name.trim().is_empty() {
            return Err(ServiceError::validation("Name is required"));
        }
        if !customer.email.is_empty() && !validators::is_valid_email(&customer.email) {
            return Err(ServiceError::validation("Invalid email"));
        }
        if !customer.tax_id.is_empty() && !validators::is_valid_tax_id(&customer.tax_id) {
            return Err(ServiceError::validation("Invalid tax id"));
        }
        Ok(())
    }

    /// Create a customer. Returns the new id.
    pub fn create(&self, customer: &Customer) -> Result<i64, ServiceError> {
        Self::validate(customer)?;

        let id = self.db.insert_customer(customer)?;
        interactions::record(
            self.db,
            id,
            kind::CUSTOMER_CREATED,
            format!("Customer {} was registered", customer.name),
        )?;
        Ok(id)
    }

    /// Update an existing customer. Logs only once the persist succeeds.
    pub fn update(&self, customer: &Customer) -> Result<(), ServiceError> {
        let id = customer
            .id
            .ok_or_else(|| ServiceError::validation("Customer id is required for update"))?;
        Self::validate(customer)?;

        self.db.update_customer(customer)?;
        interactions::record(
            self.db,
            id,
            kind::CUSTOMER_EDITED,
            format!("Customer {} was updated", customer.name),
        )?;
        Ok(())
    }

    pub fn get(&self, id: i64) -> Option<Customer> {
        self.db.get_customer(id).unwrap_or_else(|e| {
            log::error!("Failed to get customer {}: {}", id, e);
            None
        })
    }

    pub fn list_all(&self) -> Vec<Customer> {
        self.db.list_customers().unwrap_or_else(|e| {
            log::error!("Failed to list customers: {}", e);
            Vec::new()
        })
    }

    /// Case-insensitive substring search over name, email, company, or city.
    pub fn search(&self, term: &str) -> Vec<Customer> {
        self.db.search_customers(term).unwrap_or_else(|e| {
            log::error!("Failed to search customers for '{}': {}", term, e);
            Vec::new()
        })
    }

    /// Delete a customer. Returns false if the customer does not exist.
    ///
    /// The deletion entry captures the name at time of deletion; dependent
    /// opportunities and tasks cascade at the storage layer. Delete and log
    /// commit together.
    pub fn delete(&self, id: i64) -> Result<bool, ServiceError> {
        let Some(customer) = self.db.get_customer(id)? else {
            return Ok(false);
        };

        self.db
            .with_transaction(|db| {
                let deleted = db.delete_customer(id)?;
                if deleted {
                    interactions::record(
                        db,
                        id,
                        kind::CUSTOMER_DELETED,
                        format!("Customer {} was deleted", customer.name),
                    )?;
                }
                Ok(deleted)
            })
            .map_err(Into::into)
    }
}
