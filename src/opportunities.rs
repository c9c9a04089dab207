//! Opportunity pipeline service.
//!
//! Owns the stage lifecycle: any stage is reachable from any other stage —
//! there is no transition graph, and `Won`/`Lost` are not terminal in the
//! enforcement sense, only for the pipeline metrics. Every stage change that
//! reaches storage is recorded in the interaction log; the read-prior-stage /
//! write / log sequence runs inside one transaction so the logged "from"
//! value is the committed prior stage.

use chrono::Utc;

use crate::db::{CrmDb, Opportunity, Stage};
use crate::error::ServiceError;
use crate::interactions::{self, kind};

pub struct OpportunityService<'a> {
    db: &'a CrmDb,
}

impl<'a> OpportunityService<'a> {
    pub fn new(db: &'a CrmDb) -> Self {
        Self { db }
    }

    /// Create an opportunity. Returns the new id.
    pub fn create(&self, opportunity: &Opportunity) -> Result<i64, ServiceError> {
        if opportunity.title.trim().is_empty() {
            return Err(ServiceError::validation("Title is required"));
        }
        if opportunity.customer_id <= 0 {
            return Err(ServiceError::validation("Customer is required"));
        }
        if opportunity.value < 0.0 {
            return Err(ServiceError::validation("Value cannot be negative"));
        }
        if !(0..=100).contains(&opportunity.probability) {
            return Err(ServiceError::validation(
                "Probability must be between 0 and 100",
            ));
        }
        if let Some(close_date) = opportunity.expected_close_date {
            if close_date < Utc::now().date_naive() {
                return Err(ServiceError::validation(
                    "Expected close date cannot be in the past",
                ));
            }
        }

        let id = self.db.insert_opportunity(opportunity)?;
        interactions::record(
            self.db,
            opportunity.customer_id,
            kind::OPPORTUNITY_CREATED,
            format!(
                "Opportunity '{}' was created in stage {}",
                opportunity.title, opportunity.stage
            ),
        )?;
        Ok(id)
    }

    /// Update an existing opportunity.
    ///
    /// Re-validates title and value only; probability and close date are
    /// checked on the create path alone (the schema CHECK still bounds
    /// probability at the storage layer). If the stage differs from the
    /// stored one, an `opportunity_stage_changed` entry is appended; an
    /// opportunity missing at read time still gets the update statement,
    /// just no transition entry.
    pub fn update(&self, opportunity: &Opportunity) -> Result<(), ServiceError> {
        let id = opportunity
            .id
            .ok_or_else(|| ServiceError::validation("Opportunity id is required"))?;
        if opportunity.title.trim().is_empty() {
            return Err(ServiceError::validation("Title is required"));
        }
        if opportunity.value < 0.0 {
            return Err(ServiceError::validation("Value cannot be negative"));
        }

        self.db
            .with_transaction(|db| {
                let prior_stage = db.get_opportunity(id)?.map(|o| o.stage);

                db.update_opportunity(opportunity)?;

                if let Some(prior) = prior_stage {
                    if prior != opportunity.stage {
                        interactions::record(
                            db,
                            opportunity.customer_id,
                            kind::OPPORTUNITY_STAGE_CHANGED,
                            format!(
                                "Opportunity '{}' moved from {} to {}",
                                opportunity.title, prior, opportunity.stage
                            ),
                        )?;
                    }
                }
                Ok(())
            })
            .map_err(Into::into)
    }

    /// Move an opportunity to another stage.
    ///
    /// Returns false if the opportunity does not exist. Always appends
    /// exactly one transition entry — also when the requested stage equals
    /// the current one.
    pub fn move_stage(&self, id: i64, new_stage: Stage) -> Result<bool, ServiceError> {
        self.db
            .with_transaction(|db| {
                let Some(opportunity) = db.get_opportunity(id)? else {
                    return Ok(false);
                };

                db.update_opportunity_stage(id, new_stage)?;
                interactions::record(
                    db,
                    opportunity.customer_id,
                    kind::OPPORTUNITY_STAGE_CHANGED,
                    format!(
                        "Opportunity '{}' moved from {} to {}",
                        opportunity.title, opportunity.stage, new_stage
                    ),
                )?;
                Ok(true)
            })
            .map_err(Into::into)
    }

    pub fn get(&self, id: i64) -> Option<Opportunity> {
        self.db.get_opportunity(id).unwrap_or_else(|e| {
            log::error!("Failed to get opportunity {}: {}", id, e);
            None
        })
    }

    pub fn list_all(&self) -> Vec<Opportunity> {
        self.db.list_opportunities().unwrap_or_else(|e| {
            log::error!("Failed to list opportunities: {}", e);
            Vec::new()
        })
    }

    pub fn by_customer(&self, customer_id: i64) -> Vec<Opportunity> {
        self.db.opportunities_by_customer(customer_id).unwrap_or_else(|e| {
            log::error!("Failed to list opportunities for customer {}: {}", customer_id, e);
            Vec::new()
        })
    }

    pub fn by_stage(&self, stage: Stage) -> Vec<Opportunity> {
        self.db.opportunities_by_stage(stage).unwrap_or_else(|e| {
            log::error!("Failed to list opportunities in stage {}: {}", stage, e);
            Vec::new()
        })
    }

    /// Delete an opportunity. Returns false if missing. No log entry.
    pub fn delete(&self, id: i64) -> Result<bool, ServiceError> {
        Ok(self.db.delete_opportunity(id)?)
    }

    /// Pipeline forecast: Σ value × probability/100 over every opportunity
    /// not yet Won or Lost.
    pub fn total_weighted_open_value(&self) -> f64 {
        self.list_all()
            .iter()
            .filter(|o| !o.stage.is_terminal())
            .map(|o| o.value * (o.probability as f64 / 100.0))
            .sum()
    }

    /// Won count over total count, as a percentage. 0 when there are no
    /// opportunities at all.
    pub fn conversion_rate(&self) -> f64 {
        let all = self.list_all();
        if all.is_empty() {
            return 0.0;
        }
        let won = all.iter().filter(|o| o.stage == Stage::Won).count();
        (won as f64 / all.len() as f64) * 100.0
    }
}
