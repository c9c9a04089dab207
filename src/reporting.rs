//! Dashboard metrics.
//!
//! Everything here is derived, recomputed from the full entity lists on every
//! call — no caching, no incremental maintenance. The one exception is
//! `sales_by_day`, which aggregates in SQL because its date range can cover
//! far more rows than a dashboard holds in memory.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::db::{CrmDb, Stage, TaskStatus};
use crate::opportunities::OpportunityService;
use crate::tasks::TaskService;

pub use crate::db::opportunities::DailySales;

/// Done-vs-pending task counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskCounts {
    pub done: usize,
    pub pending: usize,
    pub total: usize,
}

pub struct ReportService<'a> {
    db: &'a CrmDb,
}

impl<'a> ReportService<'a> {
    pub fn new(db: &'a CrmDb) -> Self {
        Self { db }
    }

    /// Total customer count.
    pub fn total_customers(&self) -> usize {
        match self.db.list_customers() {
            Ok(customers) => customers.len(),
            Err(e) => {
                log::error!("Failed to count customers: {}", e);
                0
            }
        }
    }

    /// Opportunities still in the open pipeline (not Won or Lost).
    pub fn open_opportunities(&self) -> usize {
        OpportunityService::new(self.db)
            .list_all()
            .iter()
            .filter(|o| !o.stage.is_terminal())
            .count()
    }

    /// Pipeline forecast; same formula as the opportunity service.
    pub fn weighted_open_value(&self) -> f64 {
        OpportunityService::new(self.db).total_weighted_open_value()
    }

    /// Pending tasks scheduled for today.
    pub fn tasks_pending_today(&self) -> usize {
        TaskService::new(self.db).pending_today().len()
    }

    /// Opportunity counts keyed by stage. Stages with no opportunities are
    /// absent from the map.
    pub fn opportunities_by_stage(&self) -> HashMap<Stage, usize> {
        let mut histogram = HashMap::new();
        for opportunity in OpportunityService::new(self.db).list_all() {
            *histogram.entry(opportunity.stage).or_insert(0) += 1;
        }
        histogram
    }

    /// Done vs. pending task counts.
    pub fn tasks_done_vs_pending(&self) -> TaskCounts {
        let all = TaskService::new(self.db).list_all();
        let done = all.iter().filter(|t| t.status == TaskStatus::Done).count();
        let pending = all.iter().filter(|t| t.status == TaskStatus::Pending).count();
        TaskCounts {
            done,
            pending,
            total: all.len(),
        }
    }

    /// Won / all × 100, 0 when there are no opportunities.
    pub fn conversion_rate(&self) -> f64 {
        OpportunityService::new(self.db).conversion_rate()
    }

    /// Closed-won value per creation date within `[start, end]`, ascending.
    pub fn sales_by_day(&self, start: NaiveDate, end: NaiveDate) -> Vec<DailySales> {
        match self.db.won_value_by_day(start, end) {
            Ok(days) => days,
            Err(e) => {
                log::error!("Failed to aggregate sales between {} and {}: {}", start, end, e);
                Vec::new()
            }
        }
    }
}
