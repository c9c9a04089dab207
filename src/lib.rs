//! CrmDesk — small-business CRM engine.
//!
//! Customers, a six-stage sales-opportunity funnel, follow-up tasks, and an
//! append-only interaction history over an embedded SQLite database. This
//! crate is the engine behind a desktop form/list UI: the shell constructs a
//! [`db::CrmDb`], hands it to the domain services, and issues one call at a
//! time. Every noteworthy state change lands in the interaction log.

pub mod customers;
pub mod db;
pub mod error;
pub mod export;
pub mod interactions;
pub mod migrations;
pub mod opportunities;
pub mod reporting;
pub mod settings;
pub mod tasks;
pub mod validators;

pub use customers::CustomerService;
pub use db::{CrmDb, Customer, InteractionLogEntry, Opportunity, Stage, Task};
pub use error::ServiceError;
pub use interactions::InteractionService;
pub use opportunities::OpportunityService;
pub use reporting::ReportService;
pub use tasks::TaskService;
