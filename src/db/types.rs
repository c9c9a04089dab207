//! Shared type definitions for the database layer.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors specific to database operations.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Home directory not found")]
    HomeDirNotFound,

    #[error("Failed to create database directory: {0}")]
    CreateDir(std::io::Error),

    #[error("Schema migration failed: {0}")]
    Migration(String),
}

/// Sales funnel stage of an opportunity.
///
/// Order matters for display only — every stage is reachable from every
/// other stage, including moves out of `Won` and `Lost`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Stage {
    #[default]
    Lead,
    Qualification,
    Proposal,
    Negotiation,
    Won,
    Lost,
}

impl Stage {
    /// All stages in display order.
    pub const ALL: [Stage; 6] = [
        Stage::Lead,
        Stage::Qualification,
        Stage::Proposal,
        Stage::Negotiation,
        Stage::Won,
        Stage::Lost,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Lead => "Lead",
            Stage::Qualification => "Qualification",
            Stage::Proposal => "Proposal",
            Stage::Negotiation => "Negotiation",
            Stage::Won => "Won",
            Stage::Lost => "Lost",
        }
    }

    /// Whether the opportunity has left the open pipeline.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Stage::Won | Stage::Lost)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Stage::ALL
            .iter()
            .find(|stage| stage.as_str() == s)
            .copied()
            .ok_or_else(|| {
                format!(
                    "Invalid stage. Use one of: {}",
                    Stage::ALL.map(|s| s.as_str()).join(", ")
                )
            })
    }
}

/// Kind of follow-up task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TaskType {
    Call,
    Email,
    Meeting,
    Chat,
    Visit,
    #[default]
    Other,
}

impl TaskType {
    pub const ALL: [TaskType; 6] = [
        TaskType::Call,
        TaskType::Email,
        TaskType::Meeting,
        TaskType::Chat,
        TaskType::Visit,
        TaskType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::Call => "Call",
            TaskType::Email => "Email",
            TaskType::Meeting => "Meeting",
            TaskType::Chat => "Chat",
            TaskType::Visit => "Visit",
            TaskType::Other => "Other",
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskType::ALL
            .iter()
            .find(|t| t.as_str() == s)
            .copied()
            .ok_or_else(|| {
                format!(
                    "Invalid task type. Use one of: {}",
                    TaskType::ALL.map(|t| t.as_str()).join(", ")
                )
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TaskStatus {
    #[default]
    Pending,
    Done,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "Pending",
            TaskStatus::Done => "Done",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(TaskStatus::Pending),
            "Done" => Ok(TaskStatus::Done),
            _ => Err("Invalid status. Use one of: Pending, Done".to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl TaskPriority {
    pub const ALL: [TaskPriority; 3] =
        [TaskPriority::Low, TaskPriority::Medium, TaskPriority::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "Low",
            TaskPriority::Medium => "Medium",
            TaskPriority::High => "High",
        }
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskPriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskPriority::ALL
            .iter()
            .find(|p| p.as_str() == s)
            .copied()
            .ok_or_else(|| "Invalid priority. Use one of: Low, Medium, High".to_string())
    }
}

/// Access level for a `users` row. The table is part of the schema but no
/// service in this crate reads or writes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AccessLevel {
    Admin,
    #[default]
    Seller,
    Viewer,
}

impl AccessLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessLevel::Admin => "Admin",
            AccessLevel::Seller => "Seller",
            AccessLevel::Viewer => "Viewer",
        }
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A row from the `customers` table.
///
/// String fields default to empty rather than `NULL` — the row mapper is
/// total, so a customer read back always has every display field populated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    /// `None` until the row is inserted.
    pub id: Option<i64>,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub company: String,
    pub tax_id: String,
    pub street: String,
    pub number: String,
    pub district: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub notes: String,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// A row from the `opportunities` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Opportunity {
    pub id: Option<i64>,
    pub customer_id: i64,
    pub title: String,
    pub stage: Stage,
    pub value: f64,
    /// Win probability, 0–100 inclusive.
    pub probability: i64,
    pub expected_close_date: Option<NaiveDate>,
    pub owner: String,
    pub notes: String,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl Default for Opportunity {
    fn default() -> Self {
        Opportunity {
            id: None,
            customer_id: 0,
            title: String::new(),
            stage: Stage::Lead,
            value: 0.0,
            probability: 0,
            expected_close_date: None,
            owner: String::new(),
            notes: String::new(),
            created_at: None,
            updated_at: None,
        }
    }
}

/// A row from the `tasks` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Option<i64>,
    pub customer_id: i64,
    pub description: String,
    pub task_type: TaskType,
    /// Required by the service layer; `Option` only so an unsaved form can
    /// be represented before validation.
    pub scheduled_at: Option<NaiveDateTime>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub notes: String,
    pub created_at: Option<String>,
    /// Set when the task is marked done; re-stamped on repeat completion.
    pub completed_at: Option<String>,
}

impl Default for Task {
    fn default() -> Self {
        Task {
            id: None,
            customer_id: 0,
            description: String::new(),
            task_type: TaskType::Other,
            scheduled_at: None,
            status: TaskStatus::Pending,
            priority: TaskPriority::Medium,
            notes: String::new(),
            created_at: None,
            completed_at: None,
        }
    }
}

/// A row from the `interaction_log` table. Append-only: never updated or
/// deleted by the services.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionLogEntry {
    pub id: Option<i64>,
    pub customer_id: i64,
    /// Event tag, e.g. "customer_created" (see `crate::interactions::kind`).
    pub kind: String,
    pub description: String,
    pub created_at: Option<String>,
}

/// A row from the `users` table. Defined and persisted but unused by any
/// service in this crate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Option<i64>,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub access_level: AccessLevel,
    pub active: bool,
    pub created_at: Option<String>,
}
