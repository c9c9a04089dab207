//! CSV export for customers, opportunities, and tasks.
//!
//! One row per entity under a fixed header per entity type, written UTF-8.
//! Quoting follows RFC 4180: fields containing commas, quotes, or newlines
//! are wrapped in double quotes with inner quotes doubled.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::Local;

use crate::db::{Customer, Opportunity, Task};

const CUSTOMER_HEADER: [&str; 15] = [
    "ID", "Name", "Email", "Phone", "Company", "Tax ID", "Street", "Number",
    "District", "City", "State", "Postal Code", "Notes", "Created At", "Updated At",
];

const OPPORTUNITY_HEADER: [&str; 11] = [
    "ID", "Customer ID", "Title", "Stage", "Value", "Probability",
    "Expected Close Date", "Owner", "Notes", "Created At", "Updated At",
];

const TASK_HEADER: [&str; 10] = [
    "ID", "Customer ID", "Description", "Type", "Scheduled At", "Status",
    "Priority", "Notes", "Created At", "Completed At",
];

fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') || value.contains('\r') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn write_row<W: Write>(out: &mut W, fields: &[String]) -> std::io::Result<()> {
    let escaped: Vec<String> = fields.iter().map(|f| csv_field(f)).collect();
    writeln!(out, "{}", escaped.join(","))
}

fn opt(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn opt_id(id: &Option<i64>) -> String {
    id.map(|v| v.to_string()).unwrap_or_default()
}

/// Build the export filename: `{entity}_{YYYYMMDD_HHMMSS}.csv`.
pub fn export_filename(entity: &str) -> String {
    format!("{}_{}.csv", entity, Local::now().format("%Y%m%d_%H%M%S"))
}

/// Write customers to a CSV file at `path`.
pub fn export_customers_csv(customers: &[Customer], path: &Path) -> std::io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    write_row(&mut out, &CUSTOMER_HEADER.map(String::from))?;
    for customer in customers {
        write_row(
            &mut out,
            &[
                opt_id(&customer.id),
                customer.name.clone(),
                customer.email.clone(),
                customer.phone.clone(),
                customer.company.clone(),
                customer.tax_id.clone(),
                customer.street.clone(),
                customer.number.clone(),
                customer.district.clone(),
                customer.city.clone(),
                customer.state.clone(),
                customer.postal_code.clone(),
                customer.notes.clone(),
                opt(&customer.created_at),
                opt(&customer.updated_at),
            ],
        )?;
    }
    out.flush()
}

/// Write opportunities to a CSV file at `path`.
pub fn export_opportunities_csv(opportunities: &[Opportunity], path: &Path) -> std::io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    write_row(&mut out, &OPPORTUNITY_HEADER.map(String::from))?;
    for opportunity in opportunities {
        write_row(
            &mut out,
            &[
                opt_id(&opportunity.id),
                opportunity.customer_id.to_string(),
                opportunity.title.clone(),
                opportunity.stage.to_string(),
                format!("{:.2}", opportunity.value),
                opportunity.probability.to_string(),
                opportunity
                    .expected_close_date
                    .map(|d| d.to_string())
                    .unwrap_or_default(),
                opportunity.owner.clone(),
                opportunity.notes.clone(),
                opt(&opportunity.created_at),
                opt(&opportunity.updated_at),
            ],
        )?;
    }
    out.flush()
}

/// Write tasks to a CSV file at `path`.
pub fn export_tasks_csv(tasks: &[Task], path: &Path) -> std::io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    write_row(&mut out, &TASK_HEADER.map(String::from))?;
    for task in tasks {
        write_row(
            &mut out,
            &[
                opt_id(&task.id),
                task.customer_id.to_string(),
                task.description.clone(),
                task.task_type.to_string(),
                task.scheduled_at
                    .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                    .unwrap_or_default(),
                task.status.to_string(),
                task.priority.to_string(),
                task.notes.clone(),
                opt(&task.created_at),
                opt(&task.completed_at),
            ],
        )?;
    }
    out.flush()
}
