use chrono::{NaiveDate, Utc};
use rusqlite::{params, Row};

use super::{CrmDb, DbError, Opportunity, Stage};

/// One day of closed-won sales, from `won_value_by_day`.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySales {
    /// Creation date, `YYYY-MM-DD`.
    pub day: String,
    pub total: f64,
}

impl CrmDb {
    // =========================================================================
    // Opportunities
    // =========================================================================

    /// Total, field-by-field row mapping. Unknown stage text maps to the
    /// default stage and an unparseable close date to `None`, so a corrupt
    /// row still materializes.
    fn map_opportunity_row(row: &Row) -> rusqlite::Result<Opportunity> {
        let stage: String = row.get(3)?;
        let close_date: Option<String> = row.get(6)?;
        Ok(Opportunity {
            id: row.get(0)?,
            customer_id: row.get(1)?,
            title: row.get(2)?,
            stage: stage.parse().unwrap_or_default(),
            value: row.get(4)?,
            probability: row.get(5)?,
            expected_close_date: close_date
                .and_then(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d").ok()),
            owner: row.get(7)?,
            notes: row.get(8)?,
            created_at: row.get(9)?,
            updated_at: row.get(10)?,
        })
    }

    const OPPORTUNITY_COLUMNS: &'static str =
        "id, customer_id, title, stage, value, probability, expected_close_date,
         owner, notes, created_at, updated_at";

    /// Insert an opportunity and return the new id.
    pub fn insert_opportunity(&self, opportunity: &Opportunity) -> Result<i64, DbError> {
        let now = Utc::now().to_rfc3339();
        self.conn_ref().execute(
            "INSERT INTO opportunities (
                customer_id, title, stage, value, probability,
                expected_close_date, owner, notes, created_at, updated_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)",
            params![
                opportunity.customer_id,
                opportunity.title,
                opportunity.stage.as_str(),
                opportunity.value,
                opportunity.probability,
                opportunity.expected_close_date.map(|d| d.to_string()),
                opportunity.owner,
                opportunity.notes,
                now,
            ],
        )?;
        Ok(self.conn_ref().last_insert_rowid())
    }

    /// Update every caller-supplied column of an existing opportunity.
    pub fn update_opportunity(&self, opportunity: &Opportunity) -> Result<(), DbError> {
        let now = Utc::now().to_rfc3339();
        self.conn_ref().execute(
            "UPDATE opportunities SET
                customer_id = ?1, title = ?2, stage = ?3, value = ?4,
                probability = ?5, expected_close_date = ?6, owner = ?7,
                notes = ?8, updated_at = ?9
             WHERE id = ?10",
            params![
                opportunity.customer_id,
                opportunity.title,
                opportunity.stage.as_str(),
                opportunity.value,
                opportunity.probability,
                opportunity.expected_close_date.map(|d| d.to_string()),
                opportunity.owner,
                opportunity.notes,
                now,
                opportunity.id,
            ],
        )?;
        Ok(())
    }

    /// Update only the stage column.
    pub fn update_opportunity_stage(&self, id: i64, stage: Stage) -> Result<(), DbError> {
        let now = Utc::now().to_rfc3339();
        self.conn_ref().execute(
            "UPDATE opportunities SET stage = ?1, updated_at = ?2 WHERE id = ?3",
            params![stage.as_str(), now, id],
        )?;
        Ok(())
    }

    /// Get a single opportunity by id.
    pub fn get_opportunity(&self, id: i64) -> Result<Option<Opportunity>, DbError> {
        let mut stmt = self.conn_ref().prepare(&format!(
            "SELECT {} FROM opportunities WHERE id = ?1",
            Self::OPPORTUNITY_COLUMNS
        ))?;
        let mut rows = stmt.query_map(params![id], Self::map_opportunity_row)?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    /// List all opportunities, newest first.
    pub fn list_opportunities(&self) -> Result<Vec<Opportunity>, DbError> {
        let mut stmt = self.conn_ref().prepare(&format!(
            "SELECT {} FROM opportunities ORDER BY id DESC",
            Self::OPPORTUNITY_COLUMNS
        ))?;
        let rows = stmt.query_map([], Self::map_opportunity_row)?;

        let mut opportunities = Vec::new();
        for row in rows {
            opportunities.push(row?);
        }
        Ok(opportunities)
    }

    /// Opportunities belonging to one customer, newest first.
    pub fn opportunities_by_customer(&self, customer_id: i64) -> Result<Vec<Opportunity>, DbError> {
        let mut stmt = self.conn_ref().prepare(&format!(
            "SELECT {} FROM opportunities WHERE customer_id = ?1 ORDER BY created_at DESC, id DESC",
            Self::OPPORTUNITY_COLUMNS
        ))?;
        let rows = stmt.query_map(params![customer_id], Self::map_opportunity_row)?;

        let mut opportunities = Vec::new();
        for row in rows {
            opportunities.push(row?);
        }
        Ok(opportunities)
    }

    /// Opportunities in one stage, soonest expected close first.
    pub fn opportunities_by_stage(&self, stage: Stage) -> Result<Vec<Opportunity>, DbError> {
        let mut stmt = self.conn_ref().prepare(&format!(
            "SELECT {} FROM opportunities WHERE stage = ?1 ORDER BY expected_close_date",
            Self::OPPORTUNITY_COLUMNS
        ))?;
        let rows = stmt.query_map(params![stage.as_str()], Self::map_opportunity_row)?;

        let mut opportunities = Vec::new();
        for row in rows {
            opportunities.push(row?);
        }
        Ok(opportunities)
    }

    /// Delete an opportunity. Returns true if a row went.
    pub fn delete_opportunity(&self, id: i64) -> Result<bool, DbError> {
        let affected = self
            .conn_ref()
            .execute("DELETE FROM opportunities WHERE id = ?1", params![id])?;
        Ok(affected > 0)
    }

    /// Closed-won value summed per creation date inside `[start, end]`.
    ///
    /// Runs directly in SQL rather than over the in-memory list — the date
    /// range can span far more rows than a dashboard ever materializes.
    pub fn won_value_by_day(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailySales>, DbError> {
        let mut stmt = self.conn_ref().prepare(
            "SELECT date(created_at) AS day, SUM(value) AS total
             FROM opportunities
             WHERE stage = 'Won' AND date(created_at) BETWEEN ?1 AND ?2
             GROUP BY date(created_at)
             ORDER BY day",
        )?;
        let rows = stmt.query_map(params![start.to_string(), end.to_string()], |row| {
            Ok(DailySales {
                day: row.get(0)?,
                total: row.get(1)?,
            })
        })?;

        let mut days = Vec::new();
        for row in rows {
            days.push(row?);
        }
        Ok(days)
    }
}
