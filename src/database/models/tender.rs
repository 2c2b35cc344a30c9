use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

use crate::database::DatabaseError;
use crate::models::Tender;

/// `tenders` row; `status` is stored as its lower-case wire name
#[derive(Debug, Clone, FromRow)]
pub struct TenderRow {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub budget: f64,
    pub deadline: NaiveDate,
    pub status: String,
    pub category: String,
    pub company: String,
    pub location: String,
    pub requirements: Vec<String>,
    pub contact: String,
    pub created_by: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<TenderRow> for Tender {
    type Error = DatabaseError;

    fn try_from(row: TenderRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse()
            .map_err(|e: String| DatabaseError::QueryError(format!("tender {}: {}", row.id, e)))?;
        Ok(Tender {
            id: row.id,
            title: row.title,
            description: row.description,
            budget: row.budget,
            deadline: row.deadline,
            status,
            category: row.category,
            company: row.company,
            location: row.location,
            requirements: row.requirements,
            contact: row.contact,
            created_by: row.created_by,
            created_at: row.created_at.date_naive(),
            updated_at: Some(row.updated_at),
        })
    }
}

/// Converts a batch of rows, failing on the first corrupt one
pub fn into_tenders(rows: Vec<TenderRow>) -> Result<Vec<Tender>, DatabaseError> {
    rows.into_iter().map(Tender::try_from).collect()
}
