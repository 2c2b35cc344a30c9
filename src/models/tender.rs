use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::validation::ValidationError;
use crate::types::{parse_date, TenderStatus};

pub const TITLE_MAX_CHARS: usize = 100;

/// Tender as returned to API consumers.
///
/// `created_at` is the creation *date*; the full timestamp stays in the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tender {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub budget: f64,
    pub deadline: NaiveDate,
    pub status: TenderStatus,
    pub category: String,
    pub company: String,
    pub location: String,
    #[serde(default)]
    pub requirements: Vec<String>,
    pub contact: String,
    #[serde(default)]
    pub created_by: Option<i32>,
    pub created_at: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Create/update payload. Every field is optional so that missing fields
/// surface as validation errors instead of deserialization failures, and so
/// the same type can carry partial updates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenderInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requirements: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
}

/// A fully validated tender body, ready to be stored
#[derive(Debug, Clone, PartialEq)]
pub struct TenderDraft {
    pub title: String,
    pub description: String,
    pub budget: f64,
    pub deadline: NaiveDate,
    pub status: TenderStatus,
    pub category: String,
    pub company: String,
    pub location: String,
    pub requirements: Vec<String>,
    pub contact: String,
}

impl TenderInput {
    /// Fields present in `other` replace the ones in `self`
    pub fn overlay(mut self, other: &TenderInput) -> Self {
        fn pick<T: Clone>(current: Option<T>, incoming: &Option<T>) -> Option<T> {
            incoming.clone().or(current)
        }
        self.title = pick(self.title, &other.title);
        self.description = pick(self.description, &other.description);
        self.budget = pick(self.budget, &other.budget);
        self.deadline = pick(self.deadline, &other.deadline);
        self.status = pick(self.status, &other.status);
        self.category = pick(self.category, &other.category);
        self.company = pick(self.company, &other.company);
        self.location = pick(self.location, &other.location);
        self.requirements = pick(self.requirements, &other.requirements);
        self.contact = pick(self.contact, &other.contact);
        self
    }

    pub fn into_draft(self) -> Result<TenderDraft, ValidationError> {
        let mut errors = ValidationError::default();

        let title = self.title.unwrap_or_default().trim().to_string();
        if title.is_empty() {
            errors.push("title", "Please provide a title");
        } else if title.chars().count() > TITLE_MAX_CHARS {
            errors.push("title", "Title cannot be more than 100 characters");
        }

        let description = self.description.unwrap_or_default().trim().to_string();
        if description.is_empty() {
            errors.push("description", "Please provide a description");
        }

        let budget = match self.budget {
            None => {
                errors.push("budget", "Please provide a budget");
                0.0
            }
            Some(b) if !b.is_finite() || b < 0.0 => {
                errors.push("budget", "Budget must be a non-negative number");
                0.0
            }
            Some(b) => b,
        };

        let deadline = match self.deadline.as_deref().map(str::trim) {
            None | Some("") => {
                errors.push("deadline", "Please provide a deadline");
                NaiveDate::MIN
            }
            Some(raw) => parse_date(raw).unwrap_or_else(|| {
                errors.push("deadline", "Deadline must be a date (YYYY-MM-DD)");
                NaiveDate::MIN
            }),
        };

        let status = match self.status.as_deref().map(str::trim) {
            None | Some("") => TenderStatus::Open,
            Some(raw) => raw.to_ascii_lowercase().parse::<TenderStatus>().unwrap_or_else(|msg: String| {
                errors.push("status", msg);
                TenderStatus::Open
            }),
        };

        let mut required = |field: &str, value: Option<String>| {
            let value = value.unwrap_or_default().trim().to_string();
            if value.is_empty() {
                errors.push(field, format!("Please provide a {}", field));
            }
            value
        };
        let category = required("category", self.category);
        let company = required("company", self.company);
        let location = required("location", self.location);
        let contact = required("contact", self.contact);

        let requirements = self
            .requirements
            .unwrap_or_default()
            .into_iter()
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .collect();

        errors.into_result(TenderDraft {
            title,
            description,
            budget,
            deadline,
            status,
            category,
            company,
            location,
            requirements,
            contact,
        })
    }
}

impl From<&Tender> for TenderInput {
    fn from(t: &Tender) -> Self {
        Self {
            title: Some(t.title.clone()),
            description: Some(t.description.clone()),
            budget: Some(t.budget),
            deadline: Some(t.deadline.format("%Y-%m-%d").to_string()),
            status: Some(t.status.as_str().to_string()),
            category: Some(t.category.clone()),
            company: Some(t.company.clone()),
            location: Some(t.location.clone()),
            requirements: Some(t.requirements.clone()),
            contact: Some(t.contact.clone()),
        }
    }
}

impl Tender {
    /// Builds a tender from a validated draft
    pub fn from_draft(id: i32, draft: TenderDraft, created_by: Option<i32>, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            title: draft.title,
            description: draft.description,
            budget: draft.budget,
            deadline: draft.deadline,
            status: draft.status,
            category: draft.category,
            company: draft.company,
            location: draft.location,
            requirements: draft.requirements,
            contact: draft.contact,
            created_by,
            created_at: created_at.date_naive(),
            updated_at: Some(created_at),
        }
    }

    /// Applies a partial update; the merged result must still validate.
    /// `id`, `created_by` and `created_at` are never touched.
    pub fn apply(&mut self, update: &TenderInput) -> Result<(), ValidationError> {
        let draft = TenderInput::from(&*self).overlay(update).into_draft()?;
        self.title = draft.title;
        self.description = draft.description;
        self.budget = draft.budget;
        self.deadline = draft.deadline;
        self.status = draft.status;
        self.category = draft.category;
        self.company = draft.company;
        self.location = draft.location;
        self.requirements = draft.requirements;
        self.contact = draft.contact;
        Ok(())
    }
}
