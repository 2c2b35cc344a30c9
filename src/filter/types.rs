use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::Tender;

/// Category/status value meaning "no constraint"
pub const ALL_SENTINEL: &str = "All";

/// Which entry point a query is evaluated for.
///
/// `Search` honours every field; `Filter` has no free text and no date
/// bounds, only category, status and budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryMode {
    Search,
    Filter,
}

/// Optional search / filter parameters as supplied by a caller
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenderQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_term: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_budget: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_budget: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline_after: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_after: Option<NaiveDate>,
}

/// One predicate primitive. All conditions of a predicate are ANDed.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Case-insensitive substring of title OR description OR company
    Text(String),
    Category(String),
    Status(String),
    MinBudget(f64),
    MaxBudget(f64),
    DeadlineFrom(NaiveDate),
    CreatedFrom(NaiveDate),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TenderPredicate {
    conditions: Vec<Condition>,
}

/// Bind parameter produced by SQL generation
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Text(String),
    Float(f64),
    Date(NaiveDate),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<SqlParam>,
}

impl TenderQuery {
    pub fn search(term: impl Into<String>) -> Self {
        Self {
            search_term: Some(term.into()),
            ..Default::default()
        }
    }

    /// Builds the predicate for the given entry point. Empty strings and the
    /// "All" sentinel are treated as absent.
    pub fn predicate(&self, mode: QueryMode) -> TenderPredicate {
        let mut conditions = Vec::new();

        if mode == QueryMode::Search {
            if let Some(term) = self.search_term.as_deref().filter(|t| !t.is_empty()) {
                conditions.push(Condition::Text(term.to_string()));
            }
        }
        if let Some(category) = active(&self.category) {
            conditions.push(Condition::Category(category.to_string()));
        }
        if let Some(status) = active(&self.status) {
            conditions.push(Condition::Status(status.to_ascii_lowercase()));
        }
        if let Some(min) = self.min_budget {
            conditions.push(Condition::MinBudget(min));
        }
        if let Some(max) = self.max_budget {
            conditions.push(Condition::MaxBudget(max));
        }
        if mode == QueryMode::Search {
            if let Some(date) = self.deadline_after {
                conditions.push(Condition::DeadlineFrom(date));
            }
            if let Some(date) = self.created_after {
                conditions.push(Condition::CreatedFrom(date));
            }
        }

        TenderPredicate { conditions }
    }
}

fn active(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case(ALL_SENTINEL))
}

impl TenderPredicate {
    pub fn new(conditions: Vec<Condition>) -> Self {
        Self { conditions }
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Evaluates the predicate against an in-memory tender
    pub fn matches(&self, tender: &Tender) -> bool {
        self.conditions.iter().all(|condition| condition.matches(tender))
    }
}

impl Condition {
    pub fn matches(&self, tender: &Tender) -> bool {
        match self {
            Condition::Text(term) => {
                let needle = term.to_lowercase();
                [&tender.title, &tender.description, &tender.company]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&needle))
            }
            Condition::Category(category) => tender.category == *category,
            Condition::Status(status) => tender.status.as_str() == status,
            Condition::MinBudget(min) => tender.budget >= *min,
            Condition::MaxBudget(max) => tender.budget <= *max,
            Condition::DeadlineFrom(date) => tender.deadline >= *date,
            Condition::CreatedFrom(date) => tender.created_at >= *date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::sample_tenders;

    fn ids(query: &TenderQuery, mode: QueryMode) -> Vec<i32> {
        let predicate = query.predicate(mode);
        sample_tenders().iter().filter(|t| predicate.matches(t)).map(|t| t.id).collect()
    }

    #[test]
    fn search_matches_title_description_or_company_case_insensitively() {
        assert_eq!(ids(&TenderQuery::search("ROAD"), QueryMode::Search), vec![1]);
        assert_eq!(ids(&TenderQuery::search("hospital"), QueryMode::Search), vec![2]);
        assert_eq!(ids(&TenderQuery::search("ministry"), QueryMode::Search), vec![1, 3]);
        assert!(ids(&TenderQuery::search("no such text"), QueryMode::Search).is_empty());
    }

    #[test]
    fn search_does_not_look_at_category_or_location() {
        // "Construction" is only a category in the samples
        assert!(ids(&TenderQuery::search("construction"), QueryMode::Search).is_empty());
    }

    #[test]
    fn search_handles_non_ascii_case_folding() {
        assert_eq!(ids(&TenderQuery::search("МЕКТЕП"), QueryMode::Search), vec![4]);
    }

    #[test]
    fn all_sentinel_and_empty_values_are_ignored() {
        let query = TenderQuery {
            search_term: Some(String::new()),
            category: Some("All".into()),
            status: Some("all".into()),
            ..Default::default()
        };
        assert!(query.predicate(QueryMode::Search).is_empty());
        assert_eq!(ids(&query, QueryMode::Search).len(), sample_tenders().len());
    }

    #[test]
    fn category_requires_exact_equality() {
        let query = TenderQuery {
            category: Some("Construction".into()),
            ..Default::default()
        };
        assert_eq!(ids(&query, QueryMode::Filter), vec![1, 4]);

        let query = TenderQuery {
            category: Some("construction".into()),
            ..Default::default()
        };
        assert!(ids(&query, QueryMode::Filter).is_empty());
    }

    #[test]
    fn status_is_compared_lower_cased() {
        let query = TenderQuery {
            status: Some("Closed".into()),
            ..Default::default()
        };
        assert_eq!(ids(&query, QueryMode::Filter), vec![3]);
    }

    #[test]
    fn budget_bounds_are_inclusive() {
        let query = TenderQuery {
            min_budget: Some(40_000_000.0),
            max_budget: Some(50_000_000.0),
            ..Default::default()
        };
        assert_eq!(ids(&query, QueryMode::Filter), vec![1]);

        let query = TenderQuery {
            min_budget: Some(45_000_000.0),
            max_budget: Some(45_000_000.0),
            ..Default::default()
        };
        assert_eq!(ids(&query, QueryMode::Filter), vec![1]);

        let query = TenderQuery {
            max_budget: Some(120_000_000.0),
            ..Default::default()
        };
        assert_eq!(ids(&query, QueryMode::Filter), vec![1, 2]);
    }

    #[test]
    fn text_and_refinements_combine_with_and() {
        let query = TenderQuery {
            search_term: Some("ministry".into()),
            status: Some("open".into()),
            ..Default::default()
        };
        assert_eq!(ids(&query, QueryMode::Search), vec![1]);
    }

    #[test]
    fn date_bounds_apply_only_in_search_mode() {
        let query = TenderQuery {
            deadline_after: NaiveDate::from_ymd_opt(2024, 1, 1),
            created_after: NaiveDate::from_ymd_opt(2023, 6, 1),
            ..Default::default()
        };
        assert_eq!(ids(&query, QueryMode::Search), vec![2, 4]);
        assert_eq!(ids(&query, QueryMode::Filter).len(), sample_tenders().len());
    }

    #[test]
    fn filter_mode_ignores_free_text() {
        let query = TenderQuery::search("road");
        assert!(query.predicate(QueryMode::Filter).is_empty());
    }
}
