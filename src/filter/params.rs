use std::collections::HashMap;

use serde_json::Value;

use super::types::TenderQuery;
use crate::types::parse_date;

/// Query-string parameters as received by the search / filter endpoints
pub type RawParams = HashMap<String, String>;

/// `{searchTerm, category, status}` as carried by the `query` parameter
#[derive(Debug, Default, PartialEq)]
struct EmbeddedQuery {
    search_term: Option<String>,
    category: Option<String>,
    status: Option<String>,
}

impl TenderQuery {
    /// Parses search-endpoint parameters. Never fails: values that cannot be
    /// understood degrade to the most permissive reading.
    ///
    /// The text part arrives in one of three shapes:
    /// - `query=<json object>` carrying `searchTerm`, `category`, `status`
    /// - `query=<anything else>`, taken verbatim as the search term
    /// - `query[searchTerm]=..` style nested keys, or plain top-level keys
    pub fn from_search_params(params: &RawParams) -> Self {
        let embedded = match params.get("query") {
            Some(raw) => parse_embedded_query(raw),
            None => EmbeddedQuery {
                search_term: nested_or_top(params, "searchTerm"),
                category: nested_or_top(params, "category"),
                status: nested_or_top(params, "status"),
            },
        };

        Self {
            search_term: embedded.search_term,
            category: embedded.category.or_else(|| params.get("category").cloned()),
            status: embedded.status.or_else(|| params.get("status").cloned()),
            min_budget: number_param(params, "minBudget"),
            max_budget: number_param(params, "maxBudget"),
            deadline_after: date_param(params, "deadlineAfter"),
            created_after: date_param(params, "createdAfter"),
        }
    }

    /// Parses filter-endpoint parameters: category, status and budget only
    pub fn from_filter_params(params: &RawParams) -> Self {
        Self {
            category: params.get("category").cloned(),
            status: params.get("status").cloned(),
            min_budget: number_param(params, "minBudget"),
            max_budget: number_param(params, "maxBudget"),
            ..Default::default()
        }
    }

    /// Encodes for the search endpoint: text fields go into a JSON `query`
    /// object, numeric and date refinements stay top-level.
    pub fn to_search_params(&self) -> Vec<(String, String)> {
        let mut embedded = serde_json::Map::new();
        for (key, value) in [
            ("searchTerm", &self.search_term),
            ("category", &self.category),
            ("status", &self.status),
        ] {
            if let Some(v) = value {
                embedded.insert(key.to_string(), Value::String(v.clone()));
            }
        }

        let mut pairs = vec![("query".to_string(), Value::Object(embedded).to_string())];
        pairs.extend(self.refinement_pairs(true));
        pairs
    }

    pub fn to_filter_params(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(category) = &self.category {
            pairs.push(("category".to_string(), category.clone()));
        }
        if let Some(status) = &self.status {
            pairs.push(("status".to_string(), status.clone()));
        }
        pairs.extend(self.refinement_pairs(false));
        pairs
    }

    fn refinement_pairs(&self, with_dates: bool) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(min) = self.min_budget {
            pairs.push(("minBudget".to_string(), min.to_string()));
        }
        if let Some(max) = self.max_budget {
            pairs.push(("maxBudget".to_string(), max.to_string()));
        }
        if with_dates {
            if let Some(date) = self.deadline_after {
                pairs.push(("deadlineAfter".to_string(), date.format("%Y-%m-%d").to_string()));
            }
            if let Some(date) = self.created_after {
                pairs.push(("createdAfter".to_string(), date.format("%Y-%m-%d").to_string()));
            }
        }
        pairs
    }
}

fn parse_embedded_query(raw: &str) -> EmbeddedQuery {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(object)) => EmbeddedQuery {
            search_term: object_string(&object, "searchTerm"),
            category: object_string(&object, "category"),
            status: object_string(&object, "status"),
        },
        Ok(Value::String(term)) => EmbeddedQuery {
            search_term: Some(term),
            ..Default::default()
        },
        Ok(_) | Err(_) => {
            tracing::debug!("query parameter is not a JSON object, using it as the search term");
            EmbeddedQuery {
                search_term: Some(raw.to_string()),
                ..Default::default()
            }
        }
    }
}

fn object_string(object: &serde_json::Map<String, Value>, key: &str) -> Option<String> {
    match object.get(key)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn nested_or_top(params: &RawParams, key: &str) -> Option<String> {
    params
        .get(&format!("query[{}]", key))
        .or_else(|| params.get(key))
        .cloned()
}

fn number_param(params: &RawParams, key: &str) -> Option<f64> {
    let raw = params.get(key)?.trim();
    if raw.is_empty() {
        return None;
    }
    match raw.parse::<f64>() {
        Ok(n) if n.is_finite() => Some(n),
        _ => {
            tracing::warn!("ignoring unparseable {} value '{}'", key, raw);
            None
        }
    }
}

fn date_param(params: &RawParams, key: &str) -> Option<chrono::NaiveDate> {
    let raw = params.get(key)?;
    if raw.trim().is_empty() {
        return None;
    }
    let date = parse_date(raw);
    if date.is_none() {
        tracing::warn!("ignoring unparseable {} value '{}'", key, raw);
    }
    date
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn params(pairs: &[(&str, &str)]) -> RawParams {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn json_query_object_supplies_text_fields() {
        let q = TenderQuery::from_search_params(&params(&[(
            "query",
            r#"{"searchTerm":"road","category":"Construction","status":"All"}"#,
        )]));
        assert_eq!(q.search_term.as_deref(), Some("road"));
        assert_eq!(q.category.as_deref(), Some("Construction"));
        assert_eq!(q.status.as_deref(), Some("All"));
    }

    #[test]
    fn malformed_json_falls_back_to_raw_term() {
        let q = TenderQuery::from_search_params(&params(&[("query", "{road")]));
        assert_eq!(q.search_term.as_deref(), Some("{road"));

        let q = TenderQuery::from_search_params(&params(&[("query", "hospital")]));
        assert_eq!(q.search_term.as_deref(), Some("hospital"));
    }

    #[test]
    fn json_that_is_not_an_object_is_a_raw_term() {
        let q = TenderQuery::from_search_params(&params(&[("query", "42")]));
        assert_eq!(q.search_term.as_deref(), Some("42"));
    }

    #[test]
    fn quoted_json_string_is_unwrapped() {
        let q = TenderQuery::from_search_params(&params(&[("query", "\"road\"")]));
        assert_eq!(q.search_term.as_deref(), Some("road"));
    }

    #[test]
    fn nested_and_top_level_keys_are_accepted() {
        let q = TenderQuery::from_search_params(&params(&[
            ("query[searchTerm]", "school"),
            ("query[category]", "IT"),
        ]));
        assert_eq!(q.search_term.as_deref(), Some("school"));
        assert_eq!(q.category.as_deref(), Some("IT"));

        let q = TenderQuery::from_search_params(&params(&[("searchTerm", "park"), ("status", "open")]));
        assert_eq!(q.search_term.as_deref(), Some("park"));
        assert_eq!(q.status.as_deref(), Some("open"));
    }

    #[test]
    fn refinements_are_read_from_top_level() {
        let q = TenderQuery::from_search_params(&params(&[
            ("query", "road"),
            ("minBudget", "1000"),
            ("maxBudget", " 2000.5 "),
            ("deadlineAfter", "2024-01-01"),
            ("createdAfter", "2023-06-01T00:00:00Z"),
        ]));
        assert_eq!(q.min_budget, Some(1000.0));
        assert_eq!(q.max_budget, Some(2000.5));
        assert_eq!(q.deadline_after, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(q.created_after, NaiveDate::from_ymd_opt(2023, 6, 1));
    }

    #[test]
    fn unparseable_numbers_and_dates_are_ignored() {
        let q = TenderQuery::from_search_params(&params(&[
            ("minBudget", "lots"),
            ("maxBudget", "NaN"),
            ("deadlineAfter", "tomorrow"),
        ]));
        assert_eq!(q, TenderQuery::default());
    }

    #[test]
    fn filter_params_ignore_text_and_dates() {
        let q = TenderQuery::from_filter_params(&params(&[
            ("searchTerm", "road"),
            ("category", "IT"),
            ("minBudget", "5"),
            ("deadlineAfter", "2024-01-01"),
        ]));
        assert_eq!(q.search_term, None);
        assert_eq!(q.category.as_deref(), Some("IT"));
        assert_eq!(q.min_budget, Some(5.0));
        assert_eq!(q.deadline_after, None);
    }

    #[test]
    fn search_params_encoding_is_understood_by_the_parser() {
        let original = TenderQuery {
            search_term: Some("road".into()),
            category: Some("Construction".into()),
            status: None,
            min_budget: Some(10.0),
            max_budget: None,
            deadline_after: NaiveDate::from_ymd_opt(2024, 1, 1),
            created_after: None,
        };
        let encoded: RawParams = original.to_search_params().into_iter().collect();
        assert_eq!(TenderQuery::from_search_params(&encoded), original);
    }
}
