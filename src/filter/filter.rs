use super::filter_where::FilterWhere;
use super::types::{QueryMode, SqlResult, TenderPredicate, TenderQuery};
use crate::models::Tender;

/// Entry point of the query builder: one predicate, two evaluators
/// (SQL for the database, `apply` for in-memory collections).
#[derive(Debug, Clone)]
pub struct Filter {
    table_name: &'static str,
    predicate: TenderPredicate,
}

impl Filter {
    pub const TENDERS_TABLE: &'static str = "tenders";

    pub fn new(query: &TenderQuery, mode: QueryMode) -> Self {
        let predicate = query.predicate(mode);
        tracing::debug!("{:?} predicate: {:?}", mode, predicate.conditions());
        Self::from_predicate(predicate)
    }

    pub fn from_predicate(predicate: TenderPredicate) -> Self {
        Self {
            table_name: Self::TENDERS_TABLE,
            predicate,
        }
    }

    pub fn predicate(&self) -> &TenderPredicate {
        &self.predicate
    }

    /// Full SELECT over the tenders table; no ordering or limit is added
    pub fn to_sql(&self) -> SqlResult {
        let where_result = self.to_where_sql();
        let query = if where_result.query.is_empty() {
            format!("SELECT * FROM \"{}\"", self.table_name)
        } else {
            format!("SELECT * FROM \"{}\" WHERE {}", self.table_name, where_result.query)
        };
        SqlResult {
            query,
            params: where_result.params,
        }
    }

    pub fn to_where_sql(&self) -> SqlResult {
        let (query, params) = FilterWhere::generate(&self.predicate, 0);
        SqlResult { query, params }
    }

    /// Keeps the matching tenders, preserving input order
    pub fn apply<'a, I>(&self, tenders: I) -> Vec<Tender>
    where
        I: IntoIterator<Item = &'a Tender>,
    {
        tenders
            .into_iter()
            .filter(|tender| self.predicate.matches(tender))
            .cloned()
            .collect()
    }
}
