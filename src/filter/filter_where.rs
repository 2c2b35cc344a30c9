use super::types::{Condition, SqlParam, TenderPredicate};

/// Columns matched by free-text search
const TEXT_COLUMNS: [&str; 3] = ["title", "description", "company"];

/// Turns a `TenderPredicate` into a parameterised WHERE clause
pub struct FilterWhere {
    param_values: Vec<SqlParam>,
    param_index: usize,
}

impl FilterWhere {
    pub fn new(starting_param_index: usize) -> Self {
        Self {
            param_values: vec![],
            param_index: starting_param_index,
        }
    }

    /// Returns the clause (empty when there is nothing to constrain) and its
    /// bind parameters in `$n` order.
    pub fn generate(predicate: &TenderPredicate, starting_param_index: usize) -> (String, Vec<SqlParam>) {
        let mut filter_where = Self::new(starting_param_index);
        let sql_conditions: Vec<String> = predicate
            .conditions()
            .iter()
            .map(|condition| filter_where.build_sql_condition(condition))
            .collect();
        (sql_conditions.join(" AND "), filter_where.param_values)
    }

    fn build_sql_condition(&mut self, condition: &Condition) -> String {
        match condition {
            Condition::Text(term) => {
                let placeholder = self.param(SqlParam::Text(format!("%{}%", escape_like(term))));
                let alternatives: Vec<String> = TEXT_COLUMNS
                    .iter()
                    .map(|column| format!("\"{}\" ILIKE {}", column, placeholder))
                    .collect();
                format!("({})", alternatives.join(" OR "))
            }
            Condition::Category(category) => {
                format!("\"category\" = {}", self.param(SqlParam::Text(category.clone())))
            }
            Condition::Status(status) => {
                format!("\"status\" = {}", self.param(SqlParam::Text(status.clone())))
            }
            Condition::MinBudget(min) => format!("\"budget\" >= {}", self.param(SqlParam::Float(*min))),
            Condition::MaxBudget(max) => format!("\"budget\" <= {}", self.param(SqlParam::Float(*max))),
            Condition::DeadlineFrom(date) => format!("\"deadline\" >= {}", self.param(SqlParam::Date(*date))),
            Condition::CreatedFrom(date) => format!(
                "(\"created_at\" AT TIME ZONE 'UTC')::date >= {}",
                self.param(SqlParam::Date(*date))
            ),
        }
    }

    fn param(&mut self, value: SqlParam) -> String {
        self.param_values.push(value);
        self.param_index += 1;
        format!("${}", self.param_index)
    }
}

/// Escapes LIKE wildcards so the term is matched literally
pub fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn empty_predicate_produces_no_clause() {
        let (sql, params) = FilterWhere::generate(&TenderPredicate::default(), 0);
        assert!(sql.is_empty());
        assert!(params.is_empty());
    }

    #[test]
    fn text_search_reuses_one_parameter_across_three_columns() {
        let predicate = TenderPredicate::new(vec![Condition::Text("road".into())]);
        let (sql, params) = FilterWhere::generate(&predicate, 0);
        assert_eq!(
            sql,
            "(\"title\" ILIKE $1 OR \"description\" ILIKE $1 OR \"company\" ILIKE $1)"
        );
        assert_eq!(params, vec![SqlParam::Text("%road%".into())]);
    }

    #[test]
    fn conditions_are_anded_with_sequential_placeholders() {
        let predicate = TenderPredicate::new(vec![
            Condition::Text("it".into()),
            Condition::Category("IT".into()),
            Condition::Status("open".into()),
            Condition::MinBudget(10.0),
            Condition::MaxBudget(20.0),
            Condition::DeadlineFrom(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()),
            Condition::CreatedFrom(NaiveDate::from_ymd_opt(2023, 1, 1).unwrap()),
        ]);
        let (sql, params) = FilterWhere::generate(&predicate, 0);

        assert!(sql.contains("\"category\" = $2"));
        assert!(sql.contains("\"status\" = $3"));
        assert!(sql.contains("\"budget\" >= $4 AND \"budget\" <= $5"));
        assert!(sql.contains("\"deadline\" >= $6"));
        assert!(sql.ends_with("(\"created_at\" AT TIME ZONE 'UTC')::date >= $7"));
        assert_eq!(params.len(), 7);
    }

    #[test]
    fn starting_index_offsets_placeholders() {
        let predicate = TenderPredicate::new(vec![Condition::Status("open".into())]);
        let (sql, _) = FilterWhere::generate(&predicate, 2);
        assert_eq!(sql, "\"status\" = $3");
    }

    #[test]
    fn like_wildcards_in_terms_are_escaped() {
        assert_eq!(escape_like("100%_done\\"), "100\\%\\_done\\\\");
        let predicate = TenderPredicate::new(vec![Condition::Text("50%".into())]);
        let (_, params) = FilterWhere::generate(&predicate, 0);
        assert_eq!(params, vec![SqlParam::Text("%50\\%%".into())]);
    }
}
