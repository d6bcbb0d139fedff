use super::error::FilterError;
use super::types::{FieldValue, FilterOp, FilterRow, FilterWhereInfo};

pub struct FilterWhere {
    param_values: Vec<FieldValue>,
    param_index: usize,
}

impl FilterWhere {
    pub fn new(starting_param_index: usize) -> Self {
        Self {
            param_values: vec![],
            param_index: starting_param_index,
        }
    }

    /// Build a WHERE body (without the keyword) and its positional parameters.
    /// An empty condition list yields an empty string.
    pub fn generate(
        conditions: &[FilterWhereInfo],
        starting_param_index: usize,
    ) -> Result<(String, Vec<FieldValue>), FilterError> {
        let mut filter_where = Self::new(starting_param_index);
        filter_where.build(conditions)
    }

    pub fn validate(conditions: &[FilterWhereInfo]) -> Result<(), FilterError> {
        for condition in conditions {
            if condition.data.is_empty() {
                return Err(FilterError::InvalidWhereClause(format!(
                    "condition on {} has no values",
                    condition.column
                )));
            }
            if condition.operator == FilterOp::Eq && condition.data.len() != 1 {
                return Err(FilterError::InvalidWhereClause(format!(
                    "$eq on {} takes exactly one value",
                    condition.column
                )));
            }
        }
        Ok(())
    }

    /// Evaluate the conditions against an in-memory row; all must hold.
    pub fn matches<R: FilterRow>(conditions: &[FilterWhereInfo], row: &R) -> Result<bool, FilterError> {
        for condition in conditions {
            let value = row
                .field(&condition.column)
                .ok_or_else(|| FilterError::InvalidColumn(condition.column.clone()))?;
            // NULL never equals anything, as in SQL
            if value == FieldValue::Null || !condition.data.contains(&value) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn build(&mut self, conditions: &[FilterWhereInfo]) -> Result<(String, Vec<FieldValue>), FilterError> {
        Self::validate(conditions)?;
        self.param_values.clear();

        let mut sql_conditions = vec![];
        for condition in conditions {
            sql_conditions.push(self.build_sql_condition(condition));
        }
        Ok((sql_conditions.join(" AND "), self.param_values.clone()))
    }

    fn build_sql_condition(&mut self, condition: &FilterWhereInfo) -> String {
        let column = format!("\"{}\"", condition.column);
        match condition.operator {
            FilterOp::Eq => {
                let placeholder = self.push_param(condition.data[0].clone());
                format!("{} = {}", column, placeholder)
            }
            FilterOp::In => {
                let placeholders: Vec<String> = condition
                    .data
                    .iter()
                    .map(|v| self.push_param(v.clone()))
                    .collect();
                format!("{} IN ({})", column, placeholders.join(", "))
            }
        }
    }

    fn push_param(&mut self, value: FieldValue) -> String {
        self.param_values.push(value);
        self.param_index += 1;
        format!("${}", self.param_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Row(i64);

    impl FilterRow for Row {
        fn field(&self, column: &str) -> Option<FieldValue> {
            (column == "contact_id").then(|| FieldValue::Int(self.0))
        }
    }

    #[test]
    fn eq_generates_single_placeholder() {
        let conds = vec![FilterWhereInfo::equals_any("contact_id", vec![FieldValue::Int(7)])];
        let (sql, params) = FilterWhere::generate(&conds, 0).unwrap();
        assert_eq!(sql, "\"contact_id\" = $1");
        assert_eq!(params, vec![FieldValue::Int(7)]);
    }

    #[test]
    fn in_generates_placeholder_list() {
        let conds = vec![FilterWhereInfo::equals_any(
            "contact_id",
            vec![FieldValue::Int(1), FieldValue::Int(2)],
        )];
        let (sql, params) = FilterWhere::generate(&conds, 0).unwrap();
        assert_eq!(sql, "\"contact_id\" IN ($1, $2)");
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn matches_uses_exact_equality() {
        let conds = vec![FilterWhereInfo::equals_any("contact_id", vec![FieldValue::Int(1)])];
        assert!(FilterWhere::matches(&conds, &Row(1)).unwrap());
        assert!(!FilterWhere::matches(&conds, &Row(11)).unwrap());
    }

    #[test]
    fn unknown_column_is_an_error() {
        let conds = vec![FilterWhereInfo::equals_any("notes", vec![FieldValue::Int(1)])];
        assert!(matches!(
            FilterWhere::matches(&conds, &Row(1)),
            Err(FilterError::InvalidColumn(_))
        ));
    }

    #[test]
    fn empty_value_list_is_rejected() {
        let conds = vec![FilterWhereInfo { column: "contact_id".into(), operator: FilterOp::In, data: vec![] }];
        assert!(FilterWhere::generate(&conds, 0).is_err());
    }
}
