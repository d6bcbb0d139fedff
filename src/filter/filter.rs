use super::error::FilterError;
use super::filter_order::FilterOrder;
use super::filter_where::FilterWhere;
use super::types::{FilterData, FilterOrderInfo, FilterRow, FilterWhereInfo, SortDirection, SqlResult};

/// Filter, sort and page a single table, either as SQL or over in-memory rows
pub struct Filter {
    table_name: String,
    select_columns: Vec<String>,
    where_data: Vec<FilterWhereInfo>,
    order_data: Vec<FilterOrderInfo>,
    limit: Option<i64>,
    offset: Option<i64>,
}

impl Filter {
    pub fn new(table_name: impl Into<String>) -> Result<Self, FilterError> {
        let table_name = table_name.into();
        Self::validate_table_name(&table_name)?;
        Ok(Self {
            table_name,
            select_columns: vec![],
            where_data: vec![],
            order_data: vec![],
            limit: None,
            offset: None,
        })
    }

    pub fn assign(&mut self, data: FilterData) -> Result<&mut Self, FilterError> {
        self.where_clause(data.where_clause)?;
        self.order(data.order)?;
        self.limit(data.limit, data.offset)?;
        Ok(self)
    }

    pub fn select(&mut self, columns: &[&str]) -> Result<&mut Self, FilterError> {
        let columns: Vec<String> = columns.iter().map(|c| c.to_string()).collect();
        Self::validate_columns(columns.iter())?;
        self.select_columns = columns;
        Ok(self)
    }

    pub fn where_clause(&mut self, conditions: Vec<FilterWhereInfo>) -> Result<&mut Self, FilterError> {
        Self::validate_columns(conditions.iter().map(|c| &c.column))?;
        FilterWhere::validate(&conditions)?;
        self.where_data = conditions;
        Ok(self)
    }

    pub fn order(&mut self, order: Vec<FilterOrderInfo>) -> Result<&mut Self, FilterError> {
        Self::validate_columns(order.iter().map(|o| &o.column))?;
        self.order_data = order;
        Ok(self)
    }

    pub fn limit(&mut self, limit: Option<i64>, offset: Option<i64>) -> Result<&mut Self, FilterError> {
        if let Some(l) = limit {
            if l < 0 {
                return Err(FilterError::InvalidLimit("Limit must be non-negative".to_string()));
            }
        }
        if let Some(o) = offset {
            if o < 0 {
                return Err(FilterError::InvalidOffset("Offset must be non-negative".to_string()));
            }
        }
        self.limit = limit;
        self.offset = offset;
        Ok(self)
    }

    pub fn to_sql(&self) -> Result<SqlResult, FilterError> {
        let (where_clause, params) = FilterWhere::generate(&self.where_data, 0)?;
        let order_clause = FilterOrder::generate(&self.effective_order())?;

        let query = [
            format!("SELECT {}", self.build_select_clause()),
            format!("FROM \"{}\"", self.table_name),
            if where_clause.is_empty() { String::new() } else { format!("WHERE {}", where_clause) },
            order_clause,
            self.build_limit_clause(),
        ]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

        Ok(SqlResult { query, params })
    }

    pub fn to_count_sql(&self) -> Result<SqlResult, FilterError> {
        let (where_clause, params) = FilterWhere::generate(&self.where_data, 0)?;
        let query = if where_clause.is_empty() {
            format!("SELECT COUNT(*) AS count FROM \"{}\"", self.table_name)
        } else {
            format!("SELECT COUNT(*) AS count FROM \"{}\" WHERE {}", self.table_name, where_clause)
        };
        Ok(SqlResult { query, params })
    }

    /// Apply the filter to in-memory rows. Returns the requested page and the
    /// number of rows matching before pagination.
    pub fn apply<R, I>(&self, rows: I) -> Result<(Vec<R>, i64), FilterError>
    where
        R: FilterRow,
        I: IntoIterator<Item = R>,
    {
        let mut matched = Vec::new();
        for row in rows {
            if FilterWhere::matches(&self.where_data, &row)? {
                matched.push(row);
            }
        }

        let order = self.effective_order();
        // Validate every sort column up front so sort_by below cannot fail
        if let Some(first) = matched.first() {
            FilterOrder::compare(&order, first, first)?;
        }
        matched.sort_by(|a, b| FilterOrder::compare(&order, a, b).unwrap_or(std::cmp::Ordering::Equal));

        let total = matched.len() as i64;
        let offset = self.offset.unwrap_or(0).max(0) as usize;
        let page: Vec<R> = match self.limit {
            Some(limit) => matched.into_iter().skip(offset).take(limit.max(0) as usize).collect(),
            None => matched.into_iter().skip(offset).collect(),
        };
        Ok((page, total))
    }

    /// Requested ordering with `id` appended as a tiebreaker so pages are stable.
    fn effective_order(&self) -> Vec<FilterOrderInfo> {
        let mut order = self.order_data.clone();
        if !order.iter().any(|o| o.column == "id") {
            order.push(FilterOrderInfo { column: "id".to_string(), sort: SortDirection::Asc });
        }
        order
    }

    fn validate_table_name(name: &str) -> Result<(), FilterError> {
        if !Self::is_identifier(name) {
            return Err(FilterError::InvalidTableName(format!("Invalid table name format: {}", name)));
        }
        Ok(())
    }

    fn validate_columns<'a>(columns: impl Iterator<Item = &'a String>) -> Result<(), FilterError> {
        for column in columns {
            if !Self::is_identifier(column) {
                return Err(FilterError::InvalidColumn(format!("Invalid column name format: {}", column)));
            }
        }
        Ok(())
    }

    fn is_identifier(name: &str) -> bool {
        let mut chars = name.chars();
        match chars.next() {
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
            _ => return false,
        }
        chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    }

    fn build_select_clause(&self) -> String {
        if self.select_columns.is_empty() {
            "*".to_string()
        } else {
            self.select_columns.iter().map(|c| format!("\"{}\"", c)).collect::<Vec<_>>().join(", ")
        }
    }

    fn build_limit_clause(&self) -> String {
        match (self.limit, self.offset) {
            (Some(l), Some(o)) => format!("LIMIT {} OFFSET {}", l, o),
            (Some(l), None) => format!("LIMIT {}", l),
            (None, Some(o)) => format!("OFFSET {}", o),
            (None, None) => String::new(),
        }
    }
}
