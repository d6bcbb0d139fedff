use std::cmp::Ordering;

use super::error::FilterError;
use super::types::{FilterOrderInfo, FilterRow, SortDirection};

pub struct FilterOrder;

impl FilterOrder {
    /// Parse a JSON:API sort expression: comma-separated keys, `-` prefix for descending.
    pub fn parse(s: &str) -> Result<Vec<FilterOrderInfo>, FilterError> {
        let mut out = Vec::new();
        for part in s.split(',') {
            let trimmed = part.trim();
            if trimmed.is_empty() {
                return Err(FilterError::InvalidColumn("sort key cannot be empty".to_string()));
            }
            let (column, sort) = match trimmed.strip_prefix('-') {
                Some(rest) => (rest, SortDirection::Desc),
                None => (trimmed, SortDirection::Asc),
            };
            out.push(FilterOrderInfo { column: column.to_string(), sort });
        }
        Ok(out)
    }

    pub fn generate(infos: &[FilterOrderInfo]) -> Result<String, FilterError> {
        if infos.is_empty() {
            return Ok(String::new());
        }
        let parts: Vec<String> = infos
            .iter()
            .map(|i| format!("\"{}\" {}", i.column, i.sort.to_sql()))
            .collect();
        Ok(format!("ORDER BY {}", parts.join(", ")))
    }

    /// Compare two in-memory rows by the given ordering.
    pub fn compare<R: FilterRow>(infos: &[FilterOrderInfo], a: &R, b: &R) -> Result<Ordering, FilterError> {
        for info in infos {
            let left = a
                .field(&info.column)
                .ok_or_else(|| FilterError::InvalidColumn(info.column.clone()))?;
            let right = b
                .field(&info.column)
                .ok_or_else(|| FilterError::InvalidColumn(info.column.clone()))?;
            let ord = match info.sort {
                SortDirection::Asc => left.cmp(&right),
                SortDirection::Desc => right.cmp(&left),
            };
            if ord != Ordering::Equal {
                return Ok(ord);
            }
        }
        Ok(Ordering::Equal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ascending_and_descending_keys() {
        let infos = FilterOrder::parse("name_last,-name_first").unwrap();
        assert_eq!(infos[0], FilterOrderInfo { column: "name_last".into(), sort: SortDirection::Asc });
        assert_eq!(infos[1], FilterOrderInfo { column: "name_first".into(), sort: SortDirection::Desc });
    }

    #[test]
    fn rejects_empty_keys() {
        assert!(FilterOrder::parse("name,,email").is_err());
    }

    #[test]
    fn generates_order_by() {
        let infos = FilterOrder::parse("-id").unwrap();
        assert_eq!(FilterOrder::generate(&infos).unwrap(), "ORDER BY \"id\" DESC");
    }
}
