use std::collections::{BTreeMap, HashMap};

use super::document::parse_id;
use super::links::LinkBuilder;
use crate::config::ApiConfig;
use crate::error::{ApiError, FieldError};
use crate::filter::filter_order::FilterOrder;
use crate::filter::{FieldValue, FilterData, FilterOrderInfo, FilterWhereInfo};
use crate::resources::{self, ResourceDef};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub offset: i64,
    pub limit: i64,
}

/// Validated JSON:API query parameters for one request.
///
/// Every problem found is reported, each as its own error object carrying
/// `source.parameter`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParams {
    pub filters: Vec<FilterWhereInfo>,
    pub sort: Vec<FilterOrderInfo>,
    pub page: Option<Pagination>,
    pub fields: HashMap<String, Vec<String>>,
    pub include: Vec<String>,
    /// Non-paging parameters, echoed back into pagination links
    carried: BTreeMap<String, String>,
}

impl QueryParams {
    /// Parameters for a collection endpoint: filter, sort, page, fields, include
    pub fn for_collection(
        raw: &HashMap<String, String>,
        def: &ResourceDef,
        api: &ApiConfig,
    ) -> Result<Self, ApiError> {
        Self::parse(raw, def, Some(api))
    }

    /// Parameters for a single-resource endpoint: fields and include only
    pub fn for_resource(raw: &HashMap<String, String>, def: &ResourceDef) -> Result<Self, ApiError> {
        Self::parse(raw, def, None)
    }

    fn parse(
        raw: &HashMap<String, String>,
        def: &ResourceDef,
        collection: Option<&ApiConfig>,
    ) -> Result<Self, ApiError> {
        let mut errors = Vec::new();
        let mut params = QueryParams::default();
        let mut offset = None;
        let mut limit = None;

        // Deterministic error order
        let mut keys: Vec<&String> = raw.keys().collect();
        keys.sort();

        for key in keys {
            let value = &raw[key];
            match (family(key), collection) {
                (Some(("filter", name)), Some(_)) => match parse_filter(def, name, value) {
                    Ok(info) => params.filters.push(info),
                    Err(detail) => errors.push(FieldError::parameter(key.as_str(), detail)),
                },
                (Some(("page", "offset")), Some(_)) => match parse_non_negative(value) {
                    Some(n) => offset = Some(n),
                    None => errors.push(FieldError::parameter(key.as_str(), "must be a non-negative integer")),
                },
                (Some(("page", "limit")), Some(_)) => match parse_non_negative(value) {
                    Some(n) => limit = Some(n),
                    None => errors.push(FieldError::parameter(key.as_str(), "must be a non-negative integer")),
                },
                (Some(("fields", type_name)), _) => match parse_fieldset(type_name, value) {
                    Ok(fields) => {
                        params.fields.insert(type_name.to_string(), fields);
                    }
                    Err(detail) => errors.push(FieldError::parameter(key.as_str(), detail)),
                },
                (None, Some(_)) if key == "sort" => match parse_sort(def, value) {
                    Ok(sort) => params.sort = sort,
                    Err(detail) => errors.push(FieldError::parameter("sort", detail)),
                },
                (None, _) if key == "include" => match parse_include(def, value) {
                    Ok(include) => params.include = include,
                    Err(detail) => errors.push(FieldError::parameter("include", detail)),
                },
                _ => {
                    errors.push(FieldError::parameter(key.as_str(), "is not a supported query parameter"));
                    continue;
                }
            }
            if !key.starts_with("page[") {
                params.carried.insert(key.clone(), value.clone());
            }
        }

        if !errors.is_empty() {
            return Err(ApiError::validation_error("Invalid query parameters", errors));
        }

        if let Some(api) = collection {
            params.page = Some(Pagination {
                offset: offset.unwrap_or(0),
                limit: limit.unwrap_or(api.default_page_size).min(api.max_page_size),
            });
        }
        Ok(params)
    }

    /// Store query for the validated filter, sort and page
    pub fn to_filter_data(&self) -> FilterData {
        FilterData {
            where_clause: self.filters.clone(),
            order: self.sort.clone(),
            limit: self.page.map(|p| p.limit),
            offset: self.page.map(|p| p.offset),
        }
    }

    /// Sparse fieldset requested for `type_name`, if any
    pub fn fieldset(&self, type_name: &str) -> Option<&[String]> {
        self.fields.get(type_name).map(Vec::as_slice)
    }

    pub fn includes(&self, relationship: &str) -> bool {
        self.include.iter().any(|r| r == relationship)
    }

    /// Top-level `self`, `first`, `last`, and where applicable `prev`/`next`
    pub fn page_links(&self, path: &str, total: i64) -> BTreeMap<String, String> {
        let mut links = BTreeMap::new();
        let page = match self.page {
            Some(page) => page,
            None => {
                links.insert("self".to_string(), LinkBuilder::with_query(path, &self.carried));
                return links;
            }
        };

        let link = |offset: i64| {
            let mut pairs = self.carried.clone();
            pairs.insert("page[offset]".to_string(), offset.to_string());
            pairs.insert("page[limit]".to_string(), page.limit.to_string());
            LinkBuilder::with_query(path, &pairs)
        };

        let last = if page.limit > 0 && total > 0 {
            ((total - 1) / page.limit) * page.limit
        } else {
            0
        };

        links.insert("self".to_string(), link(page.offset));
        links.insert("first".to_string(), link(0));
        links.insert("last".to_string(), link(last));
        if page.offset > 0 {
            links.insert("prev".to_string(), link(page.offset.saturating_sub(page.limit).max(0)));
        }
        if let Some(next) = page.offset.checked_add(page.limit).filter(|n| page.limit > 0 && *n < total) {
            links.insert("next".to_string(), link(next));
        }
        links
    }
}

/// Split `filter[contact]` into `("filter", "contact")`
fn family(key: &str) -> Option<(&str, &str)> {
    let (family, rest) = key.split_once('[')?;
    let member = rest.strip_suffix(']')?;
    if member.is_empty() || member.contains(['[', ']']) {
        return None;
    }
    Some((family, member))
}

fn split_list(value: &str) -> Vec<&str> {
    value.split(',').map(str::trim).collect()
}

fn parse_non_negative(value: &str) -> Option<i64> {
    value.trim().parse::<i64>().ok().filter(|n| *n >= 0)
}

fn parse_filter(def: &ResourceDef, name: &str, value: &str) -> Result<FilterWhereInfo, String> {
    let filter = def
        .filter(name)
        .ok_or_else(|| format!("{} is not a valid filter for {}", name, def.type_name))?;
    let mut values = Vec::new();
    for part in split_list(value) {
        match parse_id(part) {
            Some(id) => values.push(FieldValue::Int(id)),
            None => return Err(format!("'{}' is not a valid id", part)),
        }
    }
    Ok(FilterWhereInfo::equals_any(filter.column, values))
}

fn parse_sort(def: &ResourceDef, value: &str) -> Result<Vec<FilterOrderInfo>, String> {
    let order = FilterOrder::parse(value).map_err(|_| "sort keys cannot be empty".to_string())?;
    order
        .into_iter()
        .map(|info| match def.sort_column(&info.column) {
            Some(column) => Ok(FilterOrderInfo { column: column.to_string(), sort: info.sort }),
            None => Err(format!("{} is not a valid sort key for {}", info.column, def.type_name)),
        })
        .collect()
}

fn parse_fieldset(type_name: &str, value: &str) -> Result<Vec<String>, String> {
    let def = resources::lookup(type_name).ok_or_else(|| format!("{} is not a known resource type", type_name))?;
    if value.trim().is_empty() {
        return Ok(vec![]);
    }
    split_list(value)
        .into_iter()
        .map(|field| {
            if def.has_field(field) {
                Ok(field.to_string())
            } else {
                Err(format!("{} is not a valid field of {}", field, type_name))
            }
        })
        .collect()
}

fn parse_include(def: &ResourceDef, value: &str) -> Result<Vec<String>, String> {
    let mut include: Vec<String> = Vec::new();
    for path in split_list(value) {
        if path.contains('.') {
            return Err(format!("nested include {} is not supported", path));
        }
        if def.relationship(path).is_none() {
            return Err(format!("{} is not a relationship of {}", path, def.type_name));
        }
        if !include.iter().any(|p| p == path) {
            include.push(path.to_string());
        }
    }
    Ok(include)
}
