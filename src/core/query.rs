//! Query parameters, pagination windows and the paginated envelope

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::core::error::{Error, Result};
use crate::core::field::parse_fields;

const DEFAULT_PAGE: i64 = 1;
const DEFAULT_PAGE_SIZE: i64 = 10;

/// Sort direction for collection reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortOrder {
    #[default]
    #[serde(rename = "ASC", alias = "asc")]
    Asc,
    #[serde(rename = "DESC", alias = "desc")]
    Desc,
}

impl SortOrder {
    fn parse(raw: &str) -> Result<Self> {
        match raw.to_uppercase().as_str() {
            "ASC" => Ok(SortOrder::Asc),
            "DESC" => Ok(SortOrder::Desc),
            other => Err(Error::BadRequest(format!(
                "sortOrder must be ASC or DESC, got '{other}'"
            ))),
        }
    }
}

/// The common query parameters every generated route understands
///
/// ```text
/// GET /widgets?fields=name,sku&page=2&pageSize=5&sortBy=name&sortOrder=DESC&searchTerm=bolt
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct QueryParams {
    pub fields: Vec<String>,
    pub page: i64,
    pub page_size: i64,
    pub sort_by: Option<String>,
    pub sort_order: SortOrder,
    pub search_term: Option<String>,
}

impl Default for QueryParams {
    fn default() -> Self {
        Self {
            fields: Vec::new(),
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
            sort_by: None,
            sort_order: SortOrder::Asc,
            search_term: None,
        }
    }
}

impl QueryParams {
    /// Parse from the raw query string map; unknown keys are ignored
    pub fn from_map(raw: &HashMap<String, String>) -> Result<Self> {
        let mut params = QueryParams::default();
        if let Some(fields) = raw.get("fields") {
            params.fields = parse_fields(fields);
        }
        if let Some(page) = raw.get("page") {
            params.page = page
                .parse()
                .map_err(|_| Error::BadRequest(format!("page must be a number, got '{page}'")))?;
        }
        if let Some(page_size) = raw.get("pageSize") {
            params.page_size = page_size.parse().map_err(|_| {
                Error::BadRequest(format!("pageSize must be a number, got '{page_size}'"))
            })?;
        }
        params.sort_by = raw.get("sortBy").cloned();
        if let Some(order) = raw.get("sortOrder") {
            params.sort_order = SortOrder::parse(order)?;
        }
        params.search_term = raw.get("searchTerm").cloned().filter(|s| !s.is_empty());
        Ok(params)
    }
}

/// Reject out-of-domain pagination input
pub fn resolve_pagination(page: i64, page_size: i64) -> Result<()> {
    if page < 1 || page_size < 1 {
        return Err(Error::BadRequest(
            "The page and pageSize must be greater than or equal to 1".into(),
        ));
    }
    Ok(())
}

/// Pagination metadata of the paginated envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub total: usize,
    pub current_page: i64,
    pub total_pages: i64,
}

/// The paginated response envelope: `{ list, pagination }`
#[derive(Debug, Clone, Serialize)]
pub struct Paginated<T> {
    pub list: Vec<T>,
    pub pagination: PaginationMeta,
}

impl<T> Paginated<T> {
    /// Wrap one page of results
    ///
    /// `totalPages = ceil(count / pageSize)`; `currentPage = min(page,
    /// totalPages)` so requests past the last page clamp down instead of
    /// erroring.
    pub fn build(list: Vec<T>, count: usize, page: i64, page_size: i64) -> Self {
        let page_size = page_size.max(1);
        let total_pages = (count as i64 + page_size - 1) / page_size;
        Self {
            list,
            pagination: PaginationMeta {
                total: count,
                current_page: page.min(total_pages),
                total_pages,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let params = QueryParams::from_map(&HashMap::new()).unwrap();
        assert_eq!(params.page, 1);
        assert_eq!(params.page_size, 10);
        assert_eq!(params.sort_order, SortOrder::Asc);
        assert!(params.fields.is_empty());
        assert!(params.search_term.is_none());
    }

    #[test]
    fn test_from_map_full() {
        let raw = map(&[
            ("fields", "name,sku"),
            ("page", "3"),
            ("pageSize", "25"),
            ("sortBy", "name"),
            ("sortOrder", "desc"),
            ("searchTerm", "bolt"),
        ]);
        let params = QueryParams::from_map(&raw).unwrap();
        assert_eq!(params.fields, vec!["name", "sku"]);
        assert_eq!(params.page, 3);
        assert_eq!(params.page_size, 25);
        assert_eq!(params.sort_by.as_deref(), Some("name"));
        assert_eq!(params.sort_order, SortOrder::Desc);
        assert_eq!(params.search_term.as_deref(), Some("bolt"));
    }

    #[test]
    fn test_from_map_rejects_non_numeric_page() {
        let err = QueryParams::from_map(&map(&[("page", "abc")])).unwrap_err();
        assert!(matches!(err, Error::BadRequest(_)));
    }

    #[test]
    fn test_from_map_rejects_bad_sort_order() {
        let err = QueryParams::from_map(&map(&[("sortOrder", "sideways")])).unwrap_err();
        assert!(matches!(err, Error::BadRequest(_)));
    }

    #[test]
    fn test_empty_search_term_is_none() {
        let params = QueryParams::from_map(&map(&[("searchTerm", "")])).unwrap();
        assert!(params.search_term.is_none());
    }

    #[test]
    fn test_resolve_pagination_bounds() {
        assert!(resolve_pagination(0, 10).is_err());
        assert!(resolve_pagination(1, 0).is_err());
        assert!(resolve_pagination(-3, -1).is_err());
        assert!(resolve_pagination(1, 1).is_ok());
        assert!(resolve_pagination(7, 50).is_ok());
    }

    #[test]
    fn test_paginated_build_arithmetic() {
        let result = Paginated::build(vec![1, 2, 3], 145, 2, 20);
        assert_eq!(result.pagination.total, 145);
        assert_eq!(result.pagination.total_pages, 8);
        assert_eq!(result.pagination.current_page, 2);
    }

    #[test]
    fn test_paginated_build_clamps_page() {
        let result = Paginated::build(Vec::<i32>::new(), 30, 99, 10);
        assert_eq!(result.pagination.total_pages, 3);
        assert_eq!(result.pagination.current_page, 3);
    }

    #[test]
    fn test_paginated_build_empty_collection() {
        let result = Paginated::build(Vec::<i32>::new(), 0, 1, 10);
        assert_eq!(result.pagination.total_pages, 0);
        assert_eq!(result.pagination.current_page, 0);
    }

    #[test]
    fn test_paginated_envelope_shape() {
        let result = Paginated::build(vec!["a"], 1, 1, 10);
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["list"][0], "a");
        assert_eq!(value["pagination"]["total"], 1);
        assert_eq!(value["pagination"]["currentPage"], 1);
        assert_eq!(value["pagination"]["totalPages"], 1);
    }
}
