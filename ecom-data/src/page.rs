use serde::{Deserialize, Serialize};

use crate::query::QueryError;

/// Sort direction of a single [`Order`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    pub fn is_ascending(self) -> bool {
        matches!(self, Direction::Asc)
    }
}

/// One `ORDER BY` term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub column: String,
    pub direction: Direction,
}

/// Ordering for `find_all_sorted` and paged queries.
///
/// Parsed from the `column[,asc|desc]` form, with several terms separated by
/// `;` (e.g. `"category;price_cents,desc"`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    orders: Vec<Order>,
}

impl Sort {
    pub fn unsorted() -> Self {
        Self::default()
    }

    pub fn asc(column: &str) -> Self {
        Self::unsorted().then(column, Direction::Asc)
    }

    pub fn desc(column: &str) -> Self {
        Self::unsorted().then(column, Direction::Desc)
    }

    /// Append a tie-breaking term.
    pub fn then(mut self, column: &str, direction: Direction) -> Self {
        self.orders.push(Order {
            column: column.to_string(),
            direction,
        });
        self
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn is_unsorted(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn parse(input: &str) -> Result<Self, QueryError> {
        let mut sort = Sort::unsorted();
        for term in input.split(';').map(str::trim).filter(|t| !t.is_empty()) {
            let (column, direction) = match term.split_once(',') {
                None => (term, Direction::Asc),
                Some((column, dir)) => {
                    let direction = match dir.trim().to_ascii_lowercase().as_str() {
                        "asc" => Direction::Asc,
                        "desc" => Direction::Desc,
                        _ => {
                            return Err(QueryError::InvalidSort {
                                term: term.to_string(),
                            })
                        }
                    };
                    (column.trim(), direction)
                }
            };
            if column.is_empty() {
                return Err(QueryError::InvalidSort {
                    term: term.to_string(),
                });
            }
            sort = sort.then(column, direction);
        }
        Ok(sort)
    }

    /// Reject any term whose column is not in `allowed`.
    pub fn check_columns(&self, allowed: &[&str]) -> Result<(), QueryError> {
        match self
            .orders
            .iter()
            .find(|o| !allowed.contains(&o.column.as_str()))
        {
            Some(order) => Err(QueryError::UnknownColumn {
                column: order.column.clone(),
            }),
            None => Ok(()),
        }
    }
}

/// Pagination parameters, deserializable from query params.
#[derive(Debug, Clone, Deserialize)]
pub struct Pageable {
    #[serde(default)]
    pub page: u64,
    #[serde(default = "default_page_size")]
    pub size: u64,
    /// Sort in [`Sort::parse`] form.
    #[serde(default)]
    pub sort: Option<String>,
}

fn default_page_size() -> u64 {
    20
}

impl Default for Pageable {
    fn default() -> Self {
        Self {
            page: 0,
            size: default_page_size(),
            sort: None,
        }
    }
}

impl Pageable {
    pub fn of(page: u64, size: u64) -> Self {
        Self {
            page,
            size,
            sort: None,
        }
    }

    pub fn sorted_by(mut self, sort: &str) -> Self {
        self.sort = Some(sort.to_string());
        self
    }

    pub fn offset(&self) -> u64 {
        self.page.saturating_mul(self.size)
    }

    pub fn sort(&self) -> Result<Sort, QueryError> {
        match &self.sort {
            Some(raw) => Sort::parse(raw),
            None => Ok(Sort::unsorted()),
        }
    }
}

/// A page of results with pagination metadata.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page: u64,
    pub size: u64,
    pub total_elements: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, pageable: &Pageable, total_elements: u64) -> Self {
        let total_pages = if pageable.size == 0 {
            0
        } else {
            total_elements.div_ceil(pageable.size)
        };
        Self {
            content,
            page: pageable.page,
            size: pageable.size,
            total_elements,
            total_pages,
        }
    }

    pub fn has_next(&self) -> bool {
        self.page.saturating_add(1) < self.total_pages
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            page: self.page,
            size: self.size,
            total_elements: self.total_elements,
            total_pages: self.total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sort_terms() {
        let sort = Sort::parse("category; price_cents,DESC").unwrap();
        assert_eq!(
            sort.orders(),
            &[
                Order {
                    column: "category".into(),
                    direction: Direction::Asc
                },
                Order {
                    column: "price_cents".into(),
                    direction: Direction::Desc
                },
            ]
        );
    }

    #[test]
    fn test_parse_sort_rejects_bad_direction() {
        assert!(matches!(
            Sort::parse("name,sideways"),
            Err(QueryError::InvalidSort { .. })
        ));
        assert!(Sort::parse(",desc").is_err());
    }

    #[test]
    fn test_check_columns() {
        let sort = Sort::desc("price_cents");
        assert!(sort.check_columns(&["id", "price_cents"]).is_ok());
        assert!(matches!(
            sort.check_columns(&["id"]),
            Err(QueryError::UnknownColumn { column }) if column == "price_cents"
        ));
    }

    #[test]
    fn test_page_metadata() {
        let pageable = Pageable::of(1, 20);
        let page = Page::new(vec![1, 2, 3], &pageable, 43);
        assert_eq!(pageable.offset(), 20);
        assert_eq!(page.total_pages, 3);
        assert!(page.has_next());

        let last = Page::new(vec![1, 2, 3], &Pageable::of(2, 20), 43);
        assert!(!last.has_next());
    }

    #[test]
    fn test_zero_size_page() {
        let page: Page<i32> = Page::new(vec![], &Pageable::of(0, 0), 10);
        assert_eq!(page.total_pages, 0);
        assert!(page.is_empty());
    }

    #[test]
    fn test_pageable_from_query_params() {
        let pageable: Pageable =
            serde_json::from_str(r#"{"page": 2, "sort": "name,desc"}"#).unwrap();
        assert_eq!(pageable.size, 20);
        assert_eq!(pageable.offset(), 40);
        assert_eq!(pageable.sort().unwrap(), Sort::desc("name"));
    }

    #[test]
    fn test_extreme_page_numbers() {
        let page: Page<i32> = Page::new(vec![], &Pageable::of(u64::MAX, 1), 5);
        assert!(!page.has_next());
        assert_eq!(Pageable::of(u64::MAX, 1).offset(), u64::MAX);
        assert_eq!(Pageable::of(u64::MAX / 2, 4).offset(), u64::MAX);

        let huge: Page<i32> = Page::new(vec![1], &Pageable::of(0, u64::MAX), 1);
        assert_eq!(huge.total_pages, 1);
        assert!(!huge.has_next());
    }

    #[test]
    fn test_has_next_boundary() {
        // 5 rows in pages of 2: pages 0, 1, 2
        assert!(Page::<i32>::new(vec![], &Pageable::of(1, 2), 5).has_next());
        assert!(!Page::<i32>::new(vec![], &Pageable::of(2, 2), 5).has_next());
        assert!(!Page::<i32>::new(vec![], &Pageable::of(3, 2), 5).has_next());
        assert!(!Page::<i32>::new(vec![], &Pageable::of(0, 2), 0).has_next());
    }
}
