//! SQL generation for entity repositories.
//!
//! [`QueryBuilder`] produces statement text only; values are bound by the
//! backend in the order the placeholders appear.
//!
//! ```ignore
//! let sql = QueryBuilder::for_entity::<Product>()
//!     .dialect(Dialect::Postgres)
//!     .sort(&Sort::desc("price_cents"))
//!     .limit(10)
//!     .build_select()?;
//! // SELECT id, name, ... FROM products ORDER BY price_cents DESC LIMIT 10
//! ```

use std::fmt::Write as _;

use crate::entity::Entity;
use crate::page::{Direction, Order, Sort};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// `?` placeholders.
    Generic,
    /// `?` placeholders.
    Sqlite,
    /// Numbered `$n` placeholders.
    Postgres,
}

impl Dialect {
    /// Bind marker for the `n`th parameter, 1-based.
    fn placeholder(self, n: usize) -> String {
        if self == Dialect::Postgres {
            format!("${n}")
        } else {
            "?".to_owned()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierPolicy {
    /// Identifiers go into the SQL untouched.
    Raw,
    /// Reject anything but plain (optionally dotted) names.
    Validate,
    /// As `Validate`, then wrap each segment in double quotes.
    Quote,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Filter {
    All,
    IdEq,
    IdIn(usize),
}

/// Builds the statements a repository runs against one table.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    table: String,
    id_column: String,
    columns: Vec<String>,
    filter: Filter,
    order: Vec<Order>,
    limit: Option<u64>,
    offset: Option<u64>,
    dialect: Dialect,
    policy: IdentifierPolicy,
}

impl QueryBuilder {
    /// Builder for an arbitrary table. Identifiers are validated by default.
    pub fn new(table: &str, id_column: &str, columns: &[&str]) -> Self {
        Self {
            table: table.to_string(),
            id_column: id_column.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            filter: Filter::All,
            order: Vec::new(),
            limit: None,
            offset: None,
            dialect: Dialect::Generic,
            policy: IdentifierPolicy::Validate,
        }
    }

    /// Builder pre-configured with `T`'s table, id column and columns.
    pub fn for_entity<T: Entity>() -> Self {
        Self::new(T::table_name(), T::id_column(), T::columns())
    }

    pub fn dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn identifier_policy(mut self, policy: IdentifierPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Restrict to the row whose id equals the first bound value.
    pub fn where_id(mut self) -> Self {
        self.filter = Filter::IdEq;
        self
    }

    /// Restrict to rows whose id is one of `count` bound values.
    pub fn where_id_in(mut self, count: usize) -> Self {
        self.filter = Filter::IdIn(count);
        self
    }

    /// Append one `ORDER BY` term after any already present.
    pub fn order_by(mut self, column: &str, ascending: bool) -> Self {
        let direction = if ascending { Direction::Asc } else { Direction::Desc };
        self.order.push(Order {
            column: column.to_owned(),
            direction,
        });
        self
    }

    /// Append every term of `sort`.
    pub fn sort(mut self, sort: &Sort) -> Self {
        self.order.extend(sort.orders().iter().cloned());
        self
    }

    pub fn limit(mut self, rows: u64) -> Self {
        self.limit = Some(rows);
        self
    }

    pub fn offset(mut self, rows: u64) -> Self {
        self.offset = Some(rows);
        self
    }

    /// `SELECT <columns> FROM <table> [WHERE ...] [ORDER BY ...] [LIMIT ...] [OFFSET ...]`
    pub fn build_select(&self) -> Result<String, QueryError> {
        let mut sql = format!("SELECT {} FROM {}", self.column_list()?, self.table()?);
        self.append_where(&mut sql)?;
        self.append_order(&mut sql)?;
        self.append_paging(&mut sql);
        Ok(sql)
    }

    /// `SELECT COUNT(*) FROM <table> [WHERE ...]`
    pub fn build_count(&self) -> Result<String, QueryError> {
        let mut sql = format!("SELECT COUNT(*) FROM {}", self.table()?);
        self.append_where(&mut sql)?;
        Ok(sql)
    }

    /// `DELETE FROM <table> [WHERE ...]`
    pub fn build_delete(&self) -> Result<String, QueryError> {
        let mut sql = format!("DELETE FROM {}", self.table()?);
        self.append_where(&mut sql)?;
        Ok(sql)
    }

    /// Insert letting the database generate the id.
    ///
    /// Binds every non-id column in order, returns the stored row.
    pub fn build_insert(&self) -> Result<String, QueryError> {
        let values = self.value_columns();
        let table = self.table()?;
        let returning = self.column_list()?;
        if values.is_empty() {
            return Ok(format!(
                "INSERT INTO {table} DEFAULT VALUES RETURNING {returning}"
            ));
        }
        let cols = self.format_list(&values)?;
        let placeholders = self.placeholders(1, values.len());
        Ok(format!(
            "INSERT INTO {table} ({cols}) VALUES ({placeholders}) RETURNING {returning}"
        ))
    }

    /// Insert-or-update keyed on the id column.
    ///
    /// Binds the id first, then every non-id column in order, returns the
    /// stored row.
    pub fn build_upsert(&self) -> Result<String, QueryError> {
        let values = self.value_columns();
        let table = self.table()?;
        let id = self.format_identifier(&self.id_column, "column")?;
        let returning = self.column_list()?;

        let mut insert_cols = vec![self.id_column.as_str()];
        insert_cols.extend(values.iter().copied());
        let cols = self.format_list(&insert_cols)?;
        let placeholders = self.placeholders(1, insert_cols.len());

        let assignments = if values.is_empty() {
            format!("{id} = excluded.{id}")
        } else {
            values
                .iter()
                .map(|c| {
                    self.format_identifier(c, "column")
                        .map(|c| format!("{c} = excluded.{c}"))
                })
                .collect::<Result<Vec<_>, _>>()?
                .join(", ")
        };

        Ok(format!(
            "INSERT INTO {table} ({cols}) VALUES ({placeholders}) \
             ON CONFLICT ({id}) DO UPDATE SET {assignments} RETURNING {returning}"
        ))
    }

    fn value_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .map(String::as_str)
            .filter(|c| *c != self.id_column)
            .collect()
    }

    fn table(&self) -> Result<String, QueryError> {
        self.format_identifier(&self.table, "table")
    }

    fn column_list(&self) -> Result<String, QueryError> {
        if self.columns.is_empty() {
            return Ok("*".to_string());
        }
        let cols: Vec<&str> = self.columns.iter().map(String::as_str).collect();
        self.format_list(&cols)
    }

    fn format_list(&self, columns: &[&str]) -> Result<String, QueryError> {
        Ok(columns
            .iter()
            .map(|c| self.format_identifier(c, "column"))
            .collect::<Result<Vec<_>, _>>()?
            .join(", "))
    }

    fn placeholders(&self, first: usize, count: usize) -> String {
        (first..first + count)
            .map(|i| self.dialect.placeholder(i))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn append_where(&self, sql: &mut String) -> Result<(), QueryError> {
        match self.filter {
            Filter::All => {}
            Filter::IdEq => {
                let id = self.format_identifier(&self.id_column, "column")?;
                sql.push_str(&format!(" WHERE {id} = {}", self.dialect.placeholder(1)));
            }
            // `IN ()` is a syntax error; an empty set matches nothing
            Filter::IdIn(0) => sql.push_str(" WHERE 1 = 0"),
            Filter::IdIn(count) => {
                let id = self.format_identifier(&self.id_column, "column")?;
                sql.push_str(&format!(" WHERE {id} IN ({})", self.placeholders(1, count)));
            }
        }
        Ok(())
    }

    fn append_order(&self, sql: &mut String) -> Result<(), QueryError> {
        for (i, Order { column, direction }) in self.order.iter().enumerate() {
            let column = self.format_identifier(column, "column")?;
            let keyword = if direction.is_ascending() { "ASC" } else { "DESC" };
            let sep = if i == 0 { " ORDER BY " } else { ", " };
            let _ = write!(sql, "{sep}{column} {keyword}");
        }
        Ok(())
    }

    /// Both values are capped at `i64::MAX`, the largest integer SQL accepts.
    fn append_paging(&self, sql: &mut String) {
        if let Some(rows) = self.limit {
            let _ = write!(sql, " LIMIT {}", sql_count(rows));
        }
        if let Some(rows) = self.offset {
            let _ = write!(sql, " OFFSET {}", sql_count(rows));
        }
    }

    fn format_identifier(&self, ident: &str, kind: &'static str) -> Result<String, QueryError> {
        let checked = self.policy == IdentifierPolicy::Raw || is_valid_identifier(ident);
        if !checked {
            return Err(QueryError::InvalidIdentifier {
                kind,
                ident: ident.to_owned(),
            });
        }
        Ok(if self.policy == IdentifierPolicy::Quote {
            quote_identifier(ident)
        } else {
            ident.to_owned()
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    InvalidIdentifier { kind: &'static str, ident: String },
    /// A sort term names a column the entity does not map.
    UnknownColumn { column: String },
    /// A sort term is not in `column[,asc|desc]` form.
    InvalidSort { term: String },
}

impl std::fmt::Display for QueryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryError::InvalidIdentifier { kind, ident } => {
                write!(f, "`{ident}` is not a valid {kind} name")
            }
            QueryError::UnknownColumn { column } => write!(f, "no mapped column `{column}`"),
            QueryError::InvalidSort { term } => {
                write!(f, "sort term `{term}` is not `column[,asc|desc]`")
            }
        }
    }
}

impl std::error::Error for QueryError {}

/// One or more dot-separated `[A-Za-z_][A-Za-z0-9_]*` segments.
fn is_valid_identifier(ident: &str) -> bool {
    !ident.is_empty() && ident.split('.').all(is_valid_segment)
}

fn is_valid_segment(segment: &str) -> bool {
    let word = |c: char| c.is_ascii_alphanumeric() || c == '_';
    segment
        .chars()
        .next()
        .is_some_and(|first| !first.is_ascii_digit() && word(first))
        && segment.chars().all(word)
}

fn sql_count(rows: u64) -> i64 {
    i64::try_from(rows).unwrap_or(i64::MAX)
}

fn quote_identifier(ident: &str) -> String {
    ident
        .split('.')
        .map(|part| format!("\"{part}\""))
        .collect::<Vec<_>>()
        .join(".")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn products() -> QueryBuilder {
        QueryBuilder::new("products", "id", &["id", "name", "price_cents"])
    }

    #[test]
    fn test_simple_select() {
        let sql = products().build_select().unwrap();
        assert_eq!(sql, "SELECT id, name, price_cents FROM products");
    }

    #[test]
    fn test_select_by_id() {
        let sql = products().where_id().build_select().unwrap();
        assert_eq!(sql, "SELECT id, name, price_cents FROM products WHERE id = ?");
    }

    #[test]
    fn test_select_page() {
        let sql = products()
            .sort(&Sort::desc("price_cents"))
            .order_by("id", true)
            .limit(10)
            .offset(20)
            .build_select()
            .unwrap();
        assert_eq!(
            sql,
            "SELECT id, name, price_cents FROM products \
             ORDER BY price_cents DESC, id ASC LIMIT 10 OFFSET 20"
        );
    }

    #[test]
    fn test_paging_is_capped_at_bigint() {
        let sql = products()
            .limit(u64::MAX)
            .offset(u64::MAX)
            .build_select()
            .unwrap();
        assert_eq!(
            sql,
            "SELECT id, name, price_cents FROM products \
             LIMIT 9223372036854775807 OFFSET 9223372036854775807"
        );

        let sql = products().limit(4).offset(i64::MAX as u64).build_select().unwrap();
        assert!(sql.ends_with("LIMIT 4 OFFSET 9223372036854775807"));
    }

    #[test]
    fn test_id_in_postgres_placeholders() {
        let sql = products()
            .dialect(Dialect::Postgres)
            .where_id_in(3)
            .build_select()
            .unwrap();
        assert_eq!(
            sql,
            "SELECT id, name, price_cents FROM products WHERE id IN ($1, $2, $3)"
        );
    }

    #[test]
    fn test_empty_id_in_matches_nothing() {
        let sql = products().where_id_in(0).build_delete().unwrap();
        assert_eq!(sql, "DELETE FROM products WHERE 1 = 0");
    }

    #[test]
    fn test_count_and_delete() {
        assert_eq!(
            products().build_count().unwrap(),
            "SELECT COUNT(*) FROM products"
        );
        assert_eq!(
            products().where_id().build_count().unwrap(),
            "SELECT COUNT(*) FROM products WHERE id = ?"
        );
        assert_eq!(
            products().dialect(Dialect::Postgres).where_id().build_delete().unwrap(),
            "DELETE FROM products WHERE id = $1"
        );
    }

    #[test]
    fn test_insert_returning() {
        let sql = products().dialect(Dialect::Postgres).build_insert().unwrap();
        assert_eq!(
            sql,
            "INSERT INTO products (name, price_cents) VALUES ($1, $2) \
             RETURNING id, name, price_cents"
        );
    }

    #[test]
    fn test_insert_without_value_columns() {
        let sql = QueryBuilder::new("tags", "id", &["id"]).build_insert().unwrap();
        assert_eq!(sql, "INSERT INTO tags DEFAULT VALUES RETURNING id");
    }

    #[test]
    fn test_upsert() {
        let sql = products().dialect(Dialect::Sqlite).build_upsert().unwrap();
        assert_eq!(
            sql,
            "INSERT INTO products (id, name, price_cents) VALUES (?, ?, ?) \
             ON CONFLICT (id) DO UPDATE SET name = excluded.name, \
             price_cents = excluded.price_cents RETURNING id, name, price_cents"
        );
    }

    #[test]
    fn test_quoted_identifiers() {
        let sql = QueryBuilder::new("shop.products", "id", &["id", "name"])
            .identifier_policy(IdentifierPolicy::Quote)
            .where_id()
            .build_select()
            .unwrap();
        assert_eq!(
            sql,
            r#"SELECT "id", "name" FROM "shop"."products" WHERE "id" = ?"#
        );
    }

    #[test]
    fn test_invalid_identifier_rejected() {
        let err = products()
            .order_by("name; DROP TABLE products", true)
            .build_select()
            .unwrap_err();
        assert!(matches!(err, QueryError::InvalidIdentifier { kind: "column", .. }));
    }

    #[test]
    fn test_raw_policy_skips_validation() {
        let sql = QueryBuilder::new("products", "id", &[])
            .identifier_policy(IdentifierPolicy::Raw)
            .order_by("lower(name)", true)
            .build_select()
            .unwrap();
        assert_eq!(sql, "SELECT * FROM products ORDER BY lower(name) ASC");
    }
}
