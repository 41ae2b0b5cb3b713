use ecom_data::Repository;

use crate::product::Product;

/// Persistence contract for [`Product`].
///
/// Every `Repository<Product, i64>` is a `ProductRepo`, so code can depend on
/// this name and be handed the SQL backend or the in-memory one.
pub trait ProductRepo: Repository<Product, i64> {}

impl<R> ProductRepo for R where R: Repository<Product, i64> {}

#[cfg(feature = "sqlite")]
pub type SqliteProductRepo = ecom_data_sqlx::SqlxRepository<Product, sqlx::Sqlite>;

#[cfg(feature = "postgres")]
pub type PgProductRepo = ecom_data_sqlx::SqlxRepository<Product, sqlx::Postgres>;

pub type InMemoryProductRepo = ecom_data::InMemoryRepository<Product>;
