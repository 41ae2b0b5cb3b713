//! # ecom-catalog
//!
//! Product catalog persistence. [`Product`] is mapped onto the `products`
//! table; [`ProductRepo`] is the contract callers depend on, satisfied by
//! `SqlxRepository<Product, _>` for each enabled driver and by
//! [`InMemoryProductRepo`].
//!
//! [`Catalog::connect`] builds the pool from the `app.database` config
//! section and runs the embedded migrations (`migrations/sqlite`,
//! `migrations/postgres`).

pub mod catalog;
pub mod product;
pub mod repo;

pub use catalog::Catalog;
pub use product::Product;
pub use repo::{InMemoryProductRepo, ProductRepo};

#[cfg(feature = "postgres")]
pub use repo::PgProductRepo;
#[cfg(feature = "sqlite")]
pub use repo::SqliteProductRepo;
