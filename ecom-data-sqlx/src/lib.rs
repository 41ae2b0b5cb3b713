//! # ecom-data-sqlx: SQLx backend for the ecom data layer
//!
//! [`SqlxRepository`] implements [`ecom_data::Repository`] over an
//! `sqlx::Pool`. Statements come from [`ecom_data::QueryBuilder`], entity
//! values are bound through [`BindColumns`] and rows decode with
//! `sqlx::FromRow`. [`DatabaseConfig`] reads the `app.database` section and
//! opens the pool; driver errors become [`DataError`](ecom_data::DataError)
//! through [`SqlxErrorExt`].
//!
//! Drivers are opt-in: enable `sqlite` and/or `postgres`. Without either
//! feature the crate still builds, but no `Repository` impl exists.
//!
//! # Quick start
//!
//! ```ignore
//! use ecom_data::Repository;
//! use ecom_data_sqlx::{DatabaseConfig, SqlxRepository};
//! use sqlx::Sqlite;
//!
//! let pool = DatabaseConfig::new("sqlite::memory:").connect::<Sqlite>().await?;
//! let repo = SqlxRepository::<Product, Sqlite>::new(pool);
//! let saved = repo.save(&product).await?;
//! ```
//!
//! # Save semantics
//!
//! An entity without an id is inserted and the generated key is read back
//! with `RETURNING`. An entity with an id is upserted
//! (`INSERT ... ON CONFLICT (id) DO UPDATE`), so a caller-assigned key is
//! inserted the first time and updated afterwards.

pub mod bind;
pub mod config;
pub mod error;
pub mod repository;

pub use bind::BindColumns;
pub use config::DatabaseConfig;
pub use error::{SqlxErrorExt, SqlxResult};
pub use repository::SqlxRepository;

/// Re-exports of the most commonly used types from both `ecom-data` and this crate.
pub mod prelude {
    pub use crate::{BindColumns, DatabaseConfig, SqlxErrorExt, SqlxRepository};
    pub use ecom_data::prelude::*;
}
