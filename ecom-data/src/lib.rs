//! # ecom-data
//!
//! Backend-agnostic data access: the [`Entity`] description of a mapped
//! table, the [`Repository`] contract every backend implements, SQL
//! generation through [`QueryBuilder`], and [`InMemoryRepository`], a
//! map-backed implementation of the same contract.
//!
//! The SQL backend lives in `ecom-data-sqlx`.

pub mod entity;
pub mod error;
pub mod memory;
pub mod page;
pub mod query;
pub mod repository;

pub use entity::{AssignId, Entity};
pub use error::DataError;
pub use memory::InMemoryRepository;
pub use page::{Direction, Order, Page, Pageable, Sort};
pub use query::{Dialect, IdentifierPolicy, QueryBuilder, QueryError};
pub use repository::Repository;

pub mod prelude {
    //! Re-exports of the most commonly used data types.
    pub use crate::{DataError, Entity, Page, Pageable, Repository, Sort};
}
