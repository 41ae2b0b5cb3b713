#[cfg(any(feature = "sqlite", feature = "postgres"))]
use ecom_core::config::EcomConfig;
#[cfg(any(feature = "sqlite", feature = "postgres"))]
use ecom_data::DataError;
#[cfg(any(feature = "sqlite", feature = "postgres"))]
use ecom_data_sqlx::DatabaseConfig;
use ecom_data_sqlx::SqlxRepository;
use sqlx::{Database, Pool};

use crate::product::Product;

/// Connected catalog: the pool plus the product repository built on it.
///
/// ```ignore
/// let config = EcomConfig::load("dev")?.with_typed::<DatabaseConfig>()?;
/// let catalog = Catalog::<Sqlite>::connect(&config).await?;
/// let saved = catalog.products().save(&Product::new("Lamp", 1999)).await?;
/// ```
pub struct Catalog<DB: Database> {
    products: SqlxRepository<Product, DB>,
}

impl<DB: Database> Catalog<DB> {
    /// Wrap an existing pool. Migrations are not run.
    pub fn from_pool(pool: Pool<DB>) -> Self {
        Self {
            products: SqlxRepository::new(pool),
        }
    }

    pub fn products(&self) -> &SqlxRepository<Product, DB> {
        &self.products
    }

    pub fn pool(&self) -> &Pool<DB> {
        self.products.pool()
    }
}

impl<DB: Database> Clone for Catalog<DB> {
    fn clone(&self) -> Self {
        Self {
            products: self.products.clone(),
        }
    }
}

#[cfg(any(feature = "sqlite", feature = "postgres"))]
macro_rules! impl_catalog_connect {
    ($db:ty, $migrations:tt) => {
        impl Catalog<$db> {
            /// Open the pool described by `config` and, when
            /// `app.database.migrate` is set, bring the schema up to date.
            pub async fn connect(config: &EcomConfig<DatabaseConfig>) -> Result<Self, DataError> {
                let db: &DatabaseConfig = config;
                let catalog = Self::from_pool(db.connect::<$db>().await?);
                if db.run_migrations {
                    catalog.migrate().await?;
                }
                tracing::info!(
                    profile = config.profile(),
                    scheme = db.scheme(),
                    migrated = db.run_migrations,
                    "catalog ready"
                );
                Ok(catalog)
            }

            /// Apply the embedded migrations for this driver.
            pub async fn migrate(&self) -> Result<(), DataError> {
                sqlx::migrate!($migrations)
                    .run(self.pool())
                    .await
                    .map_err(DataError::database)
            }
        }
    };
}

#[cfg(feature = "sqlite")]
impl_catalog_connect!(sqlx::Sqlite, "migrations/sqlite");

#[cfg(feature = "postgres")]
impl_catalog_connect!(sqlx::Postgres, "migrations/postgres");
