use sqlx::{Database, Pool};
use std::marker::PhantomData;

#[cfg(any(feature = "sqlite", feature = "postgres"))]
use ecom_data::{DataError, Dialect, Entity, Page, Pageable, QueryBuilder, Repository, Sort};

#[cfg(any(feature = "sqlite", feature = "postgres"))]
use crate::bind::BindColumns;
#[cfg(any(feature = "sqlite", feature = "postgres"))]
use crate::error::SqlxErrorExt;

/// A generic SQL-based repository implementation.
///
/// Wraps an `sqlx::Pool<DB>` for a given entity type and implements
/// [`Repository`] for it by generating SQL from the [`Entity`] description.
/// Implemented for `Sqlite` and `Postgres` behind the crate features of the
/// same names.
///
/// # Example
///
/// ```ignore
/// let repo = SqlxRepository::<Product, Sqlite>::new(pool.clone());
/// let saved = repo.save(&product).await?;
/// let all = repo.find_all().await?;
/// ```
pub struct SqlxRepository<T, DB: Database> {
    pool: Pool<DB>,
    _marker: PhantomData<fn() -> T>,
}

impl<T, DB: Database> SqlxRepository<T, DB> {
    pub fn new(pool: Pool<DB>) -> Self {
        Self {
            pool,
            _marker: PhantomData,
        }
    }

    /// Get the underlying pool reference.
    pub fn pool(&self) -> &Pool<DB> {
        &self.pool
    }
}

impl<T, DB: Database> Clone for SqlxRepository<T, DB> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T, DB: Database> std::fmt::Debug for SqlxRepository<T, DB> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqlxRepository")
            .field("entity", &std::any::type_name::<T>())
            .field("pool_size", &self.pool.size())
            .finish()
    }
}

/// Implement [`Repository`] for `SqlxRepository<T, $db>`.
///
/// sqlx's executor and argument traits are driver-specific, so the body is
/// stamped out once per enabled driver rather than written against a generic
/// `DB`.
#[cfg(any(feature = "sqlite", feature = "postgres"))]
macro_rules! impl_sqlx_repository {
    ($db:ty, $dialect:expr) => {
        impl<T> SqlxRepository<T, $db>
        where
            T: BindColumns<$db> + for<'r> sqlx::FromRow<'r, <$db as Database>::Row>,
            T::Id: for<'q> sqlx::Encode<'q, $db> + sqlx::Type<$db>,
        {
            fn builder() -> QueryBuilder {
                QueryBuilder::for_entity::<T>().dialect($dialect)
            }

            fn by_id() -> QueryBuilder {
                Self::builder().order_by(T::id_column(), true)
            }

            /// Insert or upsert `entity` on an open connection.
            async fn save_on(
                conn: &mut <$db as Database>::Connection,
                entity: &T,
            ) -> Result<T, DataError> {
                let mut args: <$db as Database>::Arguments<'_> = Default::default();
                let sql = match entity.id() {
                    Some(id) => {
                        sqlx::Arguments::add(&mut args, id.clone()).map_err(DataError::Database)?;
                        Self::builder().build_upsert()?
                    }
                    None => Self::builder().build_insert()?,
                };
                entity.bind_columns(&mut args).map_err(DataError::Database)?;

                tracing::debug!(table = T::table_name(), %sql, "save");
                sqlx::query_as_with::<$db, T, _>(&sql, args)
                    .fetch_one(&mut *conn)
                    .await
                    .map_err(SqlxErrorExt::into_data_error)
            }

            async fn count_rows(&self) -> Result<u64, DataError> {
                let sql = Self::builder().build_count()?;
                let count: i64 = sqlx::query_scalar::<$db, i64>(&sql)
                    .fetch_one(&self.pool)
                    .await
                    .map_err(SqlxErrorExt::into_data_error)?;
                Ok(u64::try_from(count).unwrap_or_default())
            }

            async fn select(&self, builder: QueryBuilder) -> Result<Vec<T>, DataError> {
                let sql = builder.build_select()?;
                tracing::debug!(table = T::table_name(), %sql, "select");
                sqlx::query_as::<$db, T>(&sql)
                    .fetch_all(&self.pool)
                    .await
                    .map_err(SqlxErrorExt::into_data_error)
            }
        }

        impl<T> Repository<T, T::Id> for SqlxRepository<T, $db>
        where
            T: BindColumns<$db> + for<'r> sqlx::FromRow<'r, <$db as Database>::Row>,
            T::Id: for<'q> sqlx::Encode<'q, $db> + sqlx::Type<$db>,
        {
            async fn save(&self, entity: &T) -> Result<T, DataError> {
                let mut conn = self
                    .pool
                    .acquire()
                    .await
                    .map_err(SqlxErrorExt::into_data_error)?;
                Self::save_on(&mut *conn, entity).await
            }

            async fn save_all(&self, entities: &[T]) -> Result<Vec<T>, DataError> {
                let mut tx = self
                    .pool
                    .begin()
                    .await
                    .map_err(SqlxErrorExt::into_data_error)?;
                let mut saved = Vec::with_capacity(entities.len());
                for entity in entities {
                    // dropping `tx` on error rolls everything back
                    saved.push(Self::save_on(&mut *tx, entity).await?);
                }
                tx.commit().await.map_err(SqlxErrorExt::into_data_error)?;
                Ok(saved)
            }

            async fn find_by_id(&self, id: &T::Id) -> Result<Option<T>, DataError> {
                let sql = Self::builder().where_id().build_select()?;
                tracing::debug!(table = T::table_name(), %sql, "find_by_id");
                sqlx::query_as::<$db, T>(&sql)
                    .bind(id.clone())
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(SqlxErrorExt::into_data_error)
            }

            async fn find_all(&self) -> Result<Vec<T>, DataError> {
                self.select(Self::by_id()).await
            }

            async fn find_all_by_id(&self, ids: &[T::Id]) -> Result<Vec<T>, DataError> {
                if ids.is_empty() {
                    return Ok(Vec::new());
                }
                let sql = Self::by_id().where_id_in(ids.len()).build_select()?;
                tracing::debug!(table = T::table_name(), %sql, "find_all_by_id");
                let mut query = sqlx::query_as::<$db, T>(&sql);
                for id in ids {
                    query = query.bind(id.clone());
                }
                query
                    .fetch_all(&self.pool)
                    .await
                    .map_err(SqlxErrorExt::into_data_error)
            }

            async fn find_all_sorted(&self, sort: &Sort) -> Result<Vec<T>, DataError> {
                sort.check_columns(T::columns())?;
                self.select(Self::builder().sort(sort).order_by(T::id_column(), true))
                    .await
            }

            async fn find_all_paged(&self, pageable: &Pageable) -> Result<Page<T>, DataError> {
                let sort = pageable.sort()?;
                sort.check_columns(T::columns())?;
                let total = self.count_rows().await?;
                let content = self
                    .select(
                        Self::builder()
                            .sort(&sort)
                            .order_by(T::id_column(), true)
                            .limit(pageable.size)
                            .offset(pageable.offset()),
                    )
                    .await?;
                Ok(Page::new(content, pageable, total))
            }

            async fn exists_by_id(&self, id: &T::Id) -> Result<bool, DataError> {
                let sql = Self::builder().where_id().build_count()?;
                let count: i64 = sqlx::query_scalar::<$db, i64>(&sql)
                    .bind(id.clone())
                    .fetch_one(&self.pool)
                    .await
                    .map_err(SqlxErrorExt::into_data_error)?;
                Ok(count > 0)
            }

            async fn count(&self) -> Result<u64, DataError> {
                self.count_rows().await
            }

            async fn delete_by_id(&self, id: &T::Id) -> Result<bool, DataError> {
                let sql = Self::builder().where_id().build_delete()?;
                tracing::debug!(table = T::table_name(), %sql, "delete_by_id");
                let result = sqlx::query::<$db>(&sql)
                    .bind(id.clone())
                    .execute(&self.pool)
                    .await
                    .map_err(SqlxErrorExt::into_data_error)?;
                Ok(result.rows_affected() > 0)
            }

            async fn delete_all_by_id(&self, ids: &[T::Id]) -> Result<u64, DataError> {
                if ids.is_empty() {
                    return Ok(0);
                }
                let sql = Self::builder().where_id_in(ids.len()).build_delete()?;
                tracing::debug!(table = T::table_name(), %sql, "delete_all_by_id");
                let mut query = sqlx::query::<$db>(&sql);
                for id in ids {
                    query = query.bind(id.clone());
                }
                let result = query
                    .execute(&self.pool)
                    .await
                    .map_err(SqlxErrorExt::into_data_error)?;
                Ok(result.rows_affected())
            }

            async fn delete_all(&self) -> Result<u64, DataError> {
                let sql = Self::builder().build_delete()?;
                tracing::debug!(table = T::table_name(), %sql, "delete_all");
                let result = sqlx::query::<$db>(&sql)
                    .execute(&self.pool)
                    .await
                    .map_err(SqlxErrorExt::into_data_error)?;
                Ok(result.rows_affected())
            }
        }
    };
}

#[cfg(feature = "sqlite")]
impl_sqlx_repository!(sqlx::Sqlite, Dialect::Sqlite);

#[cfg(feature = "postgres")]
impl_sqlx_repository!(sqlx::Postgres, Dialect::Postgres);
