use crate::entity::Entity;
use crate::error::DataError;
use crate::page::{Page, Pageable, Sort};
use std::fmt::Display;
use std::future::Future;

/// Generic async repository contract for one entity type keyed by `ID`.
///
/// Implementations hold no state of their own between calls beyond a handle
/// to their store; every operation is a single unit of work against it and
/// errors from the store are returned unchanged inside [`DataError`].
///
/// Uses RPITIT (return-position `impl Trait` in traits), no `async-trait` needed.
pub trait Repository<T, ID>: Send + Sync
where
    T: Send + Sync + 'static,
    ID: Send + Sync + 'static,
{
    /// Insert `entity` when it has no id, otherwise insert-or-update the row
    /// with its id. Returns the stored entity with its id populated.
    fn save(&self, entity: &T) -> impl Future<Output = Result<T, DataError>> + Send;

    /// Save every entity as one atomic unit. On error nothing is stored.
    fn save_all(&self, entities: &[T]) -> impl Future<Output = Result<Vec<T>, DataError>> + Send;

    /// `Ok(None)` when no row has this id.
    fn find_by_id(&self, id: &ID) -> impl Future<Output = Result<Option<T>, DataError>> + Send;

    /// Every row, ordered by id ascending.
    fn find_all(&self) -> impl Future<Output = Result<Vec<T>, DataError>> + Send;

    /// Rows whose id is in `ids`, ordered by id. Unknown ids are skipped.
    fn find_all_by_id(&self, ids: &[ID]) -> impl Future<Output = Result<Vec<T>, DataError>> + Send;

    /// Every row in `sort` order. Fails with [`DataError::Query`] if `sort`
    /// names an unmapped column.
    fn find_all_sorted(&self, sort: &Sort) -> impl Future<Output = Result<Vec<T>, DataError>> + Send;

    fn find_all_paged(
        &self,
        pageable: &Pageable,
    ) -> impl Future<Output = Result<Page<T>, DataError>> + Send;

    fn exists_by_id(&self, id: &ID) -> impl Future<Output = Result<bool, DataError>> + Send;

    fn count(&self) -> impl Future<Output = Result<u64, DataError>> + Send;

    /// Remove the row with this id. Returns whether a row was removed;
    /// a missing id is not an error.
    fn delete_by_id(&self, id: &ID) -> impl Future<Output = Result<bool, DataError>> + Send;

    /// Returns the number of rows removed.
    fn delete_all_by_id(&self, ids: &[ID]) -> impl Future<Output = Result<u64, DataError>> + Send;

    /// Returns the number of rows removed.
    fn delete_all(&self) -> impl Future<Output = Result<u64, DataError>> + Send;

    /// Delete by the entity's id. An entity that was never saved is a no-op.
    fn delete(&self, entity: &T) -> impl Future<Output = Result<bool, DataError>> + Send
    where
        T: Entity<Id = ID>,
    {
        async move {
            match entity.id() {
                Some(id) => self.delete_by_id(id).await,
                None => Ok(false),
            }
        }
    }

    /// Like [`find_by_id`](Repository::find_by_id), but absence is
    /// [`DataError::NotFound`].
    fn get_by_id(&self, id: &ID) -> impl Future<Output = Result<T, DataError>> + Send
    where
        T: Entity<Id = ID>,
        ID: Display,
    {
        async move {
            self.find_by_id(id)
                .await?
                .ok_or_else(|| DataError::NotFound(format!("{} with id {id}", T::table_name())))
        }
    }
}
