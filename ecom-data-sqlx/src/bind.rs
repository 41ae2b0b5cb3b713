use ecom_data::Entity;
use sqlx::error::BoxDynError;
use sqlx::Database;

/// Binds an entity's column values for `INSERT`/upsert statements.
///
/// Implementations push one value per entry of [`Entity::value_columns`],
/// in that order, and must not bind the id.
///
/// ```ignore
/// impl BindColumns<Sqlite> for Product {
///     fn bind_columns<'q>(&'q self, args: &mut SqliteArguments<'q>) -> Result<(), BoxDynError> {
///         args.add(self.name.clone())?;
///         args.add(self.price_cents)?;
///         Ok(())
///     }
/// }
/// ```
pub trait BindColumns<DB: Database>: Entity {
    fn bind_columns<'q>(&'q self, args: &mut <DB as Database>::Arguments<'q>)
        -> Result<(), BoxDynError>;
}
