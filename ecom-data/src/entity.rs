use std::fmt::Display;

/// Trait describing how a type maps onto a database table keyed by a single id column.
///
/// `columns()` lists every mapped column, the id column included. An entity
/// that has not been persisted yet returns `None` from [`Entity::id`];
/// saving it lets the backend generate the key.
///
/// # Example
///
/// ```ignore
/// impl Entity for Product {
///     type Id = i64;
///     fn table_name() -> &'static str { "products" }
///     fn id_column() -> &'static str { "id" }
///     fn columns() -> &'static [&'static str] { &["id", "name", "price_cents"] }
///     fn id(&self) -> Option<&i64> { self.id.as_ref() }
/// }
/// ```
pub trait Entity: Send + Sync + Unpin + 'static {
    type Id: Clone + Ord + Display + Send + Sync + 'static;

    fn table_name() -> &'static str;

    fn id_column() -> &'static str;

    fn columns() -> &'static [&'static str];

    fn id(&self) -> Option<&Self::Id>;

    /// Mapped columns other than the id column, in `columns()` order.
    ///
    /// Backends bind entity values in exactly this order.
    fn value_columns() -> Vec<&'static str> {
        Self::columns()
            .iter()
            .copied()
            .filter(|c| *c != Self::id_column())
            .collect()
    }
}

/// Entities whose key can be set after construction.
///
/// Backends that generate keys themselves (rather than reading them back from
/// the database) use this to populate the id on save.
pub trait AssignId: Entity {
    fn assign_id(&mut self, id: Self::Id);
}
