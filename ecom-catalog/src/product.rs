use chrono::NaiveDate;
use ecom_data::{AssignId, Entity};
use serde::{Deserialize, Serialize};

/// A catalog product, stored in the `products` table.
///
/// Field names match column names; the in-memory backend sorts through the
/// serialized form and relies on that.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    /// `None` until the product has been saved.
    pub id: Option<i64>,
    pub name: String,
    pub description: String,
    pub brand: String,
    /// Price in the smallest currency unit.
    pub price_cents: i64,
    pub category: String,
    pub release_date: Option<NaiveDate>,
    pub available: bool,
    pub quantity: i64,
}

impl Product {
    /// An unsaved, available product with no stock.
    pub fn new(name: impl Into<String>, price_cents: i64) -> Self {
        Self {
            id: None,
            name: name.into(),
            description: String::new(),
            brand: String::new(),
            price_cents,
            category: String::new(),
            release_date: None,
            available: true,
            quantity: 0,
        }
    }

    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = brand.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_quantity(mut self, quantity: i64) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn released_on(mut self, date: NaiveDate) -> Self {
        self.release_date = Some(date);
        self
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }
}

impl Entity for Product {
    type Id = i64;

    fn table_name() -> &'static str {
        "products"
    }

    fn id_column() -> &'static str {
        "id"
    }

    fn columns() -> &'static [&'static str] {
        &[
            "id",
            "name",
            "description",
            "brand",
            "price_cents",
            "category",
            "release_date",
            "available",
            "quantity",
        ]
    }

    fn id(&self) -> Option<&i64> {
        self.id.as_ref()
    }
}

impl AssignId for Product {
    fn assign_id(&mut self, id: i64) {
        self.id = Some(id);
    }
}

/// Binds the non-id columns in `Entity::columns()` order.
#[cfg(any(feature = "sqlite", feature = "postgres"))]
macro_rules! impl_bind_product {
    ($db:ty) => {
        impl ecom_data_sqlx::BindColumns<$db> for Product {
            fn bind_columns<'q>(
                &'q self,
                args: &mut <$db as sqlx::Database>::Arguments<'q>,
            ) -> Result<(), sqlx::error::BoxDynError> {
                use sqlx::Arguments;

                args.add(&self.name)?;
                args.add(&self.description)?;
                args.add(&self.brand)?;
                args.add(self.price_cents)?;
                args.add(&self.category)?;
                args.add(self.release_date)?;
                args.add(self.available)?;
                args.add(self.quantity)?;
                Ok(())
            }
        }
    };
}

#[cfg(feature = "sqlite")]
impl_bind_product!(sqlx::Sqlite);

#[cfg(feature = "postgres")]
impl_bind_product!(sqlx::Postgres);
