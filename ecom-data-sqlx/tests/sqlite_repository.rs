#![cfg(feature = "sqlite")]

use ecom_data::{DataError, Entity, Pageable, Repository, Sort};
use ecom_data_sqlx::{BindColumns, DatabaseConfig, SqlxRepository};
use sqlx::error::BoxDynError;
use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{Arguments, FromRow, Row, Sqlite, SqlitePool};

#[derive(Debug, Clone, PartialEq)]
struct Tag {
    id: Option<i64>,
    label: String,
    weight: i64,
}

impl Tag {
    fn new(label: &str, weight: i64) -> Self {
        Self {
            id: None,
            label: label.to_string(),
            weight,
        }
    }
}

impl Entity for Tag {
    type Id = i64;

    fn table_name() -> &'static str {
        "tags"
    }

    fn id_column() -> &'static str {
        "id"
    }

    fn columns() -> &'static [&'static str] {
        &["id", "label", "weight"]
    }

    fn id(&self) -> Option<&i64> {
        self.id.as_ref()
    }
}

impl FromRow<'_, SqliteRow> for Tag {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            label: row.try_get("label")?,
            weight: row.try_get("weight")?,
        })
    }
}

impl BindColumns<Sqlite> for Tag {
    fn bind_columns<'q>(&'q self, args: &mut SqliteArguments<'q>) -> Result<(), BoxDynError> {
        args.add(self.label.clone())?;
        args.add(self.weight)?;
        Ok(())
    }
}

async fn repo() -> SqlxRepository<Tag, Sqlite> {
    // one connection: every connection to `sqlite::memory:` is its own database
    let pool: SqlitePool = DatabaseConfig::new("sqlite::memory:")
        .max_connections(1)
        .connect::<Sqlite>()
        .await
        .unwrap();
    sqlx::query(
        "CREATE TABLE tags (\
            id INTEGER PRIMARY KEY AUTOINCREMENT, \
            label TEXT NOT NULL UNIQUE, \
            weight INTEGER NOT NULL)",
    )
    .execute(&pool)
    .await
    .unwrap();
    SqlxRepository::new(pool)
}

#[tokio::test]
async fn test_insert_then_find() {
    let repo = repo().await;
    let saved = repo.save(&Tag::new("sale", 1)).await.unwrap();
    let id = saved.id.unwrap();
    assert_eq!(repo.find_by_id(&id).await.unwrap(), Some(saved));
}

#[tokio::test]
async fn test_upsert_with_caller_assigned_id() {
    let repo = repo().await;
    let mut tag = Tag::new("new", 1);
    tag.id = Some(40);

    let inserted = repo.save(&tag).await.unwrap();
    assert_eq!(inserted.id, Some(40));

    tag.weight = 9;
    let updated = repo.save(&tag).await.unwrap();
    assert_eq!(updated.weight, 9);
    assert_eq!(repo.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_constraint_violation_is_database_error() {
    let repo = repo().await;
    repo.save(&Tag::new("dup", 1)).await.unwrap();
    let err = repo.save(&Tag::new("dup", 2)).await.unwrap_err();
    assert!(matches!(err, DataError::Database(_)));
}

#[tokio::test]
async fn test_save_all_rolls_back_on_failure() {
    let repo = repo().await;
    let err = repo
        .save_all(&[Tag::new("a", 1), Tag::new("b", 2), Tag::new("a", 3)])
        .await
        .unwrap_err();
    assert!(matches!(err, DataError::Database(_)));
    assert_eq!(repo.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_sorted_and_paged() {
    let repo = repo().await;
    repo.save_all(&[Tag::new("c", 1), Tag::new("a", 3), Tag::new("b", 2)])
        .await
        .unwrap();

    let by_weight = repo.find_all_sorted(&Sort::desc("weight")).await.unwrap();
    let labels: Vec<&str> = by_weight.iter().map(|t| t.label.as_str()).collect();
    assert_eq!(labels, vec!["a", "b", "c"]);

    let page = repo
        .find_all_paged(&Pageable::of(1, 2).sorted_by("label"))
        .await
        .unwrap();
    assert_eq!(page.total_elements, 3);
    assert_eq!(page.total_pages, 2);
    assert_eq!(page.content.len(), 1);
    assert_eq!(page.content[0].label, "c");
}

#[tokio::test]
async fn test_sort_by_unmapped_column_is_rejected() {
    let repo = repo().await;
    let err = repo
        .find_all_sorted(&Sort::asc("weight; DROP TABLE tags"))
        .await
        .unwrap_err();
    assert!(matches!(err, DataError::Query(_)));
    assert_eq!(repo.count().await.unwrap(), 0);
}
