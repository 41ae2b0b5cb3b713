//! Map-backed [`Repository`] implementation.
//!
//! Keeps rows in a `BTreeMap` behind an async `RwLock` and generates ids
//! from a counter that always stays above the largest id seen, so a
//! caller-assigned id is never handed out again. Once `i64::MAX` has been
//! used the counter is exhausted and saves without an id fail. Sorting reads column values
//! through `serde`, which requires the entity's serialized field names to
//! match its column names.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::entity::{AssignId, Entity};
use crate::error::DataError;
use crate::page::{Page, Pageable, Sort};
use crate::repository::Repository;

#[derive(Debug, Clone)]
struct Rows<T> {
    by_id: BTreeMap<i64, T>,
    /// `None` once `i64::MAX` is taken.
    next_id: Option<i64>,
}

impl<T> Default for Rows<T> {
    fn default() -> Self {
        Self {
            by_id: BTreeMap::new(),
            next_id: Some(1),
        }
    }
}

impl<T: AssignId<Id = i64> + Clone> Rows<T> {
    fn store(&mut self, mut entity: T) -> Result<T, DataError> {
        let id = match entity.id() {
            Some(id) => *id,
            None => {
                let id = self.next_id.ok_or_else(|| {
                    DataError::Other(format!("no ids left to generate for {}", T::table_name()))
                })?;
                entity.assign_id(id);
                id
            }
        };
        if let Some(next) = self.next_id {
            if id >= next {
                self.next_id = id.checked_add(1);
            }
        }
        self.by_id.insert(id, entity.clone());
        Ok(entity)
    }
}

/// In-memory repository, cheap to clone (clones share the same rows).
///
/// ```ignore
/// let repo = InMemoryRepository::<Product>::new();
/// let saved = repo.save(&product).await?;
/// assert!(repo.exists_by_id(&saved.id.unwrap()).await?);
/// ```
#[derive(Debug)]
pub struct InMemoryRepository<T> {
    rows: Arc<RwLock<Rows<T>>>,
}

impl<T> InMemoryRepository<T> {
    pub fn new() -> Self {
        Self {
            rows: Arc::new(RwLock::new(Rows::default())),
        }
    }
}

impl<T> Default for InMemoryRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for InMemoryRepository<T> {
    fn clone(&self) -> Self {
        Self {
            rows: Arc::clone(&self.rows),
        }
    }
}

impl<T> InMemoryRepository<T>
where
    T: AssignId<Id = i64> + Clone + Serialize,
{
    async fn sorted(&self, sort: &Sort) -> Result<Vec<T>, DataError> {
        sort.check_columns(T::columns())?;
        let rows: Vec<T> = self.rows.read().await.by_id.values().cloned().collect();
        if sort.is_unsorted() {
            return Ok(rows);
        }
        sort_rows(rows, sort)
    }
}

fn sort_rows<T: Serialize>(rows: Vec<T>, sort: &Sort) -> Result<Vec<T>, DataError> {
    let mut keyed = rows
        .into_iter()
        .map(|row| {
            let value = serde_json::to_value(&row).map_err(|e| DataError::Other(e.to_string()))?;
            let key: Vec<Value> = sort
                .orders()
                .iter()
                .map(|o| value.get(&o.column).cloned().unwrap_or(Value::Null))
                .collect();
            Ok((key, row))
        })
        .collect::<Result<Vec<_>, DataError>>()?;

    // stable, so equal keys keep id order
    keyed.sort_by(|(a, _), (b, _)| {
        sort.orders()
            .iter()
            .zip(a.iter().zip(b.iter()))
            .map(|(order, (x, y))| {
                let ord = compare_values(x, y);
                if order.direction.is_ascending() {
                    ord
                } else {
                    ord.reverse()
                }
            })
            .find(|ord| ord.is_ne())
            .unwrap_or(Ordering::Equal)
    });
    Ok(keyed.into_iter().map(|(_, row)| row).collect())
}

/// NULL < bool < number < string; anything else compares equal.
fn compare_values(a: &Value, b: &Value) -> Ordering {
    fn rank(v: &Value) -> u8 {
        match v {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            Value::Array(_) | Value::Object(_) => 4,
        }
    }
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x.cmp(&y),
            _ => x
                .as_f64()
                .partial_cmp(&y.as_f64())
                .unwrap_or(Ordering::Equal),
        },
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

impl<T> Repository<T, i64> for InMemoryRepository<T>
where
    T: AssignId<Id = i64> + Clone + Serialize,
{
    async fn save(&self, entity: &T) -> Result<T, DataError> {
        self.rows.write().await.store(entity.clone())
    }

    async fn save_all(&self, entities: &[T]) -> Result<Vec<T>, DataError> {
        let mut rows = self.rows.write().await;
        let mut staged = rows.clone();
        let saved = entities
            .iter()
            .map(|e| staged.store(e.clone()))
            .collect::<Result<Vec<_>, _>>()?;
        *rows = staged;
        Ok(saved)
    }

    async fn find_by_id(&self, id: &i64) -> Result<Option<T>, DataError> {
        Ok(self.rows.read().await.by_id.get(id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<T>, DataError> {
        Ok(self.rows.read().await.by_id.values().cloned().collect())
    }

    async fn find_all_by_id(&self, ids: &[i64]) -> Result<Vec<T>, DataError> {
        let rows = self.rows.read().await;
        let mut wanted: Vec<i64> = ids.to_vec();
        wanted.sort_unstable();
        wanted.dedup();
        Ok(wanted
            .iter()
            .filter_map(|id| rows.by_id.get(id).cloned())
            .collect())
    }

    async fn find_all_sorted(&self, sort: &Sort) -> Result<Vec<T>, DataError> {
        self.sorted(sort).await
    }

    async fn find_all_paged(&self, pageable: &Pageable) -> Result<Page<T>, DataError> {
        let rows = self.sorted(&pageable.sort()?).await?;
        let total = rows.len() as u64;
        let content = rows
            .into_iter()
            .skip(usize::try_from(pageable.offset()).unwrap_or(usize::MAX))
            .take(usize::try_from(pageable.size).unwrap_or(usize::MAX))
            .collect();
        Ok(Page::new(content, pageable, total))
    }

    async fn exists_by_id(&self, id: &i64) -> Result<bool, DataError> {
        Ok(self.rows.read().await.by_id.contains_key(id))
    }

    async fn count(&self) -> Result<u64, DataError> {
        Ok(self.rows.read().await.by_id.len() as u64)
    }

    async fn delete_by_id(&self, id: &i64) -> Result<bool, DataError> {
        Ok(self.rows.write().await.by_id.remove(id).is_some())
    }

    async fn delete_all_by_id(&self, ids: &[i64]) -> Result<u64, DataError> {
        let mut rows = self.rows.write().await;
        Ok(ids.iter().filter(|id| rows.by_id.remove(*id).is_some()).count() as u64)
    }

    async fn delete_all(&self) -> Result<u64, DataError> {
        let mut rows = self.rows.write().await;
        let removed = rows.by_id.len() as u64;
        rows.by_id.clear();
        tracing::debug!(table = T::table_name(), removed, "cleared in-memory table");
        Ok(removed)
    }
}
