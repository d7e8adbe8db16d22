//! In-memory repository backed by an ordered map behind an async lock
//!
//! Insertion order is the natural collection order, so unsorted reads come
//! back in creation order. Uniqueness constraints are enforced inside `save`
//! and `update` while the write lock is held, which closes the window between
//! an application-level existence check and the insert that follows it.

use async_trait::async_trait;
use indexmap::IndexMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::core::error::{Error, Result};
use crate::core::field::FieldValue;
use crate::core::query::SortOrder;
use crate::core::record::Record;
use crate::repository::{Criteria, DeleteAck, FindQuery, Repository, UpdateAck};

/// Thread-safe in-memory repository for one entity
#[derive(Debug, Clone)]
pub struct InMemoryRepository {
    entity_name: String,
    columns: Vec<String>,
    unique_columns: Vec<String>,
    records: Arc<RwLock<IndexMap<Uuid, Record>>>,
}

impl InMemoryRepository {
    /// A repository for `entity_name` with the given declared columns
    ///
    /// `id` is always a column and need not be listed.
    pub fn new(entity_name: &str, columns: &[&str]) -> Self {
        Self {
            entity_name: entity_name.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            unique_columns: Vec::new(),
            records: Arc::new(RwLock::new(IndexMap::new())),
        }
    }

    /// Declare columns whose values must be unique across the collection
    pub fn with_unique(mut self, columns: &[&str]) -> Self {
        self.unique_columns = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    pub async fn count(&self) -> usize {
        self.records.read().await.len()
    }

    /// Drop every stored record, keeping the column declarations
    pub async fn clear(&self) {
        self.records.write().await.clear();
    }

    fn check_unique(
        &self,
        records: &IndexMap<Uuid, Record>,
        candidate: &Record,
        skip_id: Option<Uuid>,
    ) -> Result<()> {
        for column in &self.unique_columns {
            let Some(value) = candidate.get(column) else {
                continue;
            };
            if value.is_null() {
                continue;
            }
            let taken = records.iter().any(|(id, existing)| {
                Some(*id) != skip_id
                    && existing
                        .get(column)
                        .is_some_and(|other| other.loosely_equals(value))
            });
            if taken {
                return Err(Error::Conflict(format!(
                    "A {} with this {} already exists",
                    self.entity_name, column
                )));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    fn entity_name(&self) -> &str {
        &self.entity_name
    }

    fn has_column(&self, field: &str) -> bool {
        field == "id" || self.columns.iter().any(|c| c == field)
    }

    async fn find_one(&self, criteria: &Criteria, select: &[String]) -> Result<Option<Record>> {
        let records = self.records.read().await;
        Ok(records
            .values()
            .find(|record| criteria.matches(record))
            .map(|record| record.project(select)))
    }

    async fn find_and_count(&self, query: &FindQuery) -> Result<(Vec<Record>, usize)> {
        let records = self.records.read().await;
        let mut matched: Vec<&Record> = records
            .values()
            .filter(|record| query.criteria.matches(record))
            .collect();
        let count = matched.len();

        if let Some((field, order)) = &query.order {
            matched.sort_by(|a, b| {
                let left = a.get(field).unwrap_or(&FieldValue::Null);
                let right = b.get(field).unwrap_or(&FieldValue::Null);
                match order {
                    SortOrder::Asc => left.compare(right),
                    SortOrder::Desc => right.compare(left),
                }
            });
        }

        let skip = query.skip.unwrap_or(0);
        let take = query.take.unwrap_or(usize::MAX);
        let page = matched
            .into_iter()
            .skip(skip)
            .take(take)
            .map(|record| record.project(&query.select))
            .collect();
        Ok((page, count))
    }

    async fn create(&self, payload: Record) -> Result<Record> {
        let mut record = Record::new();
        for (name, value) in payload.iter() {
            if self.has_column(name) && name != "id" {
                record.set(name, value.clone());
            }
        }
        record.set_id(Uuid::new_v4());
        Ok(record)
    }

    async fn save(&self, record: Record) -> Result<Record> {
        let id = record
            .id()
            .ok_or_else(|| Error::Internal("Cannot save a record without an id".into()))?;
        let mut records = self.records.write().await;
        self.check_unique(&records, &record, Some(id))?;
        records.insert(id, record.clone());
        Ok(record)
    }

    async fn update(&self, id: &Uuid, payload: Record) -> Result<UpdateAck> {
        let mut records = self.records.write().await;
        if !records.contains_key(id) {
            return Ok(UpdateAck { affected: 0 });
        }
        let mut updated = records[id].clone();
        for (name, value) in payload.iter() {
            if self.has_column(name) && name != "id" {
                updated.set(name, value.clone());
            }
        }
        self.check_unique(&records, &updated, Some(*id))?;
        records.insert(*id, updated);
        Ok(UpdateAck { affected: 1 })
    }

    async fn delete(&self, id: &Uuid) -> Result<DeleteAck> {
        let mut records = self.records.write().await;
        let affected = u64::from(records.shift_remove(id).is_some());
        Ok(DeleteAck { affected })
    }
}
