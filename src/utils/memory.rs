use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicI64, Ordering};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::RwLock;
use crate::core::domain::Identifiable;
use crate::core::library::{LibraryError, LibraryResult, PaginatedResult};

// MemoryTable is a process-local table keyed by integer id. Every mutation
// holds the write lock for its whole duration so each one is all-or-nothing.
#[derive(Debug)]
pub(crate) struct MemoryTable<T> {
    name: String,
    sequence: AtomicI64,
    rows: RwLock<BTreeMap<i64, T>>,
}

impl<T: Identifiable + Serialize + Clone> MemoryTable<T> {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            sequence: AtomicI64::new(0),
            rows: RwLock::new(BTreeMap::new()),
        }
    }

    pub(crate) fn next_id(&self) -> i64 {
        self.sequence.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub(crate) async fn insert(&self, entity: &T) -> LibraryResult<usize> {
        let mut rows = self.rows.write().await;
        if rows.contains_key(&entity.id()) {
            return Err(LibraryError::duplicate_key(
                format!("{} {} already exists", self.name, entity.id()).as_str()));
        }
        rows.insert(entity.id(), entity.clone());
        Ok(1)
    }

    // stores `entity` in place of the current row if that row is still at `expected_version`
    pub(crate) async fn replace(&self, expected_version: i64, entity: T) -> LibraryResult<usize> {
        let mut rows = self.rows.write().await;
        match rows.get(&entity.id()) {
            None => Err(LibraryError::not_found(
                format!("{} not found for {}", self.name, entity.id()).as_str())),
            Some(current) if current.version() != expected_version => Err(LibraryError::unavailable(
                format!("{} {} was modified concurrently", self.name, entity.id()).as_str(), None, false)),
            Some(_) => {
                rows.insert(entity.id(), entity);
                Ok(1)
            }
        }
    }

    pub(crate) async fn get(&self, id: i64) -> LibraryResult<T> {
        self.rows.read().await.get(&id).cloned().ok_or_else(||
            LibraryError::not_found(format!("{} not found for {}", self.name, id).as_str()))
    }

    pub(crate) async fn remove(&self, id: i64) -> LibraryResult<usize> {
        self.rows.write().await.remove(&id).map(|_| 1).ok_or_else(||
            LibraryError::not_found(format!("{} not found for {}", self.name, id).as_str()))
    }

    // pages through rows in id order; the page token is the last id of the previous page
    pub(crate) async fn scan(&self, predicate: &HashMap<String, String>,
                             page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<T>> {
        let after = match page {
            Some(token) => token.parse::<i64>().map_err(|_|
                LibraryError::serialization(format!("invalid page token {}", token).as_str()))?,
            None => 0,
        };
        let rows = self.rows.read().await;
        let mut records = vec![];
        let mut next_page = None;
        for (_, row) in rows.range(after + 1..) {
            if !matches_predicate(row, predicate)? {
                continue;
            }
            if records.len() == page_size.max(1) {
                next_page = records.last().map(|r: &T| r.id().to_string());
                break;
            }
            records.push(row.clone());
        }
        Ok(PaginatedResult::new(page, page_size, next_page, records))
    }
}

fn matches_predicate<T: Serialize>(row: &T, predicate: &HashMap<String, String>) -> LibraryResult<bool> {
    if predicate.is_empty() {
        return Ok(true);
    }
    let value = serde_json::to_value(row)?;
    Ok(predicate.iter().all(|(k, expected)| {
        match value.get(k) {
            Some(Value::String(s)) => s == expected,
            Some(Value::Number(n)) => n.to_string() == *expected,
            Some(Value::Bool(b)) => b.to_string() == *expected,
            _ => false,
        }
    }))
}
