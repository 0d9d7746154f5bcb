use std::collections::HashMap;
use async_trait::async_trait;
use crate::authors::domain::model::AuthorEntity;
use crate::authors::repository::AuthorRepository;
use crate::core::library::{LibraryResult, PaginatedResult};
use crate::core::repository::Repository;
use crate::utils::memory::MemoryTable;

#[derive(Debug)]
pub struct MemoryAuthorRepository {
    table: MemoryTable<AuthorEntity>,
}

impl MemoryAuthorRepository {
    pub(crate) fn new(table_name: &str) -> Self {
        Self {
            table: MemoryTable::new(table_name),
        }
    }
}

#[async_trait]
impl Repository<AuthorEntity> for MemoryAuthorRepository {
    async fn next_id(&self) -> LibraryResult<i64> {
        Ok(self.table.next_id())
    }

    async fn create(&self, entity: &AuthorEntity) -> LibraryResult<usize> {
        self.table.insert(entity).await
    }

    async fn update(&self, entity: &AuthorEntity) -> LibraryResult<usize> {
        let next = AuthorEntity { version: entity.version + 1, ..entity.clone() };
        self.table.replace(entity.version, next).await
    }

    async fn get(&self, id: i64) -> LibraryResult<AuthorEntity> {
        self.table.get(id).await
    }

    async fn delete(&self, id: i64) -> LibraryResult<usize> {
        self.table.remove(id).await
    }

    async fn query(&self, predicate: &HashMap<String, String>,
                   page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<AuthorEntity>> {
        self.table.scan(predicate, page, page_size).await
    }
}

impl AuthorRepository for MemoryAuthorRepository {}
