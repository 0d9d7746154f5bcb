pub mod ddb_author_repository;
pub mod memory_author_repository;

use async_trait::async_trait;
use crate::authors::domain::model::AuthorEntity;
use crate::core::library::{LibraryError, LibraryResult};
use crate::core::repository::Repository;

#[async_trait]
pub(crate) trait AuthorRepository: Repository<AuthorEntity> {
    // true when an author with this id is stored
    async fn exists(&self, author_id: i64) -> LibraryResult<bool> {
        match self.get(author_id).await {
            Ok(_) => Ok(true),
            Err(LibraryError::NotFound { .. }) => Ok(false),
            Err(err) => Err(err),
        }
    }
}
