pub mod query;
pub mod service;
pub mod validation;

use async_trait::async_trait;
use serde_json::Value;
use crate::authors::dto::{AuthorDetailDto, AuthorDto};
use crate::books::dto::BookDto;
use crate::catalog::domain::query::{BookQuery, Page};
use crate::core::library::LibraryResult;

#[async_trait]
pub(crate) trait CatalogService: Sync + Send {
    async fn list_books(&self, query: &BookQuery) -> LibraryResult<Page<BookDto>>;
    async fn find_book_by_id(&self, id: i64) -> LibraryResult<BookDto>;
    async fn add_book(&self, payload: &Value) -> LibraryResult<BookDto>;
    // partial updates keep the fields the payload leaves out
    async fn update_book(&self, id: i64, payload: &Value, partial: bool) -> LibraryResult<BookDto>;
    async fn remove_book(&self, id: i64) -> LibraryResult<()>;
    async fn list_authors(&self) -> LibraryResult<Vec<AuthorDto>>;
    async fn find_author_by_id(&self, id: i64) -> LibraryResult<AuthorDetailDto>;
    async fn add_author(&self, payload: &Value) -> LibraryResult<AuthorDto>;
}
