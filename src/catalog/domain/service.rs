use std::collections::HashMap;
use std::sync::Arc;
use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info};
use crate::authors::domain::model::AuthorEntity;
use crate::authors::dto::{AuthorDetailDto, AuthorDto};
use crate::authors::repository::AuthorRepository;
use crate::books::domain::model::BookEntity;
use crate::books::dto::BookDto;
use crate::books::repository::BookRepository;
use crate::catalog::domain::CatalogService;
use crate::catalog::domain::query::{BookQuery, Page, paginate};
use crate::catalog::domain::validation::{AuthorPatch, BookPatch, unknown_author};
use crate::core::clock::Clock;
use crate::core::domain::Configuration;
use crate::core::library::{FieldErrors, LibraryError, LibraryResult};
use crate::core::repository::query_all;

const SCAN_PAGE_SIZE: usize = 100;

pub(crate) struct CatalogServiceImpl {
    book_repository: Box<dyn BookRepository>,
    author_repository: Box<dyn AuthorRepository>,
    clock: Arc<dyn Clock>,
    page_size: usize,
    max_page_size: usize,
    max_title_length: usize,
    max_author_name_length: usize,
}

impl CatalogServiceImpl {
    pub(crate) fn new(config: &Configuration, book_repository: Box<dyn BookRepository>,
                      author_repository: Box<dyn AuthorRepository>, clock: Arc<dyn Clock>) -> Self {
        Self {
            book_repository,
            author_repository,
            clock,
            page_size: config.page_size,
            max_page_size: config.max_page_size,
            max_title_length: config.max_title_length,
            max_author_name_length: config.max_author_name_length,
        }
    }

    async fn author_names(&self) -> LibraryResult<HashMap<i64, String>> {
        let authors = query_all::<AuthorEntity, _>(
            self.author_repository.as_ref(), &HashMap::new(), SCAN_PAGE_SIZE).await?;
        Ok(authors.into_iter().map(|a| (a.author_id, a.name)).collect())
    }

    // adds the checks that need the clock or the author store
    async fn validate_book(&self, patch: &BookPatch, errors: &mut FieldErrors) -> LibraryResult<()> {
        patch.check(self.max_title_length, self.clock.current_year(), errors);
        if let Some(author_id) = patch.author {
            if !self.author_repository.exists(author_id).await? {
                errors.add("author", unknown_author(author_id).as_str());
            }
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogService for CatalogServiceImpl {
    async fn list_books(&self, query: &BookQuery) -> LibraryResult<Page<BookDto>> {
        let page_size = query.effective_page_size(self.page_size, self.max_page_size);
        if query.matches_nothing() {
            debug!("no book can match {:?}", query);
            return paginate(vec![], query.page, page_size);
        }
        let mut books = query_all::<BookEntity, _>(
            self.book_repository.as_ref(), &query.predicate(), SCAN_PAGE_SIZE).await?;
        let names = if query.needs_author_names() {
            self.author_names().await?
        } else {
            HashMap::new()
        };
        books.retain(|b| query.matches(b, &names));
        books.sort_by_key(|b| b.book_id);
        query.sort(&mut books);
        debug!("listing {} books for {:?}", books.len(), query);
        paginate(books, query.page, page_size).map(|page| page.map(|b| BookDto::from(&b)))
    }

    async fn find_book_by_id(&self, id: i64) -> LibraryResult<BookDto> {
        self.book_repository.get(id).await.map(|b| BookDto::from(&b))
    }

    async fn add_book(&self, payload: &Value) -> LibraryResult<BookDto> {
        let mut errors = FieldErrors::new();
        let patch = BookPatch::parse(payload, false, &mut errors);
        self.validate_book(&patch, &mut errors).await?;
        errors.into_result()?;
        let (title, author_id, publication_year) = match (patch.title, patch.author, patch.publication_year) {
            (Some(title), Some(author_id), Some(year)) => (title, author_id, year),
            _ => return Err(LibraryError::runtime("validated book is missing fields", None)),
        };
        let id = self.book_repository.next_id().await?;
        let book = BookEntity::new(id, title.as_str(), author_id, publication_year, self.clock.now());
        self.book_repository.create(&book).await?;
        info!(book_id = book.book_id, author_id = book.author_id, "added book");
        Ok(BookDto::from(&book))
    }

    async fn update_book(&self, id: i64, payload: &Value, partial: bool) -> LibraryResult<BookDto> {
        let current = self.book_repository.get(id).await?;
        let mut errors = FieldErrors::new();
        let patch = BookPatch::parse(payload, partial, &mut errors);
        self.validate_book(&patch, &mut errors).await?;
        errors.into_result()?;
        let mut book = patch.apply(&current);
        book.updated_at = self.clock.now();
        self.book_repository.update(&book).await?;
        info!(book_id = book.book_id, partial, "updated book");
        book.version += 1;
        Ok(BookDto::from(&book))
    }

    async fn remove_book(&self, id: i64) -> LibraryResult<()> {
        self.book_repository.delete(id).await?;
        info!(book_id = id, "removed book");
        Ok(())
    }

    async fn list_authors(&self) -> LibraryResult<Vec<AuthorDto>> {
        let mut authors = query_all::<AuthorEntity, _>(
            self.author_repository.as_ref(), &HashMap::new(), SCAN_PAGE_SIZE).await?;
        authors.sort_by_key(|a| a.author_id);
        Ok(authors.iter().map(AuthorDto::from).collect())
    }

    async fn find_author_by_id(&self, id: i64) -> LibraryResult<AuthorDetailDto> {
        let author = self.author_repository.get(id).await?;
        let mut books = vec![];
        let mut next_page: Option<String> = None;
        loop {
            let res = self.book_repository.find_by_author_id(id, next_page.as_deref(), SCAN_PAGE_SIZE).await?;
            books.extend(res.records);
            next_page = res.next_page;
            if next_page.is_none() {
                break;
            }
        }
        books.sort_by_key(|b: &BookEntity| b.book_id);
        Ok(AuthorDetailDto::new(&author, books.iter().map(BookDto::from).collect()))
    }

    async fn add_author(&self, payload: &Value) -> LibraryResult<AuthorDto> {
        let mut errors = FieldErrors::new();
        let patch = AuthorPatch::parse(payload, &mut errors);
        patch.check(self.max_author_name_length, &mut errors);
        errors.into_result()?;
        let name = patch.name.ok_or_else(|| LibraryError::runtime("validated author is missing a name", None))?;
        let id = self.author_repository.next_id().await?;
        let author = AuthorEntity::new(id, name.as_str(), self.clock.now());
        self.author_repository.create(&author).await?;
        info!(author_id = author.author_id, "added author");
        Ok(AuthorDto::from(&author))
    }
}
