use std::collections::HashMap;
use async_trait::async_trait;
use crate::books::domain::model::BookEntity;
use crate::books::repository::BookRepository;
use crate::core::library::{LibraryResult, PaginatedResult};
use crate::core::repository::Repository;
use crate::utils::memory::MemoryTable;

#[derive(Debug)]
pub struct MemoryBookRepository {
    table: MemoryTable<BookEntity>,
}

impl MemoryBookRepository {
    pub(crate) fn new(table_name: &str) -> Self {
        Self {
            table: MemoryTable::new(table_name),
        }
    }
}

#[async_trait]
impl Repository<BookEntity> for MemoryBookRepository {
    async fn next_id(&self) -> LibraryResult<i64> {
        Ok(self.table.next_id())
    }

    async fn create(&self, entity: &BookEntity) -> LibraryResult<usize> {
        self.table.insert(entity).await
    }

    async fn update(&self, entity: &BookEntity) -> LibraryResult<usize> {
        let next = BookEntity { version: entity.version + 1, ..entity.clone() };
        self.table.replace(entity.version, next).await
    }

    async fn get(&self, id: i64) -> LibraryResult<BookEntity> {
        self.table.get(id).await
    }

    async fn delete(&self, id: i64) -> LibraryResult<usize> {
        self.table.remove(id).await
    }

    async fn query(&self, predicate: &HashMap<String, String>,
                   page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<BookEntity>> {
        self.table.scan(predicate, page, page_size).await
    }
}

#[async_trait]
impl BookRepository for MemoryBookRepository {
    async fn find_by_author_id(&self, author_id: i64, page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<BookEntity>> {
        let predicate = HashMap::from([
            ("author_id".to_string(), author_id.to_string()),
        ]);
        self.query(&predicate, page, page_size).await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use chrono::Utc;
    use crate::books::domain::model::BookEntity;
    use crate::books::repository::BookRepository;
    use crate::books::repository::memory_book_repository::MemoryBookRepository;
    use crate::core::library::LibraryError;
    use crate::core::repository::{query_all, Repository};

    async fn new_book(repo: &MemoryBookRepository, title: &str, author_id: i64, year: i32) -> BookEntity {
        let id = repo.next_id().await.expect("should reserve id");
        let book = BookEntity::new(id, title, author_id, year, Utc::now().naive_utc());
        assert_eq!(1, repo.create(&book).await.expect("should create book"));
        book
    }

    #[tokio::test]
    async fn test_should_create_get_books() {
        let repo = MemoryBookRepository::new("books");
        let book = new_book(&repo, "test book", 1, 2020).await;
        let loaded = repo.get(book.book_id).await.expect("should return book");
        assert_eq!(book, loaded);
    }

    #[tokio::test]
    async fn test_should_assign_increasing_ids() {
        let repo = MemoryBookRepository::new("books");
        let first = new_book(&repo, "first", 1, 2020).await;
        let second = new_book(&repo, "second", 1, 2020).await;
        assert!(second.book_id > first.book_id);
    }

    #[tokio::test]
    async fn test_should_create_update_books() {
        let repo = MemoryBookRepository::new("books");
        let mut book = new_book(&repo, "test book", 1, 2020).await;
        book.title = "new title".to_string();
        assert_eq!(1, repo.update(&book).await.expect("should update book"));

        let loaded = repo.get(book.book_id).await.expect("should return book");
        assert_eq!("new title", loaded.title);
        assert_eq!(1, loaded.version);

        // a second write from the stale copy loses
        assert!(matches!(repo.update(&book).await, Err(LibraryError::CurrentlyUnavailable { .. })));
    }

    #[tokio::test]
    async fn test_should_create_query_books() {
        let repo = MemoryBookRepository::new("books");
        for i in 0..30 {
            new_book(&repo, format!("title_{}", i % 3).as_str(), i % 2, 2000 + (i % 5) as i32).await;
        }
        let by_author = repo.find_by_author_id(1, None, 100).await.expect("should return books");
        assert_eq!(15, by_author.records.len());

        let predicate = HashMap::from([
            ("title".to_string(), "title_0".to_string()),
            ("publication_year".to_string(), "2000".to_string()),
        ]);
        let res = query_all::<BookEntity, _>(&repo, &predicate, 4).await.expect("should return books");
        assert!(!res.is_empty());
        assert!(res.iter().all(|b| b.title == "title_0" && b.publication_year == 2000));
    }

    #[tokio::test]
    async fn test_should_create_delete_books() {
        let repo = MemoryBookRepository::new("books");
        let book = new_book(&repo, "test book", 1, 2020).await;
        assert_eq!(1, repo.delete(book.book_id).await.expect("should delete book"));
        assert!(repo.get(book.book_id).await.is_err());
    }
}
