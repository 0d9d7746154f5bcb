use std::cmp;
use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue};
use chrono::Utc;

use crate::books::domain::model::BookEntity;
use crate::books::repository::BookRepository;
use crate::core::library::{LibraryError, LibraryResult, PaginatedResult};
use crate::core::repository::Repository;
use crate::utils::ddb::{add_filter_expr, from_ddb, next_sequence_value, parse_date_attribute, parse_item, parse_number_attribute, parse_string_attribute, string_date, to_ddb_page, typed_attribute};

const NUMERIC_FIELDS: [&str; 4] = ["book_id", "version", "author_id", "publication_year"];

#[derive(Debug)]
pub struct DDBBookRepository {
    client: Client,
    table_name: String,
    index_name: String,
    sequences_table: String,
}

impl DDBBookRepository {
    pub(crate) fn new(client: Client, table_name: &str, index_name: &str, sequences_table: &str) -> Self {
        Self {
            client,
            table_name: table_name.to_string(),
            index_name: index_name.to_string(),
            sequences_table: sequences_table.to_string(),
        }
    }
}

#[async_trait]
impl Repository<BookEntity> for DDBBookRepository {
    async fn next_id(&self) -> LibraryResult<i64> {
        next_sequence_value(&self.client, self.sequences_table.as_str(), self.table_name.as_str()).await
    }

    async fn create(&self, entity: &BookEntity) -> LibraryResult<usize> {
        let table_name: &str = self.table_name.as_ref();
        let val = serde_json::to_value(entity)?;
        self.client
            .put_item()
            .table_name(table_name)
            .condition_expression("attribute_not_exists(book_id)")
            .set_item(Some(parse_item(val)?))
            .send()
            .await.map(|_| 1).map_err(LibraryError::from)
    }

    async fn update(&self, entity: &BookEntity) -> LibraryResult<usize> {
        let table_name: &str = self.table_name.as_ref();

        self.client
            .update_item()
            .table_name(table_name)
            .key("book_id", AttributeValue::N(entity.book_id.to_string()))
            .update_expression("SET version = :version, title = :title, author_id = :author_id, publication_year = :publication_year, updated_at = :updated_at")
            .expression_attribute_values(":old_version", AttributeValue::N(entity.version.to_string()))
            .expression_attribute_values(":version", AttributeValue::N((entity.version + 1).to_string()))
            .expression_attribute_values(":title", AttributeValue::S(entity.title.to_string()))
            .expression_attribute_values(":author_id", AttributeValue::N(entity.author_id.to_string()))
            .expression_attribute_values(":publication_year", AttributeValue::N(entity.publication_year.to_string()))
            .expression_attribute_values(":updated_at", string_date(entity.updated_at))
            .condition_expression("attribute_exists(version) AND version = :old_version")
            .send()
            .await.map(|_| 1).map_err(LibraryError::from)
    }

    async fn get(&self, id: i64) -> LibraryResult<BookEntity> {
        let table_name: &str = self.table_name.as_ref();
        self.client
            .get_item()
            .table_name(table_name)
            .key("book_id", AttributeValue::N(id.to_string()))
            .consistent_read(true)
            .send()
            .await.map_err(LibraryError::from).and_then(|req| {
            if let Some(map) = req.item() {
                return Ok(map_to_book(map));
            }
            Err(LibraryError::not_found(format!("book not found for {}", id).as_str()))
        })
    }

    async fn delete(&self, id: i64) -> LibraryResult<usize> {
        let table_name: &str = self.table_name.as_ref();
        self.client.delete_item()
            .table_name(table_name)
            .key("book_id", AttributeValue::N(id.to_string()))
            .return_values(ReturnValue::AllOld)
            .send()
            .await.map_err(LibraryError::from).and_then(|req| {
            if req.attributes().is_some() {
                Ok(1)
            } else {
                Err(LibraryError::not_found(format!("book not found for {}", id).as_str()))
            }
        })
    }

    // Note you cannot use certain reserved words per https://docs.aws.amazon.com/amazondynamodb/latest/developerguide/ReservedWords.html
    async fn query(&self, predicate: &HashMap<String, String>,
                   page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<BookEntity>> {
        let table_name: &str = self.table_name.as_ref();
        let exclusive_start_key = to_ddb_page(page);
        let mut request = self.client
            .scan()
            .table_name(table_name)
            .consistent_read(false)
            .set_exclusive_start_key(exclusive_start_key)
            .limit(cmp::min(page_size, 500) as i32);
        let mut filter_expr = String::new();
        for (k, v) in predicate {
            let ks = add_filter_expr(k.as_str(), &mut filter_expr);
            request = request
                .expression_attribute_names(format!("#{}", ks).as_str(), ks.as_str())
                .expression_attribute_values(format!(":{}", ks).as_str(), typed_attribute(ks.as_str(), v, &NUMERIC_FIELDS));
        }
        if !filter_expr.is_empty() {
            request = request.filter_expression(filter_expr);
        }

        request
            .send()
            .await.map_err(LibraryError::from).map(|req| {
            let records = req.items.as_ref().unwrap_or(&vec![]).iter()
                .map(map_to_book).collect();
            from_ddb(page, page_size, req.last_evaluated_key(), records)
        })
    }
}

#[async_trait]
impl BookRepository for DDBBookRepository {
    async fn find_by_author_id(&self, author_id: i64, page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<BookEntity>> {
        let table_name: &str = self.table_name.as_ref();
        let index_name: &str = self.index_name.as_ref();
        self.client
            .query()
            .table_name(table_name)
            .index_name(index_name)
            .limit(cmp::min(page_size, 500) as i32)
            .consistent_read(false)
            .set_exclusive_start_key(to_ddb_page(page))
            .key_condition_expression("author_id = :author_id")
            .expression_attribute_values(":author_id", AttributeValue::N(author_id.to_string()))
            .send()
            .await.map_err(LibraryError::from).map(|req| {
            let records = req.items.as_ref().unwrap_or(&vec![]).iter()
                .map(map_to_book).collect();
            from_ddb(page, page_size, req.last_evaluated_key(), records)
        })
    }
}

fn map_to_book(map: &HashMap<String, AttributeValue>) -> BookEntity {
    BookEntity {
        book_id: parse_number_attribute("book_id", map),
        version: parse_number_attribute("version", map),
        title: parse_string_attribute("title", map).unwrap_or(String::from("")),
        author_id: parse_number_attribute("author_id", map),
        publication_year: i32::try_from(parse_number_attribute("publication_year", map)).unwrap_or_default(),
        created_at: parse_date_attribute("created_at", map).unwrap_or(Utc::now().naive_utc()),
        updated_at: parse_date_attribute("updated_at", map).unwrap_or(Utc::now().naive_utc()),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use async_once::AsyncOnce;
    use aws_sdk_dynamodb::Client;
    use aws_sdk_dynamodb::types::ScalarAttributeType;
    use chrono::Utc;
    use lazy_static::lazy_static;

    use crate::books::domain::model::BookEntity;
    use crate::books::repository::BookRepository;
    use crate::books::repository::ddb_book_repository::DDBBookRepository;
    use crate::core::repository::{query_all, Repository, RepositoryStore};
    use crate::utils::ddb::{build_db_client, create_table, delete_table};

    lazy_static! {
        static ref CLIENT: AsyncOnce<Client> = AsyncOnce::new(async {
                let client = build_db_client(RepositoryStore::LocalDynamoDB).await;
                let _ = delete_table(&client, "test_books").await;
                let _ = create_table(&client, "test_books", "book_id", ScalarAttributeType::N, Some("author_id")).await;
                let _ = create_table(&client, "test_book_sequences", "sequence_name", ScalarAttributeType::S, None).await;
                client
            });
    }

    async fn new_repo() -> DDBBookRepository {
        DDBBookRepository::new(CLIENT.get().await.clone(), "test_books", "test_books_ndx", "test_book_sequences")
    }

    async fn new_book(repo: &DDBBookRepository, title: &str, author_id: i64, year: i32) -> BookEntity {
        let id = repo.next_id().await.expect("should reserve id");
        let book = BookEntity::new(id, title, author_id, year, Utc::now().naive_utc());
        assert_eq!(1, repo.create(&book).await.expect("should create book"));
        book
    }

    #[tokio::test]
    #[ignore]
    async fn test_should_create_get_books() {
        let repo = new_repo().await;
        let book = new_book(&repo, "test book", 1, 2020).await;
        let loaded = repo.get(book.book_id).await.expect("should return book");
        assert_eq!(book.book_id, loaded.book_id);
        assert_eq!(book.title, loaded.title);
    }

    #[tokio::test]
    #[ignore]
    async fn test_should_create_update_books() {
        let repo = new_repo().await;
        let mut book = new_book(&repo, "test book", 1, 2020).await;
        book.title = "new title".to_string();
        assert_eq!(1, repo.update(&book).await.expect("should update book"));

        let loaded = repo.get(book.book_id).await.expect("should return book");
        assert_eq!("new title", loaded.title);
        assert_eq!(book.version + 1, loaded.version);
        assert!(repo.update(&book).await.is_err());
    }

    #[tokio::test]
    #[ignore]
    async fn test_should_create_query_books() {
        let repo = new_repo().await;
        let author_id = Utc::now().timestamp_millis();
        for i in 0..20 {
            new_book(&repo, format!("title_{}", i % 2).as_str(), author_id, 2000).await;
        }
        let mut total = 0;
        let mut next_page = None;
        loop {
            let res = repo.find_by_author_id(author_id, next_page.as_deref(), 5).await.expect("should return books");
            total += res.records.len();
            next_page = res.next_page;
            if next_page.is_none() {
                break;
            }
        }
        assert_eq!(20, total);

        let predicate = HashMap::from([
            ("author_id".to_string(), author_id.to_string()),
            ("title".to_string(), "title_0".to_string()),
        ]);
        let res = query_all::<BookEntity, _>(&repo, &predicate, 50).await.expect("should return books");
        assert_eq!(10, res.len());
    }

    #[tokio::test]
    #[ignore]
    async fn test_should_create_delete_books() {
        let repo = new_repo().await;
        let book = new_book(&repo, "test book", 1, 2020).await;
        assert_eq!(1, repo.delete(book.book_id).await.expect("should delete book"));
        assert!(repo.get(book.book_id).await.is_err());
        assert!(repo.delete(book.book_id).await.is_err());
    }
}
