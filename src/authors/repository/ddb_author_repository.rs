use std::cmp;
use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue};
use chrono::Utc;

use crate::authors::domain::model::AuthorEntity;
use crate::authors::repository::AuthorRepository;
use crate::core::library::{LibraryError, LibraryResult, PaginatedResult};
use crate::core::repository::Repository;
use crate::utils::ddb::{add_filter_expr, from_ddb, next_sequence_value, parse_date_attribute, parse_item, parse_number_attribute, parse_string_attribute, string_date, to_ddb_page, typed_attribute};

const NUMERIC_FIELDS: [&str; 2] = ["author_id", "version"];

#[derive(Debug)]
pub struct DDBAuthorRepository {
    client: Client,
    table_name: String,
    sequences_table: String,
}

impl DDBAuthorRepository {
    pub(crate) fn new(client: Client, table_name: &str, sequences_table: &str) -> Self {
        Self {
            client,
            table_name: table_name.to_string(),
            sequences_table: sequences_table.to_string(),
        }
    }
}

#[async_trait]
impl Repository<AuthorEntity> for DDBAuthorRepository {
    async fn next_id(&self) -> LibraryResult<i64> {
        next_sequence_value(&self.client, self.sequences_table.as_str(), self.table_name.as_str()).await
    }

    async fn create(&self, entity: &AuthorEntity) -> LibraryResult<usize> {
        let table_name: &str = self.table_name.as_ref();
        let val = serde_json::to_value(entity)?;
        self.client
            .put_item()
            .table_name(table_name)
            .condition_expression("attribute_not_exists(author_id)")
            .set_item(Some(parse_item(val)?))
            .send()
            .await.map(|_| 1).map_err(LibraryError::from)
    }

    async fn update(&self, entity: &AuthorEntity) -> LibraryResult<usize> {
        let table_name: &str = self.table_name.as_ref();
        self.client
            .update_item()
            .table_name(table_name)
            .key("author_id", AttributeValue::N(entity.author_id.to_string()))
            .update_expression("SET version = :version, #name = :name, updated_at = :updated_at")
            .expression_attribute_names("#name", "name")
            .expression_attribute_values(":old_version", AttributeValue::N(entity.version.to_string()))
            .expression_attribute_values(":version", AttributeValue::N((entity.version + 1).to_string()))
            .expression_attribute_values(":name", AttributeValue::S(entity.name.to_string()))
            .expression_attribute_values(":updated_at", string_date(entity.updated_at))
            .condition_expression("attribute_exists(version) AND version = :old_version")
            .send()
            .await.map(|_| 1).map_err(LibraryError::from)
    }

    async fn get(&self, id: i64) -> LibraryResult<AuthorEntity> {
        let table_name: &str = self.table_name.as_ref();
        self.client
            .get_item()
            .table_name(table_name)
            .key("author_id", AttributeValue::N(id.to_string()))
            .consistent_read(true)
            .send()
            .await.map_err(LibraryError::from).and_then(|req| {
            if let Some(map) = req.item() {
                return Ok(map_to_author(map));
            }
            Err(LibraryError::not_found(format!("author not found for {}", id).as_str()))
        })
    }

    async fn delete(&self, id: i64) -> LibraryResult<usize> {
        let table_name: &str = self.table_name.as_ref();
        self.client.delete_item()
            .table_name(table_name)
            .key("author_id", AttributeValue::N(id.to_string()))
            .return_values(ReturnValue::AllOld)
            .send()
            .await.map_err(LibraryError::from).and_then(|req| {
            if req.attributes().is_some() {
                Ok(1)
            } else {
                Err(LibraryError::not_found(format!("author not found for {}", id).as_str()))
            }
        })
    }

    async fn query(&self, predicate: &HashMap<String, String>,
                   page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<AuthorEntity>> {
        let table_name: &str = self.table_name.as_ref();
        let mut request = self.client
            .scan()
            .table_name(table_name)
            .consistent_read(false)
            .set_exclusive_start_key(to_ddb_page(page))
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
                .map(map_to_author).collect();
            from_ddb(page, page_size, req.last_evaluated_key(), records)
        })
    }
}

impl AuthorRepository for DDBAuthorRepository {}

fn map_to_author(map: &HashMap<String, AttributeValue>) -> AuthorEntity {
    AuthorEntity {
        author_id: parse_number_attribute("author_id", map),
        version: parse_number_attribute("version", map),
        name: parse_string_attribute("name", map).unwrap_or(String::from("")),
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

    use crate::authors::domain::model::AuthorEntity;
    use crate::authors::repository::AuthorRepository;
    use crate::authors::repository::ddb_author_repository::DDBAuthorRepository;
    use crate::core::repository::{Repository, RepositoryStore};
    use crate::utils::ddb::{build_db_client, create_table, delete_table};

    lazy_static! {
        static ref CLIENT: AsyncOnce<Client> = AsyncOnce::new(async {
                let client = build_db_client(RepositoryStore::LocalDynamoDB).await;
                let _ = delete_table(&client, "test_authors").await;
                let _ = create_table(&client, "test_authors", "author_id", ScalarAttributeType::N, None).await;
                let _ = create_table(&client, "test_author_sequences", "sequence_name", ScalarAttributeType::S, None).await;
                client
            });
    }

    async fn new_author(repo: &DDBAuthorRepository, name: &str) -> AuthorEntity {
        let id = repo.next_id().await.expect("should reserve id");
        let author = AuthorEntity::new(id, name, Utc::now().naive_utc());
        assert_eq!(1, repo.create(&author).await.expect("should create author"));
        author
    }

    #[tokio::test]
    #[ignore]
    async fn test_should_create_get_authors() {
        let repo = DDBAuthorRepository::new(CLIENT.get().await.clone(), "test_authors", "test_author_sequences");
        let author = new_author(&repo, "A1").await;
        let loaded = repo.get(author.author_id).await.expect("should return author");
        assert_eq!(author.name, loaded.name);
        assert!(repo.exists(author.author_id).await.expect("should check author"));
    }

    #[tokio::test]
    #[ignore]
    async fn test_should_create_update_authors() {
        let repo = DDBAuthorRepository::new(CLIENT.get().await.clone(), "test_authors", "test_author_sequences");
        let mut author = new_author(&repo, "A1").await;
        author.name = "A1 revised".to_string();
        assert_eq!(1, repo.update(&author).await.expect("should update author"));
        assert_eq!("A1 revised", repo.get(author.author_id).await.expect("should return author").name);
    }

    #[tokio::test]
    #[ignore]
    async fn test_should_query_authors_by_name() {
        let repo = DDBAuthorRepository::new(CLIENT.get().await.clone(), "test_authors", "test_author_sequences");
        let name = format!("author_{}", Utc::now().timestamp_millis());
        new_author(&repo, name.as_str()).await;
        let predicate = HashMap::from([("name".to_string(), name)]);
        let mut found = 0;
        let mut next_page = None;
        loop {
            let res = repo.query(&predicate, next_page.as_deref(), 50).await.expect("should return authors");
            found += res.records.len();
            next_page = res.next_page;
            if next_page.is_none() {
                break;
            }
        }
        assert_eq!(1, found);
    }
}
