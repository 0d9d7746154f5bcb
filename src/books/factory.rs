use aws_sdk_dynamodb::types::ScalarAttributeType;
use crate::books::repository::BookRepository;
use crate::books::repository::ddb_book_repository::DDBBookRepository;
use crate::books::repository::memory_book_repository::MemoryBookRepository;
use crate::core::domain::Configuration;
use crate::core::repository::RepositoryStore;
use crate::utils::ddb::{build_db_client, create_table};

pub(crate) async fn create_book_repository(config: &Configuration) -> Box<dyn BookRepository> {
    let index_name = format!("{}_ndx", config.books_table);
    match config.store {
        RepositoryStore::DynamoDB => {
            let client = build_db_client(config.store).await;
            Box::new(DDBBookRepository::new(client, config.books_table.as_str(),
                                            index_name.as_str(), config.sequences_table.as_str()))
        }
        RepositoryStore::LocalDynamoDB => {
            let client = build_db_client(config.store).await;
            let _ = create_table(&client, config.books_table.as_str(), "book_id",
                                 ScalarAttributeType::N, Some("author_id")).await;
            let _ = create_table(&client, config.sequences_table.as_str(), "sequence_name",
                                 ScalarAttributeType::S, None).await;
            Box::new(DDBBookRepository::new(client, config.books_table.as_str(),
                                            index_name.as_str(), config.sequences_table.as_str()))
        }
        RepositoryStore::InMemory => {
            Box::new(MemoryBookRepository::new(config.books_table.as_str()))
        }
    }
}
