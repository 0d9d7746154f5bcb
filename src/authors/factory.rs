use aws_sdk_dynamodb::types::ScalarAttributeType;
use crate::authors::repository::AuthorRepository;
use crate::authors::repository::ddb_author_repository::DDBAuthorRepository;
use crate::authors::repository::memory_author_repository::MemoryAuthorRepository;
use crate::core::domain::Configuration;
use crate::core::repository::RepositoryStore;
use crate::utils::ddb::{build_db_client, create_table};

pub(crate) async fn create_author_repository(config: &Configuration) -> Box<dyn AuthorRepository> {
    match config.store {
        RepositoryStore::DynamoDB => {
            let client = build_db_client(config.store).await;
            Box::new(DDBAuthorRepository::new(client, config.authors_table.as_str(), config.sequences_table.as_str()))
        }
        RepositoryStore::LocalDynamoDB => {
            let client = build_db_client(config.store).await;
            let _ = create_table(&client, config.authors_table.as_str(), "author_id",
                                 ScalarAttributeType::N, None).await;
            let _ = create_table(&client, config.sequences_table.as_str(), "sequence_name",
                                 ScalarAttributeType::S, None).await;
            Box::new(DDBAuthorRepository::new(client, config.authors_table.as_str(), config.sequences_table.as_str()))
        }
        RepositoryStore::InMemory => {
            Box::new(MemoryAuthorRepository::new(config.authors_table.as_str()))
        }
    }
}
