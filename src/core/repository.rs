use async_trait::async_trait;
use core::option::Option;
use std::collections::HashMap;
use std::fmt;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use crate::core::library::{LibraryResult, PaginatedResult};

#[async_trait]
pub trait Repository<Entity>: Sync + Send {
    // reserve the next server-assigned identifier
    async fn next_id(&self) -> LibraryResult<i64>;

    // create an entity
    async fn create(&self, entity: &Entity) -> LibraryResult<usize>;

    // updates an entity
    async fn update(&self, entity: &Entity) -> LibraryResult<usize>;

    // get an entity
    async fn get(&self, id: i64) -> LibraryResult<Entity>;

    // delete an entity
    async fn delete(&self, id: i64) -> LibraryResult<usize>;

    // find by equality predicate, empty predicate matches everything
    async fn query(&self, predicate: &HashMap::<String, String>,
                   page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<Entity>>;
}

// drains every page of a query into memory
pub(crate) async fn query_all<Entity, R>(repo: &R, predicate: &HashMap<String, String>,
                                         page_size: usize) -> LibraryResult<Vec<Entity>>
    where R: Repository<Entity> + ?Sized {
    let mut records = vec![];
    let mut next_page: Option<String> = None;
    loop {
        let res = repo.query(predicate, next_page.as_deref(), page_size).await?;
        records.extend(res.records);
        next_page = res.next_page;
        if next_page.is_none() {
            break;
        }
    }
    Ok(records)
}

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone, Copy)]
pub enum RepositoryStore {
    DynamoDB,
    LocalDynamoDB,
    InMemory,
}

impl Display for RepositoryStore {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            RepositoryStore::DynamoDB => write!(f, "dynamodb"),
            RepositoryStore::LocalDynamoDB => write!(f, "local-dynamodb"),
            RepositoryStore::InMemory => write!(f, "memory"),
        }
    }
}

impl FromStr for RepositoryStore {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dynamodb" => Ok(RepositoryStore::DynamoDB),
            "local-dynamodb" => Ok(RepositoryStore::LocalDynamoDB),
            "memory" => Ok(RepositoryStore::InMemory),
            other => Err(format!("unknown repository store {}", other)),
        }
    }
}
