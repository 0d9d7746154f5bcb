use std::sync::Arc;
use async_trait::async_trait;
use serde::Serialize;
use crate::authors::dto::AuthorDto;
use crate::catalog::domain::CatalogService;
use crate::core::command::{Command, CommandError};

pub(crate) struct ListAuthorsCommand {
    catalog_service: Arc<dyn CatalogService>,
}

impl ListAuthorsCommand {
    pub(crate) fn new(catalog_service: Arc<dyn CatalogService>) -> Self {
        Self {
            catalog_service,
        }
    }
}

#[derive(Debug)]
pub(crate) struct ListAuthorsCommandRequest {}

impl ListAuthorsCommandRequest {
    pub fn new() -> Self {
        Self {}
    }
}

#[derive(Debug, Serialize)]
#[serde(transparent)]
pub(crate) struct ListAuthorsCommandResponse {
    pub authors: Vec<AuthorDto>,
}

impl ListAuthorsCommandResponse {
    pub fn new(authors: Vec<AuthorDto>) -> Self {
        Self {
            authors,
        }
    }
}

#[async_trait]
impl Command<ListAuthorsCommandRequest, ListAuthorsCommandResponse> for ListAuthorsCommand {
    async fn execute(&self, _req: ListAuthorsCommandRequest) -> Result<ListAuthorsCommandResponse, CommandError> {
        self.catalog_service.list_authors()
            .await.map_err(CommandError::from).map(ListAuthorsCommandResponse::new)
    }
}
