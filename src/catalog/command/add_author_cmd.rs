use std::sync::Arc;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use crate::authors::dto::AuthorDto;
use crate::catalog::domain::CatalogService;
use crate::core::command::{Command, CommandError};

pub(crate) struct AddAuthorCommand {
    catalog_service: Arc<dyn CatalogService>,
}

impl AddAuthorCommand {
    pub(crate) fn new(catalog_service: Arc<dyn CatalogService>) -> Self {
        Self {
            catalog_service,
        }
    }
}

#[derive(Debug)]
pub(crate) struct AddAuthorCommandRequest {
    pub(crate) payload: Value,
}

impl AddAuthorCommandRequest {
    pub fn new(payload: Value) -> Self {
        Self {
            payload,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct AddAuthorCommandResponse {
    #[serde(flatten)]
    pub author: AuthorDto,
}

impl AddAuthorCommandResponse {
    pub fn new(author: AuthorDto) -> Self {
        Self {
            author,
        }
    }
}

#[async_trait]
impl Command<AddAuthorCommandRequest, AddAuthorCommandResponse> for AddAuthorCommand {
    async fn execute(&self, req: AddAuthorCommandRequest) -> Result<AddAuthorCommandResponse, CommandError> {
        self.catalog_service.add_author(&req.payload).await
            .map_err(CommandError::from).map(AddAuthorCommandResponse::new)
    }
}
