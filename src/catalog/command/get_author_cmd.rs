use std::sync::Arc;
use async_trait::async_trait;
use serde::Serialize;
use crate::authors::dto::AuthorDetailDto;
use crate::catalog::domain::CatalogService;
use crate::core::command::{Command, CommandError};

pub(crate) struct GetAuthorCommand {
    catalog_service: Arc<dyn CatalogService>,
}

impl GetAuthorCommand {
    pub(crate) fn new(catalog_service: Arc<dyn CatalogService>) -> Self {
        Self {
            catalog_service,
        }
    }
}

#[derive(Debug)]
pub(crate) struct GetAuthorCommandRequest {
    pub(crate) author_id: i64,
}

impl GetAuthorCommandRequest {
    pub fn new(author_id: i64) -> Self {
        Self {
            author_id,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct GetAuthorCommandResponse {
    #[serde(flatten)]
    pub author: AuthorDetailDto,
}

impl GetAuthorCommandResponse {
    pub fn new(author: AuthorDetailDto) -> Self {
        Self {
            author,
        }
    }
}

#[async_trait]
impl Command<GetAuthorCommandRequest, GetAuthorCommandResponse> for GetAuthorCommand {
    async fn execute(&self, req: GetAuthorCommandRequest) -> Result<GetAuthorCommandResponse, CommandError> {
        self.catalog_service.find_author_by_id(req.author_id)
            .await.map_err(CommandError::from).map(GetAuthorCommandResponse::new)
    }
}
