use std::collections::HashMap;
use std::sync::Arc;
use async_trait::async_trait;
use serde::Serialize;
use crate::books::dto::BookDto;
use crate::catalog::domain::CatalogService;
use crate::catalog::domain::query::{BookQuery, Page};
use crate::core::command::{Command, CommandError};

pub(crate) struct ListBooksCommand {
    catalog_service: Arc<dyn CatalogService>,
}

impl ListBooksCommand {
    pub(crate) fn new(catalog_service: Arc<dyn CatalogService>) -> Self {
        Self {
            catalog_service,
        }
    }
}

#[derive(Debug)]
pub(crate) struct ListBooksCommandRequest {
    pub(crate) query: BookQuery,
}

impl ListBooksCommandRequest {
    pub fn new(params: &HashMap<String, String>) -> Self {
        Self {
            query: BookQuery::from_params(params),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ListBooksCommandResponse {
    #[serde(flatten)]
    pub page: Page<BookDto>,
}

impl ListBooksCommandResponse {
    pub fn new(page: Page<BookDto>) -> Self {
        Self {
            page,
        }
    }
}

#[async_trait]
impl Command<ListBooksCommandRequest, ListBooksCommandResponse> for ListBooksCommand {
    async fn execute(&self, req: ListBooksCommandRequest) -> Result<ListBooksCommandResponse, CommandError> {
        self.catalog_service.list_books(&req.query)
            .await.map_err(CommandError::from).map(ListBooksCommandResponse::new)
    }
}
