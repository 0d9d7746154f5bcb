use std::sync::Arc;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use crate::books::dto::BookDto;
use crate::catalog::domain::CatalogService;
use crate::core::command::{Command, CommandError};

pub(crate) struct UpdateBookCommand {
    catalog_service: Arc<dyn CatalogService>,
}

impl UpdateBookCommand {
    pub(crate) fn new(catalog_service: Arc<dyn CatalogService>) -> Self {
        Self {
            catalog_service,
        }
    }
}

#[derive(Debug)]
pub(crate) struct UpdateBookCommandRequest {
    pub book_id: i64,
    pub payload: Value,
    // PATCH semantics: fields left out of the payload keep their stored values
    pub partial: bool,
}

impl UpdateBookCommandRequest {
    pub fn new(book_id: i64, payload: Value, partial: bool) -> Self {
        Self {
            book_id,
            payload,
            partial,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct UpdateBookCommandResponse {
    #[serde(flatten)]
    pub book: BookDto,
}

impl UpdateBookCommandResponse {
    pub fn new(book: BookDto) -> Self {
        Self {
            book,
        }
    }
}

#[async_trait]
impl Command<UpdateBookCommandRequest, UpdateBookCommandResponse> for UpdateBookCommand {
    async fn execute(&self, req: UpdateBookCommandRequest) -> Result<UpdateBookCommandResponse, CommandError> {
        self.catalog_service.update_book(req.book_id, &req.payload, req.partial).await
            .map_err(CommandError::from).map(UpdateBookCommandResponse::new)
    }
}
