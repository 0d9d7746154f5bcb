use std::sync::Arc;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use crate::books::dto::BookDto;
use crate::catalog::domain::CatalogService;
use crate::core::command::{Command, CommandError};

pub(crate) struct AddBookCommand {
    catalog_service: Arc<dyn CatalogService>,
}

impl AddBookCommand {
    pub(crate) fn new(catalog_service: Arc<dyn CatalogService>) -> Self {
        Self {
            catalog_service,
        }
    }
}

#[derive(Debug)]
pub(crate) struct AddBookCommandRequest {
    pub(crate) payload: Value,
}

impl AddBookCommandRequest {
    pub fn new(payload: Value) -> Self {
        Self {
            payload,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct AddBookCommandResponse {
    #[serde(flatten)]
    pub book: BookDto,
}

impl AddBookCommandResponse {
    pub fn new(book: BookDto) -> Self {
        Self {
            book,
        }
    }
}

#[async_trait]
impl Command<AddBookCommandRequest, AddBookCommandResponse> for AddBookCommand {
    async fn execute(&self, req: AddBookCommandRequest) -> Result<AddBookCommandResponse, CommandError> {
        self.catalog_service.add_book(&req.payload).await
            .map_err(CommandError::from).map(AddBookCommandResponse::new)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use async_once::AsyncOnce;
    use lazy_static::lazy_static;
    use serde_json::json;
    use crate::catalog::command::add_book_cmd::{AddBookCommand, AddBookCommandRequest};
    use crate::catalog::factory;
    use crate::core::clock::SystemClock;
    use crate::core::command::{Command, CommandError};
    use crate::core::domain::Configuration;

    lazy_static! {
        static ref SUT_CMD : AsyncOnce<AddBookCommand> = AsyncOnce::new(async {
                let svc = factory::create_catalog_service(&Configuration::new("test"), Arc::new(SystemClock)).await;
                svc.add_author(&json!({"name": "A1"})).await.expect("should add author");
                AddBookCommand::new(svc)
            });
    }

    #[tokio::test]
    async fn test_should_run_add_book() {
        let cmd = SUT_CMD.get().await;
        let res = cmd.execute(AddBookCommandRequest::new(json!({"title": "test book", "author": 1, "publication_year": 2001})))
            .await.expect("should add book");
        assert_eq!("test book", res.book.title);
        assert!(res.book.id > 0);
    }

    #[tokio::test]
    async fn test_should_reject_unknown_author() {
        let cmd = SUT_CMD.get().await;
        let res = cmd.execute(AddBookCommandRequest::new(json!({"title": "test book", "author": 404, "publication_year": 2001}))).await;
        assert!(matches!(res, Err(CommandError::Validation { .. })));
    }
}
