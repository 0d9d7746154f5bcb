use std::sync::Arc;
use async_trait::async_trait;
use serde::Serialize;
use crate::catalog::domain::CatalogService;
use crate::core::command::{Command, CommandError};

pub(crate) struct RemoveBookCommand {
    catalog_service: Arc<dyn CatalogService>,
}

impl RemoveBookCommand {
    pub(crate) fn new(catalog_service: Arc<dyn CatalogService>) -> Self {
        Self {
            catalog_service,
        }
    }
}

#[derive(Debug)]
pub(crate) struct RemoveBookCommandRequest {
    pub(crate) book_id: i64,
}

impl RemoveBookCommandRequest {
    pub fn new(book_id: i64) -> Self {
        Self {
            book_id,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct RemoveBookCommandResponse {}

impl RemoveBookCommandResponse {
    pub fn new() -> Self {
        Self {}
    }
}

#[async_trait]
impl Command<RemoveBookCommandRequest, RemoveBookCommandResponse> for RemoveBookCommand {
    async fn execute(&self, req: RemoveBookCommandRequest) -> Result<RemoveBookCommandResponse, CommandError> {
        self.catalog_service.remove_book(req.book_id).await
            .map_err(CommandError::from).map(|_| RemoveBookCommandResponse::new())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use serde_json::json;
    use crate::catalog::command::remove_book_cmd::{RemoveBookCommand, RemoveBookCommandRequest};
    use crate::catalog::factory;
    use crate::core::clock::SystemClock;
    use crate::core::command::{Command, CommandError};
    use crate::core::domain::Configuration;

    #[tokio::test]
    async fn test_should_run_remove_book() {
        let svc = factory::create_catalog_service(&Configuration::new("test"), Arc::new(SystemClock)).await;
        let author = svc.add_author(&json!({"name": "A1"})).await.expect("should add author");
        let book = svc.add_book(&json!({"title": "test book", "author": author.id, "publication_year": 2001}))
            .await.expect("should add book");
        let cmd = RemoveBookCommand::new(svc.clone());

        cmd.execute(RemoveBookCommandRequest::new(book.id)).await.expect("should remove book");
        assert!(svc.find_book_by_id(book.id).await.is_err());
        assert!(svc.find_author_by_id(author.id).await.is_ok());

        let res = cmd.execute(RemoveBookCommandRequest::new(book.id)).await;
        assert!(matches!(res, Err(CommandError::NotFound { .. })));
    }
}
