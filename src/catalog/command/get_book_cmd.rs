use std::sync::Arc;
use async_trait::async_trait;
use serde::Serialize;
use crate::books::dto::BookDto;
use crate::catalog::domain::CatalogService;
use crate::core::command::{Command, CommandError};

pub(crate) struct GetBookCommand {
    catalog_service: Arc<dyn CatalogService>,
}

impl GetBookCommand {
    pub(crate) fn new(catalog_service: Arc<dyn CatalogService>) -> Self {
        Self {
            catalog_service,
        }
    }
}

#[derive(Debug)]
pub(crate) struct GetBookCommandRequest {
    pub(crate) book_id: i64,
}

impl GetBookCommandRequest {
    pub fn new(book_id: i64) -> Self {
        Self {
            book_id,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct GetBookCommandResponse {
    #[serde(flatten)]
    pub book: BookDto,
}

impl GetBookCommandResponse {
    pub fn new(book: BookDto) -> Self {
        Self {
            book,
        }
    }
}

#[async_trait]
impl Command<GetBookCommandRequest, GetBookCommandResponse> for GetBookCommand {
    async fn execute(&self, req: GetBookCommandRequest) -> Result<GetBookCommandResponse, CommandError> {
        self.catalog_service.find_book_by_id(req.book_id)
            .await.map_err(CommandError::from).map(GetBookCommandResponse::new)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use serde_json::json;
    use crate::catalog::command::add_book_cmd::{AddBookCommand, AddBookCommandRequest};
    use crate::catalog::command::get_book_cmd::{GetBookCommand, GetBookCommandRequest};
    use crate::catalog::factory;
    use crate::core::clock::SystemClock;
    use crate::core::command::{Command, CommandError};
    use crate::core::domain::Configuration;

    #[tokio::test]
    async fn test_should_run_get_book() {
        let svc = factory::create_catalog_service(&Configuration::new("test"), Arc::new(SystemClock)).await;
        let author = svc.add_author(&json!({"name": "A1"})).await.expect("should add author");
        let add_cmd = AddBookCommand::new(svc.clone());
        let get_cmd = GetBookCommand::new(svc);

        let res = add_cmd.execute(AddBookCommandRequest::new(json!({"title": "test book", "author": author.id, "publication_year": 2001})))
            .await.expect("should add book");
        let loaded = get_cmd.execute(GetBookCommandRequest::new(res.book.id)).await.expect("should get book");
        assert_eq!(res.book, loaded.book);

        let missing = get_cmd.execute(GetBookCommandRequest::new(res.book.id + 1)).await;
        assert!(matches!(missing, Err(CommandError::NotFound { .. })));
    }
}
