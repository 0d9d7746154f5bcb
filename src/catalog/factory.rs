use std::sync::Arc;
use crate::authors::factory::create_author_repository;
use crate::books::factory::create_book_repository;
use crate::catalog::domain::CatalogService;
use crate::catalog::domain::service::CatalogServiceImpl;
use crate::core::clock::Clock;
use crate::core::domain::Configuration;

pub(crate) async fn create_catalog_service(config: &Configuration, clock: Arc<dyn Clock>) -> Arc<dyn CatalogService> {
    let book_repo = create_book_repository(config).await;
    let author_repo = create_author_repository(config).await;
    Arc::new(CatalogServiceImpl::new(config, book_repo, author_repo, clock))
}
