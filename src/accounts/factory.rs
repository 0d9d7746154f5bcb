use std::sync::Arc;
use crate::accounts::domain::AccountService;
use crate::accounts::domain::service::AccountServiceImpl;
use crate::core::domain::Configuration;
use crate::core::library::LibraryResult;

pub(crate) fn create_account_service(config: &Configuration) -> LibraryResult<Arc<dyn AccountService>> {
    Ok(Arc::new(AccountServiceImpl::new(&config.users)?))
}
