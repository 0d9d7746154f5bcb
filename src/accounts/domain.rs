pub mod model;
pub mod password;
pub mod service;

use async_trait::async_trait;
use crate::accounts::Principal;
use crate::core::library::LibraryResult;

#[async_trait]
pub(crate) trait AccountService: Sync + Send {
    // resolves a bearer token key, failing with Unauthorized for unknown keys
    async fn authenticate(&self, token: &str) -> LibraryResult<Principal>;
    // exchanges credentials for the user's token key
    async fn obtain_token(&self, username: &str, password: &str) -> LibraryResult<String>;
}
