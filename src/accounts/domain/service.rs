use std::collections::HashMap;
use async_trait::async_trait;
use tracing::{info, warn};
use crate::accounts::Principal;
use crate::accounts::domain::AccountService;
use crate::accounts::domain::model::UserEntity;
use crate::core::domain::UserSeed;
use crate::core::library::{LibraryError, LibraryResult, NON_FIELD_ERRORS};

pub(crate) const INVALID_CREDENTIALS: &str = "Unable to log in with provided credentials.";

// AccountServiceImpl is a fixed registry built from the configured seeds
pub(crate) struct AccountServiceImpl {
    users: HashMap<String, UserEntity>,
    tokens: HashMap<String, String>,
}

impl AccountServiceImpl {
    pub(crate) fn new(seeds: &[UserSeed]) -> LibraryResult<Self> {
        let mut users = HashMap::new();
        let mut tokens = HashMap::new();
        for (i, seed) in seeds.iter().enumerate() {
            if seed.username.trim().is_empty() || seed.password.is_empty() {
                return Err(LibraryError::validation("users", "user seeds need a username and a password"));
            }
            if users.contains_key(&seed.username) {
                return Err(LibraryError::duplicate_key(format!("user {} is seeded twice", seed.username).as_str()));
            }
            let user = UserEntity::from_seed(i as i64 + 1, seed);
            if tokens.insert(user.token.to_string(), user.username.to_string()).is_some() {
                return Err(LibraryError::duplicate_key(format!("token of user {} is not unique", seed.username).as_str()));
            }
            info!(user_id = user.user_id, username = user.username.as_str(), "seeded user");
            users.insert(user.username.to_string(), user);
        }
        Ok(Self { users, tokens })
    }
}

#[async_trait]
impl AccountService for AccountServiceImpl {
    async fn authenticate(&self, token: &str) -> LibraryResult<Principal> {
        self.tokens.get(token)
            .and_then(|username| self.users.get(username))
            .map(UserEntity::principal)
            .ok_or_else(|| LibraryError::unauthorized("Invalid token."))
    }

    async fn obtain_token(&self, username: &str, password: &str) -> LibraryResult<String> {
        match self.users.get(username) {
            Some(user) if user.password.verify(password) => Ok(user.token.to_string()),
            _ => {
                warn!(username, "rejected credentials");
                Err(LibraryError::validation(NON_FIELD_ERRORS, INVALID_CREDENTIALS))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::accounts::domain::AccountService;
    use crate::accounts::domain::service::AccountServiceImpl;
    use crate::core::domain::UserSeed;
    use crate::core::library::LibraryError;

    fn seeds() -> Vec<UserSeed> {
        let mut admin = UserSeed::new("admin", "admin@example.com", "adminpass");
        admin.token = Some("admin-token".to_string());
        vec![UserSeed::new("testuser", "test@example.com", "testpassword123"), admin]
    }

    #[tokio::test]
    async fn test_should_exchange_credentials_for_token() {
        let svc = AccountServiceImpl::new(&seeds()).expect("should seed users");
        let token = svc.obtain_token("testuser", "testpassword123").await.expect("should obtain token");
        let principal = svc.authenticate(token.as_str()).await.expect("should authenticate");
        assert_eq!("testuser", principal.username);
        assert_eq!(1, principal.id);
        assert_eq!("admin", svc.authenticate("admin-token").await.expect("should authenticate").username);
    }

    #[tokio::test]
    async fn test_should_reject_bad_credentials() {
        let svc = AccountServiceImpl::new(&seeds()).expect("should seed users");
        assert!(matches!(svc.obtain_token("testuser", "wrong").await, Err(LibraryError::Validation { .. })));
        assert!(matches!(svc.obtain_token("nobody", "testpassword123").await, Err(LibraryError::Validation { .. })));
        assert!(matches!(svc.authenticate("bogus").await, Err(LibraryError::Unauthorized { .. })));
    }

    #[tokio::test]
    async fn test_should_reject_duplicate_seeds() {
        let mut dup = seeds();
        dup.push(UserSeed::new("testuser", "", "other"));
        assert!(matches!(AccountServiceImpl::new(&dup), Err(LibraryError::DuplicateKey { .. })));

        let mut same_token = seeds();
        let mut other = UserSeed::new("other", "", "pw");
        other.token = Some("admin-token".to_string());
        same_token.push(other);
        assert!(matches!(AccountServiceImpl::new(&same_token), Err(LibraryError::DuplicateKey { .. })));

        assert!(AccountServiceImpl::new(&[UserSeed::new(" ", "", "pw")]).is_err());
    }
}
