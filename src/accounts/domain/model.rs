use uuid::Uuid;
use crate::accounts::Principal;
use crate::accounts::domain::password::PasswordHash;
use crate::core::domain::UserSeed;

// UserEntity is an account with exactly one token key
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct UserEntity {
    pub user_id: i64,
    pub username: String,
    pub email: String,
    pub password: PasswordHash,
    pub token: String,
}

impl UserEntity {
    pub fn from_seed(user_id: i64, seed: &UserSeed) -> Self {
        Self {
            user_id,
            username: seed.username.to_string(),
            email: seed.email.to_string(),
            password: PasswordHash::new(seed.password.as_str()),
            token: seed.token.clone().unwrap_or_else(|| Uuid::new_v4().simple().to_string()),
        }
    }

    pub fn principal(&self) -> Principal {
        Principal {
            id: self.user_id,
            username: self.username.to_string(),
            email: self.email.to_string(),
        }
    }
}
