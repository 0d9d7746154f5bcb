use std::fmt;
use std::fmt::{Debug, Formatter};
use rand::Rng;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

// PasswordHash keeps a random salt and the hex SHA-256 digest of salt followed by password
#[derive(Clone, PartialEq)]
pub(crate) struct PasswordHash {
    salt: String,
    digest: String,
}

impl PasswordHash {
    pub fn new(password: &str) -> Self {
        let salt: [u8; 16] = rand::thread_rng().gen();
        Self::with_salt(hex::encode(salt).as_str(), password)
    }

    fn with_salt(salt: &str, password: &str) -> Self {
        Self {
            salt: salt.to_string(),
            digest: digest(salt, password),
        }
    }

    pub fn verify(&self, password: &str) -> bool {
        let candidate = digest(self.salt.as_str(), password);
        candidate.as_bytes().ct_eq(self.digest.as_bytes()).into()
    }
}

impl Debug for PasswordHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "PasswordHash(salt={}, digest=..)", self.salt)
    }
}

fn digest(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}
