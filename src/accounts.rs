use serde::{Deserialize, Serialize};

pub mod command;
pub mod controller;
pub mod domain;
pub mod extractor;
pub mod factory;
pub mod gate;

// Principal is the identity a valid token resolves to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct Principal {
    pub id: i64,
    pub username: String,
    pub email: String,
}

// Caller is whoever sent the request; unknown or malformed tokens leave it Anonymous
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Caller {
    Anonymous,
    Authenticated(Principal),
}

impl Caller {
    pub fn principal(&self) -> Option<&Principal> {
        match self {
            Caller::Anonymous => None,
            Caller::Authenticated(principal) => Some(principal),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.principal().is_some()
    }
}
