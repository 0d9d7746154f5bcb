use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use crate::core::domain::Identifiable;
use crate::utils::date::serializer;

// AuthorEntity is referenced by zero or more books and outlives all of them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct AuthorEntity {
    pub author_id: i64,
    pub version: i64,
    pub name: String,
    #[serde(with = "serializer")]
    pub created_at: NaiveDateTime,
    #[serde(with = "serializer")]
    pub updated_at: NaiveDateTime,
}

impl AuthorEntity {
    pub fn new(author_id: i64, name: &str, now: NaiveDateTime) -> Self {
        Self {
            author_id,
            version: 0,
            name: name.to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl Identifiable for AuthorEntity {
    fn id(&self) -> i64 {
        self.author_id
    }

    fn version(&self) -> i64 {
        self.version
    }
}
