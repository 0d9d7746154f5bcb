use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use crate::books::domain::Book;
use crate::core::domain::Identifiable;
use crate::utils::date::serializer;

// BookEntity is a catalogued book written by exactly one author. The version
// is bumped on every update and guards against lost writes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct BookEntity {
    pub book_id: i64,
    pub version: i64,
    pub title: String,
    pub author_id: i64,
    pub publication_year: i32,
    #[serde(with = "serializer")]
    pub created_at: NaiveDateTime,
    #[serde(with = "serializer")]
    pub updated_at: NaiveDateTime,
}

impl BookEntity {
    pub fn new(book_id: i64, title: &str, author_id: i64, publication_year: i32, now: NaiveDateTime) -> Self {
        Self {
            book_id,
            version: 0,
            title: title.to_string(),
            author_id,
            publication_year,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Identifiable for BookEntity {
    fn id(&self) -> i64 {
        self.book_id
    }

    fn version(&self) -> i64 {
        self.version
    }
}

impl Book for BookEntity {
    fn title(&self) -> &str {
        self.title.as_str()
    }

    fn author_id(&self) -> i64 {
        self.author_id
    }

    fn publication_year(&self) -> i32 {
        self.publication_year
    }
}
