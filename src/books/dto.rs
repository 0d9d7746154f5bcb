use serde::{Deserialize, Serialize};
use crate::books::domain::Book;
use crate::books::domain::model::BookEntity;
use crate::core::domain::Identifiable;

// BookDto is the wire representation of a book; `author` carries the author id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct BookDto {
    pub id: i64,
    pub title: String,
    pub author: i64,
    pub publication_year: i32,
}

impl BookDto {
    pub fn new(id: i64, title: &str, author: i64, publication_year: i32) -> BookDto {
        BookDto {
            id,
            title: title.to_string(),
            author,
            publication_year,
        }
    }
}

impl From<&BookEntity> for BookDto {
    fn from(other: &BookEntity) -> Self {
        BookDto::new(other.book_id, other.title.as_str(), other.author_id, other.publication_year)
    }
}

impl Identifiable for BookDto {
    fn id(&self) -> i64 {
        self.id
    }

    fn version(&self) -> i64 {
        0
    }
}

impl Book for BookDto {
    fn title(&self) -> &str {
        self.title.as_str()
    }

    fn author_id(&self) -> i64 {
        self.author
    }

    fn publication_year(&self) -> i32 {
        self.publication_year
    }
}
