use serde::{Deserialize, Serialize};
use crate::authors::domain::model::AuthorEntity;
use crate::books::dto::BookDto;

// AuthorDto is the wire representation used by author listings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct AuthorDto {
    pub id: i64,
    pub name: String,
}

impl From<&AuthorEntity> for AuthorDto {
    fn from(other: &AuthorEntity) -> Self {
        AuthorDto {
            id: other.author_id,
            name: other.name.to_string(),
        }
    }
}

// AuthorDetailDto nests the author's books
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct AuthorDetailDto {
    pub id: i64,
    pub name: String,
    pub books: Vec<BookDto>,
}

impl AuthorDetailDto {
    pub fn new(author: &AuthorEntity, books: Vec<BookDto>) -> Self {
        AuthorDetailDto {
            id: author.author_id,
            name: author.name.to_string(),
            books,
        }
    }
}
