pub mod add_author_cmd;
pub mod add_book_cmd;
pub mod get_author_cmd;
pub mod get_book_cmd;
pub mod list_authors_cmd;
pub mod list_books_cmd;
pub mod remove_book_cmd;
pub mod update_book_cmd;
