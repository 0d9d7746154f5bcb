use std::collections::HashMap;
use axum::{
    body::{Bytes, HttpBody},
    BoxError,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, post, put},
    Router,
};
use crate::accounts::Caller;
use crate::accounts::controller::{obtain_token, profile};
use crate::accounts::gate::{Action, Resource};
use crate::catalog::command::add_author_cmd::{AddAuthorCommand, AddAuthorCommandRequest, AddAuthorCommandResponse};
use crate::catalog::command::add_book_cmd::{AddBookCommand, AddBookCommandRequest, AddBookCommandResponse};
use crate::catalog::command::get_author_cmd::{GetAuthorCommand, GetAuthorCommandRequest, GetAuthorCommandResponse};
use crate::catalog::command::get_book_cmd::{GetBookCommand, GetBookCommandRequest, GetBookCommandResponse};
use crate::catalog::command::list_authors_cmd::{ListAuthorsCommand, ListAuthorsCommandRequest, ListAuthorsCommandResponse};
use crate::catalog::command::list_books_cmd::{ListBooksCommand, ListBooksCommandRequest, ListBooksCommandResponse};
use crate::catalog::command::remove_book_cmd::{RemoveBookCommand, RemoveBookCommandRequest};
use crate::catalog::command::update_book_cmd::{UpdateBookCommand, UpdateBookCommandRequest, UpdateBookCommandResponse};
use crate::core::command::Command;
use crate::core::controller::{AppState, parse_id, parse_payload, ServerError};

// generic over the body so both hyper and lambda_http can drive the routes
pub fn router<B>(state: AppState) -> Router<(), B>
    where B: HttpBody + Send + 'static, B::Data: Send, B::Error: Into<BoxError> {
    Router::new()
        .route("/books/", get(list_books))
        .route("/books/:id/", get(find_book_by_id))
        .route("/books/create/", post(add_book))
        .route("/books/update/:id/", put(replace_book).patch(modify_book))
        .route("/books/delete/:id/", delete(remove_book))
        .route("/authors/", get(list_authors))
        .route("/authors/:id/", get(find_author_by_id))
        .route("/authors/create/", post(add_author))
        .route("/auth/token/", post(obtain_token))
        .route("/auth/profile/", get(profile))
        .with_state(state)
}

pub(crate) async fn list_books(
    State(state): State<AppState>,
    caller: Caller,
    Query(params): Query<HashMap<String, String>>) -> Result<Json<ListBooksCommandResponse>, ServerError> {
    state.gate.authorize(&caller, Resource::Book, Action::List)?;
    let req = ListBooksCommandRequest::new(&params);
    let res = ListBooksCommand::new(state.catalog_service.clone()).execute(req).await?;
    Ok(Json(res))
}

pub(crate) async fn find_book_by_id(
    State(state): State<AppState>,
    caller: Caller,
    Path(book_id): Path<String>) -> Result<Json<GetBookCommandResponse>, ServerError> {
    state.gate.authorize(&caller, Resource::Book, Action::Detail)?;
    let req = GetBookCommandRequest::new(parse_id(book_id.as_str())?);
    let res = GetBookCommand::new(state.catalog_service.clone()).execute(req).await?;
    Ok(Json(res))
}

pub(crate) async fn add_book(
    State(state): State<AppState>,
    caller: Caller,
    body: Bytes) -> Result<(StatusCode, Json<AddBookCommandResponse>), ServerError> {
    state.gate.authorize(&caller, Resource::Book, Action::Create)?;
    let req = AddBookCommandRequest::new(parse_payload(&body)?);
    let res = AddBookCommand::new(state.catalog_service.clone()).execute(req).await?;
    Ok((StatusCode::CREATED, Json(res)))
}

pub(crate) async fn replace_book(
    state: State<AppState>,
    caller: Caller,
    book_id: Path<String>,
    body: Bytes) -> Result<Json<UpdateBookCommandResponse>, ServerError> {
    update_book(state, caller, book_id, body, false).await
}

pub(crate) async fn modify_book(
    state: State<AppState>,
    caller: Caller,
    book_id: Path<String>,
    body: Bytes) -> Result<Json<UpdateBookCommandResponse>, ServerError> {
    update_book(state, caller, book_id, body, true).await
}

async fn update_book(
    State(state): State<AppState>,
    caller: Caller,
    Path(book_id): Path<String>,
    body: Bytes,
    partial: bool) -> Result<Json<UpdateBookCommandResponse>, ServerError> {
    state.gate.authorize(&caller, Resource::Book, Action::Update)?;
    let book_id = parse_id(book_id.as_str())?;
    let req = UpdateBookCommandRequest::new(book_id, parse_payload(&body)?, partial);
    let res = UpdateBookCommand::new(state.catalog_service.clone()).execute(req).await?;
    Ok(Json(res))
}

pub(crate) async fn remove_book(
    State(state): State<AppState>,
    caller: Caller,
    Path(book_id): Path<String>) -> Result<StatusCode, ServerError> {
    state.gate.authorize(&caller, Resource::Book, Action::Delete)?;
    let req = RemoveBookCommandRequest::new(parse_id(book_id.as_str())?);
    let _ = RemoveBookCommand::new(state.catalog_service.clone()).execute(req).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn list_authors(
    State(state): State<AppState>,
    caller: Caller) -> Result<Json<ListAuthorsCommandResponse>, ServerError> {
    state.gate.authorize(&caller, Resource::Author, Action::List)?;
    let res = ListAuthorsCommand::new(state.catalog_service.clone()).execute(ListAuthorsCommandRequest::new()).await?;
    Ok(Json(res))
}

pub(crate) async fn find_author_by_id(
    State(state): State<AppState>,
    caller: Caller,
    Path(author_id): Path<String>) -> Result<Json<GetAuthorCommandResponse>, ServerError> {
    state.gate.authorize(&caller, Resource::Author, Action::Detail)?;
    let req = GetAuthorCommandRequest::new(parse_id(author_id.as_str())?);
    let res = GetAuthorCommand::new(state.catalog_service.clone()).execute(req).await?;
    Ok(Json(res))
}

pub(crate) async fn add_author(
    State(state): State<AppState>,
    caller: Caller,
    body: Bytes) -> Result<(StatusCode, Json<AddAuthorCommandResponse>), ServerError> {
    state.gate.authorize(&caller, Resource::Author, Action::Create)?;
    let req = AddAuthorCommandRequest::new(parse_payload(&body)?);
    let res = AddAuthorCommand::new(state.catalog_service.clone()).execute(req).await?;
    Ok((StatusCode::CREATED, Json(res)))
}
