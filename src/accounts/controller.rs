use axum::{
    body::Bytes,
    extract::State,
    response::Json,
};
use crate::accounts::{Caller, Principal};
use crate::accounts::command::obtain_token_cmd::{ObtainTokenCommand, ObtainTokenCommandRequest, ObtainTokenCommandResponse};
use crate::accounts::gate::{Action, NOT_AUTHENTICATED, Resource};
use crate::core::command::Command;
use crate::core::controller::{AppState, parse_payload, ServerError};
use crate::core::library::LibraryError;

pub(crate) async fn obtain_token(
    State(state): State<AppState>,
    body: Bytes) -> Result<Json<ObtainTokenCommandResponse>, ServerError> {
    let payload = parse_payload(&body)?;
    let req = ObtainTokenCommandRequest::from_payload(&payload)?;
    let res = ObtainTokenCommand::new(state.account_service.clone()).execute(req).await?;
    Ok(Json(res))
}

pub(crate) async fn profile(
    State(state): State<AppState>,
    caller: Caller) -> Result<Json<Principal>, ServerError> {
    state.gate.authorize(&caller, Resource::Profile, Action::Detail)?;
    caller.principal().cloned().map(Json)
        .ok_or_else(|| ServerError::from(LibraryError::unauthorized(NOT_AUTHENTICATED)))
}
