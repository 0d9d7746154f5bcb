use std::sync::Arc;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use serde_json::{json, Value};
use tracing::{error, warn};
use crate::accounts::domain::AccountService;
use crate::accounts::factory::create_account_service;
use crate::accounts::gate::AuthorizationGate;
use crate::catalog::domain::CatalogService;
use crate::catalog::factory::create_catalog_service;
use crate::core::clock::Clock;
use crate::core::command::CommandError;
use crate::core::domain::Configuration;
use crate::core::library::{FieldErrors, LibraryError, LibraryResult, NON_FIELD_ERRORS};

// AppState is built once per process and shared by every request
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Configuration>,
    pub(crate) catalog_service: Arc<dyn CatalogService>,
    pub(crate) account_service: Arc<dyn AccountService>,
    pub(crate) gate: Arc<AuthorizationGate>,
}

impl AppState {
    pub async fn build(config: Configuration, clock: Arc<dyn Clock>) -> LibraryResult<AppState> {
        config.validate()?;
        let catalog_service = create_catalog_service(&config, clock).await;
        let account_service = create_account_service(&config)?;
        Ok(AppState {
            config: Arc::new(config),
            catalog_service,
            account_service,
            gate: Arc::new(AuthorizationGate::default()),
        })
    }
}

#[derive(Debug)]
pub struct ServerError {
    status: StatusCode,
    body: Value,
}

impl ServerError {
    pub fn new(status: StatusCode, body: Value) -> Self {
        Self { status, body }
    }

    pub fn detail(status: StatusCode, message: &str) -> Self {
        Self::new(status, json!({ "detail": message }))
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn body(&self) -> &Value {
        &self.body
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status;
        let mut res = (status, Json(self.body)).into_response();
        if status == StatusCode::UNAUTHORIZED {
            res.headers_mut().insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Token"));
        }
        res
    }
}

pub fn json_to_server_error(err: serde_json::Error) -> ServerError {
    ServerError::detail(StatusCode::BAD_REQUEST, format!("JSON parse error - {}", err).as_str())
}

// path ids that are not integers cannot name a stored record
pub(crate) fn parse_id(id: &str) -> Result<i64, ServerError> {
    id.parse::<i64>().map_err(|_| ServerError::detail(StatusCode::NOT_FOUND, "Not found."))
}

// the request body must be a JSON object; an empty body counts as an empty object
pub(crate) fn parse_payload(body: &[u8]) -> Result<Value, ServerError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(json!({}));
    }
    let value: Value = serde_json::from_slice(body).map_err(json_to_server_error)?;
    if value.is_object() {
        Ok(value)
    } else {
        let kind = match value {
            Value::Array(_) => "list",
            Value::String(_) => "str",
            Value::Number(_) => "int",
            Value::Bool(_) => "bool",
            _ => "null",
        };
        let errors = FieldErrors::single(
            NON_FIELD_ERRORS, format!("Invalid data. Expected a dictionary, but got {}.", kind).as_str());
        Err(ServerError::new(StatusCode::BAD_REQUEST, json!(errors)))
    }
}

impl From<CommandError> for ServerError {
    fn from(err: CommandError) -> Self {
        match err {
            CommandError::Unauthorized { message } => {
                ServerError::detail(StatusCode::UNAUTHORIZED, message.as_str())
            }
            CommandError::Forbidden { message } => {
                ServerError::detail(StatusCode::FORBIDDEN, message.as_str())
            }
            CommandError::Database { .. } => {
                error!("database failure {:?}", err);
                ServerError::detail(StatusCode::INTERNAL_SERVER_ERROR, format!("{:?}", err).as_str())
            }
            CommandError::DuplicateKey { message } => {
                ServerError::detail(StatusCode::CONFLICT, message.as_str())
            }
            CommandError::NotFound { .. } => {
                ServerError::detail(StatusCode::NOT_FOUND, "Not found.")
            }
            CommandError::Runtime { retryable, .. } => {
                warn!("runtime failure {:?}", err);
                if retryable {
                    ServerError::detail(StatusCode::SERVICE_UNAVAILABLE, format!("{:?}", err).as_str())
                } else {
                    ServerError::detail(StatusCode::INTERNAL_SERVER_ERROR, format!("{:?}", err).as_str())
                }
            }
            CommandError::Serialization { message } => {
                ServerError::detail(StatusCode::BAD_REQUEST, message.as_str())
            }
            CommandError::Validation { errors } => {
                ServerError::new(StatusCode::BAD_REQUEST, json!(errors))
            }
        }
    }
}

impl From<LibraryError> for ServerError {
    fn from(err: LibraryError) -> Self {
        ServerError::from(CommandError::from(err))
    }
}

#[cfg(test)]
mod tests {
    use axum::http::{header, StatusCode};
    use axum::response::IntoResponse;
    use crate::core::command::CommandError;
    use crate::core::controller::{parse_id, parse_payload, ServerError};
    use crate::core::library::LibraryError;

    #[tokio::test]
    async fn test_should_map_command_errors() {
        assert_eq!(StatusCode::NOT_FOUND, ServerError::from(CommandError::NotFound { message: "x".to_string() }).status());
        assert_eq!(StatusCode::UNAUTHORIZED, ServerError::from(CommandError::Unauthorized { message: "x".to_string() }).status());
        assert_eq!(StatusCode::FORBIDDEN, ServerError::from(LibraryError::forbidden("x")).status());
        assert_eq!(StatusCode::CONFLICT, ServerError::from(CommandError::DuplicateKey { message: "x".to_string() }).status());
        assert_eq!(StatusCode::SERVICE_UNAVAILABLE, ServerError::from(LibraryError::unavailable("x", None, true)).status());
        assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, ServerError::from(LibraryError::runtime("x", None)).status());
    }

    #[tokio::test]
    async fn test_should_render_field_errors() {
        let err = ServerError::from(LibraryError::validation("publication_year", "publication year cannot be in the future"));
        assert_eq!(StatusCode::BAD_REQUEST, err.status());
        assert_eq!("publication year cannot be in the future", err.body()["publication_year"][0]);
    }

    #[tokio::test]
    async fn test_should_add_authenticate_header() {
        let res = ServerError::from(LibraryError::unauthorized("no credentials")).into_response();
        assert_eq!(StatusCode::UNAUTHORIZED, res.status());
        assert_eq!(Some("Token"), res.headers().get(header::WWW_AUTHENTICATE).and_then(|v| v.to_str().ok()));
    }

    #[tokio::test]
    async fn test_should_parse_ids() {
        assert_eq!(42, parse_id("42").expect("numeric id"));
        assert_eq!(StatusCode::NOT_FOUND, parse_id("abc").expect_err("text id").status());
    }

    #[tokio::test]
    async fn test_should_parse_payload() {
        assert!(parse_payload(b"").expect("empty body").is_object());
        assert!(parse_payload(br#"{"title":"x"}"#).is_ok());
        let err = parse_payload(b"[1,2]").expect_err("list body");
        assert_eq!("Invalid data. Expected a dictionary, but got list.", err.body()["non_field_errors"][0]);
        assert_eq!(StatusCode::BAD_REQUEST, parse_payload(b"{oops").expect_err("broken json").status());
    }
}
