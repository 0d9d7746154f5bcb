use std::sync::Arc;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use crate::accounts::domain::AccountService;
use crate::core::command::{Command, CommandError};
use crate::core::library::{FieldErrors, LibraryResult};

pub(crate) struct ObtainTokenCommand {
    account_service: Arc<dyn AccountService>,
}

impl ObtainTokenCommand {
    pub(crate) fn new(account_service: Arc<dyn AccountService>) -> Self {
        Self {
            account_service,
        }
    }
}

#[derive(Debug)]
pub(crate) struct ObtainTokenCommandRequest {
    pub(crate) username: String,
    pub(crate) password: String,
}

impl ObtainTokenCommandRequest {
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    // both fields must be present non-blank strings
    pub fn from_payload(payload: &Value) -> LibraryResult<Self> {
        let mut errors = FieldErrors::new();
        let mut read = |field: &str| match payload.get(field) {
            None => {
                errors.add(field, "This field is required.");
                String::new()
            }
            Some(Value::String(s)) if !s.trim().is_empty() => s.to_string(),
            Some(Value::String(_)) => {
                errors.add(field, "This field may not be blank.");
                String::new()
            }
            Some(_) => {
                errors.add(field, "Not a valid string.");
                String::new()
            }
        };
        let username = read("username");
        let password = read("password");
        errors.into_result()?;
        Ok(Self::new(username.as_str(), password.as_str()))
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ObtainTokenCommandResponse {
    pub token: String,
}

impl ObtainTokenCommandResponse {
    pub fn new(token: String) -> Self {
        Self {
            token,
        }
    }
}

#[async_trait]
impl Command<ObtainTokenCommandRequest, ObtainTokenCommandResponse> for ObtainTokenCommand {
    async fn execute(&self, req: ObtainTokenCommandRequest) -> Result<ObtainTokenCommandResponse, CommandError> {
        self.account_service.obtain_token(req.username.as_str(), req.password.as_str()).await
            .map_err(CommandError::from).map(ObtainTokenCommandResponse::new)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use crate::accounts::command::obtain_token_cmd::{ObtainTokenCommand, ObtainTokenCommandRequest};
    use crate::accounts::factory::create_account_service;
    use crate::core::command::{Command, CommandError};
    use crate::core::domain::{Configuration, UserSeed};
    use crate::core::library::LibraryError;

    #[tokio::test]
    async fn test_should_run_obtain_token() {
        let mut seed = UserSeed::new("testuser", "test@example.com", "testpassword123");
        seed.token = Some("known-token".to_string());
        let svc = create_account_service(&Configuration::new("test").with_user(seed)).expect("should seed users");
        let cmd = ObtainTokenCommand::new(svc);

        let res = cmd.execute(ObtainTokenCommandRequest::new("testuser", "testpassword123")).await.expect("should obtain token");
        assert_eq!("known-token", res.token);

        let res = cmd.execute(ObtainTokenCommandRequest::new("testuser", "nope")).await;
        match res {
            Err(CommandError::Validation { errors }) => assert!(errors.contains("non_field_errors")),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_should_require_credentials() {
        let res = ObtainTokenCommandRequest::from_payload(&json!({"username": " "}));
        match res {
            Err(LibraryError::Validation { errors }) => {
                assert_eq!(Some(&vec!["This field may not be blank.".to_string()]), errors.get("username"));
                assert_eq!(Some(&vec!["This field is required.".to_string()]), errors.get("password"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
        assert!(ObtainTokenCommandRequest::from_payload(&json!({"username": "u", "password": "p"})).is_ok());
    }
}
