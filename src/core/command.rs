use async_trait::async_trait;
use crate::core::library::{FieldErrors, LibraryError};

#[derive(Debug)]
pub enum CommandError {
    Unauthorized {
        message: String,
    },
    Forbidden {
        message: String,
    },
    Database {
        message: String,
        reason_code: Option<String>,
        retryable: bool,
    },
    DuplicateKey {
        message: String,
    },
    NotFound {
        message: String,
    },
    Runtime {
        message: String,
        reason_code: Option<String>,
        retryable: bool,
    },
    Serialization {
        message: String,
    },
    Validation {
        errors: FieldErrors,
    },
}

#[async_trait]
pub trait Command<Request, Response> {
    async fn execute(&self, req: Request) -> Result<Response, CommandError>;
}

impl From<LibraryError> for CommandError {
    fn from(other: LibraryError) -> Self {
        match other {
            LibraryError::Database { message, reason_code, retryable } => {
                CommandError::Database { message, reason_code, retryable }
            }
            LibraryError::Unauthorized { message } => {
                CommandError::Unauthorized { message }
            }
            LibraryError::Forbidden { message } => {
                CommandError::Forbidden { message }
            }
            LibraryError::DuplicateKey { message } => {
                CommandError::DuplicateKey { message }
            }
            LibraryError::NotFound { message } => {
                CommandError::NotFound { message }
            }
            LibraryError::CurrentlyUnavailable { message, reason_code, retryable } => {
                CommandError::Runtime { message, reason_code, retryable }
            }
            LibraryError::Validation { errors } => {
                CommandError::Validation { errors }
            }
            LibraryError::Serialization { message } => {
                CommandError::Serialization { message }
            }
            LibraryError::Runtime { message, reason_code } => {
                CommandError::Runtime { message, reason_code, retryable: false }
            }
        }
    }
}
