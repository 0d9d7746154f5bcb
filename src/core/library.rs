use std::collections::BTreeMap;
use std::fmt;
use std::fmt::{Display, Formatter};
use serde::{Deserialize, Serialize};

// FieldErrors collects validation failures keyed by the input field they belong to
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors {
    errors: BTreeMap<String, Vec<String>>,
}

pub const NON_FIELD_ERRORS: &str = "non_field_errors";

impl FieldErrors {
    pub fn new() -> Self {
        FieldErrors::default()
    }

    pub fn single(field: &str, message: &str) -> Self {
        let mut errors = FieldErrors::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: &str) {
        self.errors.entry(field.to_string()).or_default().push(message.to_string());
    }

    pub fn contains(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&Vec<String>> {
        self.errors.get(field)
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    // converts collected errors into a validation failure, or Ok when nothing was collected
    pub fn into_result(self) -> LibraryResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(LibraryError::Validation { errors: self })
        }
    }
}

impl Display for FieldErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.errors.iter()
            .map(|(k, v)| format!("{}: {}", k, v.join(" ")))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

#[derive(Debug)]
pub enum LibraryError {
    Database {
        message: String,
        reason_code: Option<String>,
        retryable: bool,
    },
    Unauthorized {
        message: String,
    },
    Forbidden {
        message: String,
    },
    DuplicateKey {
        message: String,
    },
    NotFound {
        message: String,
    },
    // This is a retry-able error, which indicates that the store could not serve the request
    // right now, e.g. throughput was exceeded or a conditional write lost a race.
    CurrentlyUnavailable {
        message: String,
        reason_code: Option<String>,
        retryable: bool,
    },
    Validation {
        errors: FieldErrors,
    },
    Serialization {
        message: String,
    },
    Runtime {
        message: String,
        reason_code: Option<String>,
    },
}

impl LibraryError {
    pub fn database(message: &str, reason_code: Option<String>, retryable: bool) -> LibraryError {
        LibraryError::Database { message: message.to_string(), reason_code, retryable }
    }

    pub fn unauthorized(message: &str) -> LibraryError {
        LibraryError::Unauthorized { message: message.to_string() }
    }

    pub fn forbidden(message: &str) -> LibraryError {
        LibraryError::Forbidden { message: message.to_string() }
    }

    pub fn duplicate_key(message: &str) -> LibraryError {
        LibraryError::DuplicateKey { message: message.to_string() }
    }

    pub fn not_found(message: &str) -> LibraryError {
        LibraryError::NotFound { message: message.to_string() }
    }

    pub fn unavailable(message: &str, reason_code: Option<String>, retryable: bool) -> LibraryError {
        LibraryError::CurrentlyUnavailable { message: message.to_string(), reason_code, retryable }
    }

    pub fn database_or_unavailable(message: &str, reason: Option<String>, retryable: bool) -> LibraryError {
        if retryable {
            LibraryError::unavailable(
                format!("ddb database unavailable error {:?} {:?}", message, reason).as_str(), reason, true)
        } else if let Some(ref reason_val) = reason {
            if reason_val.as_str().contains("404") {
                LibraryError::not_found(
                    format!("not found error {:?} {:?}", message, reason).as_str())
            } else if reason_val.as_str().contains("400") && message.contains("ConditionalCheckFailed") {
                LibraryError::unavailable(
                    format!("conditional check failed {:?} {:?}", message, reason).as_str(), reason, false)
            } else {
                LibraryError::database(
                    format!("ddb database error {:?} {:?}", message, reason).as_str(), reason, false)
            }
        } else {
            LibraryError::database(
                format!("ddb database error {:?} {:?}", message, reason).as_str(), reason, false)
        }
    }

    pub fn validation(field: &str, message: &str) -> LibraryError {
        LibraryError::Validation { errors: FieldErrors::single(field, message) }
    }

    pub fn serialization(message: &str) -> LibraryError {
        LibraryError::Serialization { message: message.to_string() }
    }

    pub fn runtime(message: &str, reason_code: Option<String>) -> LibraryError {
        LibraryError::Runtime { message: message.to_string(), reason_code }
    }

    pub fn retryable(&self) -> bool {
        match self {
            LibraryError::Database { retryable, .. } => { *retryable }
            LibraryError::Unauthorized { .. } => { false }
            LibraryError::Forbidden { .. } => { false }
            LibraryError::DuplicateKey { .. } => { false }
            LibraryError::NotFound { .. } => { false }
            LibraryError::CurrentlyUnavailable { retryable, .. } => { *retryable }
            LibraryError::Validation { .. } => { false }
            LibraryError::Serialization { .. } => { false }
            LibraryError::Runtime { .. } => { false }
        }
    }
}

impl From<std::io::Error> for LibraryError {
    fn from(err: std::io::Error) -> Self {
        LibraryError::runtime(
            format!("serde io {:?}", err).as_str(), None)
    }
}

impl From<serde_json::Error> for LibraryError {
    fn from(err: serde_json::Error) -> Self {
        LibraryError::serialization(
            format!("serde json parsing {:?}", err).as_str())
    }
}

impl From<String> for LibraryError {
    fn from(err: String) -> Self {
        LibraryError::serialization(
            format!("serde parsing {:?}", err).as_str())
    }
}

impl Display for LibraryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            LibraryError::Database { message, reason_code, retryable } => {
                write!(f, "{} {:?} {}", message, reason_code, retryable)
            }
            LibraryError::Unauthorized { message } => {
                write!(f, "{}", message)
            }
            LibraryError::Forbidden { message } => {
                write!(f, "{}", message)
            }
            LibraryError::DuplicateKey { message } => {
                write!(f, "{}", message)
            }
            LibraryError::NotFound { message } => {
                write!(f, "{}", message)
            }
            LibraryError::CurrentlyUnavailable { message, reason_code, retryable } => {
                write!(f, "{} {:?} {}", message, reason_code, retryable)
            }
            LibraryError::Validation { errors } => {
                write!(f, "{}", errors)
            }
            LibraryError::Serialization { message } => {
                write!(f, "{}", message)
            }
            LibraryError::Runtime { message, reason_code } => {
                write!(f, "{} {:?}", message, reason_code)
            }
        }
    }
}

impl std::error::Error for LibraryError {}

/// A specialized Result type for Repository .
pub type LibraryResult<T> = Result<T, LibraryError>;

// It defines abstraction for paginated result
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    // The page number or token
    pub page: Option<String>,
    // page size
    pub page_size: usize,
    // Next page if available
    pub next_page: Option<String>,
    // list of records
    pub records: Vec<T>,
}

impl<T> PaginatedResult<T> {
    pub(crate) fn new(page: Option<&str>, page_size: usize,
                      next_page: Option<String>, records: Vec<T>) -> Self {
        PaginatedResult {
            page: page.map(str::to_string),
            page_size,
            next_page,
            records,
        }
    }
}
