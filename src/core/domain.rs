use std::env;
use std::fmt::Display;
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use crate::core::library::{LibraryError, LibraryResult};
use crate::core::repository::RepositoryStore;

// Identifiable defines common traits that can be shared by persistent objects
pub trait Identifiable : Sync + Send {
    fn id(&self) -> i64;
    fn version(&self) -> i64;
}

// UserSeed describes an account provisioned out of band through configuration
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct UserSeed {
    pub username: String,
    #[serde(default)]
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub token: Option<String>,
}

impl UserSeed {
    pub fn new(username: &str, email: &str, password: &str) -> Self {
        Self {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            token: None,
        }
    }
}

// Configuration abstracts config options for the book service
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct Configuration {
    pub name: String,
    pub store: RepositoryStore,
    pub bind_address: String,
    pub page_size: usize,
    pub max_page_size: usize,
    pub max_title_length: usize,
    pub max_author_name_length: usize,
    pub log_level: String,
    pub books_table: String,
    pub authors_table: String,
    pub sequences_table: String,
    pub users: Vec<UserSeed>,
}

impl Configuration {
    pub fn new(name: &str) -> Self {
        Configuration {
            name: name.to_string(),
            store: RepositoryStore::InMemory,
            bind_address: "0.0.0.0:8080".to_string(),
            page_size: 10,
            max_page_size: 100,
            max_title_length: 200,
            max_author_name_length: 100,
            log_level: "info".to_string(),
            books_table: "books".to_string(),
            authors_table: "authors".to_string(),
            sequences_table: "sequences".to_string(),
            users: vec![],
        }
    }

    pub fn with_store(mut self, store: RepositoryStore) -> Self {
        self.store = store;
        self
    }

    pub fn with_user(mut self, user: UserSeed) -> Self {
        self.users.push(user);
        self
    }

    // loads configuration from BOOK_API_* environment variables, falling back to defaults
    pub fn from_env() -> LibraryResult<Self> {
        let defaults = Configuration::new("book-api");
        let users = match env::var("BOOK_API_USERS") {
            Ok(json) => serde_json::from_str::<Vec<UserSeed>>(json.as_str())
                .map_err(|e| LibraryError::validation("BOOK_API_USERS", format!("invalid user seeds: {}", e).as_str()))?,
            Err(_) => {
                warn!("BOOK_API_USERS not set, no account can obtain a token");
                vec![]
            }
        };
        let config = Configuration {
            name: try_load("BOOK_API_NAME", defaults.name.as_str())?,
            store: try_load("BOOK_API_STORE", defaults.store.to_string().as_str())?,
            bind_address: try_load("BOOK_API_BIND", defaults.bind_address.as_str())?,
            page_size: try_load("BOOK_API_PAGE_SIZE", defaults.page_size.to_string().as_str())?,
            max_page_size: try_load("BOOK_API_MAX_PAGE_SIZE", defaults.max_page_size.to_string().as_str())?,
            max_title_length: defaults.max_title_length,
            max_author_name_length: defaults.max_author_name_length,
            log_level: try_load("BOOK_API_LOG_LEVEL", defaults.log_level.as_str())?,
            books_table: try_load("BOOK_API_BOOKS_TABLE", defaults.books_table.as_str())?,
            authors_table: try_load("BOOK_API_AUTHORS_TABLE", defaults.authors_table.as_str())?,
            sequences_table: try_load("BOOK_API_SEQUENCES_TABLE", defaults.sequences_table.as_str())?,
            users,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> LibraryResult<()> {
        if self.page_size == 0 {
            return Err(LibraryError::validation("page_size", "page size must be positive"));
        }
        if self.max_page_size < self.page_size {
            return Err(LibraryError::validation("max_page_size", "max page size must not be below page size"));
        }
        if self.log_level.parse::<tracing::Level>().is_err() {
            return Err(LibraryError::validation("log_level", format!("unknown log level {}", self.log_level).as_str()));
        }
        Ok(())
    }
}

fn try_load<T: FromStr>(key: &str, default: &str) -> LibraryResult<T>
where
    T::Err: Display,
{
    env::var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
            LibraryError::validation(key, format!("invalid value: {}", e).as_str())
        })
}
