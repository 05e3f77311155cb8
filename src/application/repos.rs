//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::entities::BookRecord;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("duplicate record violates unique constraint `{constraint}`")]
    Duplicate { constraint: String },
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

/// New book filed under `category_name`, which is created when missing.
#[derive(Debug, Clone)]
pub struct CreateBookParams {
    pub name: String,
    pub author: String,
    pub category_name: String,
}

/// Full replacement of a stored book's name and author.
///
/// `category_name` moves the book to that category (created when missing);
/// `None` keeps the current one.
#[derive(Debug, Clone)]
pub struct UpdateBookParams {
    pub id: i64,
    pub name: String,
    pub author: String,
    pub category_name: Option<String>,
}

#[async_trait]
pub trait BooksRepo: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<BookRecord>, RepoError>;

    async fn find_by_name_and_author(
        &self,
        name: &str,
        author: &str,
    ) -> Result<Option<BookRecord>, RepoError>;

    async fn list_by_category_name(&self, name: &str) -> Result<Vec<BookRecord>, RepoError>;
}

/// Mutations. Each call is one transaction: a category created for a write
/// that then fails is rolled back with it.
#[async_trait]
pub trait BooksWriteRepo: Send + Sync {
    async fn create_book(&self, params: CreateBookParams) -> Result<BookRecord, RepoError>;

    async fn update_book(&self, params: UpdateBookParams) -> Result<BookRecord, RepoError>;

    async fn delete_book(&self, id: i64) -> Result<(), RepoError>;
}

#[async_trait]
pub trait HealthRepo: Send + Sync {
    /// Round-trip to the backing store.
    async fn ping(&self) -> Result<(), RepoError>;
}
