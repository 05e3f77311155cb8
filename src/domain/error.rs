use thiserror::Error;

/// Failures the catalog reports back to callers.
///
/// Messages are user facing and are rendered verbatim in the `{message}` body.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("{message}")]
    NotFound { message: String },
    #[error("{message}")]
    BadRequest { message: String },
}

impl DomainError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    pub fn book_not_found(id: i64) -> Self {
        Self::not_found(format!("Книга с id {id} не найдена"))
    }

    pub fn book_not_found_by_name(name: &str, author: &str) -> Self {
        Self::not_found(format!(
            "Книга под названием {name} автора {author} не найдена"
        ))
    }

    pub fn duplicate_book(name: &str, author: &str) -> Self {
        Self::bad_request(format!("Книга под названием {name} автора {author} уже есть"))
    }

    pub fn message(&self) -> &str {
        match self {
            Self::NotFound { message } | Self::BadRequest { message } => message,
        }
    }
}
