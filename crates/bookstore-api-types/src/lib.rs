//! Request and response bodies of the bookstore HTTP API.
//!
//! Field names are serialized in camelCase to match the wire format clients
//! already depend on.

use serde::{Deserialize, Serialize};

/// Body of `POST /api/v1/book`.
///
/// Every field is required and must not be blank. Fields are optional here so
/// that a missing field reaches validation and is reported with the same
/// message as a blank one.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub category_name: Option<String>,
}

/// Body of `PUT /api/v1/book/{id}`. Absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBookRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub category_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BookResponse {
    pub id: i64,
    pub name: String,
    pub author: String,
    pub category_name: Option<String>,
}

/// List item of `GET /api/v1/{category}/book`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct BookShortResponse {
    pub id: i64,
    pub name: String,
    pub author: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct BooksResponse {
    pub books: Vec<BookShortResponse>,
}

/// Uniform error body.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ResponseMessage {
    pub message: String,
}

impl ResponseMessage {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn book_response_uses_camel_case() {
        let body = BookResponse {
            id: 7,
            name: "Dune".to_string(),
            author: "Frank Herbert".to_string(),
            category_name: Some("sci-fi".to_string()),
        };

        let json = serde_json::to_value(&body).expect("serialize");
        assert_eq!(json["categoryName"], "sci-fi");
        assert!(json.get("category_name").is_none());
    }

    #[test]
    fn create_request_tolerates_missing_fields() {
        let request: CreateBookRequest =
            serde_json::from_str(r#"{"name":"Dune"}"#).expect("deserialize");

        assert_eq!(request.name.as_deref(), Some("Dune"));
        assert!(request.author.is_none());
        assert!(request.category_name.is_none());
    }

    #[test]
    fn uncategorized_book_serializes_null_category() {
        let body = BookResponse {
            id: 1,
            name: "n".to_string(),
            author: "a".to_string(),
            category_name: None,
        };

        let json = serde_json::to_value(&body).expect("serialize");
        assert!(json["categoryName"].is_null());
    }
}
