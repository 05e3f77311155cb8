//! Field checks for request bodies that carry required values.

use bookstore_api_types::CreateBookRequest;

use crate::domain::entities::NewBook;

pub const BLANK_NAME: &str = "Название книги не может быть пустым";
pub const BLANK_AUTHOR: &str = "Имя автора не может быть пустым";
pub const BLANK_CATEGORY: &str = "Название категории не может быть пустым";

/// A create request whose required fields are all present and non-blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidCreateBook {
    pub book: NewBook,
    pub category_name: String,
}

/// Check every field and report all failures at once, joined with `", "` in
/// field order.
pub fn validate_create(request: CreateBookRequest) -> Result<ValidCreateBook, String> {
    let CreateBookRequest {
        name,
        author,
        category_name,
    } = request;

    let mut failures = Vec::new();
    let name = required(name, BLANK_NAME, &mut failures);
    let author = required(author, BLANK_AUTHOR, &mut failures);
    let category_name = required(category_name, BLANK_CATEGORY, &mut failures);

    match (name, author, category_name) {
        (Some(name), Some(author), Some(category_name)) => Ok(ValidCreateBook {
            book: NewBook { name, author },
            category_name,
        }),
        _ => Err(failures.join(", ")),
    }
}

fn required(
    value: Option<String>,
    message: &'static str,
    failures: &mut Vec<&'static str>,
) -> Option<String> {
    match value {
        Some(value) if !value.trim().is_empty() => Some(value),
        _ => {
            failures.push(message);
            None
        }
    }
}
