//! Domain entities mirrored from persistent storage.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRecord {
    pub id: i64,
    pub name: String,
}

/// A catalog entry. `(name, author)` is unique across all books.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookRecord {
    pub id: i64,
    pub name: String,
    pub author: String,
    pub category: Option<CategoryRecord>,
}

impl BookRecord {
    pub fn category_name(&self) -> Option<&str> {
        self.category.as_ref().map(|category| category.name.as_str())
    }

    /// Overwrite the fields present in `patch`, leaving the others untouched.
    pub fn apply(&mut self, patch: &BookPatch) {
        if let Some(name) = patch.name.as_ref() {
            self.name = name.clone();
        }
        if let Some(author) = patch.author.as_ref() {
            self.author = author.clone();
        }
    }
}

/// Input for creating a book; the category is resolved separately by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub name: String,
    pub author: String,
}

/// Partial update of a book.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookPatch {
    pub name: Option<String>,
    pub author: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book() -> BookRecord {
        BookRecord {
            id: 1,
            name: "old name".to_string(),
            author: "old author".to_string(),
            category: Some(CategoryRecord {
                id: 3,
                name: "sport".to_string(),
            }),
        }
    }

    #[test]
    fn apply_overwrites_only_present_fields() {
        let mut record = book();
        record.apply(&BookPatch {
            name: Some("new name".to_string()),
            author: None,
        });

        assert_eq!(record.name, "new name");
        assert_eq!(record.author, "old author");
        assert_eq!(record.category_name(), Some("sport"));
    }

    #[test]
    fn empty_patch_changes_nothing() {
        let mut record = book();
        record.apply(&BookPatch::default());
        assert_eq!(record, book());
    }
}
