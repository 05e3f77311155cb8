//! Book catalog service: cache-through reads, evict-after-write mutations.
//!
//! Cache entries and the writes that evict them:
//!
//! | entry | evicted by |
//! |---|---|
//! | `book::<id>` | `update_by_id`, `delete_by_id` |
//! | `bookByNameAndAuthor::<name><author>` | `update_by_id` (old pair), `delete_by_id` |
//! | `books::<category>` | `save` (target), `update_by_id` (old and new), `delete_by_id` |
//!
//! Evictions run after the store write returns and are best effort.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, instrument};

use crate::application::repos::{
    BooksRepo, BooksWriteRepo, CreateBookParams, RepoError, UpdateBookParams,
};
use crate::cache::{CacheKey, QueryCache};
use crate::domain::entities::{BookPatch, BookRecord, NewBook};
use crate::domain::error::DomainError;

#[derive(Debug, Error)]
pub enum BookServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Clone)]
pub struct BookService {
    reader: Arc<dyn BooksRepo>,
    writer: Arc<dyn BooksWriteRepo>,
    cache: QueryCache,
}

impl BookService {
    pub fn new(
        reader: Arc<dyn BooksRepo>,
        writer: Arc<dyn BooksWriteRepo>,
        cache: QueryCache,
    ) -> Self {
        Self {
            reader,
            writer,
            cache,
        }
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    #[instrument(skip(self))]
    pub async fn find_by_id(&self, id: i64) -> Result<BookRecord, BookServiceError> {
        let key = CacheKey::book(id);
        if let Some(book) = self.cache.get::<BookRecord>(&key).await {
            return Ok(book);
        }

        let book = self.load_existing(id).await?;
        self.cache.put(&key, &book).await;
        Ok(book)
    }

    #[instrument(skip(self))]
    pub async fn find_by_author_and_name(
        &self,
        name: &str,
        author: &str,
    ) -> Result<BookRecord, BookServiceError> {
        let key = CacheKey::book_by_name_and_author(name, author);
        if let Some(book) = self.cache.get::<BookRecord>(&key).await {
            return Ok(book);
        }

        let book = self
            .reader
            .find_by_name_and_author(name, author)
            .await?
            .ok_or_else(|| DomainError::book_not_found_by_name(name, author))?;
        self.cache.put(&key, &book).await;
        Ok(book)
    }

    /// Books of `category_name`; unknown categories yield an empty list.
    #[instrument(skip(self))]
    pub async fn find_by_category(
        &self,
        category_name: &str,
    ) -> Result<Vec<BookRecord>, BookServiceError> {
        let key = CacheKey::books(category_name);
        if let Some(books) = self.cache.get::<Vec<BookRecord>>(&key).await {
            return Ok(books);
        }

        let books = self.reader.list_by_category_name(category_name).await?;
        self.cache.put(&key, &books).await;
        Ok(books)
    }

    #[instrument(skip(self, book), fields(name = %book.name, author = %book.author))]
    pub async fn save(
        &self,
        book: NewBook,
        category_name: &str,
    ) -> Result<BookRecord, BookServiceError> {
        self.ensure_unique(&book.name, &book.author).await?;

        let created = self
            .writer
            .create_book(CreateBookParams {
                name: book.name.clone(),
                author: book.author.clone(),
                category_name: category_name.to_string(),
            })
            .await
            .map_err(|err| duplicate_as_bad_request(err, &book.name, &book.author))?;

        self.cache.evict(&CacheKey::books(category_name)).await;

        info!(id = created.id, category = category_name, "book created");
        Ok(created)
    }

    /// Apply `patch` to book `id`, optionally moving it to `category_name`.
    ///
    /// The (name, author) uniqueness check runs against the patch as given and
    /// does not exclude the book being updated: re-sending a book's own name
    /// and author is rejected as a duplicate. The check is skipped unless both
    /// fields are present.
    #[instrument(skip(self, patch))]
    pub async fn update_by_id(
        &self,
        id: i64,
        patch: BookPatch,
        category_name: Option<&str>,
    ) -> Result<BookRecord, BookServiceError> {
        if let (Some(name), Some(author)) = (patch.name.as_deref(), patch.author.as_deref()) {
            self.ensure_unique(name, author).await?;
        }

        let existing = self.load_existing(id).await?;
        let previous_key = CacheKey::book_by_name_and_author(&existing.name, &existing.author);
        let previous_category = existing.category.clone();

        let mut updated = existing;
        updated.apply(&patch);

        let saved = self
            .writer
            .update_book(UpdateBookParams {
                id,
                name: updated.name.clone(),
                author: updated.author.clone(),
                category_name: category_name.map(str::to_string),
            })
            .await
            .map_err(|err| match err {
                RepoError::NotFound => DomainError::book_not_found(id).into(),
                other => duplicate_as_bad_request(other, &updated.name, &updated.author),
            })?;

        self.cache.evict(&CacheKey::book(id)).await;
        self.cache.evict(&previous_key).await;
        if let Some(previous) = previous_category.as_ref() {
            self.cache.evict(&CacheKey::books(&previous.name)).await;
        }
        if let Some(target) = category_name {
            self.cache.evict(&CacheKey::books(target)).await;
        }

        info!(id, "book updated");
        Ok(saved)
    }

    #[instrument(skip(self))]
    pub async fn delete_by_id(&self, id: i64) -> Result<(), BookServiceError> {
        let existing = self.load_existing(id).await?;
        self.writer.delete_book(id).await.map_err(|err| match err {
            RepoError::NotFound => BookServiceError::from(DomainError::book_not_found(id)),
            other => other.into(),
        })?;

        self.cache.evict(&CacheKey::book(id)).await;
        self.cache
            .evict(&CacheKey::book_by_name_and_author(
                &existing.name,
                &existing.author,
            ))
            .await;
        if let Some(category) = existing.category_name() {
            self.cache.evict(&CacheKey::books(category)).await;
        }

        info!(id, "book deleted");
        Ok(())
    }

    async fn load_existing(&self, id: i64) -> Result<BookRecord, BookServiceError> {
        self.reader
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::book_not_found(id).into())
    }

    async fn ensure_unique(&self, name: &str, author: &str) -> Result<(), BookServiceError> {
        match self.reader.find_by_name_and_author(name, author).await? {
            Some(_) => Err(DomainError::duplicate_book(name, author).into()),
            None => Ok(()),
        }
    }
}

/// A unique-index violation means a concurrent writer won the (name, author)
/// race after the pre-check passed; report it like the pre-check would.
fn duplicate_as_bad_request(err: RepoError, name: &str, author: &str) -> BookServiceError {
    match err {
        RepoError::Duplicate { .. } => DomainError::duplicate_book(name, author).into(),
        other => other.into(),
    }
}
