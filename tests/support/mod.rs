//! In-memory catalog standing in for Postgres in service and router tests.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use bookstore::application::books::BookService;
use bookstore::application::repos::{
    BooksRepo, BooksWriteRepo, CreateBookParams, HealthRepo, RepoError, UpdateBookParams,
};
use bookstore::cache::{CacheConfig, MemoryCacheStore, QueryCache};
use bookstore::domain::entities::{BookRecord, CategoryRecord};

#[derive(Clone)]
struct StoredBook {
    name: String,
    author: String,
    category_id: Option<i64>,
}

#[derive(Default)]
struct Tables {
    books: BTreeMap<i64, StoredBook>,
    categories: BTreeMap<i64, String>,
    next_book_id: i64,
    next_category_id: i64,
}

impl Tables {
    fn record(&self, id: i64, book: &StoredBook) -> BookRecord {
        let category = book.category_id.and_then(|category_id| {
            self.categories
                .get(&category_id)
                .map(|name| CategoryRecord {
                    id: category_id,
                    name: name.clone(),
                })
        });
        BookRecord {
            id,
            name: book.name.clone(),
            author: book.author.clone(),
            category,
        }
    }

    fn ensure_category(&mut self, name: &str) -> i64 {
        if let Some((id, _)) = self
            .categories
            .iter()
            .find(|(_, existing)| existing.as_str() == name)
        {
            return *id;
        }
        self.next_category_id += 1;
        let id = self.next_category_id;
        self.categories.insert(id, name.to_string());
        id
    }

    fn conflicts(&self, id: Option<i64>, name: &str, author: &str) -> bool {
        self.books
            .iter()
            .any(|(other, book)| Some(*other) != id && book.name == name && book.author == author)
    }
}

/// Counts every read that reaches the store so tests can tell cache hits apart.
#[derive(Default)]
pub struct InMemoryCatalog {
    tables: Mutex<Tables>,
    reads_by_id: AtomicUsize,
    reads_by_name: AtomicUsize,
    reads_by_category: AtomicUsize,
    unhealthy: AtomicBool,
    reads_time_out: AtomicBool,
}

impl InMemoryCatalog {
    pub fn reads_by_id(&self) -> usize {
        self.reads_by_id.load(Ordering::SeqCst)
    }

    pub fn reads_by_name(&self) -> usize {
        self.reads_by_name.load(Ordering::SeqCst)
    }

    pub fn reads_by_category(&self) -> usize {
        self.reads_by_category.load(Ordering::SeqCst)
    }

    pub fn set_unhealthy(&self) {
        self.unhealthy.store(true, Ordering::SeqCst);
    }

    /// Make every read fail the way an exhausted pool does.
    pub fn set_reads_time_out(&self) {
        self.reads_time_out.store(true, Ordering::SeqCst);
    }

    fn check_read(&self) -> Result<(), RepoError> {
        if self.reads_time_out.load(Ordering::SeqCst) {
            return Err(RepoError::Timeout);
        }
        Ok(())
    }

    pub async fn book_count(&self) -> usize {
        self.tables.lock().await.books.len()
    }

    pub async fn category_count(&self) -> usize {
        self.tables.lock().await.categories.len()
    }

    /// Insert a row directly, bypassing the service and its cache.
    pub async fn seed(&self, name: &str, author: &str, category: &str) -> i64 {
        let mut tables = self.tables.lock().await;
        let category_id = tables.ensure_category(category);
        tables.next_book_id += 1;
        let id = tables.next_book_id;
        tables.books.insert(
            id,
            StoredBook {
                name: name.to_string(),
                author: author.to_string(),
                category_id: Some(category_id),
            },
        );
        id
    }
}

#[async_trait]
impl BooksRepo for InMemoryCatalog {
    async fn find_by_id(&self, id: i64) -> Result<Option<BookRecord>, RepoError> {
        self.check_read()?;
        self.reads_by_id.fetch_add(1, Ordering::SeqCst);
        let tables = self.tables.lock().await;
        Ok(tables.books.get(&id).map(|book| tables.record(id, book)))
    }

    async fn find_by_name_and_author(
        &self,
        name: &str,
        author: &str,
    ) -> Result<Option<BookRecord>, RepoError> {
        self.check_read()?;
        self.reads_by_name.fetch_add(1, Ordering::SeqCst);
        let tables = self.tables.lock().await;
        Ok(tables
            .books
            .iter()
            .find(|(_, book)| book.name == name && book.author == author)
            .map(|(id, book)| tables.record(*id, book)))
    }

    async fn list_by_category_name(&self, name: &str) -> Result<Vec<BookRecord>, RepoError> {
        self.check_read()?;
        self.reads_by_category.fetch_add(1, Ordering::SeqCst);
        let tables = self.tables.lock().await;
        Ok(tables
            .books
            .iter()
            .map(|(id, book)| tables.record(*id, book))
            .filter(|record| record.category_name() == Some(name))
            .collect())
    }
}

#[async_trait]
impl BooksWriteRepo for InMemoryCatalog {
    async fn create_book(&self, params: CreateBookParams) -> Result<BookRecord, RepoError> {
        let mut tables = self.tables.lock().await;
        // Checks run before any table changes, so a rejected write leaves no
        // category behind.
        if tables.conflicts(None, &params.name, &params.author) {
            return Err(RepoError::Duplicate {
                constraint: "books_name_author_key".to_string(),
            });
        }
        let category_id = tables.ensure_category(&params.category_name);
        tables.next_book_id += 1;
        let id = tables.next_book_id;
        let book = StoredBook {
            name: params.name,
            author: params.author,
            category_id: Some(category_id),
        };
        let record = tables.record(id, &book);
        tables.books.insert(id, book);
        Ok(record)
    }

    async fn update_book(&self, params: UpdateBookParams) -> Result<BookRecord, RepoError> {
        let mut tables = self.tables.lock().await;
        let Some(current) = tables.books.get(&params.id) else {
            return Err(RepoError::NotFound);
        };
        let current_category = current.category_id;
        if tables.conflicts(Some(params.id), &params.name, &params.author) {
            return Err(RepoError::Duplicate {
                constraint: "books_name_author_key".to_string(),
            });
        }
        let category_id = match params.category_name.as_deref() {
            Some(name) => Some(tables.ensure_category(name)),
            None => current_category,
        };
        let book = StoredBook {
            name: params.name,
            author: params.author,
            category_id,
        };
        let record = tables.record(params.id, &book);
        tables.books.insert(params.id, book);
        Ok(record)
    }

    async fn delete_book(&self, id: i64) -> Result<(), RepoError> {
        match self.tables.lock().await.books.remove(&id) {
            Some(_) => Ok(()),
            None => Err(RepoError::NotFound),
        }
    }
}

#[async_trait]
impl HealthRepo for InMemoryCatalog {
    async fn ping(&self) -> Result<(), RepoError> {
        if self.unhealthy.load(Ordering::SeqCst) {
            return Err(RepoError::from_persistence("connection refused"));
        }
        Ok(())
    }
}

pub struct Fixture {
    pub catalog: Arc<InMemoryCatalog>,
    pub store: Arc<MemoryCacheStore>,
    pub service: Arc<BookService>,
}

impl Fixture {
    pub fn new() -> Self {
        let catalog = Arc::new(InMemoryCatalog::default());
        let store = Arc::new(MemoryCacheStore::new(&CacheConfig::default()));
        let cache = QueryCache::new(store.clone());
        let service = Arc::new(BookService::new(catalog.clone(), catalog.clone(), cache));
        Self {
            catalog,
            store,
            service,
        }
    }

    pub fn cached_keys(&self) -> Vec<String> {
        let mut keys = self.store.keys();
        keys.sort();
        keys
    }

    pub fn is_cached(&self, key: &str) -> bool {
        self.store.keys().iter().any(|cached| cached == key)
    }
}
