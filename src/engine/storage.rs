// Storage abstraction for the bookshelf engine
// This defines the interface resolvers use to read and write books

//! # Storage Abstraction Layer
//!
//! Resolvers never talk to a database driver directly. They go through the
//! [`BookStorage`] trait, which the schema receives at construction time.
//!
//! ## Implementations
//!
//! - **[`InMemoryBookStorage`]**: insertion-ordered vector, for tests and local runs
//! - **[`MongoBookStorage`](crate::engine::mongo_storage::MongoBookStorage)**: the real collection
//!
//! ## Thread Safety
//!
//! A single storage value is shared by every request task, so implementations
//! must be `Send + Sync`. The in-memory backend uses a tokio `RwLock`; the
//! MongoDB driver's collection handle is already safe to share.

use tokio::sync::RwLock;

use crate::models::{Book, BookId};
use crate::{BookshelfError, Result};

/// Storage trait for book persistence
///
/// Each method maps to exactly one database call.
///
/// ## Return Values
///
/// `get_book` returns `Result<Option<Book>>`:
/// - `Ok(Some(book))`: found
/// - `Ok(None)`: no document with that id (the caller decides whether that is an error)
/// - `Err(error)`: the lookup itself failed
#[async_trait::async_trait]
pub trait BookStorage: Send + Sync {
    /// Find a single book by identifier
    async fn get_book(&self, id: &BookId) -> Result<Option<Book>>;

    /// Load every book in the collection
    ///
    /// No filter, no sort, no pagination. Order is whatever the backend yields.
    async fn list_books(&self) -> Result<Vec<Book>>;

    /// Insert a new book
    ///
    /// Returns the identifier the backend acknowledged for the stored document.
    async fn insert_book(&self, book: &Book) -> Result<BookId>;
}

/// In-memory storage implementation for development and testing
///
/// Books are kept in insertion order, so `list_books` is deterministic here
/// even though callers must not rely on ordering in general.
#[derive(Default)]
pub struct InMemoryBookStorage {
    books: RwLock<Vec<Book>>,
}

impl InMemoryBookStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored books
    pub async fn len(&self) -> usize {
        self.books.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.books.read().await.is_empty()
    }
}

#[async_trait::async_trait]
impl BookStorage for InMemoryBookStorage {
    async fn get_book(&self, id: &BookId) -> Result<Option<Book>> {
        let books = self.books.read().await;
        Ok(books.iter().find(|book| &book.id == id).cloned())
    }

    async fn list_books(&self) -> Result<Vec<Book>> {
        Ok(self.books.read().await.clone())
    }

    async fn insert_book(&self, book: &Book) -> Result<BookId> {
        let mut books = self.books.write().await;

        // Mirrors the unique index on `_id`
        if books.iter().any(|existing| existing.id == book.id) {
            return Err(BookshelfError::Storage(format!(
                "duplicate key: book {} already exists",
                book.id
            )));
        }

        books.push(book.clone());
        Ok(book.id)
    }
}
