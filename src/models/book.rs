// Book records - the single entity stored in the `books` collection

use std::str::FromStr;

use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::{BookshelfError, Result};

/// **Book identifier** - the storage-native document id
///
/// Assigned when a book is created and never changed afterwards. On the wire
/// it travels as the 24-character hex form of the underlying ObjectId.
///
/// ```rust
/// # use bookshelf::BookId;
/// let id = BookId::new();
/// let parsed: BookId = id.to_string().parse().unwrap();
/// assert_eq!(id, parsed);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookId(ObjectId);

impl BookId {
    /// Generate a fresh, globally unique identifier
    pub fn new() -> Self {
        BookId(ObjectId::new())
    }

    pub fn object_id(&self) -> ObjectId {
        self.0
    }
}

impl Default for BookId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<ObjectId> for BookId {
    fn from(oid: ObjectId) -> Self {
        BookId(oid)
    }
}

impl FromStr for BookId {
    type Err = BookshelfError;

    /// Parse the wire form. Anything that is not exactly 24 hex digits is rejected.
    fn from_str(s: &str) -> Result<Self> {
        ObjectId::parse_str(s)
            .map(BookId)
            .map_err(|_| BookshelfError::InvalidArgument(format!("invalid book id: {:?}", s)))
    }
}

impl std::fmt::Display for BookId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_hex())
    }
}

/// A persisted book, in storage form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    #[serde(rename = "_id")]
    pub id: BookId,
    pub title: String,
    pub author: String,
}

impl Book {
    /// Assemble a storage record from a validated creation request
    pub fn from_new(id: BookId, new_book: NewBook) -> Self {
        Book {
            id,
            title: new_book.title,
            author: new_book.author,
        }
    }
}

/// Validated arguments for creating a book
///
/// Only constructible through [`NewBook::new`], which refuses blank fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    title: String,
    author: String,
}

impl NewBook {
    pub fn new(title: impl Into<String>, author: impl Into<String>) -> Result<Self> {
        let title = title.into();
        let author = author.into();

        if title.trim().is_empty() {
            return Err(BookshelfError::InvalidArgument(
                "title must not be empty".to_string(),
            ));
        }
        if author.trim().is_empty() {
            return Err(BookshelfError::InvalidArgument(
                "author must not be empty".to_string(),
            ));
        }

        Ok(NewBook { title, author })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author(&self) -> &str {
        &self.author
    }
}
