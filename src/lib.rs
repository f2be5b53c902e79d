// Bookshelf - GraphQL over a document collection
// A single /graphql endpoint serving reads and writes against the `books` collection

//! # Bookshelf Library
//!
//! This is the library crate behind the `server` binary. It exposes a small
//! GraphQL API (`book`, `books`, `createBook`) backed by a document database.
//!
//! ## Core Components
//!
//! ### Domain Models
//! - [`Book`]: A stored book record (identifier, title, author)
//! - [`BookId`]: The storage-native identifier, rendered as a hex string on the wire
//! - [`NewBook`]: A validated `createBook` argument
//!
//! ### GraphQL Engine
//! [`create_schema_with_storage`] builds the schema once per process. Each resolver
//! performs exactly one storage call and turns its outcome into a field value or
//! a coded GraphQL error.
//!
//! ### Storage Layer
//! [`BookStorage`] abstracts persistence. [`MongoBookStorage`] talks to the real
//! database; [`InMemoryBookStorage`] backs tests and local experiments.
//!
//! ### Server
//! [`GraphQLServerBuilder`] wires the schema into an Axum router and serves it.
//!
//! ## Request Flow
//!
//! ```text
//! HTTP POST /graphql
//!   ↓ decode body, extract `query`
//! server::graphql::graphql_handler
//!   ↓ execute
//! engine::graphql (Query / Mutation resolvers)
//!   ↓ one call
//! BookStorage (MongoDB or in-memory)
//! ```

// Core domain models
pub mod models;

// GraphQL schema and storage backends
pub mod engine;

// HTTP server and request dispatch
pub mod server;

// Command-line / environment configuration
pub mod config;

pub use models::{Book, BookId, NewBook};

pub use engine::{
    graphql::{create_schema_with_storage, execute, BookGQL, BookInput, BookshelfSchema},
    mongo_storage::MongoBookStorage,
    storage::{BookStorage, InMemoryBookStorage},
};

pub use config::ServerConfig;
pub use server::graphql::GraphQLServerBuilder;

use async_graphql::ErrorExtensions;
use thiserror::Error;

/// Errors raised while resolving book operations
///
/// ## Propagation
///
/// None of these ever change the HTTP status of a GraphQL response. Resolvers
/// convert them into field errors through [`ErrorExtensions`], which attaches
/// a machine-readable `code` to the error's `extensions` map.
#[derive(Error, Debug)]
pub enum BookshelfError {
    /// An argument had the right GraphQL type but an unusable value
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A point lookup matched no document
    #[error("Not found: {0}")]
    NotFound(String),

    /// A stored document could not be decoded into a book
    #[error("Decode error: {0}")]
    Decode(String),

    /// Any other storage driver failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// A storage call exceeded its deadline
    #[error("Timed out after {after:?} during {operation}")]
    Timeout {
        operation: &'static str,
        after: std::time::Duration,
    },

    /// Startup configuration is missing or unusable
    #[error("Configuration error: {0}")]
    Config(String),
}

impl BookshelfError {
    /// Error code reported in the GraphQL `extensions.code` field
    pub fn code(&self) -> &'static str {
        match self {
            BookshelfError::InvalidArgument(_) => "INVALID_ARGUMENT",
            BookshelfError::NotFound(_) => "NOT_FOUND",
            BookshelfError::Decode(_) => "DECODE_ERROR",
            BookshelfError::Storage(_) => "STORAGE_ERROR",
            BookshelfError::Timeout { .. } => "TIMEOUT",
            BookshelfError::Config(_) => "INTERNAL",
        }
    }
}

impl ErrorExtensions for BookshelfError {
    fn extend(&self) -> async_graphql::Error {
        async_graphql::Error::new(self.to_string()).extend_with(|_, e| e.set("code", self.code()))
    }
}

impl From<mongodb::error::Error> for BookshelfError {
    fn from(err: mongodb::error::Error) -> Self {
        match err.kind.as_ref() {
            mongodb::error::ErrorKind::BsonDeserialization(e) => {
                BookshelfError::Decode(e.to_string())
            }
            _ => BookshelfError::Storage(err.to_string()),
        }
    }
}

/// Type alias for Results that use our custom error type
pub type Result<T> = std::result::Result<T, BookshelfError>;
