// Engine layer: GraphQL schema and storage backends

//! # Bookshelf Engine
//!
//! - [`graphql`]: schema declaration and the three resolvers
//! - [`storage`]: the [`BookStorage`] seam and an in-memory backend
//! - [`mongo_storage`]: the MongoDB backend used in production
//!
//! The schema never reaches for a global collection handle. The storage
//! backend is handed to [`create_schema_with_storage`] and read back by each
//! resolver from the schema's data.

pub mod graphql;

pub mod storage;

pub mod mongo_storage;

pub use graphql::{
    create_schema_with_storage, // Build the schema around a storage backend
    execute,                    // Run one operation string against a schema
    BookGQL,                    // Wire representation of a book
    BookInput,                  // createBook input object
    BookshelfSchema,            // Complete schema type
    Mutation,
    Query,
};

pub use storage::{BookStorage, InMemoryBookStorage};

pub use mongo_storage::MongoBookStorage;
