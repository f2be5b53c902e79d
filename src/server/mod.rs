// Bookshelf server implementations
// This exposes the GraphQL engine over HTTP

//! # Bookshelf Server Module
//!
//! The server layer sits on top of the engine layer:
//! ```text
//! Client
//!        ↓ HTTP POST /graphql
//! Server Layer (this module) ← body decoding, status codes, content types
//!        ↓ Function calls
//! Engine Layer ← GraphQL schema, storage abstraction
//! ```
//!
//! Transport problems (undecodable body, no query) are answered here with
//! `400 Bad Request` and never reach the schema. Everything the schema
//! returns, errors included, goes back as `200 OK`.

/// GraphQL HTTP server implementation
pub mod graphql;
