// Domain models for the bookshelf service
// Storage-facing types only; GraphQL wire types live in `engine::graphql`

//! # Domain Models
//!
//! A book has two shapes:
//! - **Storage form** ([`Book`]): identifier is a native [`BookId`], serialized as `_id`
//! - **Wire form** (`engine::graphql::BookGQL`): every field, identifier included, is a string
//!
//! Converting storage to wire is a lossless stringification. Converting a wire
//! identifier back (the `FromStr` impl on [`BookId`]) validates the format.

pub mod book;

pub use book::{Book, BookId, NewBook};
