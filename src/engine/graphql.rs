// GraphQL API for the bookshelf engine
// Declares the schema and binds `book`, `books` and `createBook` to storage calls

use std::sync::Arc;

use async_graphql::{
    Context, EmptySubscription, ErrorExtensions, InputObject, Object, PathSegment, Schema,
    SimpleObject, ID,
};
use tracing::{debug, error};

use crate::engine::storage::BookStorage;
use crate::models::{Book, BookId, NewBook};
use crate::BookshelfError;

// GraphQL types - these are the API representations of our domain models

/// Wire form of a book: every field is a string
#[derive(SimpleObject, Debug, Clone, PartialEq)]
#[graphql(name = "Book")]
pub struct BookGQL {
    pub id: ID,
    pub title: String,
    pub author: String,
}

impl From<Book> for BookGQL {
    fn from(book: Book) -> Self {
        BookGQL {
            id: ID(book.id.to_string()),
            title: book.title,
            author: book.author,
        }
    }
}

// Input types for mutations

/// Arguments for `createBook`. Both fields are required at the schema
/// boundary, so a missing one fails validation before any resolver runs.
#[derive(InputObject, Debug)]
pub struct BookInput {
    pub title: String,
    pub author: String,
}

impl TryFrom<BookInput> for NewBook {
    type Error = BookshelfError;

    fn try_from(input: BookInput) -> Result<Self, Self::Error> {
        NewBook::new(input.title, input.author)
    }
}

fn storage<'a>(ctx: &Context<'a>) -> async_graphql::Result<&'a Arc<dyn BookStorage>> {
    ctx.data::<Arc<dyn BookStorage>>()
}

/// Record `err` against the field being resolved and null only that field.
///
/// Returning `Err` from a root resolver discards the whole `data` object, so
/// the nullable fields report through the context instead and let their
/// siblings resolve.
fn field_error<T>(ctx: &Context<'_>, err: BookshelfError) -> Option<T> {
    let mut server_error = err.extend().into_server_error(ctx.item.pos);
    server_error.path = vec![PathSegment::Field(
        ctx.item.node.response_key().node.to_string(),
    )];
    ctx.add_error(server_error);
    None
}

// GraphQL Query root
pub struct Query;

#[Object]
impl Query {
    /// Get a book by ID
    async fn book(&self, ctx: &Context<'_>, id: ID) -> async_graphql::Result<Option<BookGQL>> {
        let storage = storage(ctx)?;
        let book_id: BookId = match id.as_str().parse() {
            Ok(book_id) => book_id,
            Err(e) => return Ok(field_error(ctx, e)),
        };

        match storage.get_book(&book_id).await {
            Ok(Some(book)) => Ok(Some(BookGQL::from(book))),
            Ok(None) => {
                debug!("No book with id {}", book_id);
                Ok(field_error(
                    ctx,
                    BookshelfError::NotFound(format!("book {}", book_id)),
                ))
            }
            Err(e) => {
                error!("Error finding book by ID {}: {}", book_id, e);
                Ok(field_error(ctx, e))
            }
        }
    }

    /// List every book in the collection
    async fn books(&self, ctx: &Context<'_>) -> async_graphql::Result<Option<Vec<BookGQL>>> {
        let storage = storage(ctx)?;
        match storage.list_books().await {
            Ok(books) => Ok(Some(books.into_iter().map(BookGQL::from).collect())),
            Err(e) => {
                error!("Error listing books: {}", e);
                Ok(field_error(ctx, e))
            }
        }
    }
}

// GraphQL Mutation root
pub struct Mutation;

#[Object]
impl Mutation {
    /// Create a new book
    async fn create_book(
        &self,
        ctx: &Context<'_>,
        input: Option<BookInput>,
    ) -> async_graphql::Result<Option<BookGQL>> {
        let storage = storage(ctx)?;

        let Some(input) = input else {
            return Ok(field_error(
                ctx,
                BookshelfError::InvalidArgument(
                    "createBook requires an input object".to_string(),
                ),
            ));
        };
        let new_book = match NewBook::try_from(input) {
            Ok(new_book) => new_book,
            Err(e) => return Ok(field_error(ctx, e)),
        };

        let mut book = Book::from_new(BookId::new(), new_book);
        match storage.insert_book(&book).await {
            Ok(acknowledged_id) => {
                // Report the id the database actually stored
                book.id = acknowledged_id;
                debug!("Created book {}", book.id);
                Ok(Some(BookGQL::from(book)))
            }
            Err(e) => {
                error!("Error creating a new book: {}", e);
                Ok(field_error(ctx, e))
            }
        }
    }
}

// Schema type and creation functions
pub type BookshelfSchema = Schema<Query, Mutation, EmptySubscription>;

/// Create schema with storage backend
pub fn create_schema_with_storage(storage: Arc<dyn BookStorage>) -> BookshelfSchema {
    Schema::build(Query, Mutation, EmptySubscription)
        .data(storage)
        .finish()
}

/// Run one operation string and return the `{ data, errors }` envelope
///
/// Parse and validation failures come back as an envelope with `data: null`
/// and no resolver invoked.
pub async fn execute(
    schema: &BookshelfSchema,
    query: impl Into<String>,
) -> async_graphql::Response {
    schema.execute(query.into()).await
}
