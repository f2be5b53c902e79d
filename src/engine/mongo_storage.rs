// MongoDB storage backend
// Implements BookStorage on top of a single driver collection handle

//! # MongoDB Storage
//!
//! [`MongoBookStorage`] owns a typed `Collection<Book>`. The driver keeps its
//! own connection pool behind that handle, so one instance is created at
//! startup and shared by every request.
//!
//! Each call is wrapped in a deadline ([`ServerConfig::operation_timeout`]) so
//! a stalled database cannot hold a request task forever.

use std::future::Future;
use std::time::Duration;

use futures::TryStreamExt;
use mongodb::{
    bson::{doc, Document},
    options::ClientOptions,
    Client, Collection,
};
use tracing::{debug, info};

use crate::config::ServerConfig;
use crate::engine::storage::BookStorage;
use crate::models::{Book, BookId};
use crate::{BookshelfError, Result};

pub struct MongoBookStorage {
    collection: Collection<Book>,
    operation_timeout: Duration,
}

impl MongoBookStorage {
    /// Wrap an existing collection handle
    pub fn new(collection: Collection<Book>, operation_timeout: Duration) -> Self {
        Self {
            collection,
            operation_timeout,
        }
    }

    /// Connect using the server configuration
    ///
    /// Fails if the connection string is invalid or the database does not
    /// answer a `ping` within the connect timeout.
    pub async fn connect(config: &ServerConfig) -> Result<Self> {
        let connect_timeout = config.connect_timeout();

        let mut options = ClientOptions::parse(&config.mongo_uri)
            .await
            .map_err(|e| BookshelfError::Config(format!("invalid MONGOURI: {}", e)))?;
        options.app_name = Some("bookshelf".to_string());
        options.connect_timeout = Some(connect_timeout);
        options.server_selection_timeout = Some(connect_timeout);

        let client = Client::with_options(options)?;
        let database = client.database(&config.database);

        tokio::time::timeout(connect_timeout, database.run_command(doc! { "ping": 1 }, None))
            .await
            .map_err(|_| BookshelfError::Timeout {
                operation: "connect",
                after: connect_timeout,
            })??;

        info!(
            "Connected to MongoDB, using {}.{}",
            config.database, config.collection
        );

        Ok(Self::new(
            database.collection::<Book>(&config.collection),
            config.operation_timeout(),
        ))
    }

    async fn with_deadline<T, F>(&self, operation: &'static str, fut: F) -> Result<T>
    where
        F: Future<Output = mongodb::error::Result<T>>,
    {
        match tokio::time::timeout(self.operation_timeout, fut).await {
            Ok(result) => result.map_err(BookshelfError::from),
            Err(_) => Err(BookshelfError::Timeout {
                operation,
                after: self.operation_timeout,
            }),
        }
    }
}

fn id_filter(id: &BookId) -> Document {
    doc! { "_id": id.object_id() }
}

#[async_trait::async_trait]
impl BookStorage for MongoBookStorage {
    async fn get_book(&self, id: &BookId) -> Result<Option<Book>> {
        debug!("find_one _id={}", id);
        self.with_deadline("find_one", self.collection.find_one(id_filter(id), None))
            .await
    }

    async fn list_books(&self) -> Result<Vec<Book>> {
        // The cursor is dropped on every path out of this future, which closes
        // it on the server.
        self.with_deadline("find", async {
            let cursor = self.collection.find(doc! {}, None).await?;
            cursor.try_collect::<Vec<Book>>().await
        })
        .await
    }

    async fn insert_book(&self, book: &Book) -> Result<BookId> {
        let result = self
            .with_deadline("insert_one", self.collection.insert_one(book, None))
            .await?;

        result
            .inserted_id
            .as_object_id()
            .map(BookId::from)
            .ok_or_else(|| {
                BookshelfError::Storage(format!(
                    "insert acknowledged a non-ObjectId _id: {}",
                    result.inserted_id
                ))
            })
    }
}
