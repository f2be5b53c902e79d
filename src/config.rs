// Server configuration, read from command-line flags or the environment

use std::time::Duration;

use clap::Parser;

/// `host:port` string handed to the listener, e.g. `0.0.0.0:8070`
pub fn bind_address(host: &str, port: u16) -> String {
    format!("{}:{}", host, port)
}

/// Runtime configuration for the bookshelf server
///
/// Every field can be given as a flag or through its environment variable.
/// The binary loads a local `.env` file before parsing, so `MONGOURI` is
/// usually supplied there. Parsing fails (and the process exits) when it is
/// missing.
#[derive(Parser, Debug, Clone)]
#[command(name = "bookshelf-server")]
#[command(about = "GraphQL API over a MongoDB books collection")]
pub struct ServerConfig {
    /// MongoDB connection string
    #[arg(long, env = "MONGOURI", hide_env_values = true)]
    pub mongo_uri: String,

    /// Database holding the books collection
    #[arg(long, env = "MONGO_DATABASE", default_value = "graphql")]
    pub database: String,

    /// Collection storing book documents
    #[arg(long, env = "MONGO_COLLECTION", default_value = "books")]
    pub collection: String,

    /// Interface to bind
    #[arg(long, env = "SERVER_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "SERVER_PORT", default_value_t = 8070)]
    pub port: u16,

    /// Deadline for the initial database connection, in seconds
    #[arg(long, env = "CONNECT_TIMEOUT_SECS", default_value_t = 10)]
    pub connect_timeout_secs: u64,

    /// Deadline for each find / insert issued by a request, in seconds
    #[arg(long, env = "OPERATION_TIMEOUT_SECS", default_value_t = 10)]
    pub operation_timeout_secs: u64,

    /// Allow cross-origin requests from any origin
    #[arg(long, env = "CORS_ENABLED", default_value_t = true, action = clap::ArgAction::Set)]
    pub cors_enabled: bool,
}

impl ServerConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn operation_timeout(&self) -> Duration {
        Duration::from_secs(self.operation_timeout_secs)
    }

    pub fn bind_address(&self) -> String {
        bind_address(&self.host, self.port)
    }
}
