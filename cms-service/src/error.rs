//! Process-level errors raised while starting or running the service
//!
//! Request-level failures live in [`crate::handlers::ApiError`]; this type
//! covers everything that happens outside a request: loading configuration,
//! connecting to PostgreSQL, running migrations, binding the listener.

use thiserror::Error;

/// Startup and runtime errors
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be loaded or deserialized
    #[error("Configuration error: {0}")]
    Config(Box<figment::Error>),

    /// Configuration loaded but holds an unusable value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The connection pool could not be established
    #[error("Failed to connect to database at '{url}' ({category}): {source}")]
    DatabaseConnect {
        /// Connection URL with the password masked
        url: String,
        /// Short human-readable classification of the failure
        category: &'static str,
        /// Underlying driver error
        #[source]
        source: sqlx::Error,
    },

    /// Schema migrations failed
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// I/O error (binding the listener, serving connections)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

/// Result alias for process-level operations
pub type Result<T> = std::result::Result<T, Error>;
