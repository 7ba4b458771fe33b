//! # cms-service
//!
//! REST backend for a content-management system, backed by PostgreSQL.
//!
//! ## Features
//!
//! - **Content model**: content types, posts with tags and media attachments,
//!   media metadata, tags, contact submissions and key/value settings
//! - **Listing**: pagination, per-entity filters and allow-listed sorting
//! - **Uniform responses**: every body is the `{success, data, error, meta}` envelope
//! - **Middleware stack**: request tracking, CORS, compression, timeouts, body
//!   size limits, panic recovery
//! - **Graceful shutdown**: SIGTERM/SIGINT drain with a bounded grace period
//!
//! ## Example
//!
//! ```rust,no_run
//! use cms_service::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = Config::load()?;
//!     init_tracing(&config);
//!
//!     let pool = create_pool(&config.database).await?;
//!     run_migrations(&pool).await?;
//!
//!     let app = router::build(AppState::new(config.clone(), pool));
//!     Server::new(config).serve(app).await
//! }
//! ```

pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod health;
pub mod middleware;
pub mod models;
pub mod observability;
pub mod repository;
pub mod router;
pub mod server;
pub mod state;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{Config, DatabaseConfig, MiddlewareConfig, ServiceConfig};
    pub use crate::database::{connect_lazy, create_pool, run_migrations};
    pub use crate::error::{Error, Result};
    pub use crate::handlers::{ApiError, ApiErrorKind, ApiResponse};
    pub use crate::health::health;
    pub use crate::observability::init_tracing;
    pub use crate::repository::{Repository, RepositoryError, RepositoryErrorKind};
    pub use crate::router;
    pub use crate::server::Server;
    pub use crate::state::AppState;
}
