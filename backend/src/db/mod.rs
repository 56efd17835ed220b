//! Catalog storage.
//!
//! Storage is reached through the Repository pattern so the backend can be
//! swapped without touching the HTTP layer.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  HTTP handlers (http::handlers)                         │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Service Layer (services.rs)                            │
//! │  - referential checks on series ids                     │
//! │  - hasOnlineRead derivation                             │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Repository Traits (repository/mod.rs)                  │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//!        ┌────────────┴─────────────┐
//!        │                          │
//! ┌──────▼───────────┐    ┌─────────▼────────┐
//! │ LocalRepository  │    │ PostgresRepository│
//! │   (in-memory)    │    │  (diesel + r2d2)  │
//! └──────────────────┘    └───────────────────┘
//! ```
//!
//! # Usage
//! ```ignore
//! use comics_catalog::db::{services, RepositoryFactory};
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let repo = RepositoryFactory::from_env().await?;
//!     let series = services::list_series(repo.as_ref(), None).await?;
//!     Ok(())
//! }
//! ```

#[cfg(not(any(feature = "postgres-repo", feature = "local-repo")))]
compile_error!("Enable at least one repository backend feature.");

pub mod factory;
pub mod repo_config;
pub mod repositories;
pub mod repository;
pub mod services;

// Postgres config is colocated with the repository implementation.
#[cfg(feature = "postgres-repo")]
pub use repositories::postgres::PostgresConfig;

pub use factory::{RepositoryFactory, RepositoryType};
pub use repo_config::RepositoryConfig;
pub use repositories::LocalRepository;
#[cfg(feature = "postgres-repo")]
pub use repositories::PostgresRepository;
pub use repository::{
    ComicRepository, ErrorContext, FullRepository, RepositoryError, RepositoryResult,
    SeriesRepository,
};
