//! Repository traits for the catalog store.
//!
//! The store is split along its two collections:
//! - [`SeriesRepository`]: series documents and the atomic view counter
//! - [`ComicRepository`]: comic documents and the online-read lookup
//!
//! [`FullRepository`] is what the application holds; every type that
//! implements both halves gets it for free.

pub mod error;

use std::collections::HashSet;

use async_trait::async_trait;

use crate::models::{Comic, ComicPatch, EntityId, NewComic, NewSeries, Series, SeriesPatch};

pub use error::{ErrorContext, RepositoryError, RepositoryResult};

/// Operations on the series collection.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to be shared across request handlers.
#[async_trait]
pub trait SeriesRepository: Send + Sync {
    /// Check that the store is reachable.
    async fn health_check(&self) -> RepositoryResult<bool>;

    /// Insert a series and return the stored document.
    async fn insert_series(&self, series: NewSeries) -> RepositoryResult<Series>;

    /// Fetch one series.
    ///
    /// # Errors
    /// `RepositoryError::NotFound` if no series has this id.
    async fn get_series(&self, id: EntityId) -> RepositoryResult<Series>;

    /// Whether a series with this id exists.
    async fn series_exists(&self, id: EntityId) -> RepositoryResult<bool>;

    /// All series, newest first, optionally filtered by a case-insensitive
    /// substring of the publisher.
    async fn list_series(&self, publisher: Option<&str>) -> RepositoryResult<Vec<Series>>;

    /// Series whose name contains `term` (case-insensitive), in store order.
    async fn search_series(&self, term: &str) -> RepositoryResult<Vec<Series>>;

    /// Up to `limit` series ordered by views, highest first.
    async fn top_series(&self, limit: usize) -> RepositoryResult<Vec<Series>>;

    /// Merge `patch` into a series.
    ///
    /// # Errors
    /// `RepositoryError::NotFound` if no series has this id.
    async fn update_series(&self, id: EntityId, patch: SeriesPatch) -> RepositoryResult<Series>;

    /// Atomically add one to a series' view counter and return the result.
    ///
    /// # Errors
    /// `RepositoryError::NotFound` if no series has this id.
    async fn increment_series_views(&self, id: EntityId) -> RepositoryResult<Series>;

    /// Remove a series. Comics referencing it are left in place.
    ///
    /// # Errors
    /// `RepositoryError::NotFound` if no series has this id.
    async fn delete_series(&self, id: EntityId) -> RepositoryResult<()>;
}

/// Operations on the comics collection.
#[async_trait]
pub trait ComicRepository: Send + Sync {
    /// Insert a comic and return the stored document.
    async fn insert_comic(&self, comic: NewComic) -> RepositoryResult<Comic>;

    /// Fetch one comic.
    ///
    /// # Errors
    /// `RepositoryError::NotFound` if no comic has this id.
    async fn get_comic(&self, id: EntityId) -> RepositoryResult<Comic>;

    /// Up to `limit` comics, newest first.
    async fn list_comics(&self, limit: usize) -> RepositoryResult<Vec<Comic>>;

    /// Comics referencing `series_id`, newest first.
    async fn list_comics_for_series(&self, series_id: EntityId) -> RepositoryResult<Vec<Comic>>;

    /// Merge `patch` into a comic.
    ///
    /// # Errors
    /// `RepositoryError::NotFound` if no comic has this id.
    async fn update_comic(&self, id: EntityId, patch: ComicPatch) -> RepositoryResult<Comic>;

    /// Remove a comic.
    ///
    /// # Errors
    /// `RepositoryError::NotFound` if no comic has this id.
    async fn delete_comic(&self, id: EntityId) -> RepositoryResult<()>;

    /// The subset of `series_ids` that own at least one comic with
    /// `online_read = true` and a non-empty page list.
    ///
    /// One store round trip regardless of how many ids are asked about.
    async fn series_with_online_read(
        &self,
        series_ids: &[EntityId],
    ) -> RepositoryResult<HashSet<EntityId>>;
}

/// Combined repository handle used by the application.
pub trait FullRepository: SeriesRepository + ComicRepository {}

impl<T> FullRepository for T where T: SeriesRepository + ComicRepository {}
