//! Query and derivation layer.
//!
//! These functions sit between the HTTP handlers and the repository. They
//! enforce referential checks (a comic's series must exist), normalise
//! filters, and attach the derived `hasOnlineRead` flag to every series
//! they return. They work with any repository implementation.

use crate::db::repository::{FullRepository, RepositoryError, RepositoryResult};
use crate::models::{
    Comic, ComicPatch, EntityId, NewComic, NewSeries, Series, SeriesPatch, SeriesWithOnlineRead,
};

/// Check that the backing store answers.
pub async fn health_check<R: FullRepository + ?Sized>(repo: &R) -> RepositoryResult<bool> {
    repo.health_check().await
}

/// Attach `hasOnlineRead` to each series using one batched lookup.
pub async fn attach_online_read<R: FullRepository + ?Sized>(
    repo: &R,
    series: Vec<Series>,
) -> RepositoryResult<Vec<SeriesWithOnlineRead>> {
    if series.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<EntityId> = series.iter().map(|s| s.id).collect();
    let readable = repo.series_with_online_read(&ids).await?;

    Ok(series
        .into_iter()
        .map(|s| {
            let has_online_read = readable.contains(&s.id);
            SeriesWithOnlineRead {
                series: s,
                has_online_read,
            }
        })
        .collect())
}

async fn attach_one<R: FullRepository + ?Sized>(
    repo: &R,
    series: Series,
) -> RepositoryResult<SeriesWithOnlineRead> {
    let readable = repo.series_with_online_read(&[series.id]).await?;
    let has_online_read = readable.contains(&series.id);
    Ok(SeriesWithOnlineRead {
        series,
        has_online_read,
    })
}

/// All series, newest first. A blank publisher filter means no filter.
pub async fn list_series<R: FullRepository + ?Sized>(
    repo: &R,
    publisher: Option<&str>,
) -> RepositoryResult<Vec<SeriesWithOnlineRead>> {
    let publisher = publisher.map(str::trim).filter(|p| !p.is_empty());
    let series = repo.list_series(publisher).await?;
    attach_online_read(repo, series).await
}

/// Series whose name contains an already-validated search term.
pub async fn search_series<R: FullRepository + ?Sized>(
    repo: &R,
    term: &str,
) -> RepositoryResult<Vec<SeriesWithOnlineRead>> {
    let series = repo.search_series(term).await?;
    attach_online_read(repo, series).await
}

/// Most viewed series, at most `limit` of them.
pub async fn top_series<R: FullRepository + ?Sized>(
    repo: &R,
    limit: usize,
) -> RepositoryResult<Vec<SeriesWithOnlineRead>> {
    let series = repo.top_series(limit).await?;
    attach_online_read(repo, series).await
}

pub async fn get_series<R: FullRepository + ?Sized>(
    repo: &R,
    id: EntityId,
) -> RepositoryResult<SeriesWithOnlineRead> {
    let series = repo.get_series(id).await?;
    attach_one(repo, series).await
}

pub async fn create_series<R: FullRepository + ?Sized>(
    repo: &R,
    series: NewSeries,
) -> RepositoryResult<SeriesWithOnlineRead> {
    let stored = repo.insert_series(series).await?;
    attach_one(repo, stored).await
}

pub async fn update_series<R: FullRepository + ?Sized>(
    repo: &R,
    id: EntityId,
    patch: SeriesPatch,
) -> RepositoryResult<SeriesWithOnlineRead> {
    let updated = repo.update_series(id, patch).await?;
    attach_one(repo, updated).await
}

/// Count one more view. The increment itself is a single atomic store call.
pub async fn increment_series_views<R: FullRepository + ?Sized>(
    repo: &R,
    id: EntityId,
) -> RepositoryResult<SeriesWithOnlineRead> {
    let updated = repo.increment_series_views(id).await?;
    attach_one(repo, updated).await
}

/// Delete a series. Its comics stay behind.
pub async fn delete_series<R: FullRepository + ?Sized>(
    repo: &R,
    id: EntityId,
) -> RepositoryResult<()> {
    repo.delete_series(id).await
}

async fn ensure_series_exists<R: FullRepository + ?Sized>(
    repo: &R,
    id: EntityId,
    operation: &str,
) -> RepositoryResult<()> {
    if repo.series_exists(id).await? {
        Ok(())
    } else {
        Err(RepositoryError::series_not_found(operation, id))
    }
}

pub async fn list_comics<R: FullRepository + ?Sized>(
    repo: &R,
    limit: usize,
) -> RepositoryResult<Vec<Comic>> {
    repo.list_comics(limit).await
}

pub async fn get_comic<R: FullRepository + ?Sized>(
    repo: &R,
    id: EntityId,
) -> RepositoryResult<Comic> {
    repo.get_comic(id).await
}

/// Comics of a series, newest first. The series itself must exist.
pub async fn list_comics_for_series<R: FullRepository + ?Sized>(
    repo: &R,
    series_id: EntityId,
) -> RepositoryResult<Vec<Comic>> {
    ensure_series_exists(repo, series_id, "list_comics_for_series").await?;
    repo.list_comics_for_series(series_id).await
}

/// Create a comic once its series is known to exist.
pub async fn create_comic<R: FullRepository + ?Sized>(
    repo: &R,
    comic: NewComic,
) -> RepositoryResult<Comic> {
    ensure_series_exists(repo, comic.series_id, "create_comic").await?;
    repo.insert_comic(comic).await
}

/// Update a comic. A new series reference is checked before the write.
pub async fn update_comic<R: FullRepository + ?Sized>(
    repo: &R,
    id: EntityId,
    patch: ComicPatch,
) -> RepositoryResult<Comic> {
    if let Some(series_id) = patch.series_id {
        ensure_series_exists(repo, series_id, "update_comic").await?;
    }
    repo.update_comic(id, patch).await
}

pub async fn delete_comic<R: FullRepository + ?Sized>(
    repo: &R,
    id: EntityId,
) -> RepositoryResult<()> {
    repo.delete_comic(id).await
}
