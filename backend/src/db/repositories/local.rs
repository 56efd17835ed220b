//! In-memory repository for development and tests.
//!
//! Documents are kept in insertion order behind a single `RwLock`, which
//! gives the same per-document atomicity the persistent store provides:
//! every mutation (including the view counter) happens under one write lock.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;

use crate::db::repository::{ComicRepository, RepositoryError, RepositoryResult, SeriesRepository};
use crate::models::{Comic, ComicPatch, EntityId, NewComic, NewSeries, Series, SeriesPatch};
use crate::validation::MAX_VIEWS;

#[derive(Debug, Default)]
struct Collections {
    /// Insertion order.
    series: Vec<Series>,
    /// Insertion order.
    comics: Vec<Comic>,
}

/// Thread-safe in-memory catalog store.
#[derive(Debug, Clone, Default)]
pub struct LocalRepository {
    data: Arc<RwLock<Collections>>,
}

impl LocalRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn series_count(&self) -> usize {
        self.data.read().series.len()
    }

    pub fn comic_count(&self) -> usize {
        self.data.read().comics.len()
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Newest first; on equal timestamps the later insertion wins.
fn newest_first<T: Clone>(items: &[T], created_at: impl Fn(&T) -> chrono::DateTime<Utc>) -> Vec<T> {
    let mut out: Vec<T> = items.iter().rev().cloned().collect();
    out.sort_by(|a, b| created_at(b).cmp(&created_at(a)));
    out
}

#[async_trait]
impl SeriesRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(true)
    }

    async fn insert_series(&self, series: NewSeries) -> RepositoryResult<Series> {
        let stored = series.into_series(EntityId::generate(), Utc::now());
        self.data.write().series.push(stored.clone());
        Ok(stored)
    }

    async fn get_series(&self, id: EntityId) -> RepositoryResult<Series> {
        self.data
            .read()
            .series
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or_else(|| RepositoryError::series_not_found("get_series", id))
    }

    async fn series_exists(&self, id: EntityId) -> RepositoryResult<bool> {
        Ok(self.data.read().series.iter().any(|s| s.id == id))
    }

    async fn list_series(&self, publisher: Option<&str>) -> RepositoryResult<Vec<Series>> {
        let data = self.data.read();
        let matching: Vec<Series> = data
            .series
            .iter()
            .filter(|s| publisher.map_or(true, |p| contains_ignore_case(&s.publisher, p)))
            .cloned()
            .collect();
        Ok(newest_first(&matching, |s| s.created_at))
    }

    async fn search_series(&self, term: &str) -> RepositoryResult<Vec<Series>> {
        Ok(self
            .data
            .read()
            .series
            .iter()
            .filter(|s| contains_ignore_case(&s.name, term))
            .cloned()
            .collect())
    }

    async fn top_series(&self, limit: usize) -> RepositoryResult<Vec<Series>> {
        let data = self.data.read();
        let mut ranked = newest_first(&data.series, |s| s.created_at);
        ranked.sort_by(|a, b| b.views.cmp(&a.views));
        ranked.truncate(limit);
        Ok(ranked)
    }

    async fn update_series(&self, id: EntityId, patch: SeriesPatch) -> RepositoryResult<Series> {
        let mut data = self.data.write();
        let series = data
            .series
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| RepositoryError::series_not_found("update_series", id))?;
        patch.apply_to(series, Utc::now());
        Ok(series.clone())
    }

    async fn increment_series_views(&self, id: EntityId) -> RepositoryResult<Series> {
        let mut data = self.data.write();
        let series = data
            .series
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| RepositoryError::series_not_found("increment_series_views", id))?;
        series.views = series
            .views
            .checked_add(1)
            .filter(|views| *views <= MAX_VIEWS)
            .ok_or_else(|| {
                RepositoryError::validation("View count cannot be incremented further")
                    .with_operation("increment_series_views")
            })?;
        series.updated_at = Utc::now();
        Ok(series.clone())
    }

    async fn delete_series(&self, id: EntityId) -> RepositoryResult<()> {
        let mut data = self.data.write();
        let before = data.series.len();
        data.series.retain(|s| s.id != id);
        if data.series.len() == before {
            return Err(RepositoryError::series_not_found("delete_series", id));
        }
        Ok(())
    }
}

#[async_trait]
impl ComicRepository for LocalRepository {
    async fn insert_comic(&self, comic: NewComic) -> RepositoryResult<Comic> {
        let stored = comic.into_comic(EntityId::generate(), Utc::now());
        self.data.write().comics.push(stored.clone());
        Ok(stored)
    }

    async fn get_comic(&self, id: EntityId) -> RepositoryResult<Comic> {
        self.data
            .read()
            .comics
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| RepositoryError::comic_not_found("get_comic", id))
    }

    async fn list_comics(&self, limit: usize) -> RepositoryResult<Vec<Comic>> {
        let mut comics = newest_first(&self.data.read().comics, |c| c.created_at);
        comics.truncate(limit);
        Ok(comics)
    }

    async fn list_comics_for_series(&self, series_id: EntityId) -> RepositoryResult<Vec<Comic>> {
        let data = self.data.read();
        let owned: Vec<Comic> = data
            .comics
            .iter()
            .filter(|c| c.series_id == series_id)
            .cloned()
            .collect();
        Ok(newest_first(&owned, |c| c.created_at))
    }

    async fn update_comic(&self, id: EntityId, patch: ComicPatch) -> RepositoryResult<Comic> {
        let mut data = self.data.write();
        let comic = data
            .comics
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| RepositoryError::comic_not_found("update_comic", id))?;
        patch.apply_to(comic, Utc::now());
        Ok(comic.clone())
    }

    async fn delete_comic(&self, id: EntityId) -> RepositoryResult<()> {
        let mut data = self.data.write();
        let before = data.comics.len();
        data.comics.retain(|c| c.id != id);
        if data.comics.len() == before {
            return Err(RepositoryError::comic_not_found("delete_comic", id));
        }
        Ok(())
    }

    async fn series_with_online_read(
        &self,
        series_ids: &[EntityId],
    ) -> RepositoryResult<HashSet<EntityId>> {
        let wanted: HashSet<EntityId> = series_ids.iter().copied().collect();
        Ok(self
            .data
            .read()
            .comics
            .iter()
            .filter(|c| wanted.contains(&c.series_id) && c.qualifies_for_online_read())
            .map(|c| c.series_id)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_series(name: &str, publisher: &str) -> NewSeries {
        NewSeries {
            name: name.to_string(),
            publisher: publisher.to_string(),
            start_year: 2000,
            end_year: None,
            cover_url: format!("https://covers.example/{}.jpg", name),
        }
    }

    fn new_comic(series_id: EntityId, pages: &[&str]) -> NewComic {
        NewComic {
            title: "Issue".to_string(),
            cover_url: "c.jpg".to_string(),
            download_urls: vec!["d.cbz".to_string()],
            pages: pages.iter().map(|p| p.to_string()).collect(),
            series_id,
        }
    }

    #[tokio::test]
    async fn list_is_newest_first_and_filters_publisher() {
        let repo = LocalRepository::new();
        repo.insert_series(new_series("Saga", "Image")).await.unwrap();
        repo.insert_series(new_series("Batman", "DC Comics")).await.unwrap();
        repo.insert_series(new_series("Monstress", "Image")).await.unwrap();

        let all = repo.list_series(None).await.unwrap();
        let names: Vec<&str> = all.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Monstress", "Batman", "Saga"]);

        let image = repo.list_series(Some("imA")).await.unwrap();
        let names: Vec<&str> = image.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Monstress", "Saga"]);
    }

    #[tokio::test]
    async fn search_keeps_store_order() {
        let repo = LocalRepository::new();
        repo.insert_series(new_series("Spider-Man", "Marvel")).await.unwrap();
        repo.insert_series(new_series("Saga", "Image")).await.unwrap();
        repo.insert_series(new_series("Superman", "DC")).await.unwrap();

        let found = repo.search_series("MAN").await.unwrap();
        let names: Vec<&str> = found.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Spider-Man", "Superman"]);
    }

    #[tokio::test]
    async fn top_orders_by_views_and_truncates() {
        let repo = LocalRepository::new();
        let a = repo.insert_series(new_series("A", "P")).await.unwrap();
        let b = repo.insert_series(new_series("B", "P")).await.unwrap();
        repo.insert_series(new_series("C", "P")).await.unwrap();

        for _ in 0..3 {
            repo.increment_series_views(b.id).await.unwrap();
        }
        repo.increment_series_views(a.id).await.unwrap();

        let top = repo.top_series(2).await.unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].name, "B");
        assert_eq!(top[0].views, 3);
        assert_eq!(top[1].name, "A");
    }

    #[tokio::test]
    async fn saturated_view_count_is_rejected_not_wrapped() {
        let repo = LocalRepository::new();
        let series = repo.insert_series(new_series("Max", "P")).await.unwrap();
        repo.update_series(
            series.id,
            SeriesPatch {
                views: Some(MAX_VIEWS),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let err = repo.increment_series_views(series.id).await.unwrap_err();
        assert!(matches!(err, RepositoryError::ValidationError { .. }));
        assert_eq!(repo.get_series(series.id).await.unwrap().views, MAX_VIEWS);
    }

    #[tokio::test]
    async fn missing_documents_report_not_found() {
        let repo = LocalRepository::new();
        let id = EntityId::generate();

        assert!(repo.get_series(id).await.unwrap_err().is_not_found());
        assert!(repo.delete_series(id).await.unwrap_err().is_not_found());
        assert!(repo.increment_series_views(id).await.unwrap_err().is_not_found());
        assert!(repo
            .update_comic(id, ComicPatch::default())
            .await
            .unwrap_err()
            .is_not_found());
        assert!(!repo.series_exists(id).await.unwrap());
    }

    #[tokio::test]
    async fn online_read_lookup_requires_flag_and_pages() {
        let repo = LocalRepository::new();
        let readable = repo.insert_series(new_series("Readable", "P")).await.unwrap();
        let download_only = repo.insert_series(new_series("Download", "P")).await.unwrap();
        let cleared = repo.insert_series(new_series("Cleared", "P")).await.unwrap();

        repo.insert_comic(new_comic(readable.id, &["1.jpg"])).await.unwrap();
        repo.insert_comic(new_comic(download_only.id, &[])).await.unwrap();
        let comic = repo.insert_comic(new_comic(cleared.id, &["1.jpg"])).await.unwrap();
        repo.update_comic(
            comic.id,
            ComicPatch {
                pages: Some(vec![]),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let found = repo
            .series_with_online_read(&[readable.id, download_only.id, cleared.id])
            .await
            .unwrap();
        assert_eq!(found, HashSet::from([readable.id]));
    }

    #[tokio::test]
    async fn deleting_series_leaves_comics() {
        let repo = LocalRepository::new();
        let series = repo.insert_series(new_series("Saga", "Image")).await.unwrap();
        repo.insert_comic(new_comic(series.id, &[])).await.unwrap();

        repo.delete_series(series.id).await.unwrap();
        assert_eq!(repo.series_count(), 0);
        assert_eq!(repo.comic_count(), 1);
        assert_eq!(repo.list_comics_for_series(series.id).await.unwrap().len(), 1);
    }
}
