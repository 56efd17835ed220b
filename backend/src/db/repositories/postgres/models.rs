use chrono::{DateTime, Utc};
use diesel::prelude::*;

use super::schema::{comics, series};
use crate::db::repository::{ErrorContext, RepositoryError, RepositoryResult};
use crate::models::{Comic, ComicPatch, EntityId, NewComic, NewSeries, Series, SeriesPatch};

fn parse_stored_id(raw: &str, column: &str) -> RepositoryResult<EntityId> {
    raw.parse().map_err(|e| {
        RepositoryError::internal_with_context(
            format!("Corrupt identifier in {}: {}", column, e),
            ErrorContext::new("decode_row").with_details(format!("value={}", raw)),
        )
    })
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = series)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SeriesRow {
    pub id: String,
    pub name: String,
    pub publisher: String,
    pub start_year: i32,
    pub end_year: Option<i32>,
    pub cover_url: String,
    pub views: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SeriesRow {
    pub fn into_series(self) -> RepositoryResult<Series> {
        Ok(Series {
            id: parse_stored_id(&self.id, "series.id")?,
            name: self.name,
            publisher: self.publisher,
            start_year: self.start_year,
            end_year: self.end_year,
            cover_url: self.cover_url,
            views: self.views.max(0) as u64,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = series)]
pub struct NewSeriesRow {
    pub id: String,
    pub name: String,
    pub publisher: String,
    pub start_year: i32,
    pub end_year: Option<i32>,
    pub cover_url: String,
    pub views: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NewSeriesRow {
    pub fn new(series: NewSeries, id: EntityId, now: DateTime<Utc>) -> Self {
        Self {
            id: id.to_hex(),
            name: series.name,
            publisher: series.publisher,
            start_year: series.start_year,
            end_year: series.end_year,
            cover_url: series.cover_url,
            views: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = series)]
pub struct SeriesChangeset {
    pub name: Option<String>,
    pub publisher: Option<String>,
    pub start_year: Option<i32>,
    pub end_year: Option<Option<i32>>,
    pub cover_url: Option<String>,
    pub views: Option<i64>,
    pub updated_at: DateTime<Utc>,
}

impl SeriesChangeset {
    pub fn new(patch: SeriesPatch, now: DateTime<Utc>) -> Self {
        Self {
            name: patch.name,
            publisher: patch.publisher,
            start_year: patch.start_year,
            end_year: patch.end_year,
            cover_url: patch.cover_url,
            views: patch.views.map(|v| i64::try_from(v).unwrap_or(i64::MAX)),
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = comics)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ComicRow {
    pub id: String,
    pub title: String,
    pub cover_url: String,
    pub download_urls: Vec<String>,
    pub pages: Vec<String>,
    pub online_read: bool,
    pub series_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ComicRow {
    pub fn into_comic(self) -> RepositoryResult<Comic> {
        Ok(Comic {
            id: parse_stored_id(&self.id, "comics.id")?,
            title: self.title,
            cover_url: self.cover_url,
            download_urls: self.download_urls,
            pages: self.pages,
            online_read: self.online_read,
            series_id: parse_stored_id(&self.series_id, "comics.series_id")?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = comics)]
pub struct NewComicRow {
    pub id: String,
    pub title: String,
    pub cover_url: String,
    pub download_urls: Vec<String>,
    pub pages: Vec<String>,
    pub online_read: bool,
    pub series_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NewComicRow {
    pub fn new(comic: NewComic, id: EntityId, now: DateTime<Utc>) -> Self {
        let online_read = comic.online_read();
        Self {
            id: id.to_hex(),
            title: comic.title,
            cover_url: comic.cover_url,
            download_urls: comic.download_urls,
            pages: comic.pages,
            online_read,
            series_id: comic.series_id.to_hex(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = comics)]
pub struct ComicChangeset {
    pub title: Option<String>,
    pub cover_url: Option<String>,
    pub download_urls: Option<Vec<String>>,
    pub pages: Option<Vec<String>>,
    pub online_read: Option<bool>,
    pub series_id: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl ComicChangeset {
    pub fn new(patch: ComicPatch, now: DateTime<Utc>) -> Self {
        Self {
            title: patch.title,
            cover_url: patch.cover_url,
            download_urls: patch.download_urls,
            pages: patch.pages,
            online_read: patch.online_read,
            series_id: patch.series_id.map(|id| id.to_hex()),
            updated_at: now,
        }
    }
}
