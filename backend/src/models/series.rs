//! Series documents and their write models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::EntityId;

/// A comic-book title or run; the top-level catalog entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Series {
    pub id: EntityId,
    pub name: String,
    pub publisher: String,
    pub start_year: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_year: Option<i32>,
    pub cover_url: String,
    #[serde(default)]
    pub views: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A series as returned by read endpoints, with the derived online-read flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesWithOnlineRead {
    #[serde(flatten)]
    pub series: Series,
    pub has_online_read: bool,
}

/// Validated input for inserting a series.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSeries {
    pub name: String,
    pub publisher: String,
    pub start_year: i32,
    pub end_year: Option<i32>,
    pub cover_url: String,
}

impl NewSeries {
    /// Materialise the document the store will persist.
    pub fn into_series(self, id: EntityId, now: DateTime<Utc>) -> Series {
        Series {
            id,
            name: self.name,
            publisher: self.publisher,
            start_year: self.start_year,
            end_year: self.end_year,
            cover_url: self.cover_url,
            views: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update for a series. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesPatch {
    pub name: Option<String>,
    pub publisher: Option<String>,
    pub start_year: Option<i32>,
    /// `Some(None)` clears the end year.
    pub end_year: Option<Option<i32>>,
    pub cover_url: Option<String>,
    pub views: Option<u64>,
}

impl SeriesPatch {
    /// Merge the supplied fields into `series` and stamp `updated_at`.
    pub fn apply_to(&self, series: &mut Series, now: DateTime<Utc>) {
        if let Some(name) = &self.name {
            series.name = name.clone();
        }
        if let Some(publisher) = &self.publisher {
            series.publisher = publisher.clone();
        }
        if let Some(start_year) = self.start_year {
            series.start_year = start_year;
        }
        if let Some(end_year) = self.end_year {
            series.end_year = end_year;
        }
        if let Some(cover_url) = &self.cover_url {
            series.cover_url = cover_url.clone();
        }
        if let Some(views) = self.views {
            series.views = views;
        }
        series.updated_at = now;
    }
}
