//! Comic documents and their write models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::EntityId;

/// A single issue belonging to a series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comic {
    pub id: EntityId,
    pub title: String,
    pub cover_url: String,
    pub download_urls: Vec<String>,
    #[serde(default)]
    pub pages: Vec<String>,
    #[serde(default)]
    pub online_read: bool,
    pub series_id: EntityId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Comic {
    /// Whether this comic makes its series readable in the browser.
    pub fn qualifies_for_online_read(&self) -> bool {
        self.online_read && !self.pages.is_empty()
    }
}

/// Validated input for inserting a comic.
#[derive(Debug, Clone, PartialEq)]
pub struct NewComic {
    pub title: String,
    pub cover_url: String,
    pub download_urls: Vec<String>,
    pub pages: Vec<String>,
    pub series_id: EntityId,
}

impl NewComic {
    /// `onlineRead` is fixed at creation from the page list.
    pub fn online_read(&self) -> bool {
        !self.pages.is_empty()
    }

    pub fn into_comic(self, id: EntityId, now: DateTime<Utc>) -> Comic {
        let online_read = self.online_read();
        Comic {
            id,
            title: self.title,
            cover_url: self.cover_url,
            download_urls: self.download_urls,
            pages: self.pages,
            online_read,
            series_id: self.series_id,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update for a comic. `None` leaves a field untouched.
///
/// Replacing `pages` does not recompute `online_read`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComicPatch {
    pub title: Option<String>,
    pub cover_url: Option<String>,
    pub download_urls: Option<Vec<String>>,
    pub pages: Option<Vec<String>>,
    pub online_read: Option<bool>,
    pub series_id: Option<EntityId>,
}

impl ComicPatch {
    pub fn apply_to(&self, comic: &mut Comic, now: DateTime<Utc>) {
        if let Some(title) = &self.title {
            comic.title = title.clone();
        }
        if let Some(cover_url) = &self.cover_url {
            comic.cover_url = cover_url.clone();
        }
        if let Some(download_urls) = &self.download_urls {
            comic.download_urls = download_urls.clone();
        }
        if let Some(pages) = &self.pages {
            comic.pages = pages.clone();
        }
        if let Some(online_read) = self.online_read {
            comic.online_read = online_read;
        }
        if let Some(series_id) = self.series_id {
            comic.series_id = series_id;
        }
        comic.updated_at = now;
    }
}
