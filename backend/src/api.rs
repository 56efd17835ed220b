//! Request bodies accepted by the catalog API.
//!
//! Every field is optional at the serde level so that absent fields can be
//! reported together; `validate` turns a body into the typed write model
//! the store layer consumes.

use serde::{Deserialize, Deserializer, Serialize};

use crate::models::{ComicPatch, NewComic, NewSeries, SeriesPatch};
use crate::validation::{parse_identifier, FieldReport, ValidationError, MAX_VIEWS};

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`).
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Body of `POST /series`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSeriesRequest {
    pub name: Option<String>,
    pub publisher: Option<String>,
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
    pub cover_url: Option<String>,
}

impl CreateSeriesRequest {
    pub fn validate(self) -> Result<NewSeries, ValidationError> {
        let mut report = FieldReport::new();
        let name = report.required_text("name", self.name);
        let publisher = report.required_text("publisher", self.publisher);
        let start_year = report.required_int("startYear", self.start_year);
        let cover_url = report.required_text("coverUrl", self.cover_url);
        report.finish()?;

        match (name, publisher, start_year, cover_url) {
            (Some(name), Some(publisher), Some(start_year), Some(cover_url)) => Ok(NewSeries {
                name,
                publisher,
                start_year,
                end_year: self.end_year,
                cover_url,
            }),
            _ => Err(ValidationError::invalid("Missing required fields")),
        }
    }
}

/// Body of `PUT /series/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSeriesRequest {
    pub name: Option<String>,
    pub publisher: Option<String>,
    pub start_year: Option<i32>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub end_year: Option<Option<i32>>,
    pub cover_url: Option<String>,
    pub views: Option<u64>,
}

impl UpdateSeriesRequest {
    pub fn validate(self) -> Result<SeriesPatch, ValidationError> {
        let mut report = FieldReport::new();
        let patch = SeriesPatch {
            name: report.optional_text("name", self.name),
            publisher: report.optional_text("publisher", self.publisher),
            start_year: report.optional_int("startYear", self.start_year),
            end_year: self.end_year,
            cover_url: report.optional_text("coverUrl", self.cover_url),
            views: report.optional_count("views", self.views, MAX_VIEWS),
        };
        report.finish()?;
        Ok(patch)
    }
}

/// Body of `POST /comics`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateComicRequest {
    pub title: Option<String>,
    pub cover_url: Option<String>,
    pub download_urls: Option<Vec<String>>,
    pub pages: Option<Vec<String>>,
    pub series_id: Option<String>,
}

impl CreateComicRequest {
    pub fn validate(self) -> Result<NewComic, ValidationError> {
        let mut report = FieldReport::new();
        let title = report.required_text("title", self.title);
        let cover_url = report.required_text("coverUrl", self.cover_url);
        let series_id = report.required_text("seriesId", self.series_id);
        let download_urls = report.required_list("downloadUrls", self.download_urls);
        report.finish()?;

        let (Some(title), Some(cover_url), Some(series_id), Some(download_urls)) =
            (title, cover_url, series_id, download_urls)
        else {
            return Err(ValidationError::invalid("Missing required fields"));
        };

        Ok(NewComic {
            title,
            cover_url,
            download_urls,
            pages: self.pages.unwrap_or_default(),
            series_id: parse_identifier("seriesId", &series_id)?,
        })
    }
}

/// Body of `PUT /comics/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateComicRequest {
    pub title: Option<String>,
    pub cover_url: Option<String>,
    pub download_urls: Option<Vec<String>>,
    pub pages: Option<Vec<String>>,
    pub online_read: Option<bool>,
    pub series_id: Option<String>,
}

impl UpdateComicRequest {
    pub fn validate(self) -> Result<ComicPatch, ValidationError> {
        let mut report = FieldReport::new();
        let title = report.optional_text("title", self.title);
        let cover_url = report.optional_text("coverUrl", self.cover_url);
        let download_urls = report.optional_list("downloadUrls", self.download_urls);
        report.finish()?;

        let series_id = self
            .series_id
            .map(|raw| parse_identifier("seriesId", &raw))
            .transpose()?;

        Ok(ComicPatch {
            title,
            cover_url,
            download_urls,
            pages: self.pages,
            online_read: self.online_read,
            series_id,
        })
    }
}
