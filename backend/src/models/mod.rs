//! Catalog domain models.
//!
//! - [`EntityId`]: store-assigned identifier (24-character hex token)
//! - [`Series`] / [`Comic`]: persisted documents
//! - [`NewSeries`], [`SeriesPatch`], [`NewComic`], [`ComicPatch`]: validated write models
//! - [`SeriesWithOnlineRead`]: read model carrying the derived `hasOnlineRead` flag

pub mod comic;
pub mod id;
pub mod series;

pub use comic::{Comic, ComicPatch, NewComic};
pub use id::{EntityId, ParseEntityIdError, ENTITY_ID_HEX_LEN};
pub use series::{NewSeries, Series, SeriesPatch, SeriesWithOnlineRead};
