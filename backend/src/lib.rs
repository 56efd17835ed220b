//! # Comics Catalog Backend
//!
//! REST backend for a comics catalog: series, the comics that belong to
//! them, view counting, search and a most-viewed ranking.
//!
//! ## Architecture
//!
//! - [`models`]: identifiers and the `Series` / `Comic` entities
//! - [`validation`]: boundary checks on identifiers, fields and limits
//! - [`api`]: request bodies and their conversion into write models
//! - [`db`]: repository traits, in-memory and Postgres backends, service layer
//! - [`config`]: server configuration from the environment
//! - [`http`]: Axum router, handlers and the response envelope
//!

// Allow large error types - RepositoryError contains rich context for debugging
#![allow(clippy::result_large_err)]

pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod validation;

#[cfg(feature = "http-server")]
pub mod http;
