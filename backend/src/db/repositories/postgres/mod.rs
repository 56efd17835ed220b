//! Postgres repository implementation using Diesel.
//!
//! ## Features
//!
//! - Connection pooling with r2d2
//! - Connection health monitoring
//! - Automatic migration execution
//!
//! Failed queries are reported immediately; nothing is retried.
//!
//! ## Configuration
//!
//! Environment variables:
//! - `DATABASE_URL` or `PG_DATABASE_URL`: Connection string (required)
//! - `PG_POOL_MAX`: Maximum pool size (default: 10)
//! - `PG_POOL_MIN`: Minimum pool size (default: 1)
//! - `PG_CONN_TIMEOUT_SEC`: Connection timeout in seconds (default: 30)
//! - `PG_IDLE_TIMEOUT_SEC`: Idle connection timeout in seconds (default: 600)

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use diesel::dsl::sql;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sql_query;
use diesel::sql_types::Bool;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use tokio::task;

use crate::db::repository::{
    ComicRepository, ErrorContext, RepositoryError, RepositoryResult, SeriesRepository,
};
use crate::models::{Comic, ComicPatch, EntityId, NewComic, NewSeries, Series, SeriesPatch};

mod models;
mod schema;

use models::*;
use schema::{comics, series};

type PgPool = Pool<ConnectionManager<PgConnection>>;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("src/db/repositories/postgres/migrations");

/// Configuration for connecting to Postgres.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostgresConfig {
    /// Database connection URL
    pub database_url: String,
    /// Maximum number of connections in the pool
    pub max_pool_size: u32,
    /// Minimum number of connections in the pool
    pub min_pool_size: u32,
    /// Connection timeout in seconds
    pub connection_timeout_sec: u64,
    /// Idle connection timeout in seconds
    pub idle_timeout_sec: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            max_pool_size: 10,
            min_pool_size: 1,
            connection_timeout_sec: 30,
            idle_timeout_sec: 600,
        }
    }
}

impl PostgresConfig {
    /// Create configuration from environment variables.
    pub fn from_env() -> Result<Self, String> {
        let database_url = std::env::var("DATABASE_URL")
            .or_else(|_| std::env::var("PG_DATABASE_URL"))
            .map_err(|_| "DATABASE_URL or PG_DATABASE_URL must be set".to_string())?;

        let defaults = Self::default();
        let env_or = |key: &str, default: u64| {
            std::env::var(key)
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(default)
        };

        Ok(Self {
            database_url,
            max_pool_size: env_or("PG_POOL_MAX", defaults.max_pool_size as u64) as u32,
            min_pool_size: env_or("PG_POOL_MIN", defaults.min_pool_size as u64) as u32,
            connection_timeout_sec: env_or("PG_CONN_TIMEOUT_SEC", defaults.connection_timeout_sec),
            idle_timeout_sec: env_or("PG_IDLE_TIMEOUT_SEC", defaults.idle_timeout_sec),
        })
    }

    /// Create a new configuration with a database URL.
    pub fn with_url(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            ..Default::default()
        }
    }
}

/// Diesel-backed catalog repository.
#[derive(Clone)]
pub struct PostgresRepository {
    pool: PgPool,
    config: PostgresConfig,
}

impl std::fmt::Debug for PostgresRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresRepository")
            .field("max_pool_size", &self.config.max_pool_size)
            .finish_non_exhaustive()
    }
}

impl PostgresRepository {
    /// Create a new repository and run pending migrations.
    pub fn new(config: PostgresConfig) -> RepositoryResult<Self> {
        let manager = ConnectionManager::<PgConnection>::new(&config.database_url);

        let pool = Pool::builder()
            .max_size(config.max_pool_size)
            .min_idle(Some(config.min_pool_size))
            .connection_timeout(Duration::from_secs(config.connection_timeout_sec))
            .idle_timeout(Some(Duration::from_secs(config.idle_timeout_sec)))
            .test_on_check_out(true)
            .build(manager)
            .map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("create_pool")
                        .with_details(format!("max_size={}", config.max_pool_size)),
                )
            })?;

        {
            let mut conn = pool.get().map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("get_connection_for_migrations"),
                )
            })?;
            Self::run_migrations(&mut conn)?;
        }

        Ok(Self { pool, config })
    }

    fn run_migrations(conn: &mut PgConnection) -> RepositoryResult<()> {
        conn.run_pending_migrations(MIGRATIONS).map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Migration failed: {}", e),
                ErrorContext::new("run_migrations"),
            )
        })?;

        Ok(())
    }

    /// Run `f` with a pooled connection on the blocking thread pool.
    async fn with_conn<T, F>(&self, operation: &'static str, f: F) -> RepositoryResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> RepositoryResult<T> + Send + 'static,
    {
        let pool = self.pool.clone();

        task::spawn_blocking(move || {
            let mut conn = pool.get().map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new(operation).with_details("get_connection"),
                )
            })?;
            f(&mut conn)
        })
        .await
        .map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Task join error: {}", e),
                ErrorContext::new("spawn_blocking"),
            )
        })?
        .map_err(|e| {
            if e.context().operation.is_none() {
                e.with_operation(operation)
            } else {
                e
            }
        })
    }
}

fn map_diesel_error(err: diesel::result::Error) -> RepositoryError {
    RepositoryError::from(err)
}

/// Escape `LIKE` metacharacters so user input matches literally.
fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

fn rows_to_series(rows: Vec<SeriesRow>) -> RepositoryResult<Vec<Series>> {
    rows.into_iter().map(SeriesRow::into_series).collect()
}

fn rows_to_comics(rows: Vec<ComicRow>) -> RepositoryResult<Vec<Comic>> {
    rows.into_iter().map(ComicRow::into_comic).collect()
}

#[async_trait]
impl SeriesRepository for PostgresRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        self.with_conn("health_check", |conn| {
            sql_query("SELECT 1")
                .execute(conn)
                .map(|_| true)
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn insert_series(&self, new_series: NewSeries) -> RepositoryResult<Series> {
        let row = NewSeriesRow::new(new_series, EntityId::generate(), Utc::now());
        self.with_conn("insert_series", move |conn| {
            diesel::insert_into(series::table)
                .values(&row)
                .returning(SeriesRow::as_returning())
                .get_result(conn)
                .map_err(map_diesel_error)?
                .into_series()
        })
        .await
    }

    async fn get_series(&self, id: EntityId) -> RepositoryResult<Series> {
        self.with_conn("get_series", move |conn| {
            series::table
                .find(id.to_hex())
                .select(SeriesRow::as_select())
                .first(conn)
                .optional()
                .map_err(map_diesel_error)?
                .ok_or_else(|| RepositoryError::series_not_found("get_series", id))?
                .into_series()
        })
        .await
    }

    async fn series_exists(&self, id: EntityId) -> RepositoryResult<bool> {
        self.with_conn("series_exists", move |conn| {
            diesel::select(diesel::dsl::exists(series::table.find(id.to_hex())))
                .get_result(conn)
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn list_series(&self, publisher: Option<&str>) -> RepositoryResult<Vec<Series>> {
        let pattern = publisher.map(like_pattern);
        self.with_conn("list_series", move |conn| {
            let mut query = series::table
                .select(SeriesRow::as_select())
                .order(series::created_at.desc())
                .into_boxed();
            if let Some(pattern) = pattern {
                query = query.filter(series::publisher.ilike(pattern));
            }
            rows_to_series(query.load(conn).map_err(map_diesel_error)?)
        })
        .await
    }

    async fn search_series(&self, term: &str) -> RepositoryResult<Vec<Series>> {
        let pattern = like_pattern(term);
        self.with_conn("search_series", move |conn| {
            let rows = series::table
                .filter(series::name.ilike(pattern))
                .select(SeriesRow::as_select())
                .order(series::created_at.asc())
                .load(conn)
                .map_err(map_diesel_error)?;
            rows_to_series(rows)
        })
        .await
    }

    async fn top_series(&self, limit: usize) -> RepositoryResult<Vec<Series>> {
        self.with_conn("top_series", move |conn| {
            let rows = series::table
                .select(SeriesRow::as_select())
                .order((series::views.desc(), series::created_at.desc()))
                .limit(limit as i64)
                .load(conn)
                .map_err(map_diesel_error)?;
            rows_to_series(rows)
        })
        .await
    }

    async fn update_series(&self, id: EntityId, patch: SeriesPatch) -> RepositoryResult<Series> {
        let changes = SeriesChangeset::new(patch, Utc::now());
        self.with_conn("update_series", move |conn| {
            diesel::update(series::table.find(id.to_hex()))
                .set(&changes)
                .returning(SeriesRow::as_returning())
                .get_result(conn)
                .optional()
                .map_err(map_diesel_error)?
                .ok_or_else(|| RepositoryError::series_not_found("update_series", id))?
                .into_series()
        })
        .await
    }

    async fn increment_series_views(&self, id: EntityId) -> RepositoryResult<Series> {
        self.with_conn("increment_series_views", move |conn| {
            // Single UPDATE so concurrent increments never lose a count.
            let updated = diesel::update(
                series::table
                    .find(id.to_hex())
                    .filter(series::views.lt(i64::MAX)),
            )
            .set((
                series::views.eq(series::views + 1i64),
                series::updated_at.eq(Utc::now()),
            ))
            .returning(SeriesRow::as_returning())
            .get_result(conn)
            .optional()
            .map_err(map_diesel_error)?;

            match updated {
                Some(row) => row.into_series(),
                None => {
                    let exists = diesel::select(diesel::dsl::exists(
                        series::table.find(id.to_hex()),
                    ))
                    .get_result::<bool>(conn)
                    .map_err(map_diesel_error)?;
                    if exists {
                        Err(RepositoryError::validation(
                            "View count cannot be incremented further",
                        ))
                    } else {
                        Err(RepositoryError::series_not_found("increment_series_views", id))
                    }
                }
            }
        })
        .await
    }

    async fn delete_series(&self, id: EntityId) -> RepositoryResult<()> {
        self.with_conn("delete_series", move |conn| {
            let deleted = diesel::delete(series::table.find(id.to_hex()))
                .execute(conn)
                .map_err(map_diesel_error)?;
            if deleted == 0 {
                return Err(RepositoryError::series_not_found("delete_series", id));
            }
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl ComicRepository for PostgresRepository {
    async fn insert_comic(&self, comic: NewComic) -> RepositoryResult<Comic> {
        let row = NewComicRow::new(comic, EntityId::generate(), Utc::now());
        self.with_conn("insert_comic", move |conn| {
            diesel::insert_into(comics::table)
                .values(&row)
                .returning(ComicRow::as_returning())
                .get_result(conn)
                .map_err(map_diesel_error)?
                .into_comic()
        })
        .await
    }

    async fn get_comic(&self, id: EntityId) -> RepositoryResult<Comic> {
        self.with_conn("get_comic", move |conn| {
            comics::table
                .find(id.to_hex())
                .select(ComicRow::as_select())
                .first(conn)
                .optional()
                .map_err(map_diesel_error)?
                .ok_or_else(|| RepositoryError::comic_not_found("get_comic", id))?
                .into_comic()
        })
        .await
    }

    async fn list_comics(&self, limit: usize) -> RepositoryResult<Vec<Comic>> {
        self.with_conn("list_comics", move |conn| {
            let rows = comics::table
                .select(ComicRow::as_select())
                .order(comics::created_at.desc())
                .limit(limit as i64)
                .load(conn)
                .map_err(map_diesel_error)?;
            rows_to_comics(rows)
        })
        .await
    }

    async fn list_comics_for_series(&self, series_id: EntityId) -> RepositoryResult<Vec<Comic>> {
        self.with_conn("list_comics_for_series", move |conn| {
            let rows = comics::table
                .filter(comics::series_id.eq(series_id.to_hex()))
                .select(ComicRow::as_select())
                .order(comics::created_at.desc())
                .load(conn)
                .map_err(map_diesel_error)?;
            rows_to_comics(rows)
        })
        .await
    }

    async fn update_comic(&self, id: EntityId, patch: ComicPatch) -> RepositoryResult<Comic> {
        let changes = ComicChangeset::new(patch, Utc::now());
        self.with_conn("update_comic", move |conn| {
            diesel::update(comics::table.find(id.to_hex()))
                .set(&changes)
                .returning(ComicRow::as_returning())
                .get_result(conn)
                .optional()
                .map_err(map_diesel_error)?
                .ok_or_else(|| RepositoryError::comic_not_found("update_comic", id))?
                .into_comic()
        })
        .await
    }

    async fn delete_comic(&self, id: EntityId) -> RepositoryResult<()> {
        self.with_conn("delete_comic", move |conn| {
            let deleted = diesel::delete(comics::table.find(id.to_hex()))
                .execute(conn)
                .map_err(map_diesel_error)?;
            if deleted == 0 {
                return Err(RepositoryError::comic_not_found("delete_comic", id));
            }
            Ok(())
        })
        .await
    }

    async fn series_with_online_read(
        &self,
        series_ids: &[EntityId],
    ) -> RepositoryResult<HashSet<EntityId>> {
        if series_ids.is_empty() {
            return Ok(HashSet::new());
        }

        let wanted: Vec<String> = series_ids.iter().map(EntityId::to_hex).collect();
        let found: Vec<String> = self
            .with_conn("series_with_online_read", move |conn| {
                comics::table
                    .filter(comics::series_id.eq_any(wanted))
                    .filter(comics::online_read.eq(true))
                    .filter(sql::<Bool>("cardinality(pages) > 0"))
                    .select(comics::series_id)
                    .distinct()
                    .load(conn)
                    .map_err(map_diesel_error)
            })
            .await?;

        found
            .iter()
            .map(|raw| {
                raw.parse().map_err(|e| {
                    RepositoryError::internal(format!("Corrupt identifier in comics.series_id: {}", e))
                })
            })
            .collect()
    }
}
