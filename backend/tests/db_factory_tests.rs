//! Tests for db::factory and db::repo_config - repository selection and configuration.

mod support;

use std::io::Write;
use std::str::FromStr;

use comics_catalog::db::factory::{RepositoryFactory, RepositoryType};
use comics_catalog::db::repository::SeriesRepository;

#[test]
fn test_repository_type_from_str_postgres() {
    assert_eq!(RepositoryType::from_str("postgres").unwrap(), RepositoryType::Postgres);
    assert_eq!(RepositoryType::from_str("POSTGRES").unwrap(), RepositoryType::Postgres);
    assert_eq!(RepositoryType::from_str("pg").unwrap(), RepositoryType::Postgres);
}

#[test]
fn test_repository_type_from_str_local() {
    assert_eq!(RepositoryType::from_str("local").unwrap(), RepositoryType::Local);
    assert_eq!(RepositoryType::from_str("LOCAL").unwrap(), RepositoryType::Local);
}

#[test]
fn test_repository_type_from_str_invalid() {
    let result = RepositoryType::from_str("invalid");
    assert!(result.unwrap_err().contains("Unknown repository type"));
}

#[test]
fn test_repository_type_from_env_default() {
    support::with_scoped_env(
        &[
            ("REPOSITORY_TYPE", None),
            ("DATABASE_URL", None),
            ("PG_DATABASE_URL", None),
        ],
        || assert_eq!(RepositoryType::from_env(), RepositoryType::Local),
    );
}

#[test]
fn test_repository_type_from_env_with_database_url() {
    support::with_scoped_env(
        &[
            ("REPOSITORY_TYPE", None),
            ("DATABASE_URL", Some("postgres://localhost/catalog")),
        ],
        || assert_eq!(RepositoryType::from_env(), RepositoryType::Postgres),
    );
}

#[test]
fn test_repository_type_from_env_with_pg_database_url() {
    support::with_scoped_env(
        &[
            ("REPOSITORY_TYPE", None),
            ("DATABASE_URL", None),
            ("PG_DATABASE_URL", Some("postgres://localhost/catalog")),
        ],
        || assert_eq!(RepositoryType::from_env(), RepositoryType::Postgres),
    );
}

#[test]
fn test_repository_type_explicit_wins_over_database_url() {
    support::with_scoped_env(
        &[
            ("REPOSITORY_TYPE", Some("local")),
            ("DATABASE_URL", Some("postgres://localhost/catalog")),
        ],
        || assert_eq!(RepositoryType::from_env(), RepositoryType::Local),
    );
}

#[test]
fn test_repository_type_from_env_invalid_defaults_to_local() {
    support::with_scoped_env(
        &[
            ("REPOSITORY_TYPE", Some("invalid")),
            ("DATABASE_URL", None),
            ("PG_DATABASE_URL", None),
        ],
        || assert_eq!(RepositoryType::from_env(), RepositoryType::Local),
    );
}

#[tokio::test]
async fn test_create_local_repository_is_healthy() {
    let repo = RepositoryFactory::create_local();
    assert!(repo.health_check().await.unwrap());
}

#[tokio::test]
async fn test_config_file_selects_local() {
    let path = std::env::temp_dir().join(format!(
        "catalog-repository-{}.toml",
        std::process::id()
    ));
    {
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "[repository]\ntype = \"local\"").unwrap();
    }

    let repo = RepositoryFactory::from_config_file(&path).await;
    std::fs::remove_file(&path).ok();

    let repo = repo.unwrap();
    assert!(repo.list_series(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_config_file_missing_is_error() {
    let result = RepositoryFactory::from_config_file("/nonexistent/repository.toml").await;
    let err = result.err().unwrap();
    assert!(err.to_string().contains("Configuration error"));
}

#[cfg(not(feature = "postgres-repo"))]
#[test]
fn test_from_env_postgres_without_feature_fails() {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let result = support::with_scoped_env(&[("REPOSITORY_TYPE", Some("postgres"))], || {
        runtime.block_on(RepositoryFactory::from_env())
    });
    let err = result.err().unwrap();
    assert!(err.to_string().contains("feature not enabled"));
}

#[cfg(feature = "postgres-repo")]
#[test]
fn test_from_env_postgres_without_url_fails() {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let result = support::with_scoped_env(
        &[
            ("REPOSITORY_TYPE", Some("postgres")),
            ("DATABASE_URL", None),
            ("PG_DATABASE_URL", None),
        ],
        || runtime.block_on(RepositoryFactory::from_env()),
    );
    let err = result.err().unwrap();
    assert!(err.to_string().contains("DATABASE_URL"));
}

#[test]
fn test_repository_type_partial_eq() {
    assert_eq!(RepositoryType::Local, RepositoryType::Local);
    assert_ne!(RepositoryType::Local, RepositoryType::Postgres);
}
