mod support;

use futures::future::join_all;

use comics_catalog::db::repositories::LocalRepository;
use comics_catalog::db::repository::RepositoryError;
use comics_catalog::db::services;
use comics_catalog::models::{ComicPatch, EntityId, SeriesPatch};
use support::{new_comic, new_series};

#[tokio::test]
async fn test_health_check() {
    let repo = LocalRepository::new();
    assert!(services::health_check(&repo).await.unwrap());
}

#[tokio::test]
async fn test_create_series_starts_without_views_or_online_read() {
    let repo = LocalRepository::new();
    let created = services::create_series(&repo, new_series("Saga", "Image"))
        .await
        .unwrap();

    assert_eq!(created.series.views, 0);
    assert!(!created.has_online_read);
    assert_eq!(created.series.created_at, created.series.updated_at);

    let fetched = services::get_series(&repo, created.series.id).await.unwrap();
    assert_eq!(fetched.series, created.series);
}

#[tokio::test]
async fn test_has_online_read_requires_flag_and_pages() {
    let repo = LocalRepository::new();
    let readable = services::create_series(&repo, new_series("Readable", "Marvel"))
        .await
        .unwrap();
    let download_only = services::create_series(&repo, new_series("Downloads", "Marvel"))
        .await
        .unwrap();
    let flag_only = services::create_series(&repo, new_series("Flag Only", "Marvel"))
        .await
        .unwrap();

    services::create_comic(&repo, new_comic(readable.series.id, "#1", &["p1.jpg"]))
        .await
        .unwrap();
    services::create_comic(&repo, new_comic(download_only.series.id, "#1", &[]))
        .await
        .unwrap();
    let flagged = services::create_comic(&repo, new_comic(flag_only.series.id, "#1", &[]))
        .await
        .unwrap();
    assert!(!flagged.online_read);
    services::update_comic(
        &repo,
        flagged.id,
        ComicPatch {
            online_read: Some(true),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let listed = services::list_series(&repo, None).await.unwrap();
    let flag_of = |id: EntityId| {
        listed
            .iter()
            .find(|s| s.series.id == id)
            .map(|s| s.has_online_read)
            .unwrap()
    };
    assert!(flag_of(readable.series.id));
    assert!(!flag_of(download_only.series.id));
    assert!(!flag_of(flag_only.series.id));
}

#[tokio::test]
async fn test_list_series_publisher_filter_is_literal_and_case_insensitive() {
    let repo = LocalRepository::new();
    services::create_series(&repo, new_series("Batman", "DC Comics")).await.unwrap();
    services::create_series(&repo, new_series("X-Men", "Marvel")).await.unwrap();
    services::create_series(&repo, new_series("Odd", "D.C. Press")).await.unwrap();

    let dc = services::list_series(&repo, Some("dc")).await.unwrap();
    assert_eq!(dc.len(), 1);
    assert_eq!(dc[0].series.name, "Batman");

    // A regex metacharacter matches only itself.
    let dotted = services::list_series(&repo, Some("d.c")).await.unwrap();
    assert_eq!(dotted.len(), 1);
    assert_eq!(dotted[0].series.name, "Odd");

    let all = services::list_series(&repo, Some("   ")).await.unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].series.name, "Odd");
}

#[tokio::test]
async fn test_search_and_top() {
    let repo = LocalRepository::new();
    let spider = services::create_series(&repo, new_series("Spider-Man", "Marvel"))
        .await
        .unwrap();
    let spider_gwen = services::create_series(&repo, new_series("Spider-Gwen", "Marvel"))
        .await
        .unwrap();
    services::create_series(&repo, new_series("Hellboy", "Dark Horse")).await.unwrap();

    let found = services::search_series(&repo, "SPIDER").await.unwrap();
    assert_eq!(found.len(), 2);

    for _ in 0..3 {
        services::increment_series_views(&repo, spider_gwen.series.id).await.unwrap();
    }
    services::increment_series_views(&repo, spider.series.id).await.unwrap();

    let top = services::top_series(&repo, 2).await.unwrap();
    assert_eq!(top.len(), 2);
    assert_eq!(top[0].series.id, spider_gwen.series.id);
    assert_eq!(top[0].series.views, 3);
    assert_eq!(top[1].series.id, spider.series.id);
}

#[tokio::test]
async fn test_concurrent_view_increments_are_not_lost() {
    let repo = LocalRepository::new();
    let series = services::create_series(&repo, new_series("Popular", "Image"))
        .await
        .unwrap();
    let id = series.series.id;

    let results = join_all((0..50).map(|_| services::increment_series_views(&repo, id))).await;
    assert!(results.iter().all(Result::is_ok));

    let fetched = services::get_series(&repo, id).await.unwrap();
    assert_eq!(fetched.series.views, 50);
}

#[tokio::test]
async fn test_update_series_merges_and_refreshes_timestamp() {
    let repo = LocalRepository::new();
    let mut input = new_series("Sandman", "Vertigo");
    input.end_year = Some(1996);
    let created = services::create_series(&repo, input).await.unwrap();

    let updated = services::update_series(
        &repo,
        created.series.id,
        SeriesPatch {
            publisher: Some("DC".to_string()),
            end_year: Some(None),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert_eq!(updated.series.name, "Sandman");
    assert_eq!(updated.series.publisher, "DC");
    assert_eq!(updated.series.end_year, None);
    assert!(updated.series.updated_at >= created.series.updated_at);
    assert_eq!(updated.series.created_at, created.series.created_at);
}

#[tokio::test]
async fn test_create_comic_for_missing_series_persists_nothing() {
    let repo = LocalRepository::new();
    let err = services::create_comic(&repo, new_comic(EntityId::generate(), "#1", &["p"]))
        .await
        .unwrap_err();

    assert!(matches!(err, RepositoryError::NotFound { .. }));
    assert_eq!(err.message(), "Series not found");
    assert_eq!(repo.comic_count(), 0);
}

#[tokio::test]
async fn test_update_comic_to_missing_series_is_not_found() {
    let repo = LocalRepository::new();
    let series = services::create_series(&repo, new_series("Hawkeye", "Marvel"))
        .await
        .unwrap();
    let comic = services::create_comic(&repo, new_comic(series.series.id, "#1", &[]))
        .await
        .unwrap();

    let err = services::update_comic(
        &repo,
        comic.id,
        ComicPatch {
            series_id: Some(EntityId::generate()),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.message(), "Series not found");

    let unchanged = services::get_comic(&repo, comic.id).await.unwrap();
    assert_eq!(unchanged.series_id, series.series.id);
}

#[tokio::test]
async fn test_pages_update_keeps_online_read_flag() {
    let repo = LocalRepository::new();
    let series = services::create_series(&repo, new_series("Monstress", "Image"))
        .await
        .unwrap();
    let comic = services::create_comic(&repo, new_comic(series.series.id, "#1", &[]))
        .await
        .unwrap();

    let updated = services::update_comic(
        &repo,
        comic.id,
        ComicPatch {
            pages: Some(vec!["p1.jpg".to_string()]),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert_eq!(updated.pages, vec!["p1.jpg".to_string()]);
    assert!(!updated.online_read);
}

#[tokio::test]
async fn test_comics_of_series_and_orphans_after_delete() {
    let repo = LocalRepository::new();
    let series = services::create_series(&repo, new_series("Invincible", "Image"))
        .await
        .unwrap();
    let first = services::create_comic(&repo, new_comic(series.series.id, "#1", &[]))
        .await
        .unwrap();
    let second = services::create_comic(&repo, new_comic(series.series.id, "#2", &[]))
        .await
        .unwrap();

    let comics = services::list_comics_for_series(&repo, series.series.id)
        .await
        .unwrap();
    let ids: Vec<EntityId> = comics.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);

    services::delete_series(&repo, series.series.id).await.unwrap();

    let err = services::list_comics_for_series(&repo, series.series.id)
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    // No cascade: the comics remain reachable directly.
    assert!(services::get_comic(&repo, first.id).await.is_ok());
    assert_eq!(services::list_comics(&repo, 100).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_list_comics_respects_limit() {
    let repo = LocalRepository::new();
    let series = services::create_series(&repo, new_series("Y", "Vertigo"))
        .await
        .unwrap();
    for i in 0..5 {
        services::create_comic(&repo, new_comic(series.series.id, &format!("#{}", i), &[]))
            .await
            .unwrap();
    }

    let comics = services::list_comics(&repo, 3).await.unwrap();
    assert_eq!(comics.len(), 3);
    assert_eq!(comics[0].title, "#4");
}

#[tokio::test]
async fn test_delete_missing_entities_is_not_found() {
    let repo = LocalRepository::new();
    assert!(services::delete_series(&repo, EntityId::generate())
        .await
        .unwrap_err()
        .is_not_found());
    assert!(services::delete_comic(&repo, EntityId::generate())
        .await
        .unwrap_err()
        .is_not_found());
}
