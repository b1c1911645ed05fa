//! Per-user lists, recommendations, watch bindings and watch progress.

use std::sync::Arc;

use shiori::db::Store;
use shiori::db::repositories::recommendation::RecommendationRepository;
use shiori::domain::Lang;
use shiori::models::anime::CanonicalAnimeRecord;
use shiori::models::tracking::{TrackedUser, WatchProgressInput};
use shiori::services::{
    CatalogService, SeaOrmCatalogService, SeaOrmTrackingService, TrackingError, TrackingService,
};

struct TestApp {
    store: Arc<Store>,
    catalog: SeaOrmCatalogService,
    tracking: SeaOrmTrackingService,
}

async fn spawn_app() -> TestApp {
    let db_path =
        std::env::temp_dir().join(format!("shiori-tracking-test-{}.db", uuid::Uuid::new_v4()));

    let store = Arc::new(
        Store::new(&format!("sqlite:{}", db_path.display()))
            .await
            .expect("failed to open store"),
    );
    let aliases = store.alias_resolver().await;

    TestApp {
        catalog: SeaOrmCatalogService::new(store.clone(), aliases.clone()),
        tracking: SeaOrmTrackingService::new(store.clone(), aliases),
        store,
    }
}

fn record(uid: &str, title: &str) -> CanonicalAnimeRecord {
    let mut record = CanonicalAnimeRecord::stub(uid, Some("shikimori".to_string()), None);
    record.title = title.to_string();
    record
}

fn user(id: &str) -> TrackedUser {
    TrackedUser {
        telegram_id: id.to_string(),
        username: Some(format!("user{id}")),
        lang: Some("uk".to_string()),
        ..Default::default()
    }
}

fn progress(uid: &str, episode: &str) -> WatchProgressInput {
    WatchProgressInput {
        anime_uid: uid.to_string(),
        episode_label: episode.to_string(),
        episode_number: episode.parse().ok(),
        source: Some("animevost".to_string()),
        quality: Some("1080p".to_string()),
        started_via: "webapp_quality".to_string(),
    }
}

#[tokio::test]
async fn test_watched_replaces_planned_and_counts_rewatches() {
    let app = spawn_app().await;
    let user = user("1001");
    let naruto = record("mal:20", "Naruto");

    app.tracking.add_to_list(&user, "planned", &naruto).await.unwrap();
    assert_eq!(app.tracking.get_list("1001", "planned").await.unwrap().len(), 1);

    app.tracking.add_to_list(&user, "watched", &naruto).await.unwrap();
    app.tracking.add_to_list(&user, "WATCHED", &naruto).await.unwrap();

    assert!(app.tracking.get_list("1001", "planned").await.unwrap().is_empty());

    let watched = app.tracking.get_list("1001", "watched").await.unwrap();
    assert_eq!(watched.len(), 1);
    assert_eq!(watched[0].watch_count, 2);
    assert_eq!(watched[0].anime.uid, "mal:20");
}

#[tokio::test]
async fn test_favorite_is_idempotent_and_removable() {
    let app = spawn_app().await;
    let user = user("1002");
    let monster = record("mal:19", "Monster");

    app.tracking.add_to_list(&user, "favorite", &monster).await.unwrap();
    app.tracking.add_to_list(&user, "favorite", &monster).await.unwrap();
    assert_eq!(app.tracking.get_list("1002", "favorite").await.unwrap().len(), 1);

    assert!(app.tracking.remove_from_list("1002", "favorite", "mal:19").await.unwrap());
    assert!(!app.tracking.remove_from_list("1002", "favorite", "mal:19").await.unwrap());
    assert!(!app.tracking.remove_from_list("nobody", "favorite", "mal:19").await.unwrap());
}

#[tokio::test]
async fn test_unsupported_list_type() {
    let app = spawn_app().await;

    let err = app
        .tracking
        .add_to_list(&user("1003"), "dropped", &record("mal:1", "Cowboy Bebop"))
        .await
        .unwrap_err();
    assert!(matches!(err, TrackingError::UnsupportedListType(list) if list == "dropped"));
}

#[tokio::test]
async fn test_list_writes_follow_aliases() {
    let app = spawn_app().await;

    let mut titan = record("mal:16498", "Shingeki no Kyojin");
    titan.title_uk = Some("Атака титанів".to_string());
    titan.legacy_uids = vec!["shikimori:16498".to_string()];
    app.catalog.upsert_catalog_items(&[titan]).await.unwrap();

    let uid = app
        .tracking
        .add_to_list(&user("1004"), "planned", &record("shikimori:16498", "Атака титанов"))
        .await
        .unwrap();
    assert_eq!(uid, "mal:16498");

    let planned = app.tracking.get_list("1004", "planned").await.unwrap();
    assert_eq!(planned.len(), 1);
    assert_eq!(planned[0].anime.uid, "mal:16498");
    assert_eq!(planned[0].anime.title, "Атака титанів");
    assert!(planned[0]
        .anime
        .legacy_uids
        .contains(&"shikimori:16498".to_string()));

    assert!(app
        .tracking
        .remove_from_list("1004", "planned", "shikimori:16498")
        .await
        .unwrap());
}

#[tokio::test]
async fn test_recommendations() {
    let app = spawn_app().await;
    let user = user("1005");
    let bebop = record("mal:1", "Cowboy Bebop");

    app.tracking.add_recommendation(&user, &bebop).await.unwrap();
    app.tracking.add_recommendation(&user, &bebop).await.unwrap();

    let stored = app.store.get_user("1005").await.unwrap().unwrap();
    assert_eq!(stored.username.as_deref(), Some("user1005"));

    let repo = RecommendationRepository::new(&app.store.conn);
    assert!(repo.exists(stored.id, "mal:1").await.unwrap());

    assert!(app.tracking.remove_recommendation("1005", "mal:1").await.unwrap());
    assert!(!repo.exists(stored.id, "mal:1").await.unwrap());
}

#[tokio::test]
async fn test_watch_map_requires_catalog_row() {
    let app = spawn_app().await;

    let err = app
        .tracking
        .set_watch_map("mal:21", "animego", "https://animego.example/one-piece", None)
        .await
        .unwrap_err();
    assert!(matches!(err, TrackingError::AnimeNotFound(uid) if uid == "mal:21"));

    let err = app
        .tracking
        .set_watch_map("mal:21", " ", "https://animego.example/one-piece", None)
        .await
        .unwrap_err();
    assert!(matches!(err, TrackingError::InvalidInput(_)));
}

#[tokio::test]
async fn test_watch_map_round_trip() {
    let app = spawn_app().await;

    let mut one_piece = record("mal:21", "One Piece");
    one_piece.legacy_uids = vec!["jikan:21".to_string()];
    app.catalog.upsert_catalog_items(&[one_piece]).await.unwrap();

    let binding = app
        .tracking
        .set_watch_map(
            "jikan:21",
            "AnimeGo",
            " https://animego.example/one-piece ",
            Some("Ван Пис"),
        )
        .await
        .unwrap();
    assert_eq!(binding.uid, "mal:21");
    assert_eq!(binding.watch_source, "animego");
    assert_eq!(binding.watch_url, "https://animego.example/one-piece");
    assert_eq!(binding.watch_title.as_deref(), Some("Ван Пис"));

    let updated = app
        .tracking
        .set_watch_map("mal:21", "animego", "https://animego.example/op-tv", None)
        .await
        .unwrap();
    assert_eq!(updated.watch_url, "https://animego.example/op-tv");
    assert!(updated.watch_title.is_none());

    assert_eq!(
        app.tracking.get_watch_map("jikan:21").await.unwrap(),
        Some(updated)
    );

    assert!(app.tracking.clear_watch_map("mal:21").await.unwrap());
    assert!(!app.tracking.clear_watch_map("mal:21").await.unwrap());
    assert!(app.tracking.get_watch_map("mal:21").await.unwrap().is_none());
}

#[tokio::test]
async fn test_progress_rejects_unknown_start_method() {
    let app = spawn_app().await;

    let mut input = progress("mal:20", "1");
    input.started_via = "telepathy".to_string();
    let err = app
        .tracking
        .upsert_watch_progress("1006", &input)
        .await
        .unwrap_err();
    assert!(matches!(err, TrackingError::InvalidInput(_)));

    let err = app
        .tracking
        .upsert_watch_progress("1006", &progress("mal:20", "  "))
        .await
        .unwrap_err();
    assert!(matches!(err, TrackingError::InvalidInput(_)));

    let err = app
        .tracking
        .upsert_watch_progress(" ", &progress("mal:20", "1"))
        .await
        .unwrap_err();
    assert!(matches!(err, TrackingError::InvalidInput(_)));
}

#[tokio::test]
async fn test_progress_updates_in_place_under_canonical_uid() {
    let app = spawn_app().await;

    let mut naruto = record("mal:20", "Naruto");
    naruto.title_en = Some("Naruto".to_string());
    naruto.title_uk = Some("Наруто".to_string());
    naruto.legacy_uids = vec!["shikimori:20".to_string()];
    app.catalog.upsert_catalog_items(&[naruto]).await.unwrap();

    let uid = app
        .tracking
        .upsert_watch_progress("1007", &progress("shikimori:20", "1"))
        .await
        .unwrap();
    assert_eq!(uid, "mal:20");

    let mut second = progress("mal:20", "2");
    second.started_via = "bot_source".to_string();
    second.quality = None;
    app.tracking
        .upsert_watch_progress("1007", &second)
        .await
        .unwrap();

    let recent = app
        .tracking
        .recent_watch_progress("1007", None, Some(Lang::Uk))
        .await
        .unwrap();
    assert_eq!(recent.len(), 1);

    let entry = &recent[0];
    assert_eq!(entry.uid, "mal:20");
    assert_eq!(entry.title, "Наруто");
    assert_eq!(entry.last_episode, "2");
    assert_eq!(entry.last_episode_number, Some(2.0));
    assert!(entry.last_quality.is_none());
    assert_eq!(entry.started_via, "bot_source");
    assert!(entry.first_started_at <= entry.updated_at);

    assert!(app.tracking.delete_watch_progress("1007", "shikimori:20").await.unwrap());
    assert!(app
        .tracking
        .recent_watch_progress("1007", None, None)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_recent_progress_order_and_limit() {
    let app = spawn_app().await;

    for (uid, episode) in [("mal:1", "3"), ("mal:19", "10"), ("mal:21", "1000")] {
        app.tracking
            .upsert_watch_progress("1008", &progress(uid, episode))
            .await
            .unwrap();
    }

    let recent = app
        .tracking
        .recent_watch_progress("1008", Some(2), None)
        .await
        .unwrap();
    let uids: Vec<&str> = recent.iter().map(|e| e.uid.as_str()).collect();
    assert_eq!(uids, vec!["mal:21", "mal:19"]);
    assert!(recent.iter().all(|e| e.anime.is_none()));
    assert!(recent.iter().all(|e| e.title == "Unknown title"));

    assert!(app
        .tracking
        .recent_watch_progress("nobody", None, None)
        .await
        .unwrap()
        .is_empty());
}
