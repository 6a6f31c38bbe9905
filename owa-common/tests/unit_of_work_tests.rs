//! Unit of work: identity, ordered membership and commit semantics

use owa_common::db::init::init_database;
use owa_common::db::{artists, tags, tracklists, tracks};
use owa_common::models::TracklistKind;
use owa_common::{ConstraintKind, Error, UnitOfWork};
use sqlx::SqlitePool;
use std::sync::Arc;
use tempfile::TempDir;

async fn setup() -> (TempDir, SqlitePool) {
    let dir = tempfile::tempdir().unwrap();
    let pool = init_database(&dir.path().join("owa.db")).await.unwrap();
    (dir, pool)
}

#[tokio::test]
async fn test_same_lookup_yields_same_instance() {
    let (_dir, pool) = setup().await;
    let mut uow = UnitOfWork::new(pool.clone());

    let a = uow.artist("Darkthrone").await.unwrap();
    let b = uow.artist("Darkthrone").await.unwrap();
    assert!(Arc::ptr_eq(&a, &b));

    let album_a = uow.album("Transilvanian Hunger", &a).await.unwrap();
    let album_b = uow.album("Transilvanian Hunger", &b).await.unwrap();
    assert!(Arc::ptr_eq(&album_a, &album_b));

    let t1 = uow.track("Graveward", &a, 262, "/m/dt/02.mp3").await.unwrap();
    let t2 = uow.track("Graveward", &a, 999, "/m/dt/02.mp3").await.unwrap();
    assert!(Arc::ptr_eq(&t1, &t2));
    assert_eq!(t2.length, 262);

    let summary = uow.commit().await.unwrap();
    assert_eq!(summary.entities_inserted, 3);
}

#[tokio::test]
async fn test_staged_entities_invisible_until_commit() {
    let (_dir, pool) = setup().await;
    let mut uow = UnitOfWork::new(pool.clone());

    let artist = uow.artist("Mayhem").await.unwrap();
    assert!(uow.is_new(artist.id.0));
    assert!(artists::find_artist_by_name(&pool, "Mayhem").await.unwrap().is_none());

    uow.commit().await.unwrap();

    let stored = artists::find_artist_by_name(&pool, "Mayhem").await.unwrap().unwrap();
    assert_eq!(stored.id, artist.id);
    assert_eq!(stored.slug, "mayhem");

    // A fresh unit finds the stored row instead of staging a new one
    let mut uow = UnitOfWork::new(pool);
    let found = uow.artist("Mayhem").await.unwrap();
    assert_eq!(found.id, artist.id);
    assert!(!uow.is_new(found.id.0));
}

#[tokio::test]
async fn test_rollback_discards_everything() {
    let (_dir, pool) = setup().await;
    let mut uow = UnitOfWork::new(pool.clone());

    let artist = uow.artist("Gorgoroth").await.unwrap();
    let album = uow.album("Pentagram", &artist).await.unwrap();
    let track = uow.track("Crushing the Scepter", &artist, 200, "/m/g/01.mp3").await.unwrap();
    uow.append_track(&album, &track).await.unwrap();
    uow.rollback();

    assert!(artists::find_artist_by_name(&pool, "Gorgoroth").await.unwrap().is_none());
    assert!(tracks::find_track_by_id(&pool, track.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_appends_get_consecutive_positions() {
    let (_dir, pool) = setup().await;
    let mut uow = UnitOfWork::new(pool.clone());

    let artist = uow.artist("Immortal").await.unwrap();
    let album = uow.album("Pure Holocaust", &artist).await.unwrap();

    let names = ["Unsilent Storms", "A Sign for the Norse Hordes", "The Sun No Longer Rises"];
    for (i, name) in names.iter().enumerate() {
        let location = format!("/m/immortal/{:02}.flac", i);
        let track = uow.track(name, &artist, 180, &location).await.unwrap();
        let position = uow.append_track(&album, &track).await.unwrap();
        assert_eq!(position, i);
    }

    let summary = uow.commit().await.unwrap();
    assert_eq!(summary.ledgers_written, 1);

    let stored = tracklists::tracks_of(&pool, album.id).await.unwrap();
    let positions: Vec<i64> = stored.iter().map(|(p, _)| *p).collect();
    let stored_names: Vec<&str> = stored.iter().map(|(_, t)| t.name.as_str()).collect();
    assert_eq!(positions, vec![0, 1, 2]);
    assert_eq!(stored_names, names);
}

#[tokio::test]
async fn test_insert_shifts_later_positions() {
    let (_dir, pool) = setup().await;
    let mut uow = UnitOfWork::new(pool.clone());

    let artist = uow.artist("Enslaved").await.unwrap();
    let album = uow.album("Frost", &artist).await.unwrap();
    let first = uow.track("Frost", &artist, 100, "/m/e/01.mp3").await.unwrap();
    let third = uow.track("Loke", &artist, 100, "/m/e/03.mp3").await.unwrap();
    uow.append_track(&album, &first).await.unwrap();
    uow.append_track(&album, &third).await.unwrap();
    uow.commit().await.unwrap();

    let mut uow = UnitOfWork::new(pool.clone());
    let artist = uow.artist("Enslaved").await.unwrap();
    let album = uow.album("Frost", &artist).await.unwrap();
    let second = uow.track("Fenris", &artist, 100, "/m/e/02.mp3").await.unwrap();
    uow.insert_track(&album, 1, &second).await.unwrap();

    let staged_view: Vec<String> = uow
        .tracks_of(album.id)
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.name)
        .collect();
    assert_eq!(staged_view, vec!["Frost", "Fenris", "Loke"]);

    uow.commit().await.unwrap();

    let order = tracklists::load_track_order(&pool, album.id).await.unwrap();
    assert_eq!(order, vec![first.id, second.id, third.id]);
}

#[tokio::test]
async fn test_insert_past_end_is_rejected() {
    let (_dir, pool) = setup().await;
    let mut uow = UnitOfWork::new(pool);

    let artist = uow.artist("Satyricon").await.unwrap();
    let album = uow.album("Nemesis Divina", &artist).await.unwrap();
    let track = uow.track("Mother North", &artist, 370, "/m/s/02.mp3").await.unwrap();

    let result = uow.insert_track(&album, 1, &track).await;
    assert!(matches!(result, Err(Error::InvalidInput(_))));
}

#[tokio::test]
async fn test_track_in_several_tracklists() {
    let (_dir, pool) = setup().await;
    let mut uow = UnitOfWork::new(pool.clone());

    let artist = uow.artist("Bathory").await.unwrap();
    let member = uow.member("dogzrule", "dogz314@bar.com", "catssuck").await.unwrap();
    let album = uow.album("Blood Fire Death", &artist).await.unwrap();
    let playlist = uow.playlist("Viking Classics", &member).await.unwrap();
    let track = uow.track("A Fine Day to Die", &artist, 516, "/m/b/05.mp3").await.unwrap();

    uow.append_track(&album, &track).await.unwrap();
    uow.append_track(&playlist, &track).await.unwrap();

    let containing = uow.tracklists_of(track.id).await.unwrap();
    assert_eq!(containing.len(), 2);
    uow.commit().await.unwrap();

    let stored_playlist = tracklists::find_tracklist_by_id(&pool, playlist.id).await.unwrap().unwrap();
    assert_eq!(stored_playlist.kind(), TracklistKind::Playlist);

    let mut uow = UnitOfWork::new(pool.clone());
    let removed = uow.remove_track(&playlist, &track).await.unwrap();
    assert_eq!(removed, Some(0));
    let containing = uow.tracklists_of(track.id).await.unwrap();
    assert_eq!(containing.len(), 1);
    assert_eq!(containing[0].id, album.id);
    uow.commit().await.unwrap();

    assert_eq!(tracklists::load_track_order(&pool, album.id).await.unwrap(), vec![track.id]);
    assert!(tracklists::load_track_order(&pool, playlist.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_racing_units_one_wins() {
    let (_dir, pool) = setup().await;

    let mut first = UnitOfWork::new(pool.clone());
    let mut second = UnitOfWork::new(pool.clone());

    // Both miss in storage and stage their own artist
    let a = first.artist("Burzum").await.unwrap();
    let b = second.artist("Burzum").await.unwrap();
    assert_ne!(a.id, b.id);

    first.commit().await.unwrap();
    let err = second.commit().await.unwrap_err();
    assert!(matches!(
        err,
        Error::Constraint {
            kind: ConstraintKind::Unique,
            ..
        }
    ));

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM artists WHERE name = 'Burzum'")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1);

    // Retrying with a fresh unit resolves to the winner
    let mut retry = UnitOfWork::new(pool);
    let resolved = retry.artist("Burzum").await.unwrap();
    assert_eq!(resolved.id, a.id);
}

#[tokio::test]
async fn test_duplicate_tagging_fails_commit() {
    let (_dir, pool) = setup().await;
    let mut uow = UnitOfWork::new(pool.clone());

    let member = uow.member("dogzrule", "dogz314@bar.com", "catssuck").await.unwrap();
    let artist = uow.artist("Emperor").await.unwrap();
    let tag = uow.tag("Black Metal").await.unwrap();
    let same_tag = uow.tag("  black   METAL ").await.unwrap();
    assert!(Arc::ptr_eq(&tag, &same_tag));

    uow.tag_artist(&member, &artist, &tag);
    uow.commit().await.unwrap();

    let top = artists::top_tags_for_artist(&pool, artist.id).await.unwrap();
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].0.name, "black metal");
    assert_eq!(top[0].1, 1);

    let mut uow = UnitOfWork::new(pool.clone());
    let member = uow.member("dogzrule", "", "").await.unwrap();
    let artist = uow.artist("Emperor").await.unwrap();
    let tag = uow.tag("black metal").await.unwrap();
    uow.tag_artist(&member, &artist, &tag);

    let err = uow.commit().await.unwrap_err();
    assert!(err.is_unique_violation());

    let top = tags::top_artists_for_tag(&pool, tag.id).await.unwrap();
    assert_eq!(top.len(), 1);
}

#[tokio::test]
async fn test_album_and_playlist_names_do_not_collide() {
    let (_dir, pool) = setup().await;
    let mut uow = UnitOfWork::new(pool.clone());

    let artist = uow.artist("Ulver").await.unwrap();
    let member = uow.member("wolf", "wolf@example.org", "howl").await.unwrap();
    let album = uow.album("Nattens Madrigal", &artist).await.unwrap();
    let playlist = uow.playlist("Nattens Madrigal", &member).await.unwrap();

    assert_ne!(album.id, playlist.id);
    assert_eq!(album.kind(), TracklistKind::Album);
    assert_eq!(playlist.kind(), TracklistKind::Playlist);

    let summary = uow.commit().await.unwrap();
    assert_eq!(summary.entities_inserted, 4);

    let albums = tracklists::list_tracklists(&pool, Some(TracklistKind::Album), Default::default())
        .await
        .unwrap();
    assert_eq!(albums.total, 1);
}
