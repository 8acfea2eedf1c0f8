//! Integration-Tests fuer ModerationRepository (In-Memory SQLite)

use chrono::{Duration, Utc};
use rampenlicht_db::{models::NeueModerationsAktion, ModerationRepository, SqliteDb};
use uuid::Uuid;

async fn db() -> SqliteDb {
    SqliteDb::in_memory()
        .await
        .expect("In-Memory DB konnte nicht erstellt werden")
}

fn mute<'a>(room_id: &'a str, moderator: Uuid, ziel: Uuid) -> NeueModerationsAktion<'a> {
    NeueModerationsAktion {
        room_id,
        moderator_id: moderator,
        target_user_id: ziel,
        action_type: "mute",
        duration_minutes: None,
        reason: Some("spam"),
        message_id: None,
        expires_at: None,
    }
}

#[tokio::test]
async fn mute_schraenkt_ein() {
    let db = db().await;
    let ziel = Uuid::new_v4();

    db.create(mute("r1", Uuid::new_v4(), ziel)).await.unwrap();

    assert!(db.is_restricted("r1", ziel).await.unwrap());
    // Anderer Raum, andere Person: nicht eingeschraenkt
    assert!(!db.is_restricted("r2", ziel).await.unwrap());
    assert!(!db.is_restricted("r1", Uuid::new_v4()).await.unwrap());
}

#[tokio::test]
async fn abgelaufener_mute_schraenkt_nicht_ein() {
    let db = db().await;
    let ziel = Uuid::new_v4();

    db.create(NeueModerationsAktion {
        expires_at: Some(Utc::now() - Duration::seconds(1)),
        duration_minutes: Some(10),
        ..mute("r1", Uuid::new_v4(), ziel)
    })
    .await
    .unwrap();

    assert!(!db.is_restricted("r1", ziel).await.unwrap());
}

#[tokio::test]
async fn kick_schraenkt_nicht_ein() {
    let db = db().await;
    let ziel = Uuid::new_v4();

    db.create(NeueModerationsAktion {
        action_type: "kick",
        ..mute("r1", Uuid::new_v4(), ziel)
    })
    .await
    .unwrap();

    assert!(!db.is_restricted("r1", ziel).await.unwrap());
}

#[tokio::test]
async fn ban_schraenkt_ein() {
    let db = db().await;
    let ziel = Uuid::new_v4();

    db.create(NeueModerationsAktion {
        action_type: "ban",
        ..mute("r1", Uuid::new_v4(), ziel)
    })
    .await
    .unwrap();

    assert!(db.is_restricted("r1", ziel).await.unwrap());
}

#[tokio::test]
async fn cleanup_entfernt_nur_abgelaufene() {
    let db = db().await;
    let ziel = Uuid::new_v4();

    db.create(NeueModerationsAktion {
        expires_at: Some(Utc::now() - Duration::minutes(5)),
        ..mute("r1", Uuid::new_v4(), ziel)
    })
    .await
    .unwrap();
    db.create(mute("r1", Uuid::new_v4(), ziel)).await.unwrap();

    let entfernt = db.cleanup_expired().await.unwrap();
    assert_eq!(entfernt, 1);

    // Der permanente Mute bleibt wirksam
    assert!(db.is_restricted("r1", ziel).await.unwrap());
}
