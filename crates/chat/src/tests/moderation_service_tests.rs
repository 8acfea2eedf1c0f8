//! Unit-Tests fuer den ModerationService

use std::sync::Arc;

use rampenlicht_core::types::{RaumId, UserId};
use rampenlicht_db::SqliteDb;

use crate::moderation::ModerationService;

async fn test_db() -> Arc<SqliteDb> {
    Arc::new(
        SqliteDb::in_memory()
            .await
            .expect("In-Memory-DB konnte nicht geoeffnet werden"),
    )
}

#[tokio::test]
async fn mute_anlegen_und_pruefen() {
    let service = ModerationService::neu(test_db().await);
    let raum = RaumId::neu("model-raum");
    let ziel = UserId::new();

    service
        .aktion_anlegen(&raum, UserId::new(), ziel, "mute", Some(10), Some("spam"), None)
        .await
        .unwrap();

    assert!(service.ist_eingeschraenkt(&raum, ziel).await.unwrap());
    assert!(!service
        .ist_eingeschraenkt(&RaumId::neu("anderer-raum"), ziel)
        .await
        .unwrap());
}

#[tokio::test]
async fn permanenter_ban_ohne_ablauf() {
    let service = ModerationService::neu(test_db().await);
    let raum = RaumId::neu("r1");
    let ziel = UserId::new();

    let record = service
        .aktion_anlegen(&raum, UserId::new(), ziel, "ban", None, None, None)
        .await
        .unwrap();

    assert!(record.expires_at.is_none());
    assert!(service.ist_eingeschraenkt(&raum, ziel).await.unwrap());
}

#[tokio::test]
async fn kick_schraenkt_nicht_ein() {
    let service = ModerationService::neu(test_db().await);
    let raum = RaumId::neu("r1");
    let ziel = UserId::new();

    service
        .aktion_anlegen(&raum, UserId::new(), ziel, "kick", None, None, None)
        .await
        .unwrap();

    assert!(!service.ist_eingeschraenkt(&raum, ziel).await.unwrap());
}

#[tokio::test]
async fn mute_mit_dauer_traegt_ablauf() {
    let service = ModerationService::neu(test_db().await);
    let raum = RaumId::neu("r1");

    let record = service
        .aktion_anlegen(&raum, UserId::new(), UserId::new(), "mute", Some(10), None, None)
        .await
        .unwrap();

    let ablauf = record.expires_at.expect("Ablauf muss gesetzt sein");
    assert!(ablauf > chrono::Utc::now());
}

#[tokio::test]
async fn nicht_eingeschraenkter_benutzer() {
    let service = ModerationService::neu(test_db().await);
    assert!(!service
        .ist_eingeschraenkt(&RaumId::neu("r1"), UserId::new())
        .await
        .unwrap());
}
