//! Integration-Tests fuer ChatMessageRepository (In-Memory SQLite)

use rampenlicht_core::types::Rolle;
use rampenlicht_db::{
    models::{NachrichtenFilter, NachrichtenTyp, NeueNachricht},
    ChatMessageRepository, SqliteDb,
};
use uuid::Uuid;

async fn db() -> SqliteDb {
    SqliteDb::in_memory()
        .await
        .expect("In-Memory DB konnte nicht erstellt werden")
}

fn neue_nachricht<'a>(room_id: &'a str, sender_id: Uuid, content: &'a str) -> NeueNachricht<'a> {
    NeueNachricht {
        room_id,
        sender_id,
        sender_username: "viewer1",
        sender_role: Rolle::Viewer,
        message_type: NachrichtenTyp::Text,
        content,
        tip_amount: None,
    }
}

#[tokio::test]
async fn nachricht_erstellen_und_laden() {
    let db = db().await;
    let sender = Uuid::new_v4();

    let nachricht = db
        .create(neue_nachricht("model-raum", sender, "hallo"))
        .await
        .unwrap();

    assert_eq!(nachricht.room_id, "model-raum");
    assert_eq!(nachricht.content, "hallo");
    assert!(!nachricht.ist_geloescht());

    let geladen = db.get_by_id(nachricht.id).await.unwrap().unwrap();
    assert_eq!(geladen.id, nachricht.id);
    assert_eq!(geladen.sender_id, sender);
    assert_eq!(geladen.sender_role, Rolle::Viewer);
}

#[tokio::test]
async fn history_chronologisch_und_begrenzt() {
    let db = db().await;
    let sender = Uuid::new_v4();

    for i in 0..5 {
        db.create(neue_nachricht("r1", sender, &format!("nachricht {i}")))
            .await
            .unwrap();
    }

    let history = db
        .get_history(NachrichtenFilter {
            room_id: "r1".into(),
            before: None,
            limit: Some(3),
        })
        .await
        .unwrap();

    assert_eq!(history.len(), 3);
    // Aelteste zuerst, neueste zuletzt
    for paar in history.windows(2) {
        assert!(paar[0].created_at <= paar[1].created_at);
    }
}

#[tokio::test]
async fn history_filtert_andere_raeume() {
    let db = db().await;
    let sender = Uuid::new_v4();

    db.create(neue_nachricht("r1", sender, "in r1")).await.unwrap();
    db.create(neue_nachricht("r2", sender, "in r2")).await.unwrap();

    let history = db
        .get_history(NachrichtenFilter {
            room_id: "r1".into(),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(history.len(), 1);
    assert_eq!(history[0].content, "in r1");
}

#[tokio::test]
async fn geloeschte_nachricht_verschwindet_aus_history() {
    let db = db().await;
    let sender = Uuid::new_v4();
    let moderator = Uuid::new_v4();

    let nachricht = db.create(neue_nachricht("r1", sender, "weg damit")).await.unwrap();
    db.create(neue_nachricht("r1", sender, "bleibt")).await.unwrap();

    assert!(db.mark_deleted(nachricht.id, moderator).await.unwrap());

    let history = db
        .get_history(NachrichtenFilter {
            room_id: "r1".into(),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].content, "bleibt");

    // Tombstone bleibt per get_by_id erreichbar
    let tombstone = db.get_by_id(nachricht.id).await.unwrap().unwrap();
    assert!(tombstone.ist_geloescht());
    assert_eq!(tombstone.deleted_by, Some(moderator));
}

#[tokio::test]
async fn doppeltes_loeschen_ist_kein_treffer() {
    let db = db().await;
    let nachricht = db
        .create(neue_nachricht("r1", Uuid::new_v4(), "einmal"))
        .await
        .unwrap();

    assert!(db.mark_deleted(nachricht.id, Uuid::new_v4()).await.unwrap());
    assert!(!db.mark_deleted(nachricht.id, Uuid::new_v4()).await.unwrap());
}

#[tokio::test]
async fn tip_nachricht_mit_betrag() {
    let db = db().await;

    let nachricht = db
        .create(NeueNachricht {
            room_id: "model-raum",
            sender_id: Uuid::new_v4(),
            sender_username: "spender",
            sender_role: Rolle::Viewer,
            message_type: NachrichtenTyp::Tip,
            content: "super show!",
            tip_amount: Some(50),
        })
        .await
        .unwrap();

    let geladen = db.get_by_id(nachricht.id).await.unwrap().unwrap();
    assert_eq!(geladen.message_type, NachrichtenTyp::Tip);
    assert_eq!(geladen.tip_amount, Some(50));
}
