//! Integration-Tests fuer KontoRepository (In-Memory SQLite)

use rampenlicht_db::{
    models::{NeueTransaktion, TransaktionsTyp},
    KontoRepository, SqliteDb,
};
use uuid::Uuid;

async fn db() -> SqliteDb {
    SqliteDb::in_memory()
        .await
        .expect("In-Memory DB konnte nicht erstellt werden")
}

#[tokio::test]
async fn aufladen_und_guthaben() {
    let db = db().await;
    let user = Uuid::new_v4();

    assert_eq!(db.guthaben(user).await.unwrap(), 0);

    let konto = db.aufladen(user, 100).await.unwrap();
    assert_eq!(konto.token_balance, 100);

    let konto = db.aufladen(user, 50).await.unwrap();
    assert_eq!(konto.token_balance, 150);
    assert_eq!(db.guthaben(user).await.unwrap(), 150);
}

#[tokio::test]
async fn abbuchen_mit_deckung() {
    let db = db().await;
    let user = Uuid::new_v4();
    db.aufladen(user, 100).await.unwrap();

    assert!(db.abbuchen(user, 60).await.unwrap());

    let konto = db.konto_laden(user).await.unwrap().unwrap();
    assert_eq!(konto.token_balance, 40);
    assert_eq!(konto.total_spent, 60);
}

#[tokio::test]
async fn abbuchen_ohne_deckung_schlaegt_fehl() {
    let db = db().await;
    let user = Uuid::new_v4();
    db.aufladen(user, 30).await.unwrap();

    assert!(!db.abbuchen(user, 31).await.unwrap());

    // Konto unveraendert
    let konto = db.konto_laden(user).await.unwrap().unwrap();
    assert_eq!(konto.token_balance, 30);
    assert_eq!(konto.total_spent, 0);
}

#[tokio::test]
async fn abbuchen_ohne_konto_schlaegt_fehl() {
    let db = db().await;
    assert!(!db.abbuchen(Uuid::new_v4(), 1).await.unwrap());
}

#[tokio::test]
async fn gutschreiben_legt_konto_an() {
    let db = db().await;
    let model = Uuid::new_v4();

    db.gutschreiben(model, 25).await.unwrap();
    db.gutschreiben(model, 25).await.unwrap();

    let konto = db.konto_laden(model).await.unwrap().unwrap();
    assert_eq!(konto.total_earnings, 50);
    assert_eq!(konto.available_balance, 50);
    assert_eq!(konto.token_balance, 0);
}

#[tokio::test]
async fn transaktionen_anlegen_und_listen() {
    let db = db().await;
    let user = Uuid::new_v4();

    db.transaktion_anlegen(NeueTransaktion {
        user_id: user,
        transaction_type: TransaktionsTyp::Tip,
        tokens: 50,
        model_room_id: Some("model-raum"),
        description: Some("Chat-Tip: super show"),
    })
    .await
    .unwrap();

    db.transaktion_anlegen(NeueTransaktion {
        user_id: user,
        transaction_type: TransaktionsTyp::Earning,
        tokens: 25,
        model_room_id: None,
        description: None,
    })
    .await
    .unwrap();

    let transaktionen = db.transaktionen_fuer(user).await.unwrap();
    assert_eq!(transaktionen.len(), 2);
    assert!(db.transaktionen_fuer(Uuid::new_v4()).await.unwrap().is_empty());
}
