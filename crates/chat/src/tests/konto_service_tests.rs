//! Unit-Tests fuer den KontoService

use std::sync::Arc;

use rampenlicht_core::types::{Identitaet, RaumId, Rolle, UserId};
use rampenlicht_db::{KontoRepository, SqliteDb};

use crate::konto::KontoService;

async fn test_db() -> Arc<SqliteDb> {
    Arc::new(
        SqliteDb::in_memory()
            .await
            .expect("In-Memory-DB konnte nicht geoeffnet werden"),
    )
}

fn viewer() -> Identitaet {
    Identitaet {
        user_id: UserId::new(),
        username: "spender".into(),
        rolle: Rolle::Viewer,
    }
}

#[tokio::test]
async fn guthaben_pruefung() {
    let service = KontoService::neu(test_db().await);
    let benutzer = UserId::new();

    assert!(!service.hat_guthaben(benutzer, 1).await.unwrap());

    service.aufladen(benutzer, 100).await.unwrap();
    assert!(service.hat_guthaben(benutzer, 100).await.unwrap());
    assert!(!service.hat_guthaben(benutzer, 101).await.unwrap());
}

#[tokio::test]
async fn tip_verbuchen_mit_gebuehr() {
    let db = test_db().await;
    let service = KontoService::neu(Arc::clone(&db));
    let spender = viewer();
    let model = UserId::new();
    let raum = RaumId::fuer_model(model);

    service.aufladen(spender.user_id, 100).await.unwrap();

    let verbucht = service
        .tip_verbuchen(&spender, &raum, 40, "super show")
        .await
        .unwrap();
    assert!(verbucht);

    // Viewer: 100 - 40, Model: 40 abzueglich 50% Gebuehr
    assert_eq!(db.guthaben(spender.user_id.inner()).await.unwrap(), 60);
    let model_konto = db.konto_laden(model.inner()).await.unwrap().unwrap();
    assert_eq!(model_konto.total_earnings, 20);
    assert_eq!(model_konto.available_balance, 20);

    // Beide Seiten haben eine Transaktion
    assert_eq!(db.transaktionen_fuer(spender.user_id.inner()).await.unwrap().len(), 1);
    assert_eq!(db.transaktionen_fuer(model.inner()).await.unwrap().len(), 1);
}

#[tokio::test]
async fn tip_ohne_deckung_wird_verworfen() {
    let db = test_db().await;
    let service = KontoService::neu(Arc::clone(&db));
    let spender = viewer();
    let raum = RaumId::fuer_model(UserId::new());

    service.aufladen(spender.user_id, 10).await.unwrap();

    let verbucht = service
        .tip_verbuchen(&spender, &raum, 11, "zu teuer")
        .await
        .unwrap();
    assert!(!verbucht);

    // Konto unveraendert, keine Transaktionen
    assert_eq!(db.guthaben(spender.user_id.inner()).await.unwrap(), 10);
    assert!(db
        .transaktionen_fuer(spender.user_id.inner())
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn tip_in_privaten_raum_wird_verworfen() {
    let db = test_db().await;
    let service = KontoService::neu(Arc::clone(&db));
    let spender = viewer();

    service.aufladen(spender.user_id, 100).await.unwrap();

    let verbucht = service
        .tip_verbuchen(&spender, &RaumId::neu("private_a_b"), 10, "hi")
        .await
        .unwrap();
    assert!(!verbucht);
    assert_eq!(db.guthaben(spender.user_id.inner()).await.unwrap(), 100);
}

#[tokio::test]
async fn tip_mit_nullbetrag_wird_verworfen() {
    let service = KontoService::neu(test_db().await);
    let spender = viewer();
    let raum = RaumId::fuer_model(UserId::new());

    assert!(!service.tip_verbuchen(&spender, &raum, 0, "nix").await.unwrap());
    assert!(!service.tip_verbuchen(&spender, &raum, -5, "nix").await.unwrap());
}
