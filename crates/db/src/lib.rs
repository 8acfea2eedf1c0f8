//! rampenlicht-db – Datenbank-Abstraktion
//!
//! Dieses Crate stellt das Repository-Pattern bereit, das die
//! Geschaeftslogik von der konkreten SQLite-Implementierung entkoppelt.
//! Die Echtzeit-Schicht kennt nur die schmalen Traits; Tests ersetzen
//! sie durch In-Memory-Fakes.

pub mod error;
pub mod models;
pub mod repository;
pub mod sqlite;

pub use error::DbError;
pub use repository::{
    ChatMessageRepository, DatabaseConfig, DbResult, KontoRepository, ModerationRepository,
};
pub use sqlite::SqliteDb;
