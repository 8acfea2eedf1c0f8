//! SQLite-Backend-Implementierungen fuer alle Repository-Traits

pub mod chat;
pub mod konto;
pub mod moderation;
pub mod pool;

pub use pool::SqliteDb;
