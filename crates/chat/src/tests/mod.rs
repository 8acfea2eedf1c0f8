//! Unit-Tests fuer die Chat-Dienste

mod konto_service_tests;
mod moderation_service_tests;
