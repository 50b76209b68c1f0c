//! Configuration domain module

mod app_config;

pub use app_config::{AppConfig, StoreKind, DEFAULT_COLLECTION};
