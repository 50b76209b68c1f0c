//! Infrastructure layer - Adapter implementations
//!
//! Contains concrete implementations of the port interfaces,
//! integrating with cpal, rodio, Firestore and Firebase Auth.

pub mod capture;
pub mod config;
pub mod identity;
pub mod playback;
pub mod store;

// Re-export adapters
pub use capture::CpalCapture;
pub use config::XdgConfigStore;
pub use identity::FirebaseAuth;
pub use playback::RodioPlayer;
pub use store::{FirestoreStore, InMemoryStore};
