//! Document store infrastructure module

mod firestore;
mod memory;

pub use firestore::FirestoreStore;
pub use memory::InMemoryStore;
