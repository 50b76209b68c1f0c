//! Identity provider infrastructure module

mod firebase_auth;

pub use firebase_auth::FirebaseAuth;
