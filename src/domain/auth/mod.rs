//! Authentication domain module

mod credentials;
mod identity;

pub use credentials::{Credentials, MIN_PASSWORD_LEN};
pub use identity::Identity;
