//! Playback infrastructure module

mod rodio;

pub use self::rodio::{RodioPlayer, RodioSound};
