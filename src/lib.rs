//! voice-memos - record voice memos and sync their metadata to Cloud Firestore
//!
//! This crate records audio from the microphone, plays finished recordings
//! back, and keeps a metadata document for each recording in a remote
//! document store, with email/password sign-in through Firebase Auth.
//!
//! # Architecture
//!
//! The crate follows hexagonal (ports & adapters) architecture:
//!
//! - **Domain**: Core business logic, value objects, and errors
//! - **Application**: Use cases and port interfaces (traits)
//! - **Infrastructure**: Adapter implementations (cpal, rodio, Firestore, Firebase Auth, config)
//! - **CLI**: Command-line interface, argument parsing, and signal handling

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
