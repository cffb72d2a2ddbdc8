//! Client side of the crib roommate matcher.
//!
//! Candidate discovery, swiping, matches and chat, written against the
//! backend capabilities in [`backend`] so the same code runs over HTTP or
//! fully in memory.

pub mod backend;
pub mod candidates;
pub mod chat;
pub mod config;
pub mod error;
pub mod profile;
pub mod registration;
pub mod screens;
pub mod scoring;
pub mod session;
pub mod swipe;

pub use backend::{Backend, HttpBackend, MemoryBackend};
pub use config::ClientConfig;
pub use error::{BackendError, ClientError, Result};
pub use session::Session;
