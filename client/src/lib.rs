//! # ptclient
//!
//! Client-side session core for the PT (Personal Transformer) nutrition
//! assistant. Owns the session state container (identity, transcript,
//! generated meal plan), the backend HTTP contract, and the landing/chat page
//! controllers that drive a remote conversational backend.
//!
//! Rendering is left to the embedding front end; this crate only exposes
//! state and the operations that mutate it.

pub mod app;
pub mod config;
pub mod net;
pub mod pages;
pub mod state;

pub use app::{App, AppError, Route};
pub use config::ClientConfig;
pub use net::api::{Backend, HttpBackend};
pub use net::types::Model;
pub use state::session::SessionState;
