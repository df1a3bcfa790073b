//! Networking modules for the PT backend HTTP contract.
//!
//! SYSTEM CONTEXT
//! ==============
//! `types` defines the wire schema, `api` the `Backend` trait and its
//! `reqwest` implementation.

pub mod api;
pub mod types;

#[cfg(test)]
pub(crate) mod mock;
