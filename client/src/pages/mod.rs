//! Page controllers for the two route-level screens.
//!
//! ARCHITECTURE
//! ============
//! Each page owns its route-scoped view state (input fields, the in-flight exchange) and
//! the orchestration of its backend calls. Shared session data lives in
//! `SessionState`, which the `App` controller lends to the active page.

pub mod chat;
pub mod landing;
