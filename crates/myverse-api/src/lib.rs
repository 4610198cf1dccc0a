//! Typed client for the MyVerse REST API.
//!
//! [`ApiClient`] is the single HTTP entry point: it attaches the session's
//! bearer token to every request and reports authorization failures back to
//! the [`SessionStore`](myverse_core::session::SessionStore). Everything else
//! is a thin service over it.

pub mod client;
pub mod dashboard;
pub mod error;
pub mod scope;
pub mod search;
pub mod services;
pub mod session;

pub use client::ApiClient;
pub use error::{ApiError, ErrorKind};
pub use session::SessionManager;
