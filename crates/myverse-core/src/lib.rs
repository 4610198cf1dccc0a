pub mod config;
pub mod error;
pub mod models;
pub mod relationship;
pub mod routes;
pub mod session;
pub mod storage;
pub mod toast;
pub mod validation;

pub use error::MyverseError;
