//! HTTP handlers behind the server's routes.

pub mod api;
pub mod upload;
