//! REST API client module for the Yuanbao web service.
//!
//! The service has no token API. Every request carries the browser
//! session cookie in the `Cookie` header together with a desktop
//! `User-Agent`, exactly as a logged-in browser tab would.

pub mod client;
pub mod error;

pub use client::YuanbaoClient;
pub use error::ApiError;
