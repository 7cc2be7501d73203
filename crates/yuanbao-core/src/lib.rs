//! Core library for yuanbao-chat.
//!
//! This crate holds everything except the terminal front end:
//!
//! - `api`: `YuanbaoClient` for the Yuanbao web API and its error type
//! - `auth`: cookie loading from env files, validation, and user info storage
//! - `models`: request payloads, chat models, and reply types
//! - `stream`: decoding of the SSE chat stream into thinking and answer text
//! - `output`: rendering a reply for the terminal

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod output;
pub mod stream;
pub mod user_agent;

#[cfg(any(test, feature = "test-util"))]
pub mod test_server;

pub use api::{ApiError, YuanbaoClient};
pub use auth::{CookieError, UserInfoStore};
pub use config::Config;
pub use models::{ChatModel, ChatOptions, ChatReply, UserInfo};
