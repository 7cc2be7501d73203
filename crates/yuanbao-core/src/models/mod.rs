//! Data models for the Yuanbao web API.
//!
//! - `ChatModel`, `ChatOptions`, `ChatRequest`: what goes out on a chat call
//! - `ChatReply`: the merged thinking trace and answer that come back
//! - `UserInfo`: the `getuserinfo` response used to validate cookies
//! - `ModelCard`, `ModelList`: the public model catalogue

pub mod chat;
pub mod user;

pub use chat::{ChatModel, ChatOptions, ChatReply, ChatRequest, ModelCard, ModelList};
pub use user::{UserInfo, ACTIVE_USER_STATUS};
