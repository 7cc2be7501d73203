//! API client for the Yuanbao web API.
//!
//! This module provides the `YuanbaoClient` struct for checking a session
//! cookie and for sending a chat message whose reply arrives as an
//! event stream.

use std::time::Duration;

use anyhow::{Context, Result};
use futures::StreamExt;
use reqwest::{header, Client};
use tracing::{debug, info};

use crate::models::{ChatOptions, ChatReply, ChatRequest, UserInfo};
use crate::stream::{ChatAccumulator, LineBuffer};
use crate::user_agent::random_user_agent;

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Origin of the Yuanbao web app; API paths hang off `/api`.
const BASE_URL: &str = "https://yuanbao.tencent.com";

/// Path of the endpoint returning the logged-in user's profile
const USER_INFO_PATH: &str = "/api/getuserinfo";

/// Path prefix of the chat endpoint; the conversation ID is appended
const CHAT_PATH: &str = "/api/chat";

/// TCP/TLS connect timeout in seconds.
const CONNECT_TIMEOUT_SECS: u64 = 30;

/// API client for Yuanbao.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct YuanbaoClient {
    client: Client,
    base_url: String,
    cookie: Option<String>,
}

impl YuanbaoClient {
    /// Create a new API client.
    ///
    /// `read_timeout_secs` bounds the silence between two reads, not the
    /// whole request, so a long reply keeps streaming as long as data flows.
    pub fn new(read_timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .read_timeout(Duration::from_secs(read_timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: BASE_URL.to_string(),
            cookie: None,
        })
    }

    /// Point the client at a different origin (mirrors, local test servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Create a new client with the given cookie, sharing the connection pool.
    pub fn with_cookie(&self, cookie: String) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            cookie: Some(cookie),
        }
    }

    /// Validate that a string looks like a valid GUID (UUID format).
    /// Conversation IDs are 36 characters with dashes: xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx
    pub fn is_valid_guid(s: &str) -> bool {
        if s.len() != 36 {
            return false;
        }
        s.chars().enumerate().all(|(i, c)| {
            if i == 8 || i == 13 || i == 18 || i == 23 {
                c == '-'
            } else {
                c.is_ascii_hexdigit()
            }
        })
    }

    fn cookie_headers(&self) -> Result<header::HeaderMap> {
        let cookie = self.cookie.as_deref().ok_or(ApiError::MissingCookie)?;

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::COOKIE,
            header::HeaderValue::from_str(cookie)
                .context("Cookie contains characters not allowed in an HTTP header")?,
        );
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_static(random_user_agent()),
        );
        Ok(headers)
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body).into())
        }
    }

    /// Fetch the profile of the user the cookie belongs to
    pub async fn fetch_user_info(&self) -> Result<UserInfo> {
        let url = format!("{}{}", self.base_url, USER_INFO_PATH);

        let response = self
            .client
            .get(&url)
            .headers(self.cookie_headers()?)
            .send()
            .await
            .map_err(ApiError::from)
            .context("Failed to send user info request")?;

        let response = Self::check_response(response).await?;

        let text = response
            .text()
            .await
            .context("Failed to read user info response body")?;
        serde_json::from_str(&text).map_err(|e| {
            ApiError::InvalidResponse(format!("Failed to parse user info: {}", e)).into()
        })
    }

    /// Check whether the cookie belongs to an active session.
    /// Any failure, including network errors, counts as invalid.
    pub async fn is_cookie_valid(&self) -> bool {
        match self.fetch_user_info().await {
            Ok(info) => info.is_active(),
            Err(e) => {
                debug!(error = %e, "Cookie check failed");
                false
            }
        }
    }

    /// Send one message to a conversation and collect the streamed reply
    pub async fn chat(
        &self,
        conversation_id: &str,
        message: &str,
        options: ChatOptions,
    ) -> Result<ChatReply> {
        if !Self::is_valid_guid(conversation_id) {
            anyhow::bail!("Invalid conversation ID: {}", conversation_id);
        }

        let url = format!("{}{}/{}", self.base_url, CHAT_PATH, conversation_id);
        let request = ChatRequest::new(message, options);

        info!(model = %options.model, internet = options.internet_search, "Sending chat message");

        let response = self
            .client
            .post(&url)
            .headers(self.cookie_headers()?)
            .json(&request)
            .send()
            .await
            .map_err(ApiError::from)
            .context("Failed to send chat request")?;

        let response = Self::check_response(response).await?;

        let mut stream = response.bytes_stream();
        let mut lines = LineBuffer::new();
        let mut acc = ChatAccumulator::new();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk
                .map_err(ApiError::from)
                .context("Failed to read chat stream")?;
            for line in lines.push(&chunk) {
                acc.push_line(&line);
            }
        }
        if let Some(line) = lines.finish() {
            acc.push_line(&line);
        }

        debug!(
            thoughts = acc.thought_count(),
            answer_parts = acc.answer_count(),
            "Chat stream finished"
        );

        Ok(acc.finish())
    }
}
