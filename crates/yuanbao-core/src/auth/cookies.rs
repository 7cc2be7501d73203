use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::api::YuanbaoClient;
use crate::models::UserInfo;

/// Env key holding a browser cookie string. May repeat, one cookie per line.
pub const COOKIE_ENV_KEY: &str = "YUANBAO_COOKIE";

/// Number of leading characters shown when a cookie is logged or printed
const COOKIE_PREVIEW_CHARS: usize = 8;

#[derive(Error, Debug)]
pub enum CookieError {
    #[error("Env file not found: {0}")]
    EnvFileNotFound(PathBuf),

    #[error("Failed to read env file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No YUANBAO_COOKIE entries found")]
    NoCookies,

    #[error("None of the {tried} cookies is valid - export fresh ones from the browser")]
    NoValidCookie { tried: usize },
}

/// Extract every `YUANBAO_COOKIE` value from env-file text, in order.
///
/// Cookie strings contain `;`, `=` and spaces, so each matching line is
/// taken verbatim after the first `=`, minus surrounding quotes. Comment
/// lines, other keys, and empty values are skipped.
pub fn parse_cookies(contents: &str) -> Vec<String> {
    contents
        .lines()
        .filter_map(|line| {
            let line = line.trim();
            let line = line.strip_prefix("export ").unwrap_or(line).trim_start();
            let (key, value) = line.split_once('=')?;
            if key.trim_end() != COOKIE_ENV_KEY {
                return None;
            }
            let value = value.trim().trim_matches(|c| c == '"' || c == '\'').trim();
            (!value.is_empty()).then(|| value.to_string())
        })
        .collect()
}

/// Read all cookies from an env file.
pub fn load_cookies(path: &Path) -> Result<Vec<String>, CookieError> {
    if !path.exists() {
        return Err(CookieError::EnvFileNotFound(path.to_path_buf()));
    }
    let contents = std::fs::read_to_string(path).map_err(|source| CookieError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let cookies = parse_cookies(&contents);
    debug!(path = %path.display(), count = cookies.len(), "Loaded cookies from env file");
    Ok(cookies)
}

/// The cookie set directly in the process environment, if any.
pub fn cookies_from_env() -> Option<String> {
    std::env::var(COOKIE_ENV_KEY)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Append `extra` to the file cookies unless it is already among them.
pub fn merge_cookies(mut cookies: Vec<String>, extra: Option<String>) -> Vec<String> {
    if let Some(extra) = extra {
        if !cookies.contains(&extra) {
            cookies.push(extra);
        }
    }
    cookies
}

/// Short, non-secret representation of a cookie for logs and reports.
pub fn mask_cookie(cookie: &str) -> String {
    let preview: String = cookie.chars().take(COOKIE_PREVIEW_CHARS).collect();
    format!("{}… ({} chars)", preview, cookie.chars().count())
}

/// Try each cookie in order and return the first one with an active session.
pub async fn find_valid_cookie(
    client: &YuanbaoClient,
    cookies: &[String],
) -> Result<(String, UserInfo), CookieError> {
    if cookies.is_empty() {
        return Err(CookieError::NoCookies);
    }

    for (i, cookie) in cookies.iter().enumerate() {
        let masked = mask_cookie(cookie);
        match client.with_cookie(cookie.clone()).fetch_user_info().await {
            Ok(info) if info.is_active() => {
                info!(index = i, cookie = %masked, user = %info.user_id_display(), "Found valid cookie");
                return Ok((cookie.clone(), info));
            }
            Ok(info) => {
                warn!(index = i, cookie = %masked, status = ?info.status, "Cookie session is not active");
            }
            Err(e) => {
                warn!(index = i, cookie = %masked, error = %e, "Failed to check cookie");
            }
        }
    }

    Err(CookieError::NoValidCookie {
        tried: cookies.len(),
    })
}

/// Outcome of checking one cookie.
#[derive(Debug)]
pub struct CookieCheck {
    pub masked: String,
    pub result: Result<UserInfo, String>,
}

impl CookieCheck {
    pub fn is_valid(&self) -> bool {
        matches!(&self.result, Ok(info) if info.is_active())
    }
}

/// Check every cookie, without stopping at the first valid one.
pub async fn check_cookies(client: &YuanbaoClient, cookies: &[String]) -> Vec<CookieCheck> {
    let mut checks = Vec::with_capacity(cookies.len());
    for cookie in cookies {
        let result = client
            .with_cookie(cookie.clone())
            .fetch_user_info()
            .await
            .map_err(|e| e.to_string());
        checks.push(CookieCheck {
            masked: mask_cookie(cookie),
            result,
        });
    }
    checks
}
