//! Authentication module for Yuanbao web sessions.
//!
//! The service is accessed with cookies copied out of a logged-in
//! browser. This module provides:
//! - cookie loading from an env file with repeated `YUANBAO_COOKIE` keys
//! - remote validation, picking the first cookie whose session is active
//! - `UserInfoStore`: on-disk copy of the validated user's profile
//!
//! Cookies expire on the service's schedule; there is no refresh flow,
//! the user re-exports them from the browser.

pub mod cookies;
pub mod user_info;

pub use cookies::{
    check_cookies, cookies_from_env, find_valid_cookie, load_cookies, mask_cookie, merge_cookies,
    parse_cookies, CookieCheck, CookieError, COOKIE_ENV_KEY,
};
pub use user_info::{SavedUserInfo, UserInfoStore};
