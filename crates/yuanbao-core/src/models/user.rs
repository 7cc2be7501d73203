use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// `status` value the service reports for a logged-in, usable account.
pub const ACTIVE_USER_STATUS: i64 = 2;

/// Response of `GET /api/getuserinfo`.
///
/// Only the fields needed to judge a cookie are typed; everything else
/// is kept as-is so the record can be written back out unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    #[serde(rename = "userId", default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserInfo {
    /// True when the response identifies a user whose session is active.
    pub fn is_active(&self) -> bool {
        self.user_id.is_some() && self.status == Some(ACTIVE_USER_STATUS)
    }

    /// User ID as display text, whether the service sent a string or a number.
    pub fn user_id_display(&self) -> String {
        match &self.user_id {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => "unknown".to_string(),
        }
    }

    pub fn nickname(&self) -> Option<&str> {
        self.extra.get("nickname").and_then(Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_active_user() {
        let json = r#"{"userId":"u_123","status":2,"nickname":"元宝用户","avatar":"https://example.invalid/a.png"}"#;
        let info: UserInfo = serde_json::from_str(json).expect("Failed to parse user info");
        assert!(info.is_active());
        assert_eq!(info.user_id_display(), "u_123");
        assert_eq!(info.nickname(), Some("元宝用户"));
        assert_eq!(info.extra.len(), 2);
    }

    #[test]
    fn test_inactive_or_incomplete() {
        let banned: UserInfo = serde_json::from_str(r#"{"userId":1,"status":1}"#).unwrap();
        assert!(!banned.is_active());

        let no_id: UserInfo = serde_json::from_str(r#"{"status":2}"#).unwrap();
        assert!(!no_id.is_active());

        let empty: UserInfo = serde_json::from_str("{}").unwrap();
        assert!(!empty.is_active());
        assert_eq!(empty.user_id_display(), "unknown");
    }

    #[test]
    fn test_round_trip_keeps_unknown_fields() {
        let json = r#"{"userId":42,"status":2,"vip":{"level":3}}"#;
        let info: UserInfo = serde_json::from_str(json).unwrap();
        let value = serde_json::to_value(&info).unwrap();
        assert_eq!(value["vip"]["level"], 3);
        assert_eq!(value["userId"], 42);
    }
}
