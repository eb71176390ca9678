// Authentication types

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Successful token endpoint response
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: Option<u64>,
}

/// A cached access token with its absolute expiry.
///
/// Serializes as the `/api/token` diagnostic payload.
#[derive(Debug, Clone, Serialize)]
pub struct TokenState {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

impl TokenState {
    /// Whether the token is still usable, i.e. more than `margin_secs`
    /// away from expiry.
    pub fn is_fresh(&self, margin_secs: i64) -> bool {
        Utc::now() + Duration::seconds(margin_secs) < self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_response_deserialization() {
        let data: TokenResponse =
            serde_json::from_str(r#"{"access_token":"tok-1","expires_in":3600}"#).unwrap();
        assert_eq!(data.access_token, "tok-1");
        assert_eq!(data.expires_in, Some(3600));

        // expires_in is optional; extra fields are ignored
        let data: TokenResponse =
            serde_json::from_str(r#"{"access_token":"tok-2","token_type":"Bearer"}"#).unwrap();
        assert_eq!(data.access_token, "tok-2");
        assert_eq!(data.expires_in, None);
    }

    #[test]
    fn test_freshness_margin() {
        let state = TokenState {
            access_token: "tok".to_string(),
            expires_at: Utc::now() + Duration::seconds(600),
        };
        // 10 minutes out, 60s margin - fresh
        assert!(state.is_fresh(60));

        let state = TokenState {
            access_token: "tok".to_string(),
            expires_at: Utc::now() + Duration::seconds(30),
        };
        // 30 seconds out, 60s margin - inside the margin, stale
        assert!(!state.is_fresh(60));

        let state = TokenState {
            access_token: "tok".to_string(),
            expires_at: Utc::now() - Duration::seconds(1),
        };
        // already expired
        assert!(!state.is_fresh(60));
    }

    #[test]
    fn test_token_state_serialization() {
        let state = TokenState {
            access_token: "tok".to_string(),
            expires_at: Utc::now(),
        };
        let value = serde_json::to_value(&state).unwrap();
        assert_eq!(value["access_token"], "tok");
        assert!(value["expires_at"].is_string());
    }
}
