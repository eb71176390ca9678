// Password-grant token fetch

use chrono::{Duration, Utc};
use reqwest::Client;

use super::types::{TokenResponse, TokenState};
use crate::config::Config;
use crate::error::AuthError;

/// Token lifetime assumed when the endpoint omits `expires_in`.
const DEFAULT_EXPIRES_IN_SECS: i64 = 300;

/// Exchange the configured resource-owner credentials for an access token.
///
/// Sends the request once; callers decide whether a failure is retried on a
/// later request. Token values and response bodies of successful calls are
/// never logged.
pub async fn fetch_token(client: &Client, config: &Config) -> Result<TokenState, AuthError> {
    let client_secret = require(&config.client_secret, "CS_CLIENT_SECRET")?;
    let username = require(&config.username, "CS_USERNAME")?;
    let password = require(&config.password, "CS_PASSWORD")?;

    tracing::debug!(url = %config.token_url, "requesting access token");

    let form = [
        ("grant_type", "password"),
        ("client_id", config.client_id.as_str()),
        ("client_secret", client_secret),
        ("username", username),
        ("password", password),
    ];

    let response = client.post(&config.token_url).form(&form).send().await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        tracing::warn!(status = status.as_u16(), "token endpoint rejected the request");
        return Err(AuthError::Endpoint {
            status: status.as_u16(),
            body,
        });
    }

    let data: TokenResponse = response
        .json()
        .await
        .map_err(|e| AuthError::InvalidResponse(e.to_string()))?;

    if data.access_token.is_empty() {
        return Err(AuthError::InvalidResponse(
            "response does not contain access_token".to_string(),
        ));
    }

    let expires_in = data
        .expires_in
        .map(|secs| secs as i64)
        .unwrap_or(DEFAULT_EXPIRES_IN_SECS);
    let expires_at = Utc::now() + Duration::seconds(expires_in);

    tracing::info!(expires_at = %expires_at.to_rfc3339(), "access token acquired");

    Ok(TokenState {
        access_token: data.access_token,
        expires_at,
    })
}

fn require<'a>(
    value: &'a Option<String>,
    name: &'static str,
) -> Result<&'a str, AuthError> {
    match value.as_deref() {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(AuthError::MissingConfig(name)),
    }
}
