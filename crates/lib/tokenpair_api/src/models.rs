//! Request and response bodies.

use serde::{Deserialize, Serialize};
use tokenpair_core::models::auth::TokenPair;

/// Query string of `POST /auth/login`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginParams {
    #[serde(rename = "userId")]
    pub user_id: i32,
}

/// Body of `POST /auth/refresh`.
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshRequest {
    #[serde(rename = "accessToken", alias = "AccessToken")]
    pub access_token: String,
    #[serde(rename = "refreshToken", alias = "RefreshToken")]
    pub refresh_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
}

impl From<TokenPair> for TokenResponse {
    fn from(pair: TokenPair) -> Self {
        Self {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refresh_request_accepts_both_casings() {
        let camel: RefreshRequest =
            serde_json::from_str(r#"{"accessToken":"a","refreshToken":"r"}"#).unwrap();
        let pascal: RefreshRequest =
            serde_json::from_str(r#"{"AccessToken":"a","RefreshToken":"r"}"#).unwrap();
        assert_eq!(camel.access_token, pascal.access_token);
        assert_eq!(camel.refresh_token, pascal.refresh_token);
    }

    #[test]
    fn token_response_is_camel_case() {
        let body = serde_json::to_value(TokenResponse {
            access_token: "a".into(),
            refresh_token: "r".into(),
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"accessToken": "a", "refreshToken": "r"}));
    }
}
