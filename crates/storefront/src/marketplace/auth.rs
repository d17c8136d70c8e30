//! Marketplace access tokens.
//!
//! The storefront authenticates with client credentials and receives a bearer
//! token. The token is cached in memory and shared by every request until the
//! marketplace rejects it.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::instrument;
use url::Url;

use super::MarketplaceError;

/// Request body for the token endpoint.
#[derive(Serialize)]
struct TokenRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
}

/// Response from the token endpoint.
///
/// Older deployments nest the token under `data`.
#[derive(Deserialize)]
struct TokenResponse {
    #[serde(default, alias = "access_token")]
    token: Option<String>,
    #[serde(default)]
    data: Option<TokenData>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Deserialize)]
struct TokenData {
    #[serde(alias = "access_token")]
    token: String,
}

/// In-memory bearer token cache.
#[derive(Debug, Default)]
pub struct TokenCache {
    token: RwLock<Option<SecretString>>,
}

impl TokenCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached token, if any.
    pub async fn current(&self) -> Option<SecretString> {
        self.token.read().await.clone()
    }

    /// Replace the cached token.
    pub async fn store(&self, token: SecretString) {
        *self.token.write().await = Some(token);
    }

    /// Discard the cached token so the next request fetches a fresh one.
    pub async fn invalidate(&self) {
        *self.token.write().await = None;
    }
}

/// Obtain a new bearer token with client credentials.
///
/// # Errors
///
/// Returns `MarketplaceError::TokenUnavailable` if the credentials are
/// rejected or the response carries no token.
#[instrument(skip(client, client_secret), fields(client_id = %client_id))]
pub(super) async fn fetch_token(
    client: &reqwest::Client,
    url: Url,
    client_id: &str,
    client_secret: &SecretString,
) -> Result<SecretString, MarketplaceError> {
    let response = client
        .post(url)
        .json(&TokenRequest {
            client_id,
            client_secret: client_secret.expose_secret(),
        })
        .send()
        .await?;

    let status = response.status();

    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        return Err(MarketplaceError::TokenUnavailable(
            "client credentials rejected".to_string(),
        ));
    }

    if !status.is_success() {
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(MarketplaceError::TokenUnavailable(format!(
            "HTTP {status}: {}",
            error_text.chars().take(200).collect::<String>()
        )));
    }

    let body: TokenResponse = response.json().await?;

    body.token
        .or_else(|| body.data.map(|d| d.token))
        .filter(|t| !t.is_empty())
        .map(SecretString::from)
        .ok_or_else(|| {
            MarketplaceError::TokenUnavailable(
                body.message
                    .unwrap_or_else(|| "response contained no token".to_string()),
            )
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn token_url(server: &MockServer) -> Url {
        Url::parse(&format!("{}/generateToken", server.uri())).unwrap()
    }

    #[tokio::test]
    async fn test_cache_store_and_invalidate() {
        let cache = TokenCache::new();
        assert!(cache.current().await.is_none());

        cache.store(SecretString::from("t-1")).await;
        assert_eq!(cache.current().await.unwrap().expose_secret(), "t-1");

        cache.invalidate().await;
        assert!(cache.current().await.is_none());
    }

    #[tokio::test]
    async fn test_fetch_token_flat_and_nested() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/generateToken"))
            .and(body_json(serde_json::json!({
                "client_id": "storefront",
                "client_secret": "s3cr3t"
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "status": true, "token": "flat" })),
            )
            .up_to_n_times(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/generateToken"))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                serde_json::json!({ "status": true, "data": { "access_token": "nested" } }),
            ))
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let secret = SecretString::from("s3cr3t");

        let first = fetch_token(&client, token_url(&server), "storefront", &secret)
            .await
            .unwrap();
        assert_eq!(first.expose_secret(), "flat");

        let second = fetch_token(&client, token_url(&server), "storefront", &secret)
            .await
            .unwrap();
        assert_eq!(second.expose_secret(), "nested");
    }

    #[tokio::test]
    async fn test_fetch_token_rejected_credentials() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/generateToken"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let result = fetch_token(
            &reqwest::Client::new(),
            token_url(&server),
            "storefront",
            &SecretString::from("wrong"),
        )
        .await;

        assert!(matches!(result, Err(MarketplaceError::TokenUnavailable(_))));
    }

    #[tokio::test]
    async fn test_fetch_token_missing_token() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/generateToken"))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                serde_json::json!({ "status": false, "message": "client disabled" }),
            ))
            .mount(&server)
            .await;

        let result = fetch_token(
            &reqwest::Client::new(),
            token_url(&server),
            "storefront",
            &SecretString::from("s3cr3t"),
        )
        .await;

        match result {
            Err(MarketplaceError::TokenUnavailable(msg)) => assert_eq!(msg, "client disabled"),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
