//! Google identity provider over the public OAuth endpoints.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::IdentitySettings;
use crate::domain::{IdentityError, IdentityProvider, VerifiedIdentity};

/// Claims returned by the token-info endpoint.
#[derive(Debug, Deserialize)]
struct TokenInfo {
    sub: Option<String>,
    email: Option<String>,
    name: Option<String>,
    picture: Option<String>,
}

impl From<TokenInfo> for VerifiedIdentity {
    fn from(info: TokenInfo) -> Self {
        Self {
            subject: info.sub,
            email: info.email,
            name: info.name,
            picture_url: info.picture,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

/// Profile returned by the userinfo endpoint.
#[derive(Debug, Deserialize)]
struct UserInfo {
    id: Option<String>,
    email: Option<String>,
    name: Option<String>,
    picture: Option<String>,
}

impl From<UserInfo> for VerifiedIdentity {
    fn from(info: UserInfo) -> Self {
        Self {
            subject: info.id,
            email: info.email,
            name: info.name,
            picture_url: info.picture,
        }
    }
}

/// Verifies Google credentials with bounded outbound requests.
pub struct GoogleIdentityProvider {
    client: reqwest::Client,
    client_credentials: Option<(String, String)>,
    tokeninfo_url: String,
    token_url: String,
    userinfo_url: String,
}

impl GoogleIdentityProvider {
    pub fn new(settings: &IdentitySettings) -> Result<Self, IdentityError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| IdentityError::Unavailable(e.to_string()))?;

        Ok(Self {
            client,
            client_credentials: settings
                .client_credentials()
                .map(|(id, secret)| (id.to_string(), secret.to_string())),
            tokeninfo_url: settings.tokeninfo_url.clone(),
            token_url: settings.token_url.clone(),
            userinfo_url: settings.userinfo_url.clone(),
        })
    }
}

fn unavailable(context: &str, err: reqwest::Error) -> IdentityError {
    IdentityError::Unavailable(format!("{}: {}", context, err))
}

#[async_trait]
impl IdentityProvider for GoogleIdentityProvider {
    async fn verify_id_token(&self, id_token: &str) -> Result<VerifiedIdentity, IdentityError> {
        let response = self
            .client
            .get(&self.tokeninfo_url)
            .query(&[("id_token", id_token)])
            .send()
            .await
            .map_err(|e| unavailable("tokeninfo", e))?;

        if !response.status().is_success() {
            tracing::debug!(status = %response.status(), "ID token rejected");
            return Err(IdentityError::Rejected("Invalid token".into()));
        }

        let info: TokenInfo = response
            .json()
            .await
            .map_err(|e| unavailable("tokeninfo body", e))?;
        Ok(info.into())
    }

    async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<VerifiedIdentity, IdentityError> {
        let (client_id, client_secret) = self
            .client_credentials
            .as_ref()
            .ok_or(IdentityError::NotConfigured)?;

        let response = self
            .client
            .post(&self.token_url)
            .form(&[
                ("code", code),
                ("client_id", client_id.as_str()),
                ("client_secret", client_secret.as_str()),
                ("redirect_uri", redirect_uri),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(|e| unavailable("token exchange", e))?;

        if !response.status().is_success() {
            return Err(IdentityError::Rejected("Failed to exchange code".into()));
        }

        let tokens: TokenResponse = response
            .json()
            .await
            .map_err(|e| unavailable("token body", e))?;
        let access_token = tokens
            .access_token
            .ok_or_else(|| IdentityError::Rejected("Failed to exchange code".into()))?;

        let response = self
            .client
            .get(&self.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| unavailable("userinfo", e))?;

        if !response.status().is_success() {
            return Err(IdentityError::Rejected("Failed to get user info".into()));
        }

        let info: UserInfo = response
            .json()
            .await
            .map_err(|e| unavailable("userinfo body", e))?;
        Ok(info.into())
    }
}
