//! External identity provider contract.

use async_trait::async_trait;

/// Identity claims returned by the provider after verification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerifiedIdentity {
    /// Provider-side subject id
    pub subject: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
    pub picture_url: Option<String>,
}

impl VerifiedIdentity {
    /// Provider name, falling back to the local part of the email.
    pub fn display_name(&self) -> Option<String> {
        self.name.clone().or_else(|| {
            self.email
                .as_deref()
                .and_then(|email| email.split('@').next())
                .filter(|local| !local.is_empty())
                .map(str::to_string)
        })
    }
}

/// Identity provider failures.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("{0}")]
    Rejected(String),

    #[error("Identity provider unavailable: {0}")]
    Unavailable(String),

    #[error("Identity provider not configured")]
    NotConfigured,
}

/// Verifies credentials against an external identity provider.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Verify an ID token issued to a native client.
    async fn verify_id_token(&self, id_token: &str) -> Result<VerifiedIdentity, IdentityError>;

    /// Exchange an authorization code and fetch the user's profile.
    async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<VerifiedIdentity, IdentityError>;
}
