//! Authentication Service
//!
//! Google sign-in: verifies the credential with the identity provider and
//! finds or creates the matching user by email.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{
    IdentityError, IdentityProvider, User, UserRepository, VerifiedIdentity,
    GOOGLE_DEVICE_PREFIX,
};
use crate::shared::clock::Clock;
use crate::shared::error::AppError;

/// Credential presented by a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GoogleCredential {
    /// ID token obtained by a native client
    IdToken(String),

    /// Authorization code from the web flow
    Code {
        code: String,
        redirect_uri: Option<String>,
    },
}

/// Authentication errors
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("{0}")]
    InvalidCredential(String),

    #[error("Email not found in token")]
    MissingEmail,

    #[error("Google OAuth not configured")]
    NotConfigured,

    #[error(transparent)]
    Store(#[from] AppError),
}

impl From<IdentityError> for AuthError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::NotConfigured => AuthError::NotConfigured,
            IdentityError::Rejected(msg) => AuthError::InvalidCredential(msg),
            IdentityError::Unavailable(msg) => {
                AuthError::InvalidCredential(format!("Token verification failed: {}", msg))
            }
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredential(_) => AppError::Unauthorized(err.to_string()),
            AuthError::MissingEmail => AppError::Validation(err.to_string()),
            AuthError::NotConfigured => AppError::Internal(err.to_string()),
            AuthError::Store(e) => e,
        }
    }
}

/// Authentication service trait for dependency injection
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Sign in with Google. The flag is true when the user was created.
    async fn sign_in_with_google(
        &self,
        credential: GoogleCredential,
    ) -> Result<(User, bool), AuthError>;
}

/// AuthService implementation
pub struct AuthServiceImpl<U>
where
    U: UserRepository + ?Sized,
{
    user_repo: Arc<U>,
    identity: Arc<dyn IdentityProvider>,
    clock: Arc<dyn Clock>,
    default_redirect_uri: String,
}

impl<U> AuthServiceImpl<U>
where
    U: UserRepository + ?Sized,
{
    pub fn new(
        user_repo: Arc<U>,
        identity: Arc<dyn IdentityProvider>,
        clock: Arc<dyn Clock>,
        default_redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            user_repo,
            identity,
            clock,
            default_redirect_uri: default_redirect_uri.into(),
        }
    }

    async fn verify(&self, credential: &GoogleCredential) -> Result<VerifiedIdentity, AuthError> {
        let identity = match credential {
            GoogleCredential::IdToken(token) => self.identity.verify_id_token(token).await?,
            GoogleCredential::Code { code, redirect_uri } => {
                let redirect_uri = redirect_uri
                    .as_deref()
                    .unwrap_or(&self.default_redirect_uri);
                self.identity.exchange_code(code, redirect_uri).await?
            }
        };
        Ok(identity)
    }
}

/// Apply fresh provider claims to an existing user.
///
/// The name follows the provider. The picture replaces the avatar unless
/// the user uploaded one. Returns whether anything changed.
fn refresh_profile(user: &mut User, name: Option<String>, picture: Option<&str>) -> bool {
    let mut changed = false;

    if let Some(name) = name {
        if user.name.as_deref() != Some(name.as_str()) {
            user.name = Some(name);
            changed = true;
        }
    }

    if let Some(picture) = picture {
        if !user.has_uploaded_avatar() && user.avatar_path.as_deref() != Some(picture) {
            user.avatar_path = Some(picture.to_string());
            changed = true;
        }
    }

    changed
}

#[async_trait]
impl<U> AuthService for AuthServiceImpl<U>
where
    U: UserRepository + ?Sized + 'static,
{
    async fn sign_in_with_google(
        &self,
        credential: GoogleCredential,
    ) -> Result<(User, bool), AuthError> {
        let identity = self.verify(&credential).await.inspect_err(|e| {
            tracing::warn!(error = %e, "Google credential rejected");
        })?;

        let email = identity
            .email
            .clone()
            .filter(|email| !email.is_empty())
            .ok_or(AuthError::MissingEmail)?;
        let name = identity.display_name();

        if let Some(mut user) = self.user_repo.find_by_email(&email).await? {
            if refresh_profile(&mut user, name, identity.picture_url.as_deref()) {
                user = self.user_repo.update(&user).await?;
            }
            tracing::info!(user_id = %user.id, "Google sign-in");
            return Ok((user, false));
        }

        let mut user = User::new(
            format!("{}{}", GOOGLE_DEVICE_PREFIX, email),
            self.clock.now(),
        );
        user.email = Some(email);
        user.name = name;
        user.avatar_path = identity.picture_url;

        let user = self.user_repo.create(&user).await?;
        tracing::info!(user_id = %user.id, "Google user created");
        Ok((user, true))
    }
}
