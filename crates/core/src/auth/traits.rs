use async_trait::async_trait;

use super::{AuthError, Credentials, Identity, ProviderClaims};

/// Result type for auth operations.
pub type Result<T> = std::result::Result<T, AuthError>;

/// An authentication provider.
///
/// Implementations publish every successful sign-in and every sign-out to
/// the identity stream they were constructed with.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Creates an email/password account and signs it in.
    async fn register(&self, credentials: &Credentials) -> Result<Identity>;

    /// Signs in with email and password.
    async fn sign_in(&self, credentials: &Credentials) -> Result<Identity>;

    /// Signs in with claims obtained from a federated provider.
    async fn sign_in_with(&self, claims: &ProviderClaims) -> Result<Identity>;

    /// Starts a password reset for the account.
    async fn reset_password(&self, email: &str) -> Result<()>;

    /// Issues a fresh token for the signed-in user.
    ///
    /// The identity stream keeps the new token but does not notify
    /// subscribers.
    async fn refresh_token(&self) -> Result<Identity>;

    /// Signs out the current user.
    async fn sign_out(&self) -> Result<()>;
}
