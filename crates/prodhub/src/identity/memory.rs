//! In-memory auth provider for tests and local sessions.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use prodhub_core::auth::{
    email_to_name, generate_token, generate_user_id, validate_email, validate_password,
    AuthError, AuthProvider, Credentials, Identity, ProviderClaims, Result, SignInMethod,
};

use super::IdentityStream;

#[derive(Debug, Clone)]
struct Account {
    user_id: String,
    email: String,
    password: String,
    display_name: String,
    disabled: bool,
}

/// Accounts live in process memory and vanish with it.
pub struct InMemoryAuthProvider {
    identity: IdentityStream,
    /// Keyed by lowercase email.
    accounts: RwLock<HashMap<String, Account>>,
    /// Keyed by (provider, subject); value is the user id.
    federated: RwLock<HashMap<(SignInMethod, String), String>>,
    reset_requests: RwLock<Vec<String>>,
}

impl InMemoryAuthProvider {
    pub fn new(identity: IdentityStream) -> Self {
        Self {
            identity,
            accounts: RwLock::new(HashMap::new()),
            federated: RwLock::new(HashMap::new()),
            reset_requests: RwLock::new(Vec::new()),
        }
    }

    /// Blocks future sign-ins for the account.
    pub async fn disable(&self, email: &str) -> Result<()> {
        let mut accounts = self.accounts.write().await;
        let account = accounts
            .get_mut(&email.to_lowercase())
            .ok_or(AuthError::UserNotFound)?;
        account.disabled = true;
        Ok(())
    }

    /// Emails for which a password reset was requested, oldest first.
    pub async fn reset_requests(&self) -> Vec<String> {
        self.reset_requests.read().await.clone()
    }

    fn sign_in_account(&self, account: &Account) -> Identity {
        let identity = Identity::new(&account.user_id, SignInMethod::Password, generate_token())
            .with_email(&account.email)
            .with_display_name(&account.display_name);
        self.identity.publish(Some(identity.clone()));
        tracing::info!(user_id = %account.user_id, "signed in");
        identity
    }
}

#[async_trait]
impl AuthProvider for InMemoryAuthProvider {
    async fn register(&self, credentials: &Credentials) -> Result<Identity> {
        validate_email(&credentials.email)?;
        validate_password(&credentials.password)?;

        let key = credentials.email.to_lowercase();
        let account = {
            let mut accounts = self.accounts.write().await;
            if accounts.contains_key(&key) {
                return Err(AuthError::EmailAlreadyInUse);
            }
            let account = Account {
                user_id: generate_user_id(),
                email: credentials.email.clone(),
                password: credentials.password.clone(),
                display_name: email_to_name(&credentials.email),
                disabled: false,
            };
            accounts.insert(key, account.clone());
            account
        };

        Ok(self.sign_in_account(&account))
    }

    async fn sign_in(&self, credentials: &Credentials) -> Result<Identity> {
        validate_email(&credentials.email)?;

        let account = self
            .accounts
            .read()
            .await
            .get(&credentials.email.to_lowercase())
            .cloned()
            .ok_or(AuthError::UserNotFound)?;

        if account.disabled {
            return Err(AuthError::UserDisabled);
        }
        if account.password != credentials.password {
            return Err(AuthError::WrongPassword);
        }

        Ok(self.sign_in_account(&account))
    }

    async fn sign_in_with(&self, claims: &ProviderClaims) -> Result<Identity> {
        if claims.provider == SignInMethod::Password {
            return Err(AuthError::OperationNotAllowed);
        }
        if let Some(email) = &claims.email {
            if self.accounts.read().await.contains_key(&email.to_lowercase()) {
                return Err(AuthError::AccountExistsWithDifferentCredential);
            }
        }

        let user_id = self
            .federated
            .write()
            .await
            .entry((claims.provider, claims.subject.clone()))
            .or_insert_with(generate_user_id)
            .clone();

        let mut identity = Identity::new(&user_id, claims.provider, generate_token());
        identity.email = claims.email.clone();
        identity.email_verified = claims.email.is_some();
        identity.display_name = claims
            .name
            .clone()
            .or_else(|| claims.email.as_deref().map(email_to_name));

        self.identity.publish(Some(identity.clone()));
        tracing::info!(user_id = %user_id, provider = %claims.provider, "signed in");
        Ok(identity)
    }

    async fn reset_password(&self, email: &str) -> Result<()> {
        validate_email(email)?;
        if !self.accounts.read().await.contains_key(&email.to_lowercase()) {
            return Err(AuthError::UserNotFound);
        }
        self.reset_requests.write().await.push(email.to_string());
        Ok(())
    }

    async fn refresh_token(&self) -> Result<Identity> {
        let mut identity = self.identity.current().ok_or(AuthError::NotSignedIn)?;
        identity.token = generate_token();
        self.identity.publish(Some(identity.clone()));
        Ok(identity)
    }

    async fn sign_out(&self) -> Result<()> {
        if let Some(user_id) = self.identity.current_user_id() {
            tracing::info!(user_id = %user_id, "signed out");
        }
        self.identity.publish(None);
        Ok(())
    }
}
