use serde::{Deserialize, Serialize};

/// How a user signed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignInMethod {
    Password,
    Google,
    Apple,
}

impl std::fmt::Display for SignInMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Password => write!(f, "password"),
            Self::Google => write!(f, "google"),
            Self::Apple => write!(f, "apple"),
        }
    }
}

/// The currently authenticated user.
///
/// `user_id` scopes every collection (`users/{user_id}/...`). The token is
/// opaque and may be refreshed without the identity being considered
/// changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub user_id: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
    pub email_verified: bool,
    pub method: SignInMethod,
    pub token: String,
}

impl Identity {
    pub fn new(user_id: impl Into<String>, method: SignInMethod, token: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            email: None,
            display_name: None,
            photo_url: None,
            email_verified: false,
            method,
            token: token.into(),
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// True when both identities belong to the same user, regardless of
    /// token.
    pub fn same_user(&self, other: &Identity) -> bool {
        self.user_id == other.user_id
    }
}

/// Email/password credentials.
#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Claims returned by a federated (Google/Apple) sign-in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderClaims {
    /// Provider's unique user identifier.
    pub subject: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub provider: SignInMethod,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_user_ignores_token() {
        let a = Identity::new("u1", SignInMethod::Password, "tok-1");
        let b = Identity::new("u1", SignInMethod::Password, "tok-2");
        let c = Identity::new("u2", SignInMethod::Password, "tok-1");

        assert!(a.same_user(&b));
        assert!(!a.same_user(&c));
        assert_ne!(a, b);
    }

    #[test]
    fn credentials_debug_redacts_password() {
        let creds = Credentials::new("a@b.co", "hunter22");
        let debug = format!("{creds:?}");
        assert!(debug.contains("a@b.co"));
        assert!(!debug.contains("hunter22"));
    }

    #[test]
    fn sign_in_method_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&SignInMethod::Google).unwrap(),
            "\"google\""
        );
        assert_eq!(SignInMethod::Apple.to_string(), "apple");
    }
}
