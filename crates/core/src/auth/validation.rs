use super::AuthError;

/// Shortest password accepted at registration.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Validates the shape of an email address.
///
/// Requires exactly one `@`, a non-empty local part, and a domain with a
/// dot that neither starts nor ends the domain. Whitespace is rejected.
///
/// # Examples
///
/// ```
/// use prodhub_core::auth::{validate_email, AuthError};
///
/// assert!(validate_email("ada@example.com").is_ok());
/// assert_eq!(validate_email("ada.example.com"), Err(AuthError::InvalidEmail));
/// ```
pub fn validate_email(email: &str) -> Result<(), AuthError> {
    if email.chars().any(char::is_whitespace) {
        return Err(AuthError::InvalidEmail);
    }
    let Some((local, domain)) = email.split_once('@') else {
        return Err(AuthError::InvalidEmail);
    };
    if local.is_empty() || domain.contains('@') {
        return Err(AuthError::InvalidEmail);
    }
    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return Err(AuthError::InvalidEmail);
    }
    Ok(())
}

/// Validates password strength.
pub fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword);
    }
    Ok(())
}
