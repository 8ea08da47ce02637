use thiserror::Error;

/// Authentication failures, with messages suitable for showing to the user.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("This email is already registered")]
    EmailAlreadyInUse,

    #[error("Invalid email address")]
    InvalidEmail,

    #[error("Operation not allowed")]
    OperationNotAllowed,

    #[error("Password is too weak")]
    WeakPassword,

    #[error("This account has been disabled")]
    UserDisabled,

    #[error("No account found with this email")]
    UserNotFound,

    #[error("Invalid password")]
    WrongPassword,

    #[error("No user is signed in")]
    NotSignedIn,

    #[error("An account already exists with the same email address but different sign-in credentials")]
    AccountExistsWithDifferentCredential,

    #[error("An error occurred during authentication: {0}")]
    Provider(String),
}
