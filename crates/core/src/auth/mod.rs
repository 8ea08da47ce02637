mod error;
mod functions;
mod traits;
mod types;
mod validation;

pub use error::AuthError;
pub use functions::{email_to_name, generate_token, generate_user_id};
pub use traits::{AuthProvider, Result};
pub use types::{Credentials, Identity, ProviderClaims, SignInMethod};
pub use validation::{validate_email, validate_password, MIN_PASSWORD_LENGTH};
