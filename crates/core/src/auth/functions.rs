use rand::{distr::Alphanumeric, Rng};

fn random_alphanumeric(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Generate an opaque bearer token.
pub fn generate_token() -> String {
    random_alphanumeric(40)
}

/// Generate a user id in the 28-character shape auth backends hand out.
pub fn generate_user_id() -> String {
    random_alphanumeric(28)
}

/// Extract username from email if no name provided.
pub fn email_to_name(email: &str) -> String {
    match email.split('@').next() {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => "User".to_string(),
    }
}
