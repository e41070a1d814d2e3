use serde::Deserialize;

/// Emails are matched case-insensitively: trimmed and ASCII-lowercased
/// before they are stored, compared or put into a token.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_ascii_lowercase()
}

/// `?email=` on identity-scoped listings.
#[derive(Debug, Deserialize)]
pub struct EmailQuery {
    pub email: Option<String>,
}

impl EmailQuery {
    pub fn normalized_email(&self) -> Option<String> {
        self.email.as_deref().map(normalize_email)
    }
}
