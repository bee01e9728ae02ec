use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

// JWT Claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize, // Expiration time (timestamp)
}

/// Inserted as a request extension by the auth middleware.
#[derive(Debug, Clone)]
pub struct AuthenticatedAdmin {
    pub subject: String,
}

/// Generic `{ "success": true }` acknowledgement.
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

/// Lets `Option<Option<T>>` fields tell "absent" (keep) apart from `null` (clear).
pub fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

/// Trims a required text field, `None` when blank.
pub fn required_text(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// Trims an optional text field, folding blank values into `None`.
pub fn optional_text(value: Option<&str>) -> Option<&str> {
    value.and_then(required_text)
}
