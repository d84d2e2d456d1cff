use serde::{Deserialize, Serialize};

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response returned after a successful login.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}
