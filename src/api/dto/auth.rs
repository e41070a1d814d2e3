/*
 * Responsibility
 * - /register, /login の request/response DTO
 * - validation (形式チェック) 用の validate()
 */
use serde::{Deserialize, Serialize};

use super::scope::normalize_email;

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

impl CredentialsRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        let email = self.email.trim();
        if email.is_empty() {
            return Err("email is required");
        }
        if !email.contains('@') {
            return Err("email must contain '@'");
        }
        if self.password.is_empty() {
            return Err("password is required");
        }
        Ok(())
    }

    pub fn normalized_email(&self) -> String {
        normalize_email(&self.email)
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    #[serde(rename = "accessToken")]
    pub access_token: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub email: String,
}
