use bcrypt::BcryptError;
use diesel::result::Error as DieselError;
use serde::Deserialize;
use thiserror::Error;
use validator::Validate;

// Login specific errors
#[derive(Error, Debug)]
pub enum LoginError {
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Database error")]
    DatabaseError(DieselError),
    #[error("Hashing error")]
    HashingError(BcryptError),
    #[error("Session error: {0}")]
    SessionError(String),
}

// Registration specific errors
#[derive(Error, Debug)]
pub enum RegisterError {
    #[error("Email already registered")]
    EmailTaken,
    #[error("Login already taken")]
    LoginTaken,
    #[error("{0}")]
    ValidationError(String),
    #[error("Database error")]
    DatabaseError(DieselError),
    #[error("Hashing error")]
    HashingError(BcryptError),
    #[error("Session error: {0}")]
    SessionError(String),
}

// Request payloads
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterForm {
    #[validate(email(message = "Email is not valid"))]
    pub email: String,
    #[validate(length(min = 3, max = 32, message = "Login must be 3 to 32 characters"))]
    pub login: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

impl RegisterForm {
    /// Surrounding whitespace is never part of a credential.
    pub fn trimmed(self) -> Self {
        Self {
            email: self.email.trim().to_string(),
            login: self.login.trim().to_string(),
            password: self.password.trim().to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MockPaymentRequest {
    pub plan_id: String,
}
