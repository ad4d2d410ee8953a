use bcrypt::BcryptError;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tower_sessions::session::Error as SessionError;
use validator::ValidationErrors;

use crate::data::models::{AppError, LoginError, RegisterError};

impl From<DieselError> for AppError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::NotFound => AppError::NotFound("record"),
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                AppError::Conflict(info.message().to_string())
            }
            DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
                AppError::Conflict(info.message().to_string())
            }
            other => AppError::Database(other),
        }
    }
}

impl From<r2d2::Error> for AppError {
    fn from(err: r2d2::Error) -> Self {
        AppError::Pool(err)
    }
}

impl From<ValidationErrors> for AppError {
    fn from(err: ValidationErrors) -> Self {
        AppError::InvalidInput(err.to_string())
    }
}

impl From<DieselError> for LoginError {
    fn from(err: DieselError) -> Self {
        LoginError::DatabaseError(err)
    }
}

impl From<BcryptError> for LoginError {
    fn from(err: BcryptError) -> Self {
        LoginError::HashingError(err)
    }
}

impl From<SessionError> for LoginError {
    fn from(err: SessionError) -> Self {
        LoginError::SessionError(err.to_string())
    }
}

impl From<BcryptError> for RegisterError {
    fn from(err: BcryptError) -> Self {
        RegisterError::HashingError(err)
    }
}

// A unique violation here means a concurrent registration won the race.
impl From<DieselError> for RegisterError {
    fn from(err: DieselError) -> Self {
        let taken = match &err {
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                let message = info.message();
                if message.contains("users.login") {
                    Some(RegisterError::LoginTaken)
                } else if message.contains("users.email") {
                    Some(RegisterError::EmailTaken)
                } else {
                    None
                }
            }
            _ => None,
        };
        match taken {
            Some(taken) => taken,
            None => RegisterError::DatabaseError(err),
        }
    }
}

impl From<ValidationErrors> for RegisterError {
    fn from(err: ValidationErrors) -> Self {
        RegisterError::ValidationError(err.to_string())
    }
}
