use crate::domain::forms::FieldErrors;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("User not found")]
    UserNotFound,

    #[error("Group not found")]
    GroupNotFound,

    #[error("Post not found")]
    PostNotFound,

    #[error("Login required")]
    LoginRequired { location: String },

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Validation error: {0:?}")]
    InvalidForm(FieldErrors),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl DomainError {
    pub fn to_status_code(&self) -> u16 {
        match self {
            Self::UserNotFound | Self::GroupNotFound | Self::PostNotFound => 404,
            Self::LoginRequired { .. } => 302,
            Self::InvalidForm(_) => 400,
            Self::DatabaseError(_) | Self::InternalError(_) => 500,
        }
    }
}

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        Self::DatabaseError(err.to_string())
    }
}
