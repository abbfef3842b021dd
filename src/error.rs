use actix_web::{body, http::{self, header::ContentType, StatusCode}, HttpResponse};
use sea_orm::DbErr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PayrollError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Transition attempted from the wrong payroll state; nothing was changed
    #[error("{0}")]
    ConcurrentLockViolation(String),

    #[error("forbidden")]
    Forbidden,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("database error")]
    Database(#[from] DbErr),
}

impl PayrollError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn lock_violation(message: impl Into<String>) -> Self {
        Self::ConcurrentLockViolation(message.into())
    }
}

impl actix_web::error::ResponseError for PayrollError {
    fn error_response(&self) -> HttpResponse<body::BoxBody> {
        if let PayrollError::Database(err) = self {
            tracing::error!(error = %err, "Database request failed");
        }

        HttpResponse::build(self.status_code())
            .insert_header(ContentType::plaintext())
            .body(self.to_string())
    }

    fn status_code(&self) -> http::StatusCode {
        match self {
            PayrollError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            PayrollError::ConcurrentLockViolation(_) => StatusCode::CONFLICT,
            PayrollError::Forbidden => StatusCode::FORBIDDEN,
            PayrollError::NotFound(_) => StatusCode::NOT_FOUND,
            PayrollError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
