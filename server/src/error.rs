use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Missing origin phone number")]
    EmptyPhone,

    #[error("Invalid code")]
    InvalidCode,

    #[error("No eligible participants")]
    NoEligibleParticipants,

    #[error("Winner marking failed partway, draw rolled back")]
    PartialDrawFailure,

    #[error("Store error: {0}")]
    Store(#[from] sqlx::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::EmptyPhone | AppError::InvalidCode | AppError::NoEligibleParticipants => {
                StatusCode::BAD_REQUEST
            }
            AppError::PartialDrawFailure | AppError::Store { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, self.to_string()).into_response()
    }
}
