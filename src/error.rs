use std::{error::Error, fmt::Debug};

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;

use crate::{domain::order_status::OrderStatus, utils::error_fmt_chain};

// Errors surfaced at the handler boundary, every variant renders as `{ "message": ... }`
#[derive(thiserror::Error)]
pub enum ApiError{
    #[error("{0}")]
    Unauthenticated(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    InvalidArgument(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    InvalidState(String),
    #[error("cannot move order from {from} to {to}")]
    InvalidTransition{
        from: OrderStatus,
        to: OrderStatus
    },
    #[error("Internal server error")]
    Internal(#[from] anyhow::Error)
}

#[derive(Serialize)]
pub struct ErrorBody{
    pub message: String
}

impl Debug for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)?;
        error_fmt_chain(f, self.source())
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::InvalidArgument(_)
            | ApiError::InvalidState(_)
            | ApiError::InvalidTransition { .. } => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR
        }
    }

    fn error_response(&self) -> HttpResponse<actix_web::body::BoxBody> {
        if let ApiError::Internal(e) = self {
            tracing::error!(error = ?e, "Request failed with internal error");
        }

        HttpResponse::build(self.status_code())
            .json(ErrorBody{ message: self.to_string() })
    }
}
