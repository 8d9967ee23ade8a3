use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use chrono::{DateTime, Utc};
use thiserror::Error;
use webstore_engine::{AccountApiError, AuthApiError, OrderFlowError};

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("Invalid request: {0}")]
    InvalidArgument(String),
    #[error("Not enough credits to complete the request")]
    InsufficientFunds,
    #[error("Order quota exhausted. Next order possible at {next_available_at}")]
    RateLimited { next_available_at: DateTime<Utc> },
    #[error("Authentication required. {0}")]
    Unauthenticated(String),
    #[error("Insufficient permissions. {0}")]
    Forbidden(String),
    #[error("The data was not found. {0}")]
    NoRecordFound(String),
    #[error("The request conflicts with the current state. {0}")]
    Conflict(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            Self::InsufficientFunds => StatusCode::BAD_REQUEST,
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            // Clients use the retry hint to schedule their next attempt, so it gets its own field.
            Self::RateLimited { next_available_at } => {
                serde_json::json!({ "error": self.to_string(), "next_available_at": next_available_at })
            },
            _ => serde_json::json!({ "error": self.to_string() }),
        };
        HttpResponse::build(self.status_code()).insert_header(ContentType::json()).body(body.to_string())
    }
}

impl From<OrderFlowError> for ServerError {
    fn from(e: OrderFlowError) -> Self {
        match e {
            OrderFlowError::DatabaseError(e) => Self::BackendError(format!("Database error: {e}")),
            OrderFlowError::AccountError(e) => e.into(),
            OrderFlowError::EmptyOrder => Self::InvalidArgument(e.to_string()),
            OrderFlowError::UnknownService(_) => Self::InvalidArgument(e.to_string()),
            OrderFlowError::RateLimited { next_available_at } => Self::RateLimited { next_available_at },
            OrderFlowError::OrderNotFound(id) => Self::NoRecordFound(format!("Order {id}")),
            // An illegal lifecycle transition is a state conflict, not a permissions problem.
            OrderFlowError::TransitionForbidden { .. } => Self::Conflict(e.to_string()),
            OrderFlowError::StatusUnchanged => Self::Conflict(e.to_string()),
            OrderFlowError::RollbackFailed { .. } => Self::BackendError(e.to_string()),
        }
    }
}

impl From<AccountApiError> for ServerError {
    fn from(e: AccountApiError) -> Self {
        match e {
            AccountApiError::DatabaseError(e) => Self::BackendError(format!("Database error: {e}")),
            AccountApiError::QueryError(e) => Self::InvalidArgument(e),
            AccountApiError::UserNotFound => Self::NoRecordFound("User account".to_string()),
            AccountApiError::RecipientNotFound(name) => Self::NoRecordFound(format!("Recipient {name}")),
            AccountApiError::InsufficientFunds => Self::InsufficientFunds,
            AccountApiError::InvalidAmount(_) => Self::InvalidArgument(e.to_string()),
        }
    }
}

impl From<AuthApiError> for ServerError {
    fn from(e: AuthApiError) -> Self {
        match e {
            AuthApiError::DatabaseError(e) => Self::BackendError(format!("Database error: {e}")),
            AuthApiError::TokenNotFound => Self::Unauthenticated(e.to_string()),
            AuthApiError::AccountBanned => Self::Forbidden(e.to_string()),
        }
    }
}
