use astra::Response;
use thiserror::Error;

use crate::domain::order_status::TransitionError;
use crate::domain::pricing::PromoRejection;

/// Errors originating from either the server logic
/// (routing, missing resources, validation) or downstream layers (DB, mail, xlsx).
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Not Found")]
    NotFound,

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database Error: {0}")]
    DbError(String),

    #[error("Spreadsheet Error: {0}")]
    XlsxError(String),

    #[error("Mail Error: {0}")]
    MailError(String),

    #[error("Internal Server Error")]
    InternalError,
}

// Type alias commonly used by route handlers.
pub type ResultResp = Result<Response, ServerError>;

impl ServerError {
    pub fn status(&self) -> u16 {
        match self {
            ServerError::NotFound => 404,
            ServerError::BadRequest(_) => 400,
            ServerError::Unauthorized(_) => 401,
            ServerError::Forbidden(_) => 403,
            ServerError::Conflict(_) => 409,
            ServerError::DbError(_)
            | ServerError::XlsxError(_)
            | ServerError::MailError(_)
            | ServerError::InternalError => 500,
        }
    }

    /// Message safe to show to the client. Internal failures stay generic.
    pub fn public_message(&self) -> String {
        match self {
            ServerError::NotFound => "Not Found".to_string(),
            ServerError::BadRequest(msg)
            | ServerError::Unauthorized(msg)
            | ServerError::Forbidden(msg)
            | ServerError::Conflict(msg) => msg.clone(),
            _ => "Internal Server Error".to_string(),
        }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        ServerError::BadRequest(msg.into())
    }
}

impl From<TransitionError> for ServerError {
    fn from(err: TransitionError) -> Self {
        ServerError::Conflict(err.to_string())
    }
}

impl From<PromoRejection> for ServerError {
    fn from(err: PromoRejection) -> Self {
        ServerError::BadRequest(err.to_string())
    }
}
