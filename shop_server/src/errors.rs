use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use order_engine::CommerceError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("{0}")]
    Commerce(#[from] CommerceError),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Commerce(e) => commerce_status_code(e),
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.to_string() }).to_string())
    }
}

fn commerce_status_code(e: &CommerceError) -> StatusCode {
    use CommerceError::*;
    match e {
        UserNotFound(_) | VariantNotFound(_) | OrderNotFound(_) | CartNotFound { .. } | CartItemNotFound(_) => {
            StatusCode::NOT_FOUND
        },
        PaymentNotFound(_) => StatusCode::NOT_FOUND,
        InsufficientStock { .. } | IllegalTransition { .. } | NotCancellable(_) | EmptyCart(_) => StatusCode::CONFLICT,
        OrderNotPayable { .. } | PaymentAlreadyExists(_) => StatusCode::CONFLICT,
        InvalidQuantity(_) | PaymentAmountMismatch { .. } | InvalidCallback(_) => StatusCode::BAD_REQUEST,
        ProviderFailure(_) => StatusCode::BAD_GATEWAY,
        DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
