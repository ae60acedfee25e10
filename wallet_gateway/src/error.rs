use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum WalletGatewayError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Could not send the request to the provider: {0}")]
    RequestError(String),
    #[error("The provider did not respond in time")]
    Timeout,
    #[error("Invalid response from the provider: {0}")]
    ResponseError(String),
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
    #[error("The provider rejected the request. Result code {code}. {message}")]
    Rejected { code: i64, message: String },
    #[error("The notification signature is invalid")]
    InvalidSignature,
    #[error("The notification is for partner {0}, which is not this merchant")]
    PartnerMismatch(String),
    #[error("The notification is missing a required field: {0}")]
    MissingField(&'static str),
}

impl From<reqwest::Error> for WalletGatewayError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_decode() {
            Self::JsonError(e.to_string())
        } else {
            Self::RequestError(e.to_string())
        }
    }
}
