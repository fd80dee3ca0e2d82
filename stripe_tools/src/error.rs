use thiserror::Error;

#[derive(Debug, Error)]
pub enum StripeApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Invalid REST request: {0}")]
    RestRequestError(String),
    #[error("Invalid REST response: {0}")]
    RestResponseError(String),
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
    #[error("Query failed. Error {status}. {message}")]
    QueryError { status: u16, message: String },
}

#[derive(Debug, Clone, Error)]
pub enum WebhookVerificationError {
    #[error("The signature header is not in the expected format. {0}")]
    MalformedHeader(String),
    #[error("The signature does not match the payload.")]
    SignatureMismatch,
    #[error("The signature timestamp is outside the accepted tolerance.")]
    StaleTimestamp,
    #[error("Could not deserialize the event payload. {0}")]
    InvalidPayload(String),
}
