use thiserror::Error;

#[derive(Debug, Error)]
pub enum MomoApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Could not reach the payment gateway: {0}")]
    RequestError(String),
    #[error("Invalid response from the payment gateway: {0}")]
    ResponseError(String),
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
    #[error("Payment creation was rejected. Error {status}. {message}")]
    QueryError { status: u16, message: String },
    #[error("The gateway declined the request. Result code {code}. {message}")]
    ProviderError { code: i64, message: String },
}
