mod api;
mod config;
mod error;

mod data_objects;
pub mod helpers;
pub mod signature;

pub use api::MomoApi;
pub use config::MomoConfig;
pub use data_objects::{
    CreatedMomoPayment,
    MomoPaymentRequest,
    MomoPaymentResponse,
    NewMomoPayment,
    DEFAULT_LANG,
    MIN_TRANSACTION_AMOUNT,
    REQUEST_TYPE,
    RESULT_CODE_SUCCESS,
};
pub use error::MomoApiError;
