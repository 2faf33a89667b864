//! The behaviour a storage backend must provide to act as a backend for the payment gateway.

mod payment_gateway_database;

pub use payment_gateway_database::{PaymentGatewayDatabase, PaymentGatewayError};
