use std::fmt::Display;

use market_payment_engine::db_types::{Order, OrderItem};
use mpg_common::Usd;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn success<S: Display>(message: S) -> Self {
        Self { success: true, message: message.to_string() }
    }

    pub fn failure<S: Display>(message: S) -> Self {
        Self { success: false, message: message.to_string() }
    }
}

/// Body of `POST /api/payments/momo`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePaymentParams {
    #[serde(default)]
    pub order_id: String,
    #[serde(default)]
    pub return_url: String,
}

/// The successful answer to a create-payment call. The storefront redirects the buyer here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentUrlResponse {
    pub payment_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
}

/// Body of `POST /api/orders` — the storefront's checkout call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutParams {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub items: Vec<CheckoutItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutItem {
    pub component_id: String,
    /// Unit price in reference-currency cents.
    pub unit_price: Usd,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
}

fn default_quantity() -> i64 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// Body of `POST /api/orders/{order_id}/status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateOrderStatusParams {
    pub status: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserQuery {
    pub user_id: String,
}
