use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use log::error;
use mpg_common::{Usd, Vnd};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Error)]
#[error("Invalid status value: {0}")]
pub struct ConversionError(String);

//--------------------------------------        OrderId        -------------------------------------------------------
/// The public identifier of an order. Generated at checkout; never reused.
#[derive(Debug, Clone, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct OrderId(pub String);

impl OrderId {
    /// A fresh, random order id.
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for OrderId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for OrderId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

//--------------------------------------     OrderStatus       -------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum OrderStatus {
    /// The order has been created and no payment has been settled yet.
    Pending,
    /// Payment has settled and the order is being fulfilled.
    Processing,
    /// The order has been fulfilled.
    Completed,
    /// The order has been cancelled by the user or an admin.
    Cancelled,
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "Pending"),
            OrderStatus::Processing => write!(f, "Processing"),
            OrderStatus::Completed => write!(f, "Completed"),
            OrderStatus::Cancelled => write!(f, "Cancelled"),
        }
    }
}

impl FromStr for OrderStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Processing" => Ok(Self::Processing),
            "Completed" => Ok(Self::Completed),
            "Cancelled" => Ok(Self::Cancelled),
            s => Err(ConversionError(format!("Invalid order status: {s}"))),
        }
    }
}

impl From<String> for OrderStatus {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid order status: {value}. But this conversion cannot fail. Defaulting to Pending");
            OrderStatus::Pending
        })
    }
}

//--------------------------------------    PaymentStatus      -------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum PaymentStatus {
    /// A payment attempt exists but the provider has not settled it.
    Pending,
    /// The provider confirmed settlement. Terminal.
    Completed,
    /// The provider reported a failure for the current attempt.
    Failed,
}

impl Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentStatus::Pending => write!(f, "Pending"),
            PaymentStatus::Completed => write!(f, "Completed"),
            PaymentStatus::Failed => write!(f, "Failed"),
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Completed" => Ok(Self::Completed),
            "Failed" => Ok(Self::Failed),
            s => Err(ConversionError(format!("Invalid payment status: {s}"))),
        }
    }
}

impl From<String> for PaymentStatus {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid payment status: {value}. But this conversion cannot fail. Defaulting to Pending");
            PaymentStatus::Pending
        })
    }
}

//--------------------------------------        Order        ---------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub order_id: OrderId,
    pub user_id: String,
    /// The order total in the reference currency.
    pub total_amount: Usd,
    pub status: OrderStatus,
    /// Name of the provider handling the current payment attempt, if any.
    pub payment_method: Option<String>,
    pub payment_status: PaymentStatus,
    /// The provider's transaction id, set when a payment settles.
    pub transaction_id: Option<String>,
    /// Correlation ids for the current payment attempt. Callbacks are matched on these, not on
    /// the order id.
    pub payment_request_id: Option<String>,
    pub payment_order_id: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    /// Orders are never hard-deleted; deactivation hides them instead.
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------      OrderItem      ---------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: OrderId,
    pub component_id: String,
    pub unit_price: Usd,
    pub quantity: i64,
    pub created_at: DateTime<Utc>,
}

//--------------------------------------      NewOrder       ---------------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrder {
    pub order_id: OrderId,
    pub user_id: String,
    pub items: Vec<NewOrderItem>,
}

impl NewOrder {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self { order_id: OrderId::random(), user_id: user_id.into(), items: Vec::new() }
    }

    pub fn with_item(mut self, component_id: impl Into<String>, unit_price: Usd, quantity: i64) -> Self {
        self.items.push(NewOrderItem { component_id: component_id.into(), unit_price, quantity });
        self
    }

    /// The order total is always derived from the line items.
    pub fn total(&self) -> Usd {
        self.items.iter().map(|i| i.unit_price * i.quantity).sum()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrderItem {
    pub component_id: String,
    pub unit_price: Usd,
    pub quantity: i64,
}

//--------------------------------------       Payment       ---------------------------------------------------------
/// One payment attempt against an order. An order may accumulate several attempts over time; the
/// current one is the most recently created.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Payment {
    pub id: i64,
    pub order_id: OrderId,
    pub provider: String,
    /// The settlement amount actually requested from the provider.
    pub amount: Vnd,
    pub status: PaymentStatus,
    pub transaction_id: Option<String>,
    pub payment_url: Option<String>,
    /// The provider-order id for this attempt. Unique; callbacks resolve against it.
    pub momo_order_id: String,
    pub request_id: String,
    /// Raw provider response/callback payload, stored verbatim for audit.
    pub response_data: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------  NewPaymentAttempt  ---------------------------------------------------------
#[derive(Debug, Clone)]
pub struct NewPaymentAttempt {
    pub order_id: OrderId,
    pub provider: String,
    pub amount: Vnd,
    pub request_id: String,
    pub momo_order_id: String,
    pub payment_url: String,
    pub response_data: String,
}

//--------------------------------------    PaymentUpdate    ---------------------------------------------------------
/// The order/payment pair after a callback has been applied. The two always agree on payment
/// status; they are written in one transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentUpdate {
    pub order: Order,
    pub payment: Payment,
}
