use thiserror::Error;

use crate::db_types::{NewOrder, NewPaymentAttempt, Order, OrderId, OrderItem, OrderStatus, Payment, PaymentUpdate};

/// This trait defines the highest level of behaviour for backends supporting the payment gateway.
///
/// This behaviour includes:
/// * Storing and fetching orders with their line items.
/// * Registering payment attempts against orders.
/// * Applying provider callback outcomes to the order/payment pair, atomically.
/// * Admin-driven order status transitions.
#[allow(async_fn_in_trait)]
pub trait PaymentGatewayDatabase: Clone {
    /// The URL of the database.
    fn url(&self) -> &str;

    /// Takes a new order and stores it, with its line items, in a single atomic transaction.
    /// This call is idempotent: the second element is `false` if the order already existed.
    async fn insert_order(&self, order: NewOrder) -> Result<(Order, bool), PaymentGatewayError>;

    /// Fetches an active order by its public id.
    async fn fetch_order_by_id(&self, order_id: &OrderId) -> Result<Option<Order>, PaymentGatewayError>;

    /// Fetches an active order together with its line items.
    async fn fetch_order_with_items(
        &self,
        order_id: &OrderId,
    ) -> Result<Option<(Order, Vec<OrderItem>)>, PaymentGatewayError>;

    /// All active orders belonging to the given user, most recent first.
    async fn fetch_orders_for_user(&self, user_id: &str) -> Result<Vec<Order>, PaymentGatewayError>;

    /// Registers a new payment attempt in a single atomic transaction:
    /// * the order is stamped with the provider name, a Pending payment status and the attempt's
    ///   correlation ids,
    /// * a Pending payment row is inserted carrying the hosted payment URL and the raw provider
    ///   response.
    ///
    /// Fails with [`PaymentGatewayError::OrderNotFound`] if the order does not exist.
    async fn register_payment_attempt(&self, attempt: NewPaymentAttempt) -> Result<Payment, PaymentGatewayError>;

    /// Resolves a payment attempt by the provider-order id carried in a callback.
    async fn fetch_payment_by_provider_order_id(
        &self,
        momo_order_id: &str,
    ) -> Result<Option<Payment>, PaymentGatewayError>;

    /// The current (most recent) payment attempt for an order, if any.
    async fn fetch_current_payment(&self, order_id: &OrderId) -> Result<Option<Payment>, PaymentGatewayError>;

    /// Applies a successful provider callback. In one transaction: the payment becomes
    /// `Completed` (with transaction id, paid-at timestamp and the raw callback stored), the
    /// order becomes `Processing` with payment status `Completed`.
    ///
    /// If the attempt is already `Completed` the call is a no-op and returns the current pair —
    /// redelivered notifications must not rewrite settled state.
    async fn confirm_payment(
        &self,
        momo_order_id: &str,
        transaction_id: &str,
        response_data: &str,
    ) -> Result<PaymentUpdate, PaymentGatewayError>;

    /// Applies a failed provider callback: payment and order payment-status both become
    /// `Failed`, the raw callback is stored for diagnostics. A `Completed` attempt is terminal
    /// and is left untouched.
    async fn fail_payment(&self, momo_order_id: &str, response_data: &str) -> Result<PaymentUpdate, PaymentGatewayError>;

    /// Changes the status of an order on behalf of an admin.
    ///
    /// Valid transitions follow the order lifecycle:
    ///
    /// | From \ To  | Pending | Processing | Completed | Cancelled |
    /// |------------|---------|------------|-----------|-----------|
    /// | Pending    | Err     | Ok         | Ok        | Ok        |
    /// | Processing | Err     | Err        | Ok        | Ok        |
    /// | Completed  | Err     | Err        | Err       | Err       |
    /// | Cancelled  | Err     | Err        | Err       | Err       |
    ///
    /// A no-op self-transition and any move out of `Completed` or `Cancelled` are rejected.
    async fn update_order_status(&self, order_id: &OrderId, status: OrderStatus) -> Result<Order, PaymentGatewayError>;

    /// Closes the database connection.
    async fn close(&mut self) -> Result<(), PaymentGatewayError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Error)]
pub enum PaymentGatewayError {
    #[error("Internal database error: {0}")]
    DatabaseError(String),
    #[error("Cannot insert order, since it already exists with id {0}")]
    OrderAlreadyExists(OrderId),
    #[error("The requested order {0} does not exist")]
    OrderNotFound(OrderId),
    #[error("No payment attempt matches provider order id {0}")]
    PaymentNotFound(String),
    #[error("The requested order change would result in a no-op.")]
    OrderModificationNoOp,
    #[error("The requested order change is forbidden.")]
    OrderModificationForbidden,
}

impl From<sqlx::Error> for PaymentGatewayError {
    fn from(e: sqlx::Error) -> Self {
        PaymentGatewayError::DatabaseError(e.to_string())
    }
}
