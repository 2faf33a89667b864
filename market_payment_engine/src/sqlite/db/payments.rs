use chrono::{DateTime, Utc};
use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db_types::{NewPaymentAttempt, OrderId, Payment, PaymentStatus},
    traits::PaymentGatewayError,
};

/// Inserts a new Pending payment attempt. Not atomic on its own; the caller pairs this with
/// [`super::orders::stamp_payment_request`] inside one transaction.
pub async fn insert_payment(
    attempt: NewPaymentAttempt,
    conn: &mut SqliteConnection,
) -> Result<Payment, PaymentGatewayError> {
    let payment: Payment = sqlx::query_as(
        r#"
            INSERT INTO payments (order_id, provider, amount, momo_order_id, request_id, payment_url, response_data)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *;
        "#,
    )
    .bind(&attempt.order_id)
    .bind(&attempt.provider)
    .bind(attempt.amount.value())
    .bind(&attempt.momo_order_id)
    .bind(&attempt.request_id)
    .bind(&attempt.payment_url)
    .bind(&attempt.response_data)
    .fetch_one(conn)
    .await?;
    debug!("📝️ Payment attempt [{}] inserted with id {}", payment.momo_order_id, payment.id);
    Ok(payment)
}

/// Resolves a payment attempt by the provider-order id carried in callbacks.
pub async fn fetch_payment_by_momo_order_id(
    momo_order_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Payment>, sqlx::Error> {
    let payment = sqlx::query_as("SELECT * FROM payments WHERE momo_order_id = $1")
        .bind(momo_order_id)
        .fetch_optional(conn)
        .await?;
    Ok(payment)
}

/// The most recent payment attempt for an order.
pub async fn fetch_latest_payment_for_order(
    order_id: &OrderId,
    conn: &mut SqliteConnection,
) -> Result<Option<Payment>, sqlx::Error> {
    let payment = sqlx::query_as("SELECT * FROM payments WHERE order_id = $1 ORDER BY id DESC LIMIT 1")
        .bind(order_id.as_str())
        .fetch_optional(conn)
        .await?;
    Ok(payment)
}

/// Settles a payment attempt: status Completed, transaction id, timestamp, and the raw callback
/// stored for audit.
pub async fn mark_payment_completed(
    momo_order_id: &str,
    transaction_id: &str,
    paid_at: DateTime<Utc>,
    response_data: &str,
    conn: &mut SqliteConnection,
) -> Result<Payment, PaymentGatewayError> {
    let payment: Option<Payment> = sqlx::query_as(
        r#"
            UPDATE payments
            SET status = $2,
                transaction_id = $3,
                paid_at = $4,
                response_data = $5
            WHERE momo_order_id = $1
            RETURNING *;
        "#,
    )
    .bind(momo_order_id)
    .bind(PaymentStatus::Completed)
    .bind(transaction_id)
    .bind(paid_at)
    .bind(response_data)
    .fetch_optional(conn)
    .await?;
    payment.ok_or_else(|| PaymentGatewayError::PaymentNotFound(momo_order_id.to_string()))
}

/// Records a failed attempt, keeping the provider's callback payload for diagnostics.
pub async fn mark_payment_failed(
    momo_order_id: &str,
    response_data: &str,
    conn: &mut SqliteConnection,
) -> Result<Payment, PaymentGatewayError> {
    let payment: Option<Payment> = sqlx::query_as(
        r#"
            UPDATE payments
            SET status = $2,
                response_data = $3
            WHERE momo_order_id = $1
            RETURNING *;
        "#,
    )
    .bind(momo_order_id)
    .bind(PaymentStatus::Failed)
    .bind(response_data)
    .fetch_optional(conn)
    .await?;
    payment.ok_or_else(|| PaymentGatewayError::PaymentNotFound(momo_order_id.to_string()))
}
