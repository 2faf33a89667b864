use chrono::{DateTime, Utc};
use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db_types::{NewOrder, Order, OrderId, OrderItem, OrderStatus, PaymentStatus},
    traits::PaymentGatewayError,
};

/// Inserts the order into the database, returning `false` in the second parameter if the order
/// already exists. The caller provides the transaction when items must commit with the order.
pub async fn idempotent_insert(
    order: NewOrder,
    conn: &mut SqliteConnection,
) -> Result<(Order, bool), PaymentGatewayError> {
    let inserted = match fetch_order_by_order_id(&order.order_id, conn).await? {
        Some(order) => (order, false),
        None => {
            let order = insert_order(order, conn).await?;
            debug!("📝️ Order {} inserted with id {}", order.order_id, order.id);
            (order, true)
        },
    };
    Ok(inserted)
}

/// Inserts a new order and its line items using the given connection. This is not atomic on its
/// own; embed the call inside a transaction and pass `&mut *tx` as the connection argument.
async fn insert_order(order: NewOrder, conn: &mut SqliteConnection) -> Result<Order, PaymentGatewayError> {
    let total = order.total();
    let inserted: Order = sqlx::query_as(
        r#"
            INSERT INTO orders (order_id, user_id, total_amount)
            VALUES ($1, $2, $3)
            RETURNING *;
        "#,
    )
    .bind(&order.order_id)
    .bind(&order.user_id)
    .bind(total.cents())
    .fetch_one(&mut *conn)
    .await?;
    for item in &order.items {
        sqlx::query(
            r#"
                INSERT INTO order_items (order_id, component_id, unit_price, quantity)
                VALUES ($1, $2, $3, $4);
            "#,
        )
        .bind(&order.order_id)
        .bind(&item.component_id)
        .bind(item.unit_price.cents())
        .bind(item.quantity)
        .execute(&mut *conn)
        .await?;
    }
    Ok(inserted)
}

/// Returns the active order with the given public id, if any.
pub async fn fetch_order_by_order_id(
    order_id: &OrderId,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as("SELECT * FROM orders WHERE order_id = $1 AND active = TRUE")
        .bind(order_id.as_str())
        .fetch_optional(conn)
        .await?;
    Ok(order)
}

pub async fn fetch_items_for_order(
    order_id: &OrderId,
    conn: &mut SqliteConnection,
) -> Result<Vec<OrderItem>, sqlx::Error> {
    let items = sqlx::query_as("SELECT * FROM order_items WHERE order_id = $1 ORDER BY id")
        .bind(order_id.as_str())
        .fetch_all(conn)
        .await?;
    Ok(items)
}

/// Active orders for a user, newest first.
pub async fn fetch_orders_for_user(user_id: &str, conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    let orders = sqlx::query_as("SELECT * FROM orders WHERE user_id = $1 AND active = TRUE ORDER BY created_at DESC")
        .bind(user_id)
        .fetch_all(conn)
        .await?;
    Ok(orders)
}

/// Stamps the order with the provider handling the current payment attempt and the attempt's
/// correlation ids, and resets the payment status to Pending.
pub async fn stamp_payment_request(
    order_id: &OrderId,
    provider: &str,
    request_id: &str,
    momo_order_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Order, PaymentGatewayError> {
    let order: Option<Order> = sqlx::query_as(
        r#"
            UPDATE orders
            SET payment_method = $2,
                payment_status = $3,
                payment_request_id = $4,
                payment_order_id = $5
            WHERE order_id = $1 AND active = TRUE
            RETURNING *;
        "#,
    )
    .bind(order_id.as_str())
    .bind(provider)
    .bind(PaymentStatus::Pending)
    .bind(request_id)
    .bind(momo_order_id)
    .fetch_optional(conn)
    .await?;
    order.ok_or_else(|| PaymentGatewayError::OrderNotFound(order_id.clone()))
}

/// Marks the order as paid: payment status Completed, order status Processing, transaction id
/// and settlement timestamp recorded.
pub async fn mark_order_paid(
    order_id: &OrderId,
    transaction_id: &str,
    paid_at: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Order, PaymentGatewayError> {
    let order: Option<Order> = sqlx::query_as(
        r#"
            UPDATE orders
            SET payment_status = $2,
                status = $3,
                transaction_id = $4,
                paid_at = $5
            WHERE order_id = $1
            RETURNING *;
        "#,
    )
    .bind(order_id.as_str())
    .bind(PaymentStatus::Completed)
    .bind(OrderStatus::Processing)
    .bind(transaction_id)
    .bind(paid_at)
    .fetch_optional(conn)
    .await?;
    order.ok_or_else(|| PaymentGatewayError::OrderNotFound(order_id.clone()))
}

/// Marks the current payment attempt as failed on the order. The order status itself is left
/// alone; the user can retry payment on a Pending order.
pub async fn mark_order_payment_failed(
    order_id: &OrderId,
    conn: &mut SqliteConnection,
) -> Result<Order, PaymentGatewayError> {
    let order: Option<Order> = sqlx::query_as(
        r#"
            UPDATE orders
            SET payment_status = $2
            WHERE order_id = $1
            RETURNING *;
        "#,
    )
    .bind(order_id.as_str())
    .bind(PaymentStatus::Failed)
    .fetch_optional(conn)
    .await?;
    order.ok_or_else(|| PaymentGatewayError::OrderNotFound(order_id.clone()))
}

/// Applies an admin status transition after validating it against the order lifecycle. See the
/// transition table on [`crate::traits::PaymentGatewayDatabase::update_order_status`].
pub async fn update_order_status(
    order_id: &OrderId,
    new_status: OrderStatus,
    conn: &mut SqliteConnection,
) -> Result<Order, PaymentGatewayError> {
    use OrderStatus::*;
    let order = fetch_order_by_order_id(order_id, &mut *conn)
        .await?
        .ok_or_else(|| PaymentGatewayError::OrderNotFound(order_id.clone()))?;
    match (order.status, new_status) {
        (old, new) if old == new => return Err(PaymentGatewayError::OrderModificationNoOp),
        (Pending, Processing | Completed | Cancelled) | (Processing, Completed | Cancelled) => {},
        (_, _) => return Err(PaymentGatewayError::OrderModificationForbidden),
    }
    let order: Order = sqlx::query_as(
        r#"
            UPDATE orders
            SET status = $2
            WHERE order_id = $1
            RETURNING *;
        "#,
    )
    .bind(order_id.as_str())
    .bind(new_status)
    .fetch_one(conn)
    .await?;
    debug!("📝️ Order {} moved to {}", order.order_id, order.status);
    Ok(order)
}
