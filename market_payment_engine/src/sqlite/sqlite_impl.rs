//! `SqliteDatabase` is a concrete implementation of the payment gateway backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements the traits defined in the
//! [`crate::traits`] module. The callback transitions wrap the order and payment updates in a
//! single transaction so the pair can never disagree, even under concurrent delivery.

use std::fmt::Debug;

use chrono::Utc;
use log::*;
use sqlx::SqlitePool;

use super::db::{new_pool, orders, payments};
use crate::{
    db_types::{
        NewOrder,
        NewPaymentAttempt,
        Order,
        OrderId,
        OrderItem,
        OrderStatus,
        Payment,
        PaymentStatus,
        PaymentUpdate,
    },
    traits::{PaymentGatewayDatabase, PaymentGatewayError},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    /// Creates a new connection pool to the database at `url`.
    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, PaymentGatewayError> {
        let pool = new_pool(url, max_connections).await?;
        Ok(Self { url: url.to_string(), pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl PaymentGatewayDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn insert_order(&self, order: NewOrder) -> Result<(Order, bool), PaymentGatewayError> {
        let mut tx = self.pool.begin().await?;
        let result = orders::idempotent_insert(order, &mut tx).await?;
        tx.commit().await?;
        Ok(result)
    }

    async fn fetch_order_by_id(&self, order_id: &OrderId) -> Result<Option<Order>, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_order_id(order_id, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_order_with_items(
        &self,
        order_id: &OrderId,
    ) -> Result<Option<(Order, Vec<OrderItem>)>, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let order = match orders::fetch_order_by_order_id(order_id, &mut conn).await? {
            Some(order) => order,
            None => return Ok(None),
        };
        let items = orders::fetch_items_for_order(order_id, &mut conn).await?;
        Ok(Some((order, items)))
    }

    async fn fetch_orders_for_user(&self, user_id: &str) -> Result<Vec<Order>, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let orders = orders::fetch_orders_for_user(user_id, &mut conn).await?;
        Ok(orders)
    }

    async fn register_payment_attempt(&self, attempt: NewPaymentAttempt) -> Result<Payment, PaymentGatewayError> {
        let mut tx = self.pool.begin().await?;
        orders::stamp_payment_request(
            &attempt.order_id,
            &attempt.provider,
            &attempt.request_id,
            &attempt.momo_order_id,
            &mut tx,
        )
        .await?;
        let payment = payments::insert_payment(attempt, &mut tx).await?;
        tx.commit().await?;
        Ok(payment)
    }

    async fn fetch_payment_by_provider_order_id(
        &self,
        momo_order_id: &str,
    ) -> Result<Option<Payment>, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let payment = payments::fetch_payment_by_momo_order_id(momo_order_id, &mut conn).await?;
        Ok(payment)
    }

    async fn fetch_current_payment(&self, order_id: &OrderId) -> Result<Option<Payment>, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let payment = payments::fetch_latest_payment_for_order(order_id, &mut conn).await?;
        Ok(payment)
    }

    async fn confirm_payment(
        &self,
        momo_order_id: &str,
        transaction_id: &str,
        response_data: &str,
    ) -> Result<PaymentUpdate, PaymentGatewayError> {
        let mut tx = self.pool.begin().await?;
        let payment = payments::fetch_payment_by_momo_order_id(momo_order_id, &mut tx)
            .await?
            .ok_or_else(|| PaymentGatewayError::PaymentNotFound(momo_order_id.to_string()))?;
        if payment.status == PaymentStatus::Completed {
            // Redelivered notification. Settled state is never rewritten.
            debug!("📝️ Payment [{momo_order_id}] is already Completed. Ignoring redelivery.");
            let order = orders::fetch_order_by_order_id(&payment.order_id, &mut tx)
                .await?
                .ok_or_else(|| PaymentGatewayError::OrderNotFound(payment.order_id.clone()))?;
            tx.commit().await?;
            return Ok(PaymentUpdate { order, payment });
        }
        let paid_at = Utc::now();
        let payment =
            payments::mark_payment_completed(momo_order_id, transaction_id, paid_at, response_data, &mut tx).await?;
        let order = orders::mark_order_paid(&payment.order_id, transaction_id, paid_at, &mut tx).await?;
        tx.commit().await?;
        Ok(PaymentUpdate { order, payment })
    }

    async fn fail_payment(
        &self,
        momo_order_id: &str,
        response_data: &str,
    ) -> Result<PaymentUpdate, PaymentGatewayError> {
        let mut tx = self.pool.begin().await?;
        let payment = payments::fetch_payment_by_momo_order_id(momo_order_id, &mut tx)
            .await?
            .ok_or_else(|| PaymentGatewayError::PaymentNotFound(momo_order_id.to_string()))?;
        if payment.status == PaymentStatus::Completed {
            // A failure notification can race or follow a settlement. Completed is terminal.
            warn!("📝️ Ignoring failure callback for settled payment [{momo_order_id}]");
            let order = orders::fetch_order_by_order_id(&payment.order_id, &mut tx)
                .await?
                .ok_or_else(|| PaymentGatewayError::OrderNotFound(payment.order_id.clone()))?;
            tx.commit().await?;
            return Ok(PaymentUpdate { order, payment });
        }
        let payment = payments::mark_payment_failed(momo_order_id, response_data, &mut tx).await?;
        let order = orders::mark_order_payment_failed(&payment.order_id, &mut tx).await?;
        tx.commit().await?;
        Ok(PaymentUpdate { order, payment })
    }

    async fn update_order_status(&self, order_id: &OrderId, status: OrderStatus) -> Result<Order, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::update_order_status(order_id, status, &mut conn).await?;
        Ok(order)
    }

    async fn close(&mut self) -> Result<(), PaymentGatewayError> {
        self.pool.close().await;
        Ok(())
    }
}
