use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{NewOrder, Order, OrderId, OrderItem, OrderStatus},
    traits::{PaymentGatewayDatabase, PaymentGatewayError},
};

/// `OrdersApi` covers the order-store operations the marketplace needs around the payment flow:
/// checkout, lookups, and admin status transitions.
pub struct OrdersApi<B> {
    db: B,
}

impl<B> Debug for OrdersApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrdersApi")
    }
}

impl<B> OrdersApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> OrdersApi<B>
where B: PaymentGatewayDatabase
{
    /// Create an order from checked-out cart contents. The order total is the sum of its line
    /// items. If an order with the same id already exists, it is returned unchanged.
    pub async fn checkout(&self, order: NewOrder) -> Result<Order, PaymentGatewayError> {
        let (order, inserted) = self.db.insert_order(order).await?;
        if inserted {
            debug!("🔄️📦️ Order {} created for user [{}]. Total {}", order.order_id, order.user_id, order.total_amount);
        } else {
            info!("🔄️📦️ Order {} already existed; checkout was a no-op", order.order_id);
        }
        Ok(order)
    }

    pub async fn order_by_id(&self, order_id: &OrderId) -> Result<Option<Order>, PaymentGatewayError> {
        self.db.fetch_order_by_id(order_id).await
    }

    pub async fn order_with_items(
        &self,
        order_id: &OrderId,
    ) -> Result<Option<(Order, Vec<OrderItem>)>, PaymentGatewayError> {
        self.db.fetch_order_with_items(order_id).await
    }

    pub async fn orders_for_user(&self, user_id: &str) -> Result<Vec<Order>, PaymentGatewayError> {
        self.db.fetch_orders_for_user(user_id).await
    }

    /// Admin-driven status transition. The valid moves are documented on
    /// [`PaymentGatewayDatabase::update_order_status`].
    pub async fn set_order_status(
        &self,
        order_id: &OrderId,
        status: OrderStatus,
    ) -> Result<Order, PaymentGatewayError> {
        let order = self.db.update_order_status(order_id, status).await?;
        info!("🔄️📦️ Order {} status changed to {}", order.order_id, order.status);
        Ok(order)
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}
