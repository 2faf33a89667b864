use chrono::Utc;
use market_payment_engine::db_types::{Order, OrderId, OrderStatus, Payment, PaymentStatus};
use mockall::mock;
use mpg_common::{Usd, Vnd};

mock! {
    pub PaymentDb {}

    impl Clone for PaymentDb {
        fn clone(&self) -> Self;
    }

    impl market_payment_engine::traits::PaymentGatewayDatabase for PaymentDb {
        fn url(&self) -> &str;
        async fn insert_order(
            &self,
            order: market_payment_engine::db_types::NewOrder,
        ) -> Result<(Order, bool), market_payment_engine::traits::PaymentGatewayError>;
        async fn fetch_order_by_id(
            &self,
            order_id: &OrderId,
        ) -> Result<Option<Order>, market_payment_engine::traits::PaymentGatewayError>;
        async fn fetch_order_with_items(
            &self,
            order_id: &OrderId,
        ) -> Result<Option<(Order, Vec<market_payment_engine::db_types::OrderItem>)>, market_payment_engine::traits::PaymentGatewayError>;
        async fn fetch_orders_for_user(
            &self,
            user_id: &str,
        ) -> Result<Vec<Order>, market_payment_engine::traits::PaymentGatewayError>;
        async fn register_payment_attempt(
            &self,
            attempt: market_payment_engine::db_types::NewPaymentAttempt,
        ) -> Result<Payment, market_payment_engine::traits::PaymentGatewayError>;
        async fn fetch_payment_by_provider_order_id(
            &self,
            momo_order_id: &str,
        ) -> Result<Option<Payment>, market_payment_engine::traits::PaymentGatewayError>;
        async fn fetch_current_payment(
            &self,
            order_id: &OrderId,
        ) -> Result<Option<Payment>, market_payment_engine::traits::PaymentGatewayError>;
        async fn confirm_payment(
            &self,
            momo_order_id: &str,
            transaction_id: &str,
            response_data: &str,
        ) -> Result<market_payment_engine::db_types::PaymentUpdate, market_payment_engine::traits::PaymentGatewayError>;
        async fn fail_payment(
            &self,
            momo_order_id: &str,
            response_data: &str,
        ) -> Result<market_payment_engine::db_types::PaymentUpdate, market_payment_engine::traits::PaymentGatewayError>;
        async fn update_order_status(
            &self,
            order_id: &OrderId,
            status: OrderStatus,
        ) -> Result<Order, market_payment_engine::traits::PaymentGatewayError>;
    }
}

pub fn sample_order(order_id: &str) -> Order {
    Order {
        id: 1,
        order_id: OrderId::from(order_id.to_string()),
        user_id: "alice".to_string(),
        total_amount: Usd::from_cents(2248),
        status: OrderStatus::Pending,
        payment_method: None,
        payment_status: PaymentStatus::Pending,
        transaction_id: None,
        payment_request_id: None,
        payment_order_id: None,
        paid_at: None,
        active: true,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

#[allow(dead_code)]
pub fn sample_payment(order_id: &str, momo_order_id: &str) -> Payment {
    Payment {
        id: 1,
        order_id: OrderId::from(order_id.to_string()),
        provider: "Momo".to_string(),
        amount: Vnd::from(562_000),
        status: PaymentStatus::Pending,
        transaction_id: None,
        payment_url: Some(format!("https://test-payment.momo.vn/pay/{momo_order_id}")),
        momo_order_id: momo_order_id.to_string(),
        request_id: format!("req-{momo_order_id}"),
        response_data: None,
        paid_at: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}
