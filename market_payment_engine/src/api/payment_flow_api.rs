use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{NewPaymentAttempt, OrderId, Payment, PaymentStatus, PaymentUpdate},
    traits::{PaymentGatewayDatabase, PaymentGatewayError},
};

/// `PaymentFlowApi` drives the payment half of the order lifecycle: registering new payment
/// attempts and applying provider callback outcomes to the order/payment pair.
pub struct PaymentFlowApi<B> {
    db: B,
}

impl<B> Debug for PaymentFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PaymentFlowApi")
    }
}

impl<B> PaymentFlowApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> PaymentFlowApi<B>
where B: PaymentGatewayDatabase
{
    /// Record a freshly created provider-hosted payment against its order.
    ///
    /// The order is stamped with the provider name and correlation ids, and a Pending payment
    /// row is created, in one transaction. Returns the new payment attempt.
    pub async fn register_attempt(&self, attempt: NewPaymentAttempt) -> Result<Payment, PaymentGatewayError> {
        let order_id = attempt.order_id.clone();
        let payment = self.db.register_payment_attempt(attempt).await?;
        debug!("🔄️💰️ Payment attempt [{}] registered for order {order_id}", payment.momo_order_id);
        Ok(payment)
    }

    /// Apply a verified *successful* callback for the attempt identified by `momo_order_id`.
    ///
    /// Both the payment and its order transition together; a redelivered success notification
    /// is acknowledged without rewriting settled state.
    pub async fn confirm_payment(
        &self,
        momo_order_id: &str,
        transaction_id: &str,
        response_data: &str,
    ) -> Result<PaymentUpdate, PaymentGatewayError> {
        let update = self.db.confirm_payment(momo_order_id, transaction_id, response_data).await?;
        info!(
            "🔄️✅️ Payment [{momo_order_id}] settled with transaction [{transaction_id}]. Order {} is now {}",
            update.order.order_id, update.order.status
        );
        Ok(update)
    }

    /// Apply a verified *failed* callback for the attempt identified by `momo_order_id`.
    pub async fn fail_payment(
        &self,
        momo_order_id: &str,
        response_data: &str,
    ) -> Result<PaymentUpdate, PaymentGatewayError> {
        let update = self.db.fail_payment(momo_order_id, response_data).await?;
        info!(
            "🔄️❌️ Payment [{momo_order_id}] failed. Order {} payment status is {}",
            update.order.order_id, update.order.payment_status
        );
        Ok(update)
    }

    /// Resolve the payment attempt a callback refers to.
    pub async fn payment_by_provider_order_id(
        &self,
        momo_order_id: &str,
    ) -> Result<Option<Payment>, PaymentGatewayError> {
        self.db.fetch_payment_by_provider_order_id(momo_order_id).await
    }

    /// The current payment attempt for an order, if one exists.
    pub async fn current_payment(&self, order_id: &OrderId) -> Result<Option<Payment>, PaymentGatewayError> {
        self.db.fetch_current_payment(order_id).await
    }

    /// The payment status of an order, or `None` if the order does not exist. Callers map the
    /// absent case to their own sentinel ("Unknown" at the HTTP boundary).
    pub async fn payment_status(&self, order_id: &OrderId) -> Result<Option<PaymentStatus>, PaymentGatewayError> {
        let status = self.db.fetch_order_by_id(order_id).await?.map(|o| o.payment_status);
        trace!("🔄️💰️ Payment status for order {order_id}: {status:?}");
        Ok(status)
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}
