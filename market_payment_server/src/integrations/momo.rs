//! Glue between the MoMo gateway client and the payment engine.
//!
//! [`create_momo_payment`] is the payment-creation orchestration: resolve the order, convert the
//! total into settlement currency, obtain a hosted payment from the gateway, and record the
//! attempt. It propagates errors to the caller as [`ServerError`]s.
//!
//! [`process_momo_callback`] is the other half and has the opposite contract: it **never**
//! fails. Every callback — redirect return or IPN — funnels through here, and whatever happens
//! internally, the provider-facing endpoint must still be able to acknowledge receipt. The
//! return value only states whether the callback was accepted as a successful payment.

use std::collections::HashMap;

use log::*;
use market_payment_engine::{
    db_types::{NewPaymentAttempt, OrderId},
    traits::PaymentGatewayDatabase,
    OrdersApi,
    PaymentFlowApi,
};
use momo_tools::{helpers::settlement_amount, signature, MomoApi, MomoConfig, NewMomoPayment};
use mpg_common::VND_PER_USD;

use crate::{data_objects::CreatePaymentParams, errors::ServerError};

/// The provider name stamped on orders and payment attempts created through this integration.
pub const PROVIDER_NAME: &str = "Momo";

/// The result code MoMo uses for a successful payment, as it appears in callbacks.
const CALLBACK_SUCCESS: &str = "0";

/// Creates a provider-hosted payment for an existing order and returns the URL the buyer should
/// be redirected to.
pub async fn create_momo_payment<B: PaymentGatewayDatabase>(
    params: CreatePaymentParams,
    ipn_url: &str,
    momo: &MomoApi,
    orders: &OrdersApi<B>,
    flow: &PaymentFlowApi<B>,
) -> Result<String, ServerError> {
    if params.order_id.trim().is_empty() {
        return Err(ServerError::InvalidRequestBody("order_id is required".to_string()));
    }
    if params.return_url.trim().is_empty() {
        return Err(ServerError::InvalidRequestBody("return_url is required".to_string()));
    }
    let order_id = OrderId::from(params.order_id);
    let (order, items) = orders
        .order_with_items(&order_id)
        .await?
        .ok_or_else(|| ServerError::NoRecordFound(format!("Order {order_id}")))?;
    let amount = settlement_amount(order.total_amount, VND_PER_USD);
    debug!("💸️ Order {order_id} totals {}; requesting {amount} from the gateway", order.total_amount);
    let order_info = format!("UI component marketplace order {} ({} items)", order.order_id, items.len());
    let created = momo
        .create_payment(NewMomoPayment {
            amount,
            order_info,
            redirect_url: params.return_url,
            ipn_url: ipn_url.to_string(),
        })
        .await?;
    let payment = flow
        .register_attempt(NewPaymentAttempt {
            order_id: order.order_id,
            provider: PROVIDER_NAME.to_string(),
            amount,
            request_id: created.request_id,
            momo_order_id: created.momo_order_id,
            payment_url: created.pay_url.clone(),
            response_data: created.raw_response,
        })
        .await?;
    info!("💸️ Payment attempt [{}] created for order {order_id}", payment.momo_order_id);
    Ok(created.pay_url)
}

/// Verifies and applies an asynchronous gateway notification. Returns whether the callback was
/// accepted as a successful payment. Never propagates an error: signature mismatches, unknown
/// correlation ids and storage failures are logged and reported as `false`.
pub async fn process_momo_callback<B: PaymentGatewayDatabase>(
    fields: &HashMap<String, String>,
    momo: &MomoConfig,
    flow: &PaymentFlowApi<B>,
) -> bool {
    if !signature::verify_callback(momo.access_key.reveal(), momo.secret_key.reveal(), fields) {
        warn!("💸️ Rejecting callback with missing or invalid signature");
        return false;
    }
    let momo_order_id = match fields.get("orderId").filter(|id| !id.is_empty()) {
        Some(id) => id,
        None => {
            warn!("💸️ Rejecting callback without an orderId field");
            return false;
        },
    };
    let raw_callback = serde_json::to_string(fields).unwrap_or_default();
    let result_code = fields.get("resultCode").map(String::as_str).unwrap_or_default();
    if result_code == CALLBACK_SUCCESS {
        let transaction_id = fields.get("transId").map(String::as_str).unwrap_or_default();
        match flow.confirm_payment(momo_order_id, transaction_id, &raw_callback).await {
            Ok(update) => {
                info!("💸️ Payment [{momo_order_id}] settled. Order {} paid.", update.order.order_id);
                true
            },
            Err(e) => {
                warn!("💸️ Could not apply successful callback for [{momo_order_id}]. {e}");
                false
            },
        }
    } else {
        let message = fields.get("message").map(String::as_str).unwrap_or_default();
        info!("💸️ Gateway reported failure for [{momo_order_id}]: {message} ({result_code})");
        if let Err(e) = flow.fail_payment(momo_order_id, &raw_callback).await {
            warn!("💸️ Could not record failed callback for [{momo_order_id}]. {e}");
        }
        false
    }
}

/// IPN bodies arrive as JSON with numeric fields; the signature covers their decimal rendering.
/// Flattens the payload into the string map the verification and audit paths work with.
pub fn flatten_callback_fields(body: &serde_json::Value) -> HashMap<String, String> {
    body.as_object()
        .map(|obj| {
            obj.iter()
                .map(|(k, v)| {
                    let value = match v {
                        serde_json::Value::String(s) => s.clone(),
                        serde_json::Value::Null => String::new(),
                        other => other.to_string(),
                    };
                    (k.clone(), value)
                })
                .collect()
        })
        .unwrap_or_default()
}
