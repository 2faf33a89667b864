//----------------------------------------------   MoMo  ----------------------------------------------------
//
// The gateway-facing routes. The create route is part of the storefront API; the return and IPN
// routes are hit by MoMo itself and must always acknowledge receipt — an error status would
// trigger provider-side retries and alerts, so the callback outcome is carried in the body (IPN)
// or the redirect target (return), never in the HTTP status.

use std::collections::HashMap;

use actix_web::{http::header, web, HttpRequest, HttpResponse};
use log::*;
use market_payment_engine::{traits::PaymentGatewayDatabase, OrdersApi, PaymentFlowApi};
use momo_tools::MomoApi;

use crate::{
    config::ServerConfig,
    data_objects::{CreatePaymentParams, JsonResponse, PaymentUrlResponse},
    errors::ServerError,
    helpers::get_remote_ip,
    integrations::momo::{create_momo_payment, flatten_callback_fields, process_momo_callback},
    route,
};

route!(create_payment => Post "/payments/momo" impl PaymentGatewayDatabase);
/// Creates a provider-hosted payment for an order and hands the hosted URL back to the
/// storefront. Fails loudly: 400 for bad input, 404 for an unknown order, 502 when the gateway
/// misbehaves.
pub async fn create_payment<B: PaymentGatewayDatabase>(
    body: web::Json<CreatePaymentParams>,
    momo: web::Data<MomoApi>,
    orders: web::Data<OrdersApi<B>>,
    flow: web::Data<PaymentFlowApi<B>>,
    config: web::Data<ServerConfig>,
) -> Result<HttpResponse, ServerError> {
    let params = body.into_inner();
    trace!("💸️ Received create-payment request for order [{}]", params.order_id);
    let pay_url = create_momo_payment(params, &config.ipn_url(), momo.as_ref(), orders.as_ref(), flow.as_ref()).await?;
    Ok(HttpResponse::Ok().json(PaymentUrlResponse { payment_url: pay_url }))
}

route!(momo_return => Get "/payments/momo/return" impl PaymentGatewayDatabase);
/// The redirect-return leg of the callback. MoMo sends the payer's browser here with the
/// callback fields in the query string; the outcome decides which storefront page the browser
/// lands on.
pub async fn momo_return<B: PaymentGatewayDatabase>(
    query: web::Query<HashMap<String, String>>,
    flow: web::Data<PaymentFlowApi<B>>,
    config: web::Data<ServerConfig>,
) -> HttpResponse {
    let fields = query.into_inner();
    trace!("💸️ Received redirect return for [{}]", fields.get("orderId").map(String::as_str).unwrap_or("?"));
    let accepted = process_momo_callback(&fields, &config.momo, flow.as_ref()).await;
    let target =
        if accepted { config.redirects.success_url.clone() } else { config.redirects.failure_url.clone() };
    HttpResponse::Found().insert_header((header::LOCATION, target)).finish()
}

route!(momo_ipn => Post "/payments/momo/ipn" impl PaymentGatewayDatabase);
/// The server-to-server IPN leg of the callback. Always answers 200 so the provider stops
/// redelivering; the body reports whether the payment was accepted.
pub async fn momo_ipn<B: PaymentGatewayDatabase>(
    req: HttpRequest,
    body: web::Json<serde_json::Value>,
    flow: web::Data<PaymentFlowApi<B>>,
    config: web::Data<ServerConfig>,
) -> HttpResponse {
    if let Some(whitelist) = &config.ipn_whitelist {
        let peer = get_remote_ip(&req, config.use_x_forwarded_for, config.use_forwarded);
        match peer {
            Some(ip) if whitelist.contains(&ip) => trace!("💸️ IPN from whitelisted peer {ip}"),
            Some(ip) => {
                warn!("💸️ Denying IPN from non-whitelisted peer {ip}");
                return HttpResponse::Forbidden().finish();
            },
            None => {
                warn!("💸️ No IP address found in IPN request, denying access.");
                return HttpResponse::Forbidden().finish();
            },
        }
    }
    let fields = flatten_callback_fields(&body.into_inner());
    let accepted = process_momo_callback(&fields, &config.momo, flow.as_ref()).await;
    let result = if accepted {
        JsonResponse::success("Payment recorded.")
    } else {
        JsonResponse::failure("Callback rejected or payment failed.")
    };
    HttpResponse::Ok().json(result)
}
