use actix_web::{http::StatusCode, web, web::ServiceConfig};
use market_payment_engine::{OrdersApi, PaymentFlowApi};
use momo_tools::{MomoApi, MomoConfig};
use serde_json::json;

use super::{
    helpers::{get_request, post_request},
    mocks::{sample_order, MockPaymentDb},
};
use crate::{
    config::ServerConfig,
    data_objects::CreatePaymentParams,
    momo_routes::{CreatePaymentRoute, MomoIpnRoute},
    routes::PaymentStatusRoute,
};

/// A gateway client pointing at a port nothing listens on. Any attempt to actually call the
/// provider fails fast instead of leaving the test hanging on the real sandbox.
fn unroutable_momo() -> MomoApi {
    let config = MomoConfig { endpoint: "http://127.0.0.1:9".to_string(), ..MomoConfig::default() };
    MomoApi::new(config).expect("could not build client")
}

fn configure_payment_routes(
    orders_mock: MockPaymentDb,
    flow_mock: MockPaymentDb,
    server_config: ServerConfig,
) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg: &mut ServiceConfig| {
        cfg.app_data(web::Data::new(OrdersApi::new(orders_mock)))
            .app_data(web::Data::new(PaymentFlowApi::new(flow_mock)))
            .app_data(web::Data::new(unroutable_momo()))
            .app_data(web::Data::new(server_config))
            .service(CreatePaymentRoute::<MockPaymentDb>::new())
            .service(MomoIpnRoute::<MockPaymentDb>::new())
            .service(PaymentStatusRoute::<MockPaymentDb>::new());
    }
}

#[actix_web::test]
async fn payment_status_for_unknown_order_is_unknown() {
    let _ = env_logger::try_init().ok();
    let mut flow = MockPaymentDb::new();
    flow.expect_fetch_order_by_id().returning(|_| Ok(None));
    let configure = configure_payment_routes(MockPaymentDb::new(), flow, ServerConfig::default());
    let (status, body) = get_request("/payments/status/no-such-order", configure).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"status":"Unknown"}"#);
}

#[actix_web::test]
async fn payment_status_reports_the_order_status_verbatim() {
    let _ = env_logger::try_init().ok();
    let mut flow = MockPaymentDb::new();
    flow.expect_fetch_order_by_id().returning(|id| Ok(Some(sample_order(id.as_str()))));
    let configure = configure_payment_routes(MockPaymentDb::new(), flow, ServerConfig::default());
    let (status, body) = get_request("/payments/status/abc-123", configure).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"status":"Pending"}"#);
}

#[actix_web::test]
async fn create_payment_requires_an_order_id() {
    let _ = env_logger::try_init().ok();
    // No expectations on the mocks: validation must reject the request before any lookup
    let configure = configure_payment_routes(MockPaymentDb::new(), MockPaymentDb::new(), ServerConfig::default());
    let body = CreatePaymentParams { order_id: "  ".to_string(), return_url: "https://shop.example/r".to_string() };
    let (status, body) = post_request("/payments/momo", &body, configure).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("order_id is required"));
}

#[actix_web::test]
async fn create_payment_requires_a_return_url() {
    let _ = env_logger::try_init().ok();
    let configure = configure_payment_routes(MockPaymentDb::new(), MockPaymentDb::new(), ServerConfig::default());
    let body = CreatePaymentParams { order_id: "abc-123".to_string(), return_url: String::new() };
    let (status, body) = post_request("/payments/momo", &body, configure).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("return_url is required"));
}

#[actix_web::test]
async fn create_payment_for_unknown_order_is_404_and_never_calls_the_gateway() {
    let _ = env_logger::try_init().ok();
    let mut orders = MockPaymentDb::new();
    orders.expect_fetch_order_with_items().returning(|_| Ok(None));
    // The flow mock has no expectations: registering an attempt would panic the test. The 404
    // (rather than the unroutable gateway's 502) proves no HTTP call was made either.
    let configure = configure_payment_routes(orders, MockPaymentDb::new(), ServerConfig::default());
    let body =
        CreatePaymentParams { order_id: "no-such-order".to_string(), return_url: "https://shop.example/r".to_string() };
    let (status, body) = post_request("/payments/momo", &body, configure).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("no-such-order"));
}

#[actix_web::test]
async fn create_payment_surfaces_gateway_failures_as_bad_gateway() {
    let _ = env_logger::try_init().ok();
    let mut orders = MockPaymentDb::new();
    orders.expect_fetch_order_with_items().returning(|id| Ok(Some((sample_order(id.as_str()), vec![]))));
    let configure = configure_payment_routes(orders, MockPaymentDb::new(), ServerConfig::default());
    let body =
        CreatePaymentParams { order_id: "abc-123".to_string(), return_url: "https://shop.example/r".to_string() };
    let (status, _) = post_request("/payments/momo", &body, configure).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
}

#[actix_web::test]
async fn ipn_with_a_bad_signature_is_acknowledged_but_rejected() {
    let _ = env_logger::try_init().ok();
    // No confirm/fail expectations: a forged callback must not touch the store
    let configure = configure_payment_routes(MockPaymentDb::new(), MockPaymentDb::new(), ServerConfig::default());
    let body = json!({
        "partnerCode": "MOMO",
        "orderId": "MOMO-1700000000000-0001",
        "resultCode": 0,
        "transId": 4088878653u64,
        "signature": "deadbeef"
    });
    let (status, body) = post_request("/payments/momo/ipn", &body, configure).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#""success":false"#));
}

#[actix_web::test]
async fn ipn_from_a_non_whitelisted_peer_is_denied() {
    let _ = env_logger::try_init().ok();
    let config = ServerConfig {
        ipn_whitelist: Some(vec!["203.0.113.7".parse().unwrap()]),
        ..ServerConfig::default()
    };
    let configure = configure_payment_routes(MockPaymentDb::new(), MockPaymentDb::new(), config);
    let (status, _) = post_request("/payments/momo/ipn", &json!({}), configure).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
