use actix_web::{http::StatusCode, web, web::ServiceConfig};
use market_payment_engine::{db_types::OrderStatus, traits::PaymentGatewayError, OrdersApi};
use serde_json::json;

use super::{
    helpers::{get_request, post_request},
    mocks::{sample_order, MockPaymentDb},
};
use crate::routes::{CheckoutRoute, OrderByIdRoute, UpdateOrderStatusRoute};

fn configure_order_routes(mock: MockPaymentDb) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg: &mut ServiceConfig| {
        cfg.app_data(web::Data::new(OrdersApi::new(mock)))
            .service(CheckoutRoute::<MockPaymentDb>::new())
            .service(OrderByIdRoute::<MockPaymentDb>::new())
            .service(UpdateOrderStatusRoute::<MockPaymentDb>::new());
    }
}

#[actix_web::test]
async fn checkout_rejects_an_empty_cart() {
    let _ = env_logger::try_init().ok();
    let configure = configure_order_routes(MockPaymentDb::new());
    let body = json!({ "user_id": "alice", "items": [] });
    let (status, body) = post_request("/orders", &body, configure).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("empty cart"));
}

#[actix_web::test]
async fn checkout_rejects_a_missing_user() {
    let _ = env_logger::try_init().ok();
    let configure = configure_order_routes(MockPaymentDb::new());
    let body = json!({ "items": [{ "component_id": "btn-01", "unit_price": 499 }] });
    let (status, body) = post_request("/orders", &body, configure).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("user_id is required"));
}

#[actix_web::test]
async fn checkout_creates_an_order() {
    let _ = env_logger::try_init().ok();
    let mut mock = MockPaymentDb::new();
    mock.expect_insert_order().returning(|order| Ok((sample_order(order.order_id.as_str()), true)));
    let configure = configure_order_routes(mock);
    let body = json!({
        "user_id": "alice",
        "items": [
            { "component_id": "btn-gradient-01", "unit_price": 499, "quantity": 2 },
            { "component_id": "navbar-glass", "unit_price": 1250 }
        ]
    });
    let (status, body) = post_request("/orders", &body, configure).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#""status":"Pending""#));
}

#[actix_web::test]
async fn fetching_an_unknown_order_is_404() {
    let _ = env_logger::try_init().ok();
    let mut mock = MockPaymentDb::new();
    mock.expect_fetch_order_with_items().returning(|_| Ok(None));
    let configure = configure_order_routes(mock);
    let (status, _) = get_request("/orders/no-such-order", configure).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn status_update_with_an_invalid_status_is_rejected() {
    let _ = env_logger::try_init().ok();
    let configure = configure_order_routes(MockPaymentDb::new());
    let body = json!({ "status": "Shipped" });
    let (status, body) = post_request("/orders/abc-123/status", &body, configure).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("Invalid order status"));
}

#[actix_web::test]
async fn forbidden_status_transitions_map_to_bad_request() {
    let _ = env_logger::try_init().ok();
    let mut mock = MockPaymentDb::new();
    mock.expect_update_order_status()
        .withf(|_, status| *status == OrderStatus::Pending)
        .returning(|_, _| Err(PaymentGatewayError::OrderModificationForbidden));
    let configure = configure_order_routes(mock);
    let body = json!({ "status": "Pending" });
    let (status, body) = post_request("/orders/abc-123/status", &body, configure).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("cannot be changed"));
}
