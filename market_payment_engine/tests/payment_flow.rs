use market_payment_engine::{
    db_types::{NewOrder, NewPaymentAttempt, OrderId, OrderStatus, PaymentStatus},
    test_utils::prepare_env::{prepare_test_env, random_db_path},
    traits::{PaymentGatewayDatabase, PaymentGatewayError},
    OrdersApi,
    PaymentFlowApi,
    SqliteDatabase,
};
use mpg_common::{Usd, Vnd};

async fn new_test_db() -> SqliteDatabase {
    let url = random_db_path();
    prepare_test_env(&url).await;
    SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating database")
}

fn checkout_order(user: &str) -> NewOrder {
    NewOrder::new(user)
        .with_item("btn-gradient-01", Usd::from_cents(499), 2)
        .with_item("navbar-glass", Usd::from_cents(1250), 1)
}

fn attempt_for(order_id: &OrderId, momo_order_id: &str) -> NewPaymentAttempt {
    NewPaymentAttempt {
        order_id: order_id.clone(),
        provider: "Momo".to_string(),
        amount: Vnd::from(562_000),
        request_id: format!("req-{momo_order_id}"),
        momo_order_id: momo_order_id.to_string(),
        payment_url: format!("https://test-payment.momo.vn/pay/{momo_order_id}"),
        response_data: r#"{"resultCode":0}"#.to_string(),
    }
}

#[tokio::test]
async fn checkout_computes_total_from_items() {
    let db = new_test_db().await;
    let orders = OrdersApi::new(db);
    let order = orders.checkout(checkout_order("alice")).await.expect("checkout failed");
    // 2 × $4.99 + $12.50
    assert_eq!(order.total_amount, Usd::from_cents(2248));
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.payment_status, PaymentStatus::Pending);
    assert!(order.active);

    let (_, items) = orders.order_with_items(&order.order_id).await.unwrap().expect("order should exist");
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].component_id, "btn-gradient-01");
    assert_eq!(items[0].quantity, 2);
}

#[tokio::test]
async fn successful_callback_settles_order_and_payment_together() {
    let db = new_test_db().await;
    let orders = OrdersApi::new(db.clone());
    let flow = PaymentFlowApi::new(db);

    let order = orders.checkout(checkout_order("bob")).await.unwrap();
    let payment = flow.register_attempt(attempt_for(&order.order_id, "MOMO-1700000000000-0001")).await.unwrap();
    assert_eq!(payment.status, PaymentStatus::Pending);

    // The order now carries the attempt's correlation ids
    let stamped = orders.order_by_id(&order.order_id).await.unwrap().unwrap();
    assert_eq!(stamped.payment_method.as_deref(), Some("Momo"));
    assert_eq!(stamped.payment_order_id.as_deref(), Some("MOMO-1700000000000-0001"));

    let update = flow
        .confirm_payment("MOMO-1700000000000-0001", "4088878653", r#"{"resultCode":"0"}"#)
        .await
        .expect("confirm failed");
    assert_eq!(update.order.payment_status, PaymentStatus::Completed);
    assert_eq!(update.order.status, OrderStatus::Processing);
    assert_eq!(update.order.transaction_id.as_deref(), Some("4088878653"));
    assert!(update.order.paid_at.is_some());
    assert_eq!(update.payment.status, PaymentStatus::Completed);
    assert_eq!(update.payment.transaction_id.as_deref(), Some("4088878653"));
    assert!(update.payment.paid_at.is_some());
    // Order and payment must agree after the callback
    assert_eq!(update.order.payment_status, update.payment.status);
}

#[tokio::test]
async fn failed_callback_marks_both_failed_without_settlement_fields() {
    let db = new_test_db().await;
    let orders = OrdersApi::new(db.clone());
    let flow = PaymentFlowApi::new(db);

    let order = orders.checkout(checkout_order("carol")).await.unwrap();
    flow.register_attempt(attempt_for(&order.order_id, "MOMO-1700000000000-0002")).await.unwrap();

    let update = flow
        .fail_payment("MOMO-1700000000000-0002", r#"{"resultCode":"1006","message":"User denied"}"#)
        .await
        .expect("fail_payment errored");
    assert_eq!(update.order.payment_status, PaymentStatus::Failed);
    assert_eq!(update.payment.status, PaymentStatus::Failed);
    // No settlement artifacts on a failed attempt
    assert_eq!(update.order.status, OrderStatus::Pending);
    assert!(update.order.paid_at.is_none());
    assert!(update.order.transaction_id.is_none());
    assert!(update.payment.paid_at.is_none());
    assert!(update.payment.transaction_id.is_none());
    // The raw callback is kept for diagnostics
    assert!(update.payment.response_data.as_deref().unwrap().contains("User denied"));
}

#[tokio::test]
async fn redelivered_success_callback_does_not_rewrite_state() {
    let db = new_test_db().await;
    let orders = OrdersApi::new(db.clone());
    let flow = PaymentFlowApi::new(db);

    let order = orders.checkout(checkout_order("dave")).await.unwrap();
    flow.register_attempt(attempt_for(&order.order_id, "MOMO-1700000000000-0003")).await.unwrap();

    let first = flow.confirm_payment("MOMO-1700000000000-0003", "4088878653", "{}").await.unwrap();
    let second = flow.confirm_payment("MOMO-1700000000000-0003", "4088878653", "{}").await.unwrap();

    assert_eq!(first.payment.paid_at, second.payment.paid_at);
    assert_eq!(first.payment.transaction_id, second.payment.transaction_id);
    assert_eq!(first.order.paid_at, second.order.paid_at);
    assert_eq!(second.order.payment_status, PaymentStatus::Completed);
}

#[tokio::test]
async fn failure_callback_after_settlement_is_ignored() {
    let db = new_test_db().await;
    let orders = OrdersApi::new(db.clone());
    let flow = PaymentFlowApi::new(db);

    let order = orders.checkout(checkout_order("erin")).await.unwrap();
    flow.register_attempt(attempt_for(&order.order_id, "MOMO-1700000000000-0004")).await.unwrap();
    flow.confirm_payment("MOMO-1700000000000-0004", "4088878653", "{}").await.unwrap();

    let update = flow.fail_payment("MOMO-1700000000000-0004", "{}").await.unwrap();
    assert_eq!(update.payment.status, PaymentStatus::Completed);
    assert_eq!(update.order.payment_status, PaymentStatus::Completed);
}

#[tokio::test]
async fn callbacks_resolve_the_attempt_they_belong_to() {
    let db = new_test_db().await;
    let orders = OrdersApi::new(db.clone());
    let flow = PaymentFlowApi::new(db);

    let order = orders.checkout(checkout_order("frank")).await.unwrap();
    flow.register_attempt(attempt_for(&order.order_id, "MOMO-1700000000000-0005")).await.unwrap();
    flow.fail_payment("MOMO-1700000000000-0005", "{}").await.unwrap();
    // Retry: a second attempt becomes the current one
    flow.register_attempt(attempt_for(&order.order_id, "MOMO-1700000000100-0006")).await.unwrap();

    let current = flow.current_payment(&order.order_id).await.unwrap().unwrap();
    assert_eq!(current.momo_order_id, "MOMO-1700000000100-0006");

    // A late callback for the first attempt still finds that attempt, not the retry
    let stale = flow.payment_by_provider_order_id("MOMO-1700000000000-0005").await.unwrap().unwrap();
    assert_eq!(stale.status, PaymentStatus::Failed);

    let update = flow.confirm_payment("MOMO-1700000000100-0006", "4088879000", "{}").await.unwrap();
    assert_eq!(update.order.payment_status, PaymentStatus::Completed);
}

#[tokio::test]
async fn registering_an_attempt_for_an_unknown_order_fails() {
    let db = new_test_db().await;
    let flow = PaymentFlowApi::new(db);
    let missing = OrderId::random();
    let err = flow.register_attempt(attempt_for(&missing, "MOMO-1700000000000-0007")).await.unwrap_err();
    assert!(matches!(err, PaymentGatewayError::OrderNotFound(_)));
}

#[tokio::test]
async fn payment_status_is_none_for_unknown_orders() {
    let db = new_test_db().await;
    let orders = OrdersApi::new(db.clone());
    let flow = PaymentFlowApi::new(db);

    assert!(flow.payment_status(&OrderId::random()).await.unwrap().is_none());

    let order = orders.checkout(checkout_order("grace")).await.unwrap();
    let status = flow.payment_status(&order.order_id).await.unwrap();
    assert_eq!(status, Some(PaymentStatus::Pending));
}

#[tokio::test]
async fn admin_status_transitions_follow_the_lifecycle() {
    let db = new_test_db().await;
    let orders = OrdersApi::new(db.clone());

    let order = orders.checkout(checkout_order("heidi")).await.unwrap();
    // No-op transitions are rejected
    let err = orders.set_order_status(&order.order_id, OrderStatus::Pending).await.unwrap_err();
    assert!(matches!(err, PaymentGatewayError::OrderModificationNoOp));

    let order2 = orders.set_order_status(&order.order_id, OrderStatus::Processing).await.unwrap();
    assert_eq!(order2.status, OrderStatus::Processing);
    let order3 = orders.set_order_status(&order.order_id, OrderStatus::Completed).await.unwrap();
    assert_eq!(order3.status, OrderStatus::Completed);

    // Completed is terminal
    let err = orders.set_order_status(&order.order_id, OrderStatus::Cancelled).await.unwrap_err();
    assert!(matches!(err, PaymentGatewayError::OrderModificationForbidden));

    // Cancelled is terminal too
    let cancelled = orders.checkout(checkout_order("heidi")).await.unwrap();
    orders.set_order_status(&cancelled.order_id, OrderStatus::Cancelled).await.unwrap();
    let err = orders.set_order_status(&cancelled.order_id, OrderStatus::Pending).await.unwrap_err();
    assert!(matches!(err, PaymentGatewayError::OrderModificationForbidden));
    // Cancellation is a status change, never a deletion
    let still_there = orders.order_by_id(&cancelled.order_id).await.unwrap();
    assert!(still_there.is_some());
}

#[tokio::test]
async fn checkout_is_idempotent_on_order_id() {
    let db = new_test_db().await;
    let orders = OrdersApi::new(db.clone());
    let new_order = checkout_order("ivan");
    let first = orders.checkout(new_order.clone()).await.unwrap();
    let second = orders.checkout(new_order).await.unwrap();
    assert_eq!(first.id, second.id);
    assert_eq!(db.fetch_orders_for_user("ivan").await.unwrap().len(), 1);
}
