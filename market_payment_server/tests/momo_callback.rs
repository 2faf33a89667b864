//! End-to-end callback processing against a real SQLite store: signature verification,
//! correlation-id resolution, and the order/payment state transitions, with only the outbound
//! HTTP leg left out.

use std::collections::HashMap;

use market_payment_engine::{
    db_types::{NewOrder, NewPaymentAttempt, OrderId, OrderStatus, PaymentStatus},
    test_utils::prepare_env::{prepare_test_env, random_db_path},
    OrdersApi,
    PaymentFlowApi,
    SqliteDatabase,
};
use market_payment_server::integrations::momo::process_momo_callback;
use momo_tools::{
    signature::{callback_signing_string, sign},
    MomoConfig,
};
use mpg_common::{Secret, Usd, Vnd};

fn momo_config() -> MomoConfig {
    MomoConfig {
        partner_code: "MOMO".to_string(),
        access_key: Secret::new("F8BBA842ECF85".to_string()),
        secret_key: Secret::new("K951B6PE1waDMi640xX08PD3vg6EkVlz".to_string()),
        ..MomoConfig::default()
    }
}

async fn new_test_db() -> SqliteDatabase {
    let url = random_db_path();
    prepare_test_env(&url).await;
    SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating database")
}

/// Creates an order with a registered Pending payment attempt and returns its ids.
async fn order_with_attempt(db: &SqliteDatabase, momo_order_id: &str) -> OrderId {
    let orders = OrdersApi::new(db.clone());
    let flow = PaymentFlowApi::new(db.clone());
    let order = orders
        .checkout(NewOrder::new("alice").with_item("card-pricing-04", Usd::from_cents(899), 1))
        .await
        .expect("checkout failed");
    flow.register_attempt(NewPaymentAttempt {
        order_id: order.order_id.clone(),
        provider: "Momo".to_string(),
        amount: Vnd::from(224_750),
        request_id: format!("req-{momo_order_id}"),
        momo_order_id: momo_order_id.to_string(),
        payment_url: format!("https://test-payment.momo.vn/pay/{momo_order_id}"),
        response_data: r#"{"resultCode":0}"#.to_string(),
    })
    .await
    .expect("register_attempt failed");
    order.order_id
}

/// A correctly signed callback field map, the way MoMo would deliver it.
fn signed_callback(config: &MomoConfig, momo_order_id: &str, result_code: &str, trans_id: &str) -> HashMap<String, String> {
    let mut fields: HashMap<String, String> = [
        ("partnerCode", "MOMO"),
        ("orderId", momo_order_id),
        ("requestId", "9f3a61e0-5d5e-4c7b-9e3e-0a1b2c3d4e5f"),
        ("amount", "224750"),
        ("orderInfo", "UI component marketplace order"),
        ("orderType", "momo_wallet"),
        ("transId", trans_id),
        ("resultCode", result_code),
        ("message", if result_code == "0" { "Successful." } else { "Transaction denied by user." }),
        ("payType", "qr"),
        ("responseTime", "1700000012345"),
        ("extraData", ""),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    let payload = callback_signing_string(config.access_key.reveal(), &fields);
    fields.insert("signature".to_string(), sign(config.secret_key.reveal(), &payload));
    fields
}

#[tokio::test]
async fn verified_success_callback_settles_the_order() {
    let db = new_test_db().await;
    let config = momo_config();
    let order_id = order_with_attempt(&db, "MOMO-1700000000000-1111").await;
    let flow = PaymentFlowApi::new(db.clone());

    let fields = signed_callback(&config, "MOMO-1700000000000-1111", "0", "4088878653");
    assert!(process_momo_callback(&fields, &config, &flow).await);

    let orders = OrdersApi::new(db);
    let order = orders.order_by_id(&order_id).await.unwrap().unwrap();
    assert_eq!(order.payment_status, PaymentStatus::Completed);
    assert_eq!(order.status, OrderStatus::Processing);
    assert_eq!(order.transaction_id.as_deref(), Some("4088878653"));
    assert!(order.paid_at.is_some());

    let payment = flow.current_payment(&order_id).await.unwrap().unwrap();
    assert_eq!(payment.status, PaymentStatus::Completed);
    assert_eq!(payment.transaction_id.as_deref(), Some("4088878653"));
    // The raw callback is stored verbatim for audit
    assert!(payment.response_data.as_deref().unwrap().contains("4088878653"));
}

#[tokio::test]
async fn tampered_callback_leaves_the_store_untouched() {
    let db = new_test_db().await;
    let config = momo_config();
    let order_id = order_with_attempt(&db, "MOMO-1700000000000-2222").await;
    let flow = PaymentFlowApi::new(db.clone());

    let mut fields = signed_callback(&config, "MOMO-1700000000000-2222", "0", "4088878653");
    // A single altered field invalidates the digest
    fields.insert("amount".to_string(), "1".to_string());
    assert!(!process_momo_callback(&fields, &config, &flow).await);

    let order = OrdersApi::new(db).order_by_id(&order_id).await.unwrap().unwrap();
    assert_eq!(order.payment_status, PaymentStatus::Pending);
    assert!(order.paid_at.is_none());
    let payment = flow.current_payment(&order_id).await.unwrap().unwrap();
    assert_eq!(payment.status, PaymentStatus::Pending);
}

#[tokio::test]
async fn failure_callback_marks_both_records_failed() {
    let db = new_test_db().await;
    let config = momo_config();
    let order_id = order_with_attempt(&db, "MOMO-1700000000000-3333").await;
    let flow = PaymentFlowApi::new(db.clone());

    let fields = signed_callback(&config, "MOMO-1700000000000-3333", "1006", "");
    assert!(!process_momo_callback(&fields, &config, &flow).await);

    let order = OrdersApi::new(db).order_by_id(&order_id).await.unwrap().unwrap();
    assert_eq!(order.payment_status, PaymentStatus::Failed);
    assert!(order.paid_at.is_none());
    assert!(order.transaction_id.is_none());
    let payment = flow.current_payment(&order_id).await.unwrap().unwrap();
    assert_eq!(payment.status, PaymentStatus::Failed);
    assert!(payment.response_data.as_deref().unwrap().contains("1006"));
}

#[tokio::test]
async fn redelivered_success_callback_is_idempotent() {
    let db = new_test_db().await;
    let config = momo_config();
    let order_id = order_with_attempt(&db, "MOMO-1700000000000-4444").await;
    let flow = PaymentFlowApi::new(db.clone());

    let fields = signed_callback(&config, "MOMO-1700000000000-4444", "0", "4088878653");
    assert!(process_momo_callback(&fields, &config, &flow).await);
    let first = flow.current_payment(&order_id).await.unwrap().unwrap();

    // MoMo retries IPN delivery; the second pass must acknowledge without rewriting anything
    assert!(process_momo_callback(&fields, &config, &flow).await);
    let second = flow.current_payment(&order_id).await.unwrap().unwrap();
    assert_eq!(first.paid_at, second.paid_at);
    assert_eq!(first.transaction_id, second.transaction_id);
    assert_eq!(first.updated_at, second.updated_at);
}

#[tokio::test]
async fn signed_callback_for_an_unknown_attempt_is_rejected() {
    let db = new_test_db().await;
    let config = momo_config();
    let flow = PaymentFlowApi::new(db);

    let fields = signed_callback(&config, "MOMO-9999999999999-0000", "0", "4088878653");
    assert!(!process_momo_callback(&fields, &config, &flow).await);
}
