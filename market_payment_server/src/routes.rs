//! Request handler definitions
//!
//! Define each route and its handler here. Handlers that are more than a line or two MUST go
//! into a separate module. Keep this module neat and tidy 🙏
//!
//! Handlers are generic over the database backend, and actix cannot register generic handlers
//! via its attribute macros, so each route gets a small `HttpServiceFactory` struct generated by
//! the `route!` macro below.

use std::str::FromStr;

use actix_web::{get, web, HttpResponse, Responder};
use log::*;
use market_payment_engine::{
    db_types::{NewOrder, OrderId, OrderStatus},
    traits::PaymentGatewayDatabase,
    OrdersApi,
    PaymentFlowApi,
};

use crate::{
    data_objects::{CheckoutParams, OrderWithItems, StatusResponse, UpdateOrderStatusParams, UserQuery},
    errors::ServerError,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------  Checkout  ----------------------------------------------------
route!(checkout => Post "/orders" impl PaymentGatewayDatabase);
/// Creates an order, with its line items, from the storefront's checkout call. The order total
/// is derived from the items; an empty cart is rejected.
pub async fn checkout<B: PaymentGatewayDatabase>(
    body: web::Json<CheckoutParams>,
    api: web::Data<OrdersApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let params = body.into_inner();
    if params.user_id.trim().is_empty() {
        return Err(ServerError::InvalidRequestBody("user_id is required".to_string()));
    }
    if params.items.is_empty() {
        return Err(ServerError::InvalidRequestBody("cannot check out an empty cart".to_string()));
    }
    let mut order = NewOrder::new(params.user_id);
    for item in params.items {
        order = order.with_item(item.component_id, item.unit_price, item.quantity);
    }
    debug!("💻️ Checkout for order {} ({} items)", order.order_id, order.items.len());
    let order = api.checkout(order).await?;
    Ok(HttpResponse::Ok().json(order))
}

//----------------------------------------------   Orders  ----------------------------------------------------
route!(order_by_id => Get "/orders/{order_id}" impl PaymentGatewayDatabase);
pub async fn order_by_id<B: PaymentGatewayDatabase>(
    path: web::Path<String>,
    api: web::Data<OrdersApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = OrderId::from(path.into_inner());
    trace!("💻️ GET order {order_id}");
    let (order, items) = api
        .order_with_items(&order_id)
        .await?
        .ok_or_else(|| ServerError::NoRecordFound(format!("Order {order_id}")))?;
    Ok(HttpResponse::Ok().json(OrderWithItems { order, items }))
}

route!(orders_for_user => Get "/orders" impl PaymentGatewayDatabase);
pub async fn orders_for_user<B: PaymentGatewayDatabase>(
    query: web::Query<UserQuery>,
    api: web::Data<OrdersApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let user_id = query.into_inner().user_id;
    trace!("💻️ GET orders for user [{user_id}]");
    let orders = api.orders_for_user(&user_id).await?;
    Ok(HttpResponse::Ok().json(orders))
}

route!(update_order_status => Post "/orders/{order_id}/status" impl PaymentGatewayDatabase);
/// Admin-driven order status transition. Forbidden moves (out of Completed or Cancelled, or a
/// no-op) come back as 400s.
pub async fn update_order_status<B: PaymentGatewayDatabase>(
    path: web::Path<String>,
    body: web::Json<UpdateOrderStatusParams>,
    api: web::Data<OrdersApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = OrderId::from(path.into_inner());
    let status = OrderStatus::from_str(&body.into_inner().status)
        .map_err(|e| ServerError::InvalidRequestBody(e.to_string()))?;
    debug!("💻️ POST status change for order {order_id} to {status}");
    let order = api.set_order_status(&order_id, status).await?;
    Ok(HttpResponse::Ok().json(order))
}

//------------------------------------------   Payment status  ------------------------------------------------
route!(payment_status => Get "/payments/status/{order_id}" impl PaymentGatewayDatabase);
/// Reports the payment status of an order verbatim, or "Unknown" when no such order exists. The
/// storefront polls this after sending the buyer to the gateway.
pub async fn payment_status<B: PaymentGatewayDatabase>(
    path: web::Path<String>,
    api: web::Data<PaymentFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = OrderId::from(path.into_inner());
    let status = api
        .payment_status(&order_id)
        .await?
        .map(|s| s.to_string())
        .unwrap_or_else(|| "Unknown".to_string());
    trace!("💻️ Payment status for order {order_id}: {status}");
    Ok(HttpResponse::Ok().json(StatusResponse { status }))
}
