use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use market_payment_engine::{OrdersApi, PaymentFlowApi, SqliteDatabase};
use momo_tools::MomoApi;

use crate::{
    config::ServerConfig,
    errors::ServerError,
    momo_routes::{CreatePaymentRoute, MomoIpnRoute, MomoReturnRoute},
    routes::{
        health,
        CheckoutRoute,
        OrderByIdRoute,
        OrdersForUserRoute,
        PaymentStatusRoute,
        UpdateOrderStatusRoute,
    },
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let srv = create_server_instance(config, db)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(config: ServerConfig, db: SqliteDatabase) -> Result<Server, ServerError> {
    let momo_api = MomoApi::new(config.momo.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let host = config.host.clone();
    let port = config.port;
    let srv = HttpServer::new(move || {
        let orders_api = OrdersApi::new(db.clone());
        let flow_api = PaymentFlowApi::new(db.clone());
        let app = App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("mps::access_log"))
            .app_data(web::Data::new(orders_api))
            .app_data(web::Data::new(flow_api))
            .app_data(web::Data::new(momo_api.clone()))
            .app_data(web::Data::new(config.clone()));
        // The storefront-facing API
        let api_scope = web::scope("/api")
            .service(CheckoutRoute::<SqliteDatabase>::new())
            .service(OrdersForUserRoute::<SqliteDatabase>::new())
            .service(OrderByIdRoute::<SqliteDatabase>::new())
            .service(UpdateOrderStatusRoute::<SqliteDatabase>::new())
            .service(CreatePaymentRoute::<SqliteDatabase>::new())
            .service(PaymentStatusRoute::<SqliteDatabase>::new());
        // Gateway-facing callback routes live outside the API scope; MoMo calls them directly
        app.service(health)
            .service(api_scope)
            .service(MomoReturnRoute::<SqliteDatabase>::new())
            .service(MomoIpnRoute::<SqliteDatabase>::new())
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((host.as_str(), port))?
    .run();
    Ok(srv)
}
