use actix_web::{http::StatusCode, test, web::ServiceConfig, App};
use serde::Serialize;

pub async fn get_request<F>(path: &str, configure: F) -> (StatusCode, String)
where F: FnOnce(&mut ServiceConfig) {
    let app = test::init_service(App::new().configure(configure)).await;
    let req = test::TestRequest::get().uri(path).to_request();
    let res = test::call_service(&app, req).await;
    let status = res.status();
    let body = String::from_utf8_lossy(&test::read_body(res).await).to_string();
    (status, body)
}

pub async fn post_request<F, B>(path: &str, body: &B, configure: F) -> (StatusCode, String)
where
    F: FnOnce(&mut ServiceConfig),
    B: Serialize,
{
    let app = test::init_service(App::new().configure(configure)).await;
    let req = test::TestRequest::post().uri(path).set_json(body).to_request();
    let res = test::call_service(&app, req).await;
    let status = res.status();
    let body = String::from_utf8_lossy(&test::read_body(res).await).to_string();
    (status, body)
}
