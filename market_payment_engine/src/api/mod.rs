pub mod orders_api;
pub mod payment_flow_api;
