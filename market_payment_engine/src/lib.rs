//! Market Payment Engine
//!
//! Core logic for the marketplace payment gateway: order and payment-attempt storage, and the
//! state transitions a payment-provider callback drives. The engine is provider-agnostic — it
//! knows about correlation ids and result outcomes, not about MoMo's wire format.
//!
//! The crate is divided into two main sections:
//! 1. Database management (the `sqlite` module). SQLite is the supported backend. Access goes
//!    through the public APIs rather than the database directly; the exception is the data
//!    types, which are defined in [`db_types`] and are public.
//! 2. The public API ([`OrdersApi`], [`PaymentFlowApi`]). Backends implement the traits in
//!    [`traits`] to drive it.

pub mod db_types;
pub mod traits;

mod api;
#[cfg(feature = "sqlite")]
mod sqlite;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

pub use api::{orders_api::OrdersApi, payment_flow_api::PaymentFlowApi};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
