//! QuickMart storefront engine
//!
//! This library contains the storage layer and business logic for the QuickMart commerce server: the product
//! catalog, user accounts and credentials, and the checkout reconciliation flow that turns completed payment
//! sessions into order records.
//!
//! The library is divided into two main sections:
//! 1. Storage traits and backends. SQLite is the supported backend ([`SqliteDatabase`]). Callers should never
//!    need to touch the database directly; the data types it trades in live in [`db_types`] and are public.
//! 2. The engine public API: [`CatalogApi`], [`AccountApi`], [`AuthApi`], [`OrdersApi`] and — the heart of the
//!    checkout flow — [`OrderFlowApi`], which reconciles completed payment sessions into exactly one order each.
//!
//! The engine also emits events when orders are paid or when reconciliation fails after a payment was captured.
//! A simple actor framework ([`events`]) lets operators hook a monitoring sink into these events.

pub mod catalog_objects;
pub mod db_types;
pub mod events;
pub mod helpers;
pub mod order_objects;
pub mod traits;

mod api;

#[cfg(feature = "sqlite")]
mod sqlite;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;

pub use api::{AccountApi, AuthApi, CatalogApi, OrderFlowApi, OrdersApi, RegisterUser};
pub use traits::{
    AccountApiError,
    AuthApiError,
    AuthManagement,
    CatalogApiError,
    CatalogManagement,
    CheckoutGatewayDatabase,
    CheckoutGatewayError,
    InsertOrderResult,
    OrderApiError,
    OrderManagement,
    UserManagement,
};
