//! # QuickMart commerce server
//! This crate hosts the REST server for the QuickMart backend. It is responsible for:
//! * User signup, login and profile management (JWT-authenticated).
//! * The product catalog endpoints.
//! * Building hosted checkout sessions against the payment processor.
//! * Listening for incoming payment webhooks, verifying their signatures, and handing verified completion
//!   events to the reconciliation engine.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.

pub mod auth;
pub mod checkout_routes;
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod integrations;
pub mod middleware;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
