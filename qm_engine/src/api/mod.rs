mod accounts_api;
mod auth_api;
mod catalog_api;
mod order_flow_api;
mod orders_api;

pub use accounts_api::{AccountApi, RegisterUser};
pub use auth_api::AuthApi;
pub use catalog_api::CatalogApi;
pub use order_flow_api::OrderFlowApi;
pub use orders_api::OrdersApi;
