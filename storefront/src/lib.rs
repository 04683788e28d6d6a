//! Verdant storefront server.
//!
//! Serves the session endpoints and the `/user`, `/seller` and `/admin`
//! namespaces behind the route gate. Catalog, orders and content are served
//! by the REST backend and are not part of this process.

pub mod app;
pub mod config;
pub mod pages;

pub use app::{build_router, from_config};
pub use config::Config;
