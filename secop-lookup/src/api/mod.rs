//! HTTP API handlers for secop-lookup

pub mod lookup;
pub mod service;
pub mod ui;

pub use lookup::{export, search};
pub use service::{service_routes, BuildInfo};
pub use ui::{serve_app_js, serve_index};
