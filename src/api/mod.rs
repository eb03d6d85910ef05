pub mod dto;
pub mod extractors;
pub mod handlers;
mod routes;

pub use routes::{login_routes, routes};
