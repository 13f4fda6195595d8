pub mod config;
pub mod handlers;
pub mod models;
pub mod moderation;
pub mod projection;
pub mod routes;
pub mod store;
pub mod utils;
