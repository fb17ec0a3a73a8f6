pub mod config;
pub mod error;
pub mod message;
pub mod observability;
pub mod routes;
pub mod services;
pub mod state;
