pub mod api;
pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod middleware;
pub mod resources;
pub mod routes;
pub mod services;
pub mod state;

pub use routes::app;
pub use state::AppState;
