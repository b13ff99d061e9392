// Public exports
pub mod server;
pub use server::{create_router, start_webhook_server, WEBHOOK_PATH};
pub use state::AppState;

// Internal modules
mod auth;
mod handlers;
mod state;
