pub mod database;
pub mod events;
pub mod http;
pub mod otel;
pub mod subscriber;

pub use events::{BusinessEvent, redact_email};
pub use http::request_logging_middleware;
pub use subscriber::{init_tracing, shutdown_tracing};
