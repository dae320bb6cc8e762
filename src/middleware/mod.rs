pub mod error_context;
pub mod http_logger;
pub mod permission;
