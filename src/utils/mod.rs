pub mod audit;
pub mod tracing;
pub mod upload;
pub mod validation;
