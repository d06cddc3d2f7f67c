//! Configuration validation
//!
//! Validates the pipeline configuration before any stage runs.

mod error;
mod validator;

#[cfg(test)]
mod tests;

pub use error::ValidationError;
pub use validator::validate_config;
