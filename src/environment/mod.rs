pub mod resolver;

// Re-export so callers can do "use crate::environment::{resolve, EnvironmentConfig};"
pub use resolver::*;
