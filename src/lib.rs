//! Library exports for the analytics session client, shared between the
//! binary and tests.

pub mod client;
pub mod config;
pub mod environment;
pub mod error;
pub mod models;
pub mod navigation;
pub mod session;
pub mod startup;
pub mod state;
pub mod store;
pub mod utils;

pub use error::{Error, Result};
