pub mod drag;
mod error;
pub mod models;
pub mod ports;
pub mod reconcile;
pub mod services;
pub mod store;

pub use error::*;
