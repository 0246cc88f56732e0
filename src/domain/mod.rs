//! Domain layer: models, ports, and typed errors.

pub mod errors;
pub mod models;
pub mod ports;
