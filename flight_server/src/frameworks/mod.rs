// Frameworks layer: configuration, seed loading and runtime bootstrap.

pub mod config;
pub mod seed;
pub mod server;
