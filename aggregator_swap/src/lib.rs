pub mod chain;
pub mod config;
pub mod error;
pub mod execution;
pub mod orchestrator;
pub mod prices;
pub mod routers;
#[cfg(test)]
pub mod tests;
pub mod utils;
