//! Remote flag service access.
//!
//! [`types`] holds the typed document model, [`gateway`] the service
//! interface, and [`client`] the reqwest implementation.

pub mod client;
pub mod gateway;
pub mod types;

pub use client::ApiClient;
pub use gateway::FlagGateway;
