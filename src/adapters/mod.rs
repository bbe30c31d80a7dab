//! Adapters Layer
//!
//! Inbound adapters drive the application (tower layer, HTTP server);
//! outbound adapters implement the domain ports (MaxMind, DashMap).

pub mod inbound;
pub mod outbound;
