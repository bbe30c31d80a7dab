//! Domain Layer
//!
//! Entities, value objects and the outbound ports the engine depends on.

pub mod entities;
pub mod ports;
pub mod value_objects;

pub use entities::GeoRecord;
pub use value_objects::{DatabaseKind, LogLevel, UNKNOWN};
