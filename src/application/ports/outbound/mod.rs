//! Outbound ports - Interfaces that the application requires from external systems

mod engine_port;
mod roll_sink_port;

pub use engine_port::{DamageEnginePort, EngineError};
pub use roll_sink_port::{RollSinkPort, SinkError};
