//! Data Transfer Objects - For process boundaries
//!
//! DTOs live in the application layer so infrastructure can serialize and
//! deserialize without pulling serde into the domain model.

pub mod calc_request;

pub use calc_request::{CalcRequestDto, CalcResponseDto};
