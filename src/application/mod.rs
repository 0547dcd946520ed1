//! Application layer - Batch use cases
//!
//! This layer contains:
//! - Ports: the damage engine and result sink interfaces
//! - DTOs: the engine's JSON wire format
//! - Services: record parsing, partitioning and batch orchestration

pub mod dto;
pub mod ports;
pub mod services;
