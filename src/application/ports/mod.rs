//! Ports - Interfaces at the edge of the application layer

pub mod outbound;
