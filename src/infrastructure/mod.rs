//! Infrastructure layer - External adapters and implementations
//!
//! This layer contains:
//! - Config: layered application configuration
//! - Engine process: the damage engine child-process adapter
//! - Input reader / roll writer: batch input and output files
//! - CLI: command line entry points

pub mod cli;
pub mod config;
pub mod engine_process;
pub mod input_reader;
pub mod roll_writer;
