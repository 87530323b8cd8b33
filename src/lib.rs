//! SlizzAi asset-processing pipeline
//!
//! Imports an engine asset, runs it through a fixed graph of simulated
//! external tools (HDR processing, codex enhancement, metadata query,
//! calibration, shader compilation, art filtering) and collects the named
//! output of every step.

pub mod cli;
pub mod config;
pub mod provenance;
pub mod runtime;
pub mod server;
