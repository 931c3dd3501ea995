//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `export` - Transaction CSV export command
//! - `insights` - AI insight pipeline command

pub mod export;
pub mod insights;

// Re-export command functions for main.rs
pub use export::*;
pub use insights::*;
