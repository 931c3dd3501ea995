//! File access capability for agent runtimes
//!
//! The model collaborator is offered a single narrow ability: read a file
//! by path and get its text back. Expressing it as a trait keeps the
//! pipeline and any agent-runtime binding decoupled from the filesystem,
//! so tests can substitute fixtures.

use std::path::Path;

use crate::error::Result;

/// Capability to read a file's full text content
pub trait FileAccess: Send + Sync {
    /// Read the file at `path` as UTF-8 text
    fn read(&self, path: &Path) -> Result<String>;
}

/// Standard filesystem-backed implementation
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFiles;

impl FileAccess for LocalFiles {
    fn read(&self, path: &Path) -> Result<String> {
        Ok(std::fs::read_to_string(path)?)
    }
}
