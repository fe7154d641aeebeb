//! Storage abstraction for persisted drawings.

mod memory;

#[cfg(not(target_arch = "wasm32"))]
mod file;

pub use memory::MemoryStorage;

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStorage;

use crate::document::Drawing;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Drawing not found: {0}")]
    NotFound(String),
    #[error("Already exists: {0}")]
    AlreadyExists(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Boxed future for async operations (compatible with WASM).
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Trait for drawing storage backends.
///
/// Drawings are stored by name; implementations can keep them in memory
/// or on the filesystem.
pub trait Storage: Send + Sync {
    /// Save a drawing.
    fn save(&self, name: &str, drawing: &Drawing) -> BoxFuture<'_, StorageResult<()>>;

    /// Load a drawing.
    fn load(&self, name: &str) -> BoxFuture<'_, StorageResult<Drawing>>;

    /// Delete a drawing.
    fn delete(&self, name: &str) -> BoxFuture<'_, StorageResult<()>>;

    /// List all stored drawing names.
    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>>;

    /// Check if a drawing exists.
    fn exists(&self, name: &str) -> BoxFuture<'_, StorageResult<bool>>;
}
