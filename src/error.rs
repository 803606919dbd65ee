//! Error types for the schematic architect.

use thiserror::Error;

/// Result type alias using ArchitectError.
pub type Result<T> = std::result::Result<T, ArchitectError>;

/// Main error type for rasterization, storage and serialization.
#[derive(Error, Debug)]
pub enum ArchitectError {
    /// Failed to read or parse a ZIP archive.
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Failed to parse JSON data.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error during file or socket operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to encode or decode an NBT tree.
    #[error("NBT error: {0}")]
    Nbt(#[from] fastnbt::error::Error),

    /// An id was looked up in a registry that does not contain it.
    #[error("Id [{id}] does not exist in {context}")]
    IdNotExists { id: String, context: String },

    /// A key selects a handler that was never registered.
    #[error("Key '{key}' is not registered in {context}")]
    KeyNotRegistered { key: String, context: String },

    /// A selection was attempted on an empty list.
    #[error("Can not get an item from the list '{0}': it is empty")]
    ListEmpty(String),

    /// Selection weights that can not form a distribution.
    #[error("Invalid weights in '{path}': {reason}")]
    InvalidWeights { path: String, reason: String },

    /// Geometry rejected at construction time.
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    /// A coordinate does not fit the storage it is written to.
    #[error("Position {pos:?} is outside of {limit}")]
    OutOfRange { pos: [i32; 3], limit: String },

    /// A buffer ended before a scheme finished reading or writing.
    #[error("Buffer underflow at offset {offset}: needed {needed} bytes, {available} available")]
    BufferUnderflow {
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// A value does not have the shape its scheme describes.
    #[error("Scheme mismatch: {0}")]
    SchemeMismatch(String),

    /// A string does not fit the 16-bit length prefix.
    #[error("String of {0} bytes exceeds the 16-bit length prefix")]
    StringTooLong(usize),

    /// A tagged union was read or written with a tag it does not know.
    #[error("Unknown union key: {0}")]
    UnknownKey(String),

    /// The operation exists but is not implemented for this input.
    #[error("Not supported yet: {0}")]
    Unsupported(String),

    /// Invalid resource pack structure.
    #[error("Invalid resource pack: {0}")]
    InvalidResourcePack(String),

    /// An export ran past its deadline.
    #[error("Export deadline exceeded")]
    DeadlineExceeded,

    /// Protocol-level failure on the worker transport.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The peer closed the connection while a request was outstanding.
    #[error("Connection closed")]
    ConnectionClosed,
}

impl ArchitectError {
    pub fn id_not_exists(id: impl Into<String>, context: &[&str]) -> Self {
        ArchitectError::IdNotExists {
            id: id.into(),
            context: context.join("/"),
        }
    }

    pub fn key_not_registered(key: impl Into<String>, context: &[&str]) -> Self {
        ArchitectError::KeyNotRegistered {
            key: key.into(),
            context: context.join("/"),
        }
    }

    /// Whether the error belongs to the lookup family (unknown block, material or key).
    pub fn is_lookup(&self) -> bool {
        matches!(
            self,
            ArchitectError::IdNotExists { .. } | ArchitectError::KeyNotRegistered { .. }
        )
    }
}
