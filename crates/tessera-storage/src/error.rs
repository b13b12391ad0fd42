//! Storage error types.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// PLY parse or write error.
#[derive(Debug, Error)]
pub enum PlyError {
    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    /// The first line is not `ply`.
    #[error("not a PLY file")]
    MissingMagic,

    /// Unknown `format` line.
    #[error("unsupported PLY format: {0}")]
    UnsupportedFormat(String),

    /// A header line that could not be understood.
    #[error("malformed header line {line}: {reason}")]
    MalformedHeader { line: usize, reason: String },

    /// Unknown scalar type name.
    #[error("unknown property type: {0}")]
    UnknownType(String),

    /// No `vertex` element in the header.
    #[error("no vertex element")]
    MissingVertexElement,

    /// A required vertex property is absent.
    #[error("vertex element has no `{0}` property")]
    MissingProperty(&'static str),

    /// The body ended before every declared row was read.
    #[error("unexpected end of data in element `{element}`")]
    UnexpectedEof { element: String },

    /// An ASCII value that does not parse as a number.
    #[error("invalid ascii value: {0:?}")]
    InvalidValue(String),
}

/// Compressed geometry codec error.
#[derive(Debug, Error)]
pub enum CodecError {
    /// IO error from the compressor.
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    /// Buffer does not start with the codec's magic bytes.
    #[error("not a compressed geometry buffer")]
    BadMagic,

    /// Buffer written by a newer codec.
    #[error("unsupported codec version: {0}")]
    UnsupportedVersion(u8),

    /// Payload length disagrees with the header.
    #[error("payload is {actual} bytes, header implies {expected}")]
    Truncated { expected: usize, actual: usize },

    /// Color array length differs from the position array.
    #[error("{colors} colors for {positions} positions")]
    ColorCount { positions: usize, colors: usize },
}

/// Storage error type.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Failed to open an input file.
    #[error("cannot open {}: {source}", .path.display())]
    Open { path: PathBuf, source: io::Error },

    /// Failed to write an output file.
    #[error("cannot write {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },

    /// PLY error.
    #[error("ply error: {0}")]
    Ply(#[from] PlyError),

    /// Codec error.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
}

/// Result type for PLY operations.
pub type PlyResult<T> = Result<T, PlyError>;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
