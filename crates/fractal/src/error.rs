use std::path::PathBuf;

use shared::ParamsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtrudeError {
    #[error("bevelled extrusion is not supported")]
    BevelUnsupported,
    #[error("extrude depth must be positive, got {0}")]
    InvalidDepth(f64),
    #[error("outline thickness must be non-negative, got {0}")]
    InvalidThickness(f64),
}

#[derive(Debug, Error)]
pub enum ComposeError {
    /// Nothing to subtract from; callers feed an empty path tree
    #[error("base surface is empty")]
    EmptyBase,
    #[error("sphere radius must be positive, got {0}")]
    InvalidSphereRadius(f64),
    #[error("sphere needs at least 3 segments, got {0}")]
    TooFewSphereSegments(u32),
    #[error("boolean subtraction removed the whole solid")]
    EmptyResult,
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("scene has nothing to export")]
    EmptyScene,
    #[error("mesh '{name}' is malformed: {reason}")]
    MalformedMesh { name: String, reason: String },
    #[error("failed to serialize glTF JSON: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to decode data URI")]
    Decode(#[from] base64::DecodeError),
    #[error("not a base64 data URI")]
    NotADataUri,
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Any failure surfaced by the library's top-level operations
#[derive(Debug, Error)]
pub enum FractalError {
    #[error("invalid parameters: {0}")]
    Params(#[from] ParamsError),
    #[error(transparent)]
    Extrude(#[from] ExtrudeError),
    #[error(transparent)]
    Compose(#[from] ComposeError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type Result<T, E = FractalError> = std::result::Result<T, E>;
