//! Error types for the origin-tracking subsystem.

/// Errors produced by direct origin-store operations.
#[derive(Debug, thiserror::Error)]
pub enum OriginError {
    #[error("window id must not be empty")]
    EmptyWindowId,
}

/// Errors produced by the import/export codec.
///
/// `Parse` and `UnsupportedShape` are hard failures: the file was not a
/// usable document and nothing was imported. `NothingImported` and
/// `NothingToExport` are soft: the document was structurally fine but
/// there was no work to do, and the caller should say so rather than
/// show a parse diagnostic.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("nothing to export: no origin marks recorded")]
    NothingToExport,

    #[error("import file is not valid JSON: {0}")]
    Parse(String),

    #[error("import file has an unrecognized top-level shape")]
    UnsupportedShape,

    #[error("no usable entries found in import file")]
    NothingImported,
}

impl CodecError {
    /// True for the "nothing to do" outcomes, false for hard parse failures.
    pub fn is_soft(&self) -> bool {
        matches!(self, CodecError::NothingToExport | CodecError::NothingImported)
    }
}

/// Result type for origin-store operations.
pub type OriginResult<T> = std::result::Result<T, OriginError>;
