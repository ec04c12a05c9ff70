use crate::error::IndexError;
use std::io::ErrorKind;
use std::path::Path;

/// What the resolved path turned out to be on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    /// Exists and is a directory; proceed to listing.
    Directory,
    /// Exists but is not a directory; defer to the next handler (a
    /// static-file service downstream may want to serve it).
    NotADirectory,
    /// Nothing there; defer to the next handler.
    NotFound,
}

/// Stats `path` once and classifies the result. Missing paths and
/// non-directories are fallthrough outcomes, not errors; a name-too-long
/// failure maps to 414 and anything else to 500.
pub async fn probe(path: &Path) -> Result<Probe, IndexError> {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_dir() => Ok(Probe::Directory),
        Ok(_) => Ok(Probe::NotADirectory),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(Probe::NotFound),
        Err(e) if e.kind() == ErrorKind::InvalidFilename => Err(IndexError::PathTooLong),
        Err(e) => Err(IndexError::Io(e)),
    }
}
