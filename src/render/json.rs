use crate::error::IndexError;
use crate::stat::StatEntry;
use std::io;

/// JSON body: the listing's entry names as an array of strings, in listing
/// order. No metadata is exposed.
pub fn render(entries: &[StatEntry]) -> Result<String, IndexError> {
    let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
    serde_json::to_string(&names).map_err(|e| IndexError::Io(io::Error::other(e)))
}
