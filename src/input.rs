//! src/input.rs
use anyhow::Context;
use std::path::Path;

/// Reads the whole file. Invalid UTF-8 is replaced, which the tokenizer
/// treats as a separator.
pub fn read_text(path: &Path) -> Result<String, anyhow::Error> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read input file: {}", path.display()))?;
    Ok(match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    })
}

/// Like `read_text`, but a missing or unreadable file is logged and counted
/// as empty so the rest of the run can carry on.
pub fn read_text_or_empty(path: &Path) -> String {
    read_text(path).unwrap_or_else(|e| {
        tracing::error!("{e:#}");
        String::new()
    })
}
