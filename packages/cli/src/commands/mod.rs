pub mod apply;
pub mod init;
pub mod inspect;

pub use apply::{apply, ApplyArgs};
pub use init::{init, InitArgs};
pub use inspect::{inspect, InspectArgs};

use anyhow::{Context, Result};
use campaign_editor::Document;
use std::path::{Path, PathBuf};

/// Resolve `path` against the working directory
pub fn resolve(cwd: &str, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        PathBuf::from(cwd).join(path)
    }
}

pub fn read_document(path: &Path) -> Result<Document> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read {}", path.display()))?;
    let document = Document::from_json(&json)
        .with_context(|| format!("{} is not a campaign document", path.display()))?;
    Ok(document)
}
