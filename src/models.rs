//! Process model discovery.
//!
//! Every regular file directly inside the model directory is one model.
//! Sub-directories are not descended into; the recursive file count is only
//! logged so a misplaced model shows up in the output.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct ModelFile {
    /// File name, used as the deployment name.
    pub name: String,
    /// Raw file content, uploaded verbatim.
    pub content: Vec<u8>,
}

/// Reads all models in `dir`, sorted by file name.
pub fn discover_models(dir: &Path) -> Result<Vec<ModelFile>> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("cannot read process model directory {}", dir.display()))?;

    let mut models = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("cannot list {}", dir.display()))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let content = fs::read(&path)
            .with_context(|| format!("cannot read process model {}", path.display()))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        debug!(model = %name, bytes = content.len(), "found process model");
        models.push(ModelFile { name, content });
    }
    models.sort_by(|a, b| a.name.cmp(&b.name));

    if models.is_empty() {
        anyhow::bail!("no process models found in {}", dir.display());
    }

    let nested = count_files_recursive(dir).saturating_sub(models.len());
    if nested > 0 {
        warn!(
            nested,
            dir = %dir.display(),
            "files in sub-directories of the model directory are not deployed"
        );
    }

    Ok(models)
}

/// Regular files anywhere below `dir`. Symlinks are not followed.
fn count_files_recursive(dir: &Path) -> usize {
    WalkDir::new(dir)
        .follow_links(false)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .count()
}
