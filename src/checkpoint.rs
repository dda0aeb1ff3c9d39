//! Checkpoint management for trained models.
//!
//! Uses burn's native record format (NamedMpk) for model weights.
//! Two tags: `latest` (written every epoch) and `best` (lowest validation
//! loss seen so far). Checkpoints live under `<artifacts>/checkpoints/`.

use std::path::{Path, PathBuf};

use burn::module::Module;
use burn::prelude::*;
use burn::record::{FullPrecisionSettings, NamedMpkFileRecorder};

/// Checkpoint tag for naming saved files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckpointTag {
    Latest,
    Best,
}

impl CheckpointTag {
    fn stem(&self) -> &'static str {
        match self {
            Self::Latest => "latest",
            Self::Best => "best",
        }
    }
}

impl std::fmt::Display for CheckpointTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.stem())
    }
}

/// Checkpoint directory under the artifact root.
pub fn checkpoint_dir(artifacts: &Path) -> PathBuf {
    artifacts.join("checkpoints")
}

/// Save a model checkpoint to disk.
///
/// Uses NamedMpk format with full precision (lossless).
/// File will be at `<artifacts>/checkpoints/{tag}.mpk`.
pub fn save_checkpoint<B: Backend, M: Module<B> + Clone>(
    model: &M,
    artifacts: &Path,
    tag: CheckpointTag,
) -> Result<PathBuf, String> {
    let dir = checkpoint_dir(artifacts);
    std::fs::create_dir_all(&dir).map_err(|e| format!("mkdir {}: {}", dir.display(), e))?;

    let path = dir.join(tag.stem());
    let recorder = NamedMpkFileRecorder::<FullPrecisionSettings>::new();
    model
        .clone()
        .save_file(path.clone(), &recorder)
        .map_err(|e| format!("save {}: {}", path.display(), e))?;

    // burn appends .mpk extension
    Ok(path.with_extension("mpk"))
}

/// Load a model checkpoint from disk.
///
/// Returns the model with loaded weights, or None if the checkpoint
/// doesn't exist.
pub fn load_checkpoint<B: Backend, M: Module<B>>(
    model: M,
    artifacts: &Path,
    tag: CheckpointTag,
    device: &B::Device,
) -> Result<Option<M>, String> {
    let path = checkpoint_dir(artifacts).join(tag.stem());

    // Probe the on-disk <stem>.mpk before handing the stem to the recorder
    let full_path = path.with_extension("mpk");
    if !full_path.exists() {
        return Ok(None);
    }

    let recorder = NamedMpkFileRecorder::<FullPrecisionSettings>::new();
    let loaded = model
        .load_file(path, &recorder, device)
        .map_err(|e| format!("load {}: {}", full_path.display(), e))?;

    Ok(Some(loaded))
}

/// Check which checkpoints exist on disk.
pub fn available_checkpoints(artifacts: &Path) -> Vec<(CheckpointTag, PathBuf)> {
    let dir = checkpoint_dir(artifacts);
    let mut found = Vec::new();
    for tag in [CheckpointTag::Best, CheckpointTag::Latest] {
        let path = dir.join(tag.stem()).with_extension("mpk");
        if path.exists() {
            found.push((tag, path));
        }
    }
    found
}

/// Content digest of a checkpoint file, for display and change tracking.
pub fn checkpoint_digest(path: &Path) -> Result<String, String> {
    let bytes =
        std::fs::read(path).map_err(|e| format!("read {}: {}", path.display(), e))?;
    Ok(blake3::hash(&bytes).to_hex().to_string())
}
