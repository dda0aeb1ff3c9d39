pub mod hallucinate;
pub mod info;
pub mod reconstruct;
pub mod train;

use std::path::Path;
use std::process;

use burn::config::Config;
use burn::prelude::*;

use mirage::checkpoint::{self, CheckpointTag};
use mirage::model::vae::{Vae, VaeConfig};

/// Load the model config snapshot written by `mirage train`.
///
/// Exits with a hint when the artifact directory has no snapshot, so the
/// generation commands can't silently build a model with the wrong shapes.
pub fn resolve_model_config(artifacts: &Path) -> VaeConfig {
    let path = artifacts.join("model.json");
    let config = match VaeConfig::load(&path) {
        Ok(config) => config,
        Err(_) => {
            eprintln!(
                "error: no model snapshot at '{}' (run `mirage train` first)",
                path.display()
            );
            process::exit(1);
        }
    };

    if !config.matches_mnist() {
        eprintln!(
            "warning: model input width {} does not match MNIST (784 pixels)",
            config.d_input
        );
    }

    config
}

/// Initialize a model and load the tagged checkpoint into it.
pub fn load_model<B: Backend>(
    config: &VaeConfig,
    artifacts: &Path,
    tag: CheckpointTag,
    device: &B::Device,
) -> Vae<B> {
    let model = config.init::<B>(device);
    match checkpoint::load_checkpoint(model, artifacts, tag, device) {
        Ok(Some(loaded)) => loaded,
        Ok(None) => {
            eprintln!(
                "error: no '{}' checkpoint under '{}'",
                tag,
                checkpoint::checkpoint_dir(artifacts).display()
            );
            process::exit(1);
        }
        Err(msg) => {
            eprintln!("error: {}", msg);
            process::exit(1);
        }
    }
}

/// Pick the checkpoint tag from the `--latest` flag (default: best).
pub fn resolve_tag(latest: bool) -> CheckpointTag {
    if latest {
        CheckpointTag::Latest
    } else {
        CheckpointTag::Best
    }
}
