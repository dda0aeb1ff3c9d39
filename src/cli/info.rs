use std::path::PathBuf;

use clap::Args;

use mirage::checkpoint::{available_checkpoints, checkpoint_digest};

#[derive(Args)]
pub struct InfoArgs {
    /// Artifact directory to inspect
    #[arg(long, default_value = "artifacts")]
    pub artifact_dir: PathBuf,
}

pub fn cmd_info(args: InfoArgs) {
    let config = super::resolve_model_config(&args.artifact_dir);

    eprintln!("Model: {} → {} → {} (≈{} params, beta {})",
        config.d_input,
        config.d_hidden,
        config.d_latent,
        config.param_estimate(),
        config.beta,
    );

    let found = available_checkpoints(&args.artifact_dir);
    if found.is_empty() {
        eprintln!("No checkpoints yet.");
        return;
    }

    eprintln!("Checkpoints:");
    for (tag, path) in found {
        let size = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
        let digest = checkpoint_digest(&path)
            .map(|d| d[..16].to_string())
            .unwrap_or_else(|_| "?".into());
        eprintln!(
            "  {:<7} {:>9} bytes  {}  {}",
            tag.to_string(),
            size,
            digest,
            path.display(),
        );
    }
}
