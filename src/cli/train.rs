use std::path::PathBuf;
use std::process;

use clap::Args;

use burn::backend::{Autodiff, NdArray, Wgpu};
use burn::tensor::backend::AutodiffBackend;

use mirage::model::vae::VaeConfig;
use mirage::training::run::{fit, TrainingConfig};

#[derive(Args)]
pub struct TrainArgs {
    /// Artifact directory for checkpoints, samples, and metrics
    #[arg(long, default_value = "artifacts")]
    pub artifact_dir: PathBuf,
    /// Maximum training epochs
    #[arg(short, long, default_value = "20")]
    pub epochs: usize,
    /// Mini-batch size
    #[arg(long, default_value = "128")]
    pub batch_size: usize,
    /// Latent dimension
    #[arg(long, default_value = "16")]
    pub latent: usize,
    /// Hidden trunk width
    #[arg(long, default_value = "512")]
    pub hidden: usize,
    /// Weight on the KL term
    #[arg(long, default_value = "1.0")]
    pub beta: f64,
    /// Initial learning rate
    #[arg(long, default_value = "1e-3")]
    pub lr: f64,
    /// RNG seed
    #[arg(long, default_value = "42")]
    pub seed: u64,
    /// Use GPU acceleration (default: CPU)
    #[arg(long)]
    pub gpu: bool,
}

pub fn cmd_train(args: TrainArgs) {
    let model_config = VaeConfig::new()
        .with_d_latent(args.latent)
        .with_d_hidden(args.hidden)
        .with_beta(args.beta);

    let config = TrainingConfig::new()
        .with_num_epochs(args.epochs)
        .with_batch_size(args.batch_size)
        .with_lr(args.lr)
        .with_seed(args.seed);

    if args.gpu {
        run::<Autodiff<Wgpu>>(&model_config, &config, &args.artifact_dir);
    } else {
        run::<Autodiff<NdArray>>(&model_config, &config, &args.artifact_dir);
    }
}

fn run<B: AutodiffBackend>(
    model_config: &VaeConfig,
    config: &TrainingConfig,
    artifact_dir: &std::path::Path,
) {
    let device = B::Device::default();
    match fit::<B>(model_config, config, artifact_dir, &device) {
        Ok(summary) => {
            eprintln!(
                "  artifacts: {} ({} sample grids)",
                artifact_dir.display(),
                summary.epochs_run,
            );
        }
        Err(msg) => {
            eprintln!("error: {}", msg);
            process::exit(1);
        }
    }
}
