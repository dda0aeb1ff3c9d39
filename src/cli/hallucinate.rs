use std::path::PathBuf;
use std::process;

use clap::Args;

use burn::backend::{NdArray, Wgpu};
use burn::prelude::*;

use mirage::sample;

#[derive(Args)]
pub struct HallucinateArgs {
    /// Artifact directory holding the trained model
    #[arg(long, default_value = "artifacts")]
    pub artifact_dir: PathBuf,
    /// Number of digits to hallucinate
    #[arg(short, long, default_value = "64")]
    pub count: usize,
    /// Grid columns
    #[arg(long, default_value = "8")]
    pub cols: usize,
    /// Output PNG path
    #[arg(short, long, default_value = "hallucinated.png")]
    pub output: PathBuf,
    /// Use the latest checkpoint instead of the best one
    #[arg(long)]
    pub latest: bool,
    /// Use GPU acceleration (default: CPU)
    #[arg(long)]
    pub gpu: bool,
}

pub fn cmd_hallucinate(args: HallucinateArgs) {
    if args.gpu {
        run::<Wgpu>(&args);
    } else {
        run::<NdArray>(&args);
    }
}

fn run<B: Backend>(args: &HallucinateArgs) {
    let device = B::Device::default();
    let config = super::resolve_model_config(&args.artifact_dir);
    let tag = super::resolve_tag(args.latest);
    let model = super::load_model::<B>(&config, &args.artifact_dir, tag, &device);

    let probs = sample::hallucinate(&model, args.count, config.d_latent, &device);
    if let Err(msg) = sample::save_grid_png(probs, args.cols, &args.output) {
        eprintln!("error: {}", msg);
        process::exit(1);
    }

    eprintln!(
        "Hallucinated {} digits from the {} checkpoint → {}",
        args.count,
        tag,
        args.output.display(),
    );
}
