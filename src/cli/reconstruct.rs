use std::path::PathBuf;
use std::process;

use clap::Args;

use burn::backend::{NdArray, Wgpu};
use burn::data::dataloader::batcher::Batcher;
use burn::data::dataset::vision::MnistDataset;
use burn::data::dataset::Dataset;
use burn::prelude::*;

use mirage::data::{DigitBatch, DigitBatcher};
use mirage::sample;

#[derive(Args)]
pub struct ReconstructArgs {
    /// Artifact directory holding the trained model
    #[arg(long, default_value = "artifacts")]
    pub artifact_dir: PathBuf,
    /// Number of test digits to round-trip
    #[arg(short, long, default_value = "32")]
    pub count: usize,
    /// Grid columns (originals and reconstructions alternate row-wise)
    #[arg(long, default_value = "8")]
    pub cols: usize,
    /// Output PNG path
    #[arg(short, long, default_value = "reconstructed.png")]
    pub output: PathBuf,
    /// Use the latest checkpoint instead of the best one
    #[arg(long)]
    pub latest: bool,
    /// Use GPU acceleration (default: CPU)
    #[arg(long)]
    pub gpu: bool,
}

pub fn cmd_reconstruct(args: ReconstructArgs) {
    if args.gpu {
        run::<Wgpu>(&args);
    } else {
        run::<NdArray>(&args);
    }
}

fn run<B: Backend>(args: &ReconstructArgs) {
    if args.cols == 0 {
        eprintln!("error: --cols must be at least 1");
        process::exit(1);
    }

    let device = B::Device::default();
    let config = super::resolve_model_config(&args.artifact_dir);
    let tag = super::resolve_tag(args.latest);
    let model = super::load_model::<B>(&config, &args.artifact_dir, tag, &device);

    let dataset = MnistDataset::test();
    let items: Vec<_> = (0..args.count).filter_map(|i| dataset.get(i)).collect();
    if items.is_empty() {
        eprintln!("error: test split yielded no items");
        process::exit(1);
    }

    let batch: DigitBatch<B> = DigitBatcher::new().batch(items, &device);
    let recons = sample::reconstruct(&model, batch.images.clone());
    let mixed = sample::interleave_rows(batch.images, recons, args.cols);

    if let Err(msg) = sample::save_grid_png(mixed, args.cols, &args.output) {
        eprintln!("error: {}", msg);
        process::exit(1);
    }

    eprintln!(
        "Reconstructed {} test digits with the {} checkpoint → {}",
        args.count,
        tag,
        args.output.display(),
    );
}
