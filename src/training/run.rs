//! Epoch loop and end-to-end training driver.
//!
//! Manual optimization in the burn idiom: forward, backward,
//! `GradientsParams`, `Optimizer::step`. The driver adds cosine learning
//! rate annealing, per-epoch validation on the test split, sample grids,
//! tagged checkpoints, and early stopping.

use std::path::Path;
use std::sync::Arc;

use burn::config::Config;
use burn::data::dataloader::{DataLoader, DataLoaderBuilder};
use burn::data::dataset::vision::MnistDataset;
use burn::grad_clipping::GradientClippingConfig;
use burn::module::AutodiffModule;
use burn::optim::{AdamConfig, GradientsParams, Optimizer};
use burn::prelude::*;
use burn::tensor::backend::AutodiffBackend;

use crate::checkpoint::{save_checkpoint, CheckpointTag};
use crate::data::{DigitBatch, DigitBatcher};
use crate::model::vae::{Vae, VaeConfig};
use crate::sample::{hallucinate, save_grid_png};
use crate::training::loss::elbo_loss;

/// Training configuration.
#[derive(Config, Debug)]
pub struct TrainingConfig {
    /// Maximum epochs.
    #[config(default = 20)]
    pub num_epochs: usize,
    /// Mini-batch size.
    #[config(default = 128)]
    pub batch_size: usize,
    /// Dataloader worker threads.
    #[config(default = 4)]
    pub num_workers: usize,
    /// Backend RNG seed (also shuffles the dataloaders).
    #[config(default = 42)]
    pub seed: u64,
    /// Initial learning rate.
    #[config(default = 1e-3)]
    pub lr: f64,
    /// Minimum learning rate (cosine decay target).
    #[config(default = 1e-5)]
    pub lr_min: f64,
    /// Gradient clipping norm.
    #[config(default = 1.0)]
    pub grad_clip: f32,
    /// Early stopping patience (epochs without validation improvement).
    #[config(default = 5)]
    pub patience: usize,
}

/// Cosine annealing learning rate: lr_min + 0.5*(lr - lr_min)*(1 + cos(pi*t/T))
pub fn cosine_lr(config: &TrainingConfig, epoch: usize, total_epochs: usize) -> f64 {
    if total_epochs <= 1 {
        return config.lr;
    }
    let t = epoch as f64 / total_epochs as f64;
    config.lr_min + 0.5 * (config.lr - config.lr_min) * (1.0 + (std::f64::consts::PI * t).cos())
}

/// Averaged loss terms over one pass of the data.
#[derive(Debug, Clone, Copy)]
pub struct EpochStats {
    /// Average total loss per batch.
    pub loss: f32,
    /// Average reconstruction term per batch.
    pub recon: f32,
    /// Average KL term per batch.
    pub kl: f32,
    /// Number of batches processed.
    pub batches: usize,
}

/// Create an Adam optimizer with norm gradient clipping.
pub fn create_optimizer<B: AutodiffBackend>(config: &TrainingConfig) -> impl Optimizer<Vae<B>, B> {
    AdamConfig::new()
        .with_grad_clipping(Some(GradientClippingConfig::Norm(config.grad_clip)))
        .init()
}

/// Train one epoch on the given batches.
///
/// Returns the model with updated weights and the averaged loss terms.
pub fn train_epoch<B: AutodiffBackend>(
    model: Vae<B>,
    batches: impl IntoIterator<Item = DigitBatch<B>>,
    optimizer: &mut impl Optimizer<Vae<B>, B>,
    lr: f64,
    beta: f64,
) -> (Vae<B>, EpochStats) {
    let mut model = model;
    let (mut loss_sum, mut recon_sum, mut kl_sum) = (0.0f32, 0.0f32, 0.0f32);
    let mut count = 0usize;

    for batch in batches {
        let (mu, logvar, logits) = model.forward(batch.images.clone());
        let out = elbo_loss(logits, batch.images, mu, logvar, beta);

        loss_sum += out.loss.clone().into_scalar().elem::<f32>();
        recon_sum += out.recon.into_scalar().elem::<f32>();
        kl_sum += out.kl.into_scalar().elem::<f32>();
        count += 1;

        let grads = out.loss.backward();
        let grads = GradientsParams::from_grads(grads, &model);
        model = optimizer.step(lr, model, grads);
    }

    (model, average(loss_sum, recon_sum, kl_sum, count))
}

/// Evaluate the loss terms on the given batches without touching weights.
pub fn valid_epoch<B: Backend>(
    model: &Vae<B>,
    batches: impl IntoIterator<Item = DigitBatch<B>>,
    beta: f64,
) -> EpochStats {
    let (mut loss_sum, mut recon_sum, mut kl_sum) = (0.0f32, 0.0f32, 0.0f32);
    let mut count = 0usize;

    for batch in batches {
        let (mu, logvar, logits) = model.forward(batch.images.clone());
        let out = elbo_loss(logits, batch.images, mu, logvar, beta);

        loss_sum += out.loss.into_scalar().elem::<f32>();
        recon_sum += out.recon.into_scalar().elem::<f32>();
        kl_sum += out.kl.into_scalar().elem::<f32>();
        count += 1;
    }

    average(loss_sum, recon_sum, kl_sum, count)
}

fn average(loss: f32, recon: f32, kl: f32, count: usize) -> EpochStats {
    let n = count.max(1) as f32;
    EpochStats {
        loss: loss / n,
        recon: recon / n,
        kl: kl / n,
        batches: count,
    }
}

/// One row of the training history.
#[derive(Debug, Clone, Copy)]
pub struct EpochRecord {
    pub epoch: usize,
    pub lr: f64,
    pub train: EpochStats,
    pub valid: EpochStats,
}

/// Outcome of a full training run.
#[derive(Debug)]
pub struct FitSummary {
    /// Epochs actually run (early stopping may cut this short).
    pub epochs_run: usize,
    /// Epoch with the lowest validation loss.
    pub best_epoch: usize,
    /// That lowest validation loss.
    pub best_valid_loss: f32,
    /// Per-epoch history.
    pub history: Vec<EpochRecord>,
}

/// Sample grid width and count written after each epoch.
const EPOCH_SAMPLES: usize = 64;
const EPOCH_SAMPLE_COLS: usize = 8;

/// Train a VAE on binarized MNIST end to end.
///
/// Saves config snapshots, per-epoch sample grids, `latest`/`best`
/// checkpoints, and a `metrics.json` history into `artifacts`.
pub fn fit<B: AutodiffBackend>(
    model_config: &VaeConfig,
    config: &TrainingConfig,
    artifacts: &Path,
    device: &B::Device,
) -> Result<FitSummary, String> {
    std::fs::create_dir_all(artifacts)
        .map_err(|e| format!("mkdir {}: {}", artifacts.display(), e))?;
    model_config
        .save(artifacts.join("model.json"))
        .map_err(|e| format!("save model config: {}", e))?;
    config
        .save(artifacts.join("train.json"))
        .map_err(|e| format!("save training config: {}", e))?;

    B::seed(device, config.seed);

    let mut model = model_config.init::<B>(device);
    let mut optimizer = create_optimizer::<B>(config);

    let batcher = DigitBatcher::new();
    let dataloader_train: Arc<dyn DataLoader<B, DigitBatch<B>>> =
        DataLoaderBuilder::new(batcher.clone())
            .batch_size(config.batch_size)
            .shuffle(config.seed)
            .num_workers(config.num_workers)
            .build(MnistDataset::train());
    let dataloader_valid: Arc<dyn DataLoader<B::InnerBackend, DigitBatch<B::InnerBackend>>> =
        DataLoaderBuilder::new(batcher)
            .batch_size(config.batch_size)
            .shuffle(config.seed)
            .num_workers(config.num_workers)
            .build(MnistDataset::test());

    eprintln!(
        "Training VAE ({} params) for up to {} epochs, batch size {}",
        model_config.param_estimate(),
        config.num_epochs,
        config.batch_size,
    );

    let mut history = Vec::with_capacity(config.num_epochs);
    let mut best_valid_loss = f32::INFINITY;
    let mut best_epoch = 0usize;
    let mut stale_epochs = 0usize;
    let start = std::time::Instant::now();

    for epoch in 1..=config.num_epochs {
        let lr = cosine_lr(config, epoch - 1, config.num_epochs);

        let (trained, train_stats) = train_epoch(
            model,
            dataloader_train.iter(),
            &mut optimizer,
            lr,
            model_config.beta,
        );
        model = trained;

        let valid_model = model.valid();
        let valid_stats = valid_epoch(&valid_model, dataloader_valid.iter(), model_config.beta);

        eprintln!(
            "[{}/{}] lr {:.2e}  train loss {:.2} (recon {:.2}, kl {:.2})  valid loss {:.2}",
            epoch, config.num_epochs, lr, train_stats.loss, train_stats.recon, train_stats.kl,
            valid_stats.loss,
        );

        // Hallucinate a grid from the prior with the weights as of this epoch
        let sample_device = valid_model.devices().first().cloned().unwrap_or_default();
        let probs = hallucinate(
            &valid_model,
            EPOCH_SAMPLES,
            model_config.d_latent,
            &sample_device,
        );
        let grid_path = artifacts.join(format!("samples/epoch_{:03}.png", epoch));
        save_grid_png(probs, EPOCH_SAMPLE_COLS, &grid_path)?;

        save_checkpoint::<B, _>(&model, artifacts, CheckpointTag::Latest)?;

        if valid_stats.loss < best_valid_loss {
            best_valid_loss = valid_stats.loss;
            best_epoch = epoch;
            stale_epochs = 0;
            save_checkpoint::<B, _>(&model, artifacts, CheckpointTag::Best)?;
        } else {
            stale_epochs += 1;
        }

        history.push(EpochRecord {
            epoch,
            lr,
            train: train_stats,
            valid: valid_stats,
        });

        if stale_epochs >= config.patience {
            eprintln!(
                "Early stop: no validation improvement for {} epochs",
                config.patience
            );
            break;
        }
    }

    let summary = FitSummary {
        epochs_run: history.len(),
        best_epoch,
        best_valid_loss,
        history,
    };
    write_metrics(&summary, &artifacts.join("metrics.json"))?;

    eprintln!(
        "Done: {} epochs in {:.1}s, best valid loss {:.2} at epoch {}",
        summary.epochs_run,
        start.elapsed().as_secs_f64(),
        summary.best_valid_loss,
        summary.best_epoch,
    );

    Ok(summary)
}

impl FitSummary {
    pub fn to_json(&self) -> String {
        let mut out = String::new();
        out.push_str("{\n  \"epochs\": [\n");
        for (i, r) in self.history.iter().enumerate() {
            out.push_str(&format!(
                "    {{\"epoch\": {}, \"lr\": {:e}, \
                 \"train_loss\": {}, \"train_recon\": {}, \"train_kl\": {}, \
                 \"valid_loss\": {}, \"valid_recon\": {}, \"valid_kl\": {}}}",
                r.epoch,
                r.lr,
                r.train.loss,
                r.train.recon,
                r.train.kl,
                r.valid.loss,
                r.valid.recon,
                r.valid.kl,
            ));
            if i + 1 < self.history.len() {
                out.push(',');
            }
            out.push('\n');
        }
        out.push_str("  ],\n");
        out.push_str(&format!("  \"best_epoch\": {},\n", self.best_epoch));
        out.push_str(&format!("  \"best_valid_loss\": {}\n", self.best_valid_loss));
        out.push_str("}\n");
        out
    }
}

/// Save the training history to a JSON file.
fn write_metrics(summary: &FitSummary, path: &Path) -> Result<(), String> {
    std::fs::write(path, summary.to_json())
        .map_err(|e| format!("cannot write '{}': {}", path.display(), e))
}
