//! Variational autoencoder for binarized MNIST, built on burn.
//!
//! A stochastic encoder maps a 784-pixel digit to a Gaussian posterior
//! q(z|x); the decoder maps latent vectors back to pixel logits. Training
//! maximizes the evidence lower bound: a Bernoulli reconstruction term plus
//! a KL penalty pulling the posterior toward the unit Gaussian prior.
//! Sampling that prior and decoding yields novel digits.
//!
//! # Public API
//!
//! ```ignore
//! use mirage::model::vae::VaeConfig;
//! use mirage::training::run::{fit, TrainingConfig};
//!
//! let summary = fit::<B>(&VaeConfig::new(), &TrainingConfig::new(), dir, &device)?;
//! ```

pub mod checkpoint;
pub mod data;
pub mod model;
pub mod sample;
pub mod training;

// Re-exports — the types most callers touch
pub use model::vae::{Vae, VaeConfig};
pub use training::run::TrainingConfig;
