//! Composite VAE: stochastic encoder + decoder.
//!
//! Wraps the encoder and decoder into a single `Module` that can be
//! saved/loaded as a unit. The reparameterization trick lives here: it is
//! the only stochastic step on the training path, and it is written as
//! `z = mu + exp(0.5·logvar)·eps` so gradients flow through `mu` and
//! `logvar` while the noise stays parameter-free.

use burn::config::Config;
use burn::module::Module;
use burn::prelude::*;
use burn::tensor::activation::sigmoid;
use burn::tensor::Distribution;

use super::decoder::{Decoder, DecoderConfig};
use super::encoder::{Encoder, EncoderConfig};
use crate::data::PIXELS;

/// Configuration for the composite VAE.
#[derive(Config, Debug)]
pub struct VaeConfig {
    /// Flattened image dimension.
    #[config(default = 784)]
    pub d_input: usize,
    /// Hidden trunk width (shared by encoder and decoder).
    #[config(default = 512)]
    pub d_hidden: usize,
    /// Latent dimension.
    #[config(default = 16)]
    pub d_latent: usize,
    /// Weight on the KL term of the loss.
    #[config(default = 1.0)]
    pub beta: f64,
}

/// Composite model: encoder q(z|x) + decoder p(x|z).
#[derive(Module, Debug)]
pub struct Vae<B: Backend> {
    pub encoder: Encoder<B>,
    pub decoder: Decoder<B>,
}

impl VaeConfig {
    /// Initialize the composite model.
    pub fn init<B: Backend>(&self, device: &B::Device) -> Vae<B> {
        let encoder = EncoderConfig {
            d_input: self.d_input,
            d_hidden: self.d_hidden,
            d_latent: self.d_latent,
        }
        .init(device);

        let decoder = DecoderConfig {
            d_latent: self.d_latent,
            d_hidden: self.d_hidden,
            d_output: self.d_input,
        }
        .init(device);

        Vae { encoder, decoder }
    }

    /// Whether this config matches the flattened MNIST shape.
    pub fn matches_mnist(&self) -> bool {
        self.d_input == PIXELS
    }

    /// Parameter count estimate.
    pub fn param_estimate(&self) -> usize {
        let (d, h, z) = (self.d_input, self.d_hidden, self.d_latent);
        // Encoder: trunk(d*h + h) + two heads(h*z + z each)
        let enc = d * h + h + 2 * (h * z + z);
        // Decoder: trunk(z*h + h) + logits head(h*d + d)
        let dec = z * h + h + h * d + d;
        enc + dec
    }
}

impl<B: Backend> Vae<B> {
    /// Posterior parameters for a batch of images.
    pub fn encode(&self, images: Tensor<B, 2>) -> (Tensor<B, 2>, Tensor<B, 2>) {
        self.encoder.forward(images)
    }

    /// Sample z = mu + exp(0.5·logvar)·eps with eps ~ N(0, I).
    pub fn reparameterize(&self, mu: Tensor<B, 2>, logvar: Tensor<B, 2>) -> Tensor<B, 2> {
        let std = (logvar * 0.5).exp();
        let eps = mu.random_like(Distribution::Normal(0.0, 1.0));
        mu + std * eps
    }

    /// Pixel logits for a batch of latent vectors.
    pub fn decode(&self, latents: Tensor<B, 2>) -> Tensor<B, 2> {
        self.decoder.forward(latents)
    }

    /// Pixel probabilities (sigmoid of the decoder logits).
    pub fn decode_probs(&self, latents: Tensor<B, 2>) -> Tensor<B, 2> {
        sigmoid(self.decode(latents))
    }

    /// Full stochastic pass: encode, sample, decode.
    ///
    /// Returns `(mu, logvar, logits)`.
    pub fn forward(&self, images: Tensor<B, 2>) -> (Tensor<B, 2>, Tensor<B, 2>, Tensor<B, 2>) {
        let (mu, logvar) = self.encode(images);
        let z = self.reparameterize(mu.clone(), logvar.clone());
        (mu, logvar, self.decode(z))
    }
}
