//! Stochastic encoder — amortized inference network q(z|x) in burn.
//!
//! A single-hidden-layer MLP trunk with two parallel linear heads producing
//! the mean and log-variance of a diagonal Gaussian posterior.

use burn::config::Config;
use burn::module::Module;
use burn::nn::{Linear, LinearConfig};
use burn::prelude::*;
use burn::tensor::activation::relu;

/// Encoder configuration.
#[derive(Config, Debug)]
pub struct EncoderConfig {
    /// Flattened input dimension.
    pub d_input: usize,
    /// Hidden trunk width.
    pub d_hidden: usize,
    /// Latent dimension.
    pub d_latent: usize,
}

/// Encoder: input → hidden trunk → (mu, logvar) heads.
#[derive(Module, Debug)]
pub struct Encoder<B: Backend> {
    trunk: Linear<B>,
    mu_head: Linear<B>,
    logvar_head: Linear<B>,
}

impl EncoderConfig {
    /// Initialize an encoder.
    pub fn init<B: Backend>(&self, device: &B::Device) -> Encoder<B> {
        Encoder {
            trunk: LinearConfig::new(self.d_input, self.d_hidden).init(device),
            mu_head: LinearConfig::new(self.d_hidden, self.d_latent).init(device),
            logvar_head: LinearConfig::new(self.d_hidden, self.d_latent).init(device),
        }
    }
}

impl<B: Backend> Encoder<B> {
    /// Map a batch of images to posterior parameters.
    ///
    /// - `images`: `[batch, d_input]`
    ///
    /// Returns `(mu, logvar)`, both `[batch, d_latent]`.
    pub fn forward(&self, images: Tensor<B, 2>) -> (Tensor<B, 2>, Tensor<B, 2>) {
        let hidden = relu(self.trunk.forward(images));
        let mu = self.mu_head.forward(hidden.clone());
        let logvar = self.logvar_head.forward(hidden);
        (mu, logvar)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type B = NdArray;

    #[test]
    fn encoder_forward_shapes() {
        let device = Default::default();
        let config = EncoderConfig {
            d_input: 16,
            d_hidden: 8,
            d_latent: 4,
        };
        let encoder = config.init::<B>(&device);

        let images = Tensor::<B, 2>::zeros([3, 16], &device);
        let (mu, logvar) = encoder.forward(images);

        assert_eq!(mu.dims(), [3, 4]);
        assert_eq!(logvar.dims(), [3, 4]);
    }
}
