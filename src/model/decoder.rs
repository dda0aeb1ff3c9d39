//! Decoder — generative network p(x|z) in burn.
//!
//! Mirror of the encoder trunk: latent → hidden → per-pixel Bernoulli
//! logits. The sigmoid is deliberately left out of the module; the loss
//! works on logits and visualization applies it explicitly.

use burn::config::Config;
use burn::module::Module;
use burn::nn::{Linear, LinearConfig};
use burn::prelude::*;
use burn::tensor::activation::relu;

/// Decoder configuration.
#[derive(Config, Debug)]
pub struct DecoderConfig {
    /// Latent dimension.
    pub d_latent: usize,
    /// Hidden trunk width.
    pub d_hidden: usize,
    /// Flattened output dimension.
    pub d_output: usize,
}

/// Decoder: latent → hidden trunk → pixel logits.
#[derive(Module, Debug)]
pub struct Decoder<B: Backend> {
    trunk: Linear<B>,
    logits_head: Linear<B>,
}

impl DecoderConfig {
    /// Initialize a decoder.
    pub fn init<B: Backend>(&self, device: &B::Device) -> Decoder<B> {
        Decoder {
            trunk: LinearConfig::new(self.d_latent, self.d_hidden).init(device),
            logits_head: LinearConfig::new(self.d_hidden, self.d_output).init(device),
        }
    }
}

impl<B: Backend> Decoder<B> {
    /// Map latent vectors to pixel logits.
    ///
    /// - `latents`: `[batch, d_latent]`
    ///
    /// Returns `[batch, d_output]`.
    pub fn forward(&self, latents: Tensor<B, 2>) -> Tensor<B, 2> {
        let hidden = relu(self.trunk.forward(latents));
        self.logits_head.forward(hidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type B = NdArray;

    #[test]
    fn decoder_forward_shapes() {
        let device = Default::default();
        let config = DecoderConfig {
            d_latent: 4,
            d_hidden: 8,
            d_output: 16,
        };
        let decoder = config.init::<B>(&device);

        let latents = Tensor::<B, 2>::zeros([5, 4], &device);
        let logits = decoder.forward(latents);

        assert_eq!(logits.dims(), [5, 16]);
    }
}
