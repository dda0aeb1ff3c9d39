//! The evidence lower bound as a minimization target.
//!
//! `loss = recon + beta·kl` where
//!
//! - `recon` is binary cross-entropy computed from logits, summed over the
//!   pixels of each image and averaged over the batch;
//! - `kl` is the analytic divergence between the diagonal Gaussian
//!   posterior and the unit Gaussian prior, summed over latent dimensions
//!   and averaged over the batch.
//!
//! The reconstruction term uses the stable formulation
//! `max(x, 0) − x·t + log(1 + exp(−|x|))` rather than sigmoid-then-log.

use burn::prelude::*;

/// The three scalar terms of one loss evaluation.
#[derive(Debug)]
pub struct ElboOutput<B: Backend> {
    /// Total minimization target: `recon + beta·kl`.
    pub loss: Tensor<B, 1>,
    /// Reconstruction term.
    pub recon: Tensor<B, 1>,
    /// KL divergence term (unweighted).
    pub kl: Tensor<B, 1>,
}

/// Bernoulli reconstruction loss from logits.
///
/// - `logits`, `targets`: `[batch, pixels]`, targets in {0, 1}
///
/// Returns a scalar: per-image pixel sum, averaged over the batch.
pub fn bernoulli_recon_loss<B: Backend>(
    logits: Tensor<B, 2>,
    targets: Tensor<B, 2>,
) -> Tensor<B, 1> {
    let neg_abs = logits.clone().abs().neg();
    let per_pixel =
        logits.clone().clamp_min(0.0) - logits * targets + neg_abs.exp().log1p();
    per_pixel.sum_dim(1).mean()
}

/// Analytic KL(q(z|x) ‖ N(0, I)) for a diagonal Gaussian posterior.
///
/// - `mu`, `logvar`: `[batch, d_latent]`
///
/// Returns a scalar: per-sample latent sum, averaged over the batch.
pub fn gaussian_kl<B: Backend>(mu: Tensor<B, 2>, logvar: Tensor<B, 2>) -> Tensor<B, 1> {
    let per_dim =
        (mu.powf_scalar(2.0) + logvar.clone().exp() - logvar - 1.0) * 0.5;
    per_dim.sum_dim(1).mean()
}

/// Combine both terms into the training target.
pub fn elbo_loss<B: Backend>(
    logits: Tensor<B, 2>,
    targets: Tensor<B, 2>,
    mu: Tensor<B, 2>,
    logvar: Tensor<B, 2>,
    beta: f64,
) -> ElboOutput<B> {
    let recon = bernoulli_recon_loss(logits, targets);
    let kl = gaussian_kl(mu, logvar);
    let loss = recon.clone() + kl.clone() * beta;
    ElboOutput { loss, recon, kl }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type B = NdArray;

    fn scalar(t: Tensor<B, 1>) -> f32 {
        t.into_scalar().elem::<f32>()
    }

    #[test]
    fn kl_of_standard_normal_posterior_is_zero() {
        let device = Default::default();
        let mu = Tensor::<B, 2>::zeros([4, 8], &device);
        let logvar = Tensor::<B, 2>::zeros([4, 8], &device);

        let kl = scalar(gaussian_kl(mu, logvar));
        assert!(kl.abs() < 1e-6, "expected zero KL, got {}", kl);
    }

    #[test]
    fn kl_positive_for_shifted_posterior() {
        let device = Default::default();
        let mu = Tensor::<B, 2>::ones([4, 8], &device);
        let logvar = Tensor::<B, 2>::zeros([4, 8], &device);

        // Per dim: 0.5·mu² = 0.5, times 8 dims = 4.0
        let kl = scalar(gaussian_kl(mu, logvar));
        assert!((kl - 4.0).abs() < 1e-5, "expected 4.0, got {}", kl);
    }

    #[test]
    fn recon_loss_non_negative_and_small_when_confident() {
        let device = Default::default();

        // Strongly positive logits against all-ones targets
        let logits = Tensor::<B, 2>::ones([2, 4], &device) * 20.0;
        let targets = Tensor::<B, 2>::ones([2, 4], &device);

        let loss = scalar(bernoulli_recon_loss(logits, targets));
        assert!(loss >= 0.0);
        assert!(loss < 1e-3, "confident match should cost ~0, got {}", loss);
    }

    #[test]
    fn recon_loss_matches_closed_form_at_zero_logits() {
        let device = Default::default();

        // At logit 0 every pixel costs ln 2 regardless of target
        let logits = Tensor::<B, 2>::zeros([3, 10], &device);
        let targets = Tensor::<B, 2>::ones([3, 10], &device);

        let loss = scalar(bernoulli_recon_loss(logits, targets));
        let expected = 10.0 * std::f32::consts::LN_2;
        assert!((loss - expected).abs() < 1e-4, "got {}", loss);
    }

    #[test]
    fn elbo_sums_terms_with_beta() {
        let device = Default::default();
        let logits = Tensor::<B, 2>::zeros([2, 4], &device);
        let targets = Tensor::<B, 2>::zeros([2, 4], &device);
        let mu = Tensor::<B, 2>::ones([2, 3], &device);
        let logvar = Tensor::<B, 2>::zeros([2, 3], &device);

        let out = elbo_loss(logits, targets, mu, logvar, 2.0);
        let total = scalar(out.loss);
        let expected = scalar(out.recon) + 2.0 * scalar(out.kl);
        assert!((total - expected).abs() < 1e-5);
    }
}
