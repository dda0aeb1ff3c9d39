//! Forward-pass latency for the default model layout.
//!
//! Measures each stage on the CPU backend:
//! 1. Encoder (posterior parameters)
//! 2. Decoder (pixel logits)
//! 3. Full stochastic pass (encode, reparameterize, decode)

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use burn::backend::NdArray;
use burn::prelude::*;
use burn::tensor::Distribution;

use mirage::model::vae::VaeConfig;

type B = NdArray;

const BATCH: usize = 64;

fn bench_forward(c: &mut Criterion) {
    let device = Default::default();
    let config = VaeConfig::new();
    let vae = config.init::<B>(&device);

    let images = Tensor::<B, 2>::random(
        [BATCH, config.d_input],
        Distribution::Uniform(0.0, 1.0),
        &device,
    );
    let latents = Tensor::<B, 2>::random(
        [BATCH, config.d_latent],
        Distribution::Normal(0.0, 1.0),
        &device,
    );

    c.bench_function("encoder", |b| {
        b.iter(|| {
            let (mu, logvar) = vae.encode(black_box(images.clone()));
            black_box((mu, logvar))
        })
    });

    c.bench_function("decoder", |b| {
        b.iter(|| black_box(vae.decode(black_box(latents.clone()))))
    });

    c.bench_function("full_forward", |b| {
        b.iter(|| black_box(vae.forward(black_box(images.clone()))))
    });
}

criterion_group!(benches, bench_forward);
criterion_main!(benches);
