//! Model definitions: stochastic encoder, decoder, and the composite VAE.

pub mod decoder;
pub mod encoder;
pub mod vae;
