//! Dataset access and batching.
//!
//! MNIST itself comes from burn's vision dataset; this module only flattens,
//! normalizes, and binarizes items into `[batch, 784]` tensors.

pub mod batcher;

pub use batcher::{DigitBatch, DigitBatcher, PIXELS, SIDE};
