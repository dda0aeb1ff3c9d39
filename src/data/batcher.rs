//! Batcher: MNIST items → binarized `[batch, 784]` tensors.

use burn::data::dataloader::batcher::Batcher;
use burn::data::dataset::vision::MnistItem;
use burn::prelude::*;

/// Image side length in pixels.
pub const SIDE: usize = 28;
/// Flattened image length.
pub const PIXELS: usize = SIDE * SIDE;

/// Threshold separating ink from background after 0–255 → [0, 1] scaling.
const BINARIZE_THRESHOLD: f32 = 0.5;

/// A batch of binarized digit images.
#[derive(Clone, Debug)]
pub struct DigitBatch<B: Backend> {
    /// Pixel values, each exactly 0.0 or 1.0. Shape `[batch, 784]`.
    pub images: Tensor<B, 2>,
}

/// Flattens 28×28 MNIST images row-major, scales 0–255 to [0, 1], and
/// binarizes at 0.5 so the Bernoulli reconstruction loss sees hard targets.
#[derive(Clone, Default)]
pub struct DigitBatcher;

impl DigitBatcher {
    pub fn new() -> Self {
        Self
    }
}

/// Binarize a single raw pixel (0–255 range as stored by the dataset).
pub fn binarize_pixel(raw: f32) -> f32 {
    if raw / 255.0 > BINARIZE_THRESHOLD {
        1.0
    } else {
        0.0
    }
}

impl<B: Backend> Batcher<B, MnistItem, DigitBatch<B>> for DigitBatcher {
    fn batch(&self, items: Vec<MnistItem>, device: &B::Device) -> DigitBatch<B> {
        let batch_size = items.len();

        let pixels: Vec<f32> = items
            .iter()
            .flat_map(|item| {
                item.image
                    .iter()
                    .flat_map(|row| row.iter())
                    .map(|&p| binarize_pixel(p))
            })
            .collect();

        let images = Tensor::from_data(TensorData::new(pixels, [batch_size, PIXELS]), device);

        DigitBatch { images }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type B = NdArray;

    fn item_with_fill(fill: f32) -> MnistItem {
        MnistItem {
            image: [[fill; SIDE]; SIDE],
            label: 0,
        }
    }

    #[test]
    fn batch_shape_and_binarization() {
        let device = Default::default();
        let batcher = DigitBatcher::new();

        // One all-ink image, one all-background image
        let items = vec![item_with_fill(255.0), item_with_fill(10.0)];
        let batch: DigitBatch<B> = batcher.batch(items, &device);

        assert_eq!(batch.images.dims(), [2, PIXELS]);

        let data = batch.images.into_data().to_vec::<f32>().unwrap();
        assert!(data[..PIXELS].iter().all(|&p| p == 1.0));
        assert!(data[PIXELS..].iter().all(|&p| p == 0.0));
    }

    #[test]
    fn binarize_pixel_threshold() {
        assert_eq!(binarize_pixel(0.0), 0.0);
        assert_eq!(binarize_pixel(127.0), 0.0);
        assert_eq!(binarize_pixel(128.0), 1.0);
        assert_eq!(binarize_pixel(255.0), 1.0);
    }
}
