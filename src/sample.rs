//! Hallucination and reconstruction.
//!
//! Hallucination draws latent vectors from the unit Gaussian prior and
//! decodes them into digit images the training set never contained.
//! Reconstruction round-trips real digits through the posterior mean.
//! Both produce `[n, 784]` probability tensors that tile into PNG grids.

use std::path::Path;

use burn::prelude::*;
use burn::tensor::Distribution;
use image::GrayImage;

use crate::data::{PIXELS, SIDE};
use crate::model::vae::Vae;

/// Decode `count` latent samples from the prior into pixel probabilities.
///
/// Returns `[count, 784]`, values in [0, 1].
pub fn hallucinate<B: Backend>(
    model: &Vae<B>,
    count: usize,
    d_latent: usize,
    device: &B::Device,
) -> Tensor<B, 2> {
    let z = Tensor::random([count, d_latent], Distribution::Normal(0.0, 1.0), device);
    model.decode_probs(z)
}

/// Reconstruct images through the posterior mean (no sampling).
pub fn reconstruct<B: Backend>(model: &Vae<B>, images: Tensor<B, 2>) -> Tensor<B, 2> {
    let (mu, _logvar) = model.encode(images);
    model.decode_probs(mu)
}

/// Tile `[n, 784]` probabilities into one grayscale image.
///
/// Cells are 28×28, laid out row-major with `cols` per row. When `n` is
/// not a multiple of `cols` the last row is padded with black cells.
pub fn image_grid<B: Backend>(probs: Tensor<B, 2>, cols: usize) -> Result<GrayImage, String> {
    let [n, pixels] = probs.dims();
    if pixels != PIXELS {
        return Err(format!("expected {} pixels per image, got {}", PIXELS, pixels));
    }
    if n == 0 || cols == 0 {
        return Err("empty grid".into());
    }

    let rows = n.div_ceil(cols);
    let values = probs
        .into_data()
        .to_vec::<f32>()
        .map_err(|e| format!("tensor readback: {:?}", e))?;

    let mut grid = GrayImage::new((cols * SIDE) as u32, (rows * SIDE) as u32);
    for (i, cell) in values.chunks_exact(PIXELS).enumerate() {
        let (row, col) = (i / cols, i % cols);
        for (j, &p) in cell.iter().enumerate() {
            let x = (col * SIDE + j % SIDE) as u32;
            let y = (row * SIDE + j / SIDE) as u32;
            let v = (p.clamp(0.0, 1.0) * 255.0) as u8;
            grid.put_pixel(x, y, image::Luma([v]));
        }
    }
    Ok(grid)
}

/// Tile and write a probability batch as a PNG.
pub fn save_grid_png<B: Backend>(
    probs: Tensor<B, 2>,
    cols: usize,
    path: &Path,
) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| format!("mkdir {}: {}", parent.display(), e))?;
    }
    let grid = image_grid(probs, cols)?;
    grid.save(path)
        .map_err(|e| format!("write {}: {}", path.display(), e))
}

/// Interleave originals and reconstructions row by row for side-by-side
/// comparison: row of originals, row of reconstructions, and so on.
///
/// `cols == 0` degrades to one image per row so the walk always advances.
pub fn interleave_rows<B: Backend>(
    originals: Tensor<B, 2>,
    recons: Tensor<B, 2>,
    cols: usize,
) -> Tensor<B, 2> {
    let cols = cols.max(1);
    let n = originals.dims()[0].min(recons.dims()[0]);
    let mut slices = Vec::new();
    let mut start = 0;
    while start < n {
        let end = (start + cols).min(n);
        slices.push(originals.clone().slice([start..end]));
        slices.push(recons.clone().slice([start..end]));
        start = end;
    }
    Tensor::cat(slices, 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::vae::VaeConfig;
    use burn::backend::NdArray;

    type B = NdArray;

    #[test]
    fn hallucinate_shape_and_range() {
        let device = Default::default();
        let config = VaeConfig {
            d_input: PIXELS,
            d_hidden: 8,
            d_latent: 4,
            beta: 1.0,
        };
        let vae = config.init::<B>(&device);

        let probs = hallucinate(&vae, 3, config.d_latent, &device);
        assert_eq!(probs.dims(), [3, PIXELS]);

        let values = probs.into_data().to_vec::<f32>().unwrap();
        assert!(values.iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn grid_dimensions_with_ragged_last_row() {
        let device = Default::default();
        let probs = Tensor::<B, 2>::zeros([5, PIXELS], &device);

        // 5 cells over 3 columns → 2 rows
        let grid = image_grid(probs, 3).unwrap();
        assert_eq!(grid.width(), 3 * SIDE as u32);
        assert_eq!(grid.height(), 2 * SIDE as u32);
    }

    #[test]
    fn grid_rejects_wrong_pixel_count() {
        let device = Default::default();
        let probs = Tensor::<B, 2>::zeros([2, 100], &device);
        assert!(image_grid(probs, 2).is_err());
    }

    #[test]
    fn grid_maps_probability_to_brightness() {
        let device = Default::default();
        let probs = Tensor::<B, 2>::ones([1, PIXELS], &device);

        let grid = image_grid(probs, 1).unwrap();
        assert_eq!(grid.get_pixel(0, 0).0[0], 255);
        assert_eq!(grid.get_pixel(27, 27).0[0], 255);
    }

    #[test]
    fn grid_clamps_out_of_range_probabilities() {
        let device = Default::default();

        // First pixel overshoots, second undershoots, rest sit mid-range
        let mut values = vec![0.5f32; PIXELS];
        values[0] = 1.5;
        values[1] = -0.5;
        let probs =
            Tensor::<B, 2>::from_data(TensorData::new(values, [1, PIXELS]), &device);

        let grid = image_grid(probs, 1).unwrap();
        assert_eq!(grid.get_pixel(0, 0).0[0], 255);
        assert_eq!(grid.get_pixel(1, 0).0[0], 0);
        assert_eq!(grid.get_pixel(2, 0).0[0], 127);
    }

    #[test]
    fn interleave_with_zero_cols_terminates() {
        let device = Default::default();
        let originals = Tensor::<B, 2>::zeros([3, PIXELS], &device);
        let recons = Tensor::<B, 2>::ones([3, PIXELS], &device);

        // Degrades to one image per row instead of looping
        let mixed = interleave_rows(originals, recons, 0);
        assert_eq!(mixed.dims(), [6, PIXELS]);

        let values = mixed.into_data().to_vec::<f32>().unwrap();
        assert_eq!(values[0], 0.0);
        assert_eq!(values[PIXELS], 1.0);
    }

    #[test]
    fn interleave_alternates_rows() {
        let device = Default::default();
        let originals = Tensor::<B, 2>::zeros([4, PIXELS], &device);
        let recons = Tensor::<B, 2>::ones([4, PIXELS], &device);

        let mixed = interleave_rows(originals, recons, 2);
        assert_eq!(mixed.dims(), [8, PIXELS]);

        let values = mixed.into_data().to_vec::<f32>().unwrap();
        // Rows of 2 cells: zeros, ones, zeros, ones
        assert_eq!(values[0], 0.0);
        assert_eq!(values[2 * PIXELS], 1.0);
        assert_eq!(values[4 * PIXELS], 0.0);
        assert_eq!(values[6 * PIXELS], 1.0);
    }
}
