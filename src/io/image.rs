//! PNG sample loading and result export
//!
//! Samples are quantized to exact RGBA colors: every distinct color becomes
//! one tile label, in sorted color order so labels are reproducible.

use image::{ImageBuffer, Rgba, RgbaImage};
use ndarray::Array2;
use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use crate::io::error::{Result, SynthesisError};

/// A sample image reduced to a grid of color labels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleImage {
    /// Color label of each pixel, indexed `[row, col]`
    pub labels: Array2<usize>,
    /// RGBA color of each label
    pub palette: Vec<[u8; 4]>,
}

impl SampleImage {
    /// Load and quantize a PNG file
    ///
    /// # Errors
    ///
    /// Returns `ImageLoad` if the file cannot be opened or decoded, and
    /// `InvalidSourceData` if the image has no pixels.
    pub fn from_png_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_buf = path.as_ref().to_path_buf();
        let img = image::open(&path_buf).map_err(|e| SynthesisError::ImageLoad {
            path: path_buf,
            source: e,
        })?;
        Self::from_rgba(&img.to_rgba8())
    }

    /// Quantize an in-memory RGBA image
    ///
    /// # Errors
    ///
    /// Returns `InvalidSourceData` if the image has no pixels.
    pub fn from_rgba(img: &RgbaImage) -> Result<Self> {
        let (width, height) = (img.width() as usize, img.height() as usize);
        if width == 0 || height == 0 {
            return Err(SynthesisError::InvalidSourceData {
                reason: "sample image has no pixels".to_string(),
            });
        }

        // Deterministic color ordering ensures reproducible tile labels
        let palette: Vec<[u8; 4]> = img
            .pixels()
            .map(|pixel| pixel.0)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let label_of: HashMap<[u8; 4], usize> = palette
            .iter()
            .enumerate()
            .map(|(label, &color)| (color, label))
            .collect();

        let mut labels = Array2::zeros((height, width));
        for (x, y, pixel) in img.enumerate_pixels() {
            if let (Some(&label), Some(cell)) = (
                label_of.get(&pixel.0),
                labels.get_mut((y as usize, x as usize)),
            ) {
                *cell = label;
            }
        }

        Ok(Self { labels, palette })
    }

    /// Number of distinct colors in the sample
    pub fn color_count(&self) -> usize {
        self.palette.len()
    }
}

/// Write a label grid as a PNG image
///
/// # Errors
///
/// Returns an error if:
/// - A label has no entry in the palette
/// - The parent directory cannot be created
/// - The image cannot be saved to the specified path
pub fn export_grid_as_png(grid: &Array2<usize>, palette: &[[u8; 4]], output_path: &Path) -> Result<()> {
    let (height, width) = grid.dim();
    let mut img: RgbaImage = ImageBuffer::new(width as u32, height as u32);

    for ((row, col), &label) in grid.indexed_iter() {
        let rgba = palette
            .get(label)
            .copied()
            .ok_or_else(|| SynthesisError::InvalidSourceData {
                reason: format!("label {label} is outside the {}-color palette", palette.len()),
            })?;
        img.put_pixel(col as u32, row as u32, Rgba(rgba));
    }

    if let Some(parent) = output_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| SynthesisError::FileSystem {
            path: parent.to_path_buf(),
            operation: "create directory",
            source: e,
        })?;
    }

    img.save(output_path)
        .map_err(|e| SynthesisError::ImageExport {
            path: output_path.to_path_buf(),
            source: e,
        })?;

    Ok(())
}
