//! Image decoding and descriptor image output.

use crate::error::{LbpError, Result};
use crate::grid::PixelGrid;
use image::{io::Reader as ImageReader, GrayImage, ImageBuffer, Luma};
use std::path::Path;

/// Decode any supported format from disk into an 8-bit luma grid.
pub fn load_grid<P: AsRef<Path>>(path: P) -> Result<PixelGrid> {
    let dyn_img = ImageReader::open(path.as_ref())?.decode()?;
    PixelGrid::from_dynamic(&dyn_img)
}

/// Wrap a descriptor sequence as a `width` x `height` grayscale image.
pub fn descriptor_image(patterns: Vec<u8>, width: u32, height: u32) -> Result<GrayImage> {
    let expected = width as usize * height as usize;
    let actual = patterns.len();
    ImageBuffer::<Luma<u8>, Vec<u8>>::from_raw(width, height, patterns)
        .ok_or(LbpError::BufferMismatch { expected, actual })
}

/// Write descriptors to `path`; the format follows the file extension.
pub fn save_descriptors<P: AsRef<Path>>(path: P, patterns: Vec<u8>, width: u32, height: u32) -> Result<()> {
    descriptor_image(patterns, width, height)?.save(path.as_ref())?;
    Ok(())
}
