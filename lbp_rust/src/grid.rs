//! Read-only grayscale grids the kernel runs over.
//!
//! `PixelGrid` is the whole decoded image. `HaloSlice` is an owned copy of a
//! band of rows plus one halo row on each side, re-indexed so local row 0 is
//! global row `origin`.

use crate::error::{LbpError, Result};
use crate::partition::RowRange;
use image::{DynamicImage, GrayImage};

/// Row access shared by full grids and halo slices.
pub trait GridView {
    fn width(&self) -> usize;

    /// Number of rows addressable through `row`.
    fn rows(&self) -> usize;

    /// Global row index of local row 0.
    fn origin(&self) -> usize;

    /// Local row `y`, exactly `width()` samples.
    fn row(&self, y: usize) -> &[u8];

    #[inline]
    fn get(&self, y: usize, x: usize) -> u8 {
        self.row(y)[x]
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelGrid {
    width: u32,
    height: u32,
    samples: Vec<u8>,
}

impl PixelGrid {
    /// Wrap row-major samples, rejecting grids with no interior pixels.
    pub fn new(width: u32, height: u32, samples: Vec<u8>) -> Result<Self> {
        if width < 3 || height < 3 {
            return Err(LbpError::InvalidInput { width, height });
        }
        let expected = width as usize * height as usize;
        if samples.len() != expected {
            return Err(LbpError::BufferMismatch { expected, actual: samples.len() });
        }
        Ok(Self { width, height, samples })
    }

    pub fn from_luma(img: GrayImage) -> Result<Self> {
        let (w, h) = img.dimensions();
        Self::new(w, h, img.into_raw())
    }

    /// Convert any decoded image to 8-bit luma.
    pub fn from_dynamic(img: &DynamicImage) -> Result<Self> {
        Self::from_luma(img.to_luma8())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn samples(&self) -> &[u8] {
        &self.samples
    }

    /// Dimensions of the descriptor image: the grid minus its border.
    pub fn interior_dims(&self) -> (u32, u32) {
        (self.width - 2, self.height - 2)
    }

    pub fn interior_len(&self) -> usize {
        (self.width as usize - 2) * (self.height as usize - 2)
    }

    /// Copy the global rows `halo` into an owned slice.
    ///
    /// `halo` comes from `partition::halo_bounds`; rows past the grid are dropped.
    pub fn halo_slice(&self, halo: RowRange) -> HaloSlice {
        let height = self.height as usize;
        let first = (halo.start as usize).min(height);
        let last = (halo.end as usize).min(height).max(first);
        let w = self.width as usize;
        HaloSlice {
            width: w,
            origin: first,
            samples: self.samples[first * w..last * w].to_vec(),
        }
    }
}

impl GridView for PixelGrid {
    #[inline]
    fn width(&self) -> usize {
        self.width as usize
    }
    #[inline]
    fn rows(&self) -> usize {
        self.height as usize
    }
    #[inline]
    fn origin(&self) -> usize {
        0
    }
    #[inline]
    fn row(&self, y: usize) -> &[u8] {
        let w = self.width as usize;
        &self.samples[y * w..(y + 1) * w]
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HaloSlice {
    width: usize,
    origin: usize,
    samples: Vec<u8>,
}

impl HaloSlice {
    /// Global rows held by this slice, half-open.
    pub fn global_rows(&self) -> RowRange {
        let end = self.origin + self.rows();
        RowRange { start: self.origin as u32, end: end as u32 }
    }
}

impl GridView for HaloSlice {
    #[inline]
    fn width(&self) -> usize {
        self.width
    }
    #[inline]
    fn rows(&self) -> usize {
        if self.width == 0 { 0 } else { self.samples.len() / self.width }
    }
    #[inline]
    fn origin(&self) -> usize {
        self.origin
    }
    #[inline]
    fn row(&self, y: usize) -> &[u8] {
        &self.samples[y * self.width..(y + 1) * self.width]
    }
}
