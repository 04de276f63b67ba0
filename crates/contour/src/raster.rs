//! Raster inputs and the cell bitmap used for border masks.

use std::path::Path;

use image::{GrayImage, Luma};
use serde::{Deserialize, Serialize};

use crate::{
    error::{ContourError, Result},
    traits::ClassRaster,
};

/// Row-major set/unset grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bitmap {
    width: usize,
    height: usize,
    bits: Vec<bool>,
}

impl Bitmap {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            bits: vec![false; width * height],
        }
    }

    /// Builds a bitmap from rows of `'#'` (set) and any other character.
    /// Rows shorter than the longest one are padded with unset cells.
    pub fn from_rows(rows: &[&str]) -> Self {
        let height = rows.len();
        let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
        let mut bitmap = Self::new(width, height);
        for (y, row) in rows.iter().enumerate() {
            for (x, c) in row.chars().enumerate() {
                bitmap.set(x, y, c == '#');
            }
        }
        bitmap
    }

    /// Binarizes a grayscale image: pixels strictly above `threshold` are set.
    pub fn from_luma_threshold(image: &GrayImage, threshold: u8) -> Self {
        let binary = imageproc::contrast::threshold(image, threshold);
        let mut bitmap = Self::new(binary.width() as usize, binary.height() as usize);
        for (x, y, pixel) in binary.enumerate_pixels() {
            bitmap.set(x as usize, y as usize, pixel[0] > 0);
        }
        bitmap
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.bits[y * self.width + x]
    }

    /// Sets a cell; coordinates outside the bitmap are ignored.
    pub fn set(&mut self, x: usize, y: usize, value: bool) {
        if x < self.width && y < self.height {
            self.bits[y * self.width + x] = value;
        }
    }

    pub fn count_ones(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }

    pub fn to_gray_image(&self) -> GrayImage {
        GrayImage::from_fn(self.width as u32, self.height as u32, |x, y| {
            Luma([if self.get(x as usize, y as usize) { 255 } else { 0 }])
        })
    }
}

/// Set cells are class 0, unset cells lie outside.
impl ClassRaster for Bitmap {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn class_at(&self, x: usize, y: usize) -> i32 {
        if self.get(x, y) { 0 } else { 1 }
    }
}

/// Owned row-major class map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelRaster {
    width: usize,
    height: usize,
    labels: Vec<i32>,
}

impl LabelRaster {
    pub fn new(width: usize, height: usize, labels: Vec<i32>) -> Result<Self> {
        if labels.len() != width * height {
            return Err(ContourError::DimensionMismatch {
                width,
                height,
                actual: labels.len(),
            });
        }
        Ok(Self { width, height, labels })
    }

    /// Builds a raster from equally long rows.
    pub fn from_rows(rows: &[&[i32]]) -> Result<Self> {
        let width = rows.first().map_or(0, |r| r.len());
        let labels: Vec<i32> = rows.iter().flat_map(|r| r.iter().copied()).collect();
        Self::new(width, rows.len(), labels)
    }

    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> i32) -> Self {
        let mut labels = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                labels.push(f(x, y));
            }
        }
        Self { width, height, labels }
    }

    /// Number of cells labeled `class`.
    pub fn count(&self, class: i32) -> usize {
        self.labels.iter().filter(|&&c| c == class).count()
    }
}

impl ClassRaster for LabelRaster {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn class_at(&self, x: usize, y: usize) -> i32 {
        self.labels[y * self.width + x]
    }
}

/// Opens an image file as 8-bit luma, ready to trace as a class map.
pub fn open_luma(path: impl AsRef<Path>) -> Result<GrayImage> {
    Ok(image::open(path)?.to_luma8())
}

/// Luma values are class ids.
impl ClassRaster for GrayImage {
    fn width(&self) -> usize {
        self.width() as usize
    }

    fn height(&self) -> usize {
        self.height() as usize
    }

    fn class_at(&self, x: usize, y: usize) -> i32 {
        i32::from(self.get_pixel(x as u32, y as u32)[0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bitmap_from_rows() {
        let bitmap = Bitmap::from_rows(&["#..", ".##"]);
        assert_eq!(bitmap.width(), 3);
        assert_eq!(bitmap.height(), 2);
        assert!(bitmap.get(0, 0));
        assert!(!bitmap.get(1, 0));
        assert!(bitmap.get(2, 1));
        assert!(!bitmap.get(5, 5));
        assert_eq!(bitmap.count_ones(), 3);
        assert_eq!(bitmap.class_at(0, 0), 0);
        assert_eq!(bitmap.class_at(1, 0), 1);
    }

    #[test]
    fn test_bitmap_from_threshold() {
        let mut image = GrayImage::new(4, 1);
        image.put_pixel(1, 0, Luma([200u8]));
        image.put_pixel(2, 0, Luma([100u8]));
        let bitmap = Bitmap::from_luma_threshold(&image, 128);
        assert!(!bitmap.get(0, 0));
        assert!(bitmap.get(1, 0));
        assert!(!bitmap.get(2, 0));
        assert_eq!(bitmap.to_gray_image().get_pixel(1, 0)[0], 255);
    }

    #[test]
    fn test_label_raster_rejects_bad_length() {
        let result = LabelRaster::new(3, 3, vec![0; 8]);
        assert!(matches!(
            result,
            Err(ContourError::DimensionMismatch { width: 3, height: 3, actual: 8 })
        ));
    }

    #[test]
    fn test_gray_image_as_classes() {
        let mut image = GrayImage::new(2, 2);
        image.put_pixel(1, 1, Luma([3u8]));
        assert_eq!(ClassRaster::width(&image), 2);
        assert_eq!(image.class_at(1, 1), 3);
        assert_eq!(image.class_at(0, 0), 0);
    }

    #[test]
    fn test_open_missing_image() {
        let result = open_luma("does/not/exist.png");
        assert!(matches!(result, Err(ContourError::Image(_))));
    }
}
