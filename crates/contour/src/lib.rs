//! # Contour Tracing Library
//!
//! Converts labeled rasters into topologically consistent polygon rings using
//! marching squares. Every class gets its own rings, and neighboring classes
//! trace exactly the same boundary, saddles included.
//!
//! ## Core Features
//!
//! - **Shared saddle resolution**: an ambiguous window is decided once and
//!   reused by every class, so boundaries never overlap or leave gaps
//! - **Incremental ring assembly**: segments are linked as they are emitted
//!   and a ring is read out the moment it closes
//! - **Oriented output**: outer rings clockwise, holes counter-clockwise (Y down)
//! - **Simplification**: direction-change vertices only, or Ramer-Douglas-Peucker
//!   with junction vertices pinned
//! - **GeoJSON Support**: export one `MultiPolygon` feature per class
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use contour::{ContourParameters, ContourTracer};
//! use image::open;
//!
//! let params = ContourParameters::builder()
//!     .with_rdp(0.75)
//!     .build()?;
//! let tracer = ContourTracer::new(params)?;
//!
//! // Luma values are class ids
//! let labels = open("labels.png")?.to_luma8();
//! let result = tracer.trace(&labels, 4)?;
//!
//! result.save_geojson("contours.geojson")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod error;
pub mod types;
pub mod traits;
pub mod params;
pub mod raster;
pub mod algorithms;
pub mod tracer;
pub mod io;

pub use error::{ContourError, Result, TopologyError};
pub use types::{ComplexShape, ComputedContours, Contour, Direction, Ring, RingId, Vertex};
pub use traits::{ClassRaster, HoleDetector};
pub use params::{ContourParameters, ContourParametersBuilder, PixelOrigin, Simplification};
pub use raster::{Bitmap, LabelRaster};
pub use algorithms::{NoHoleDetector, OrientationHoleDetector, simplify_ring};
pub use tracer::{ContourTracer, trace, trace_bitmap};

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    fn create_test_image() -> GrayImage {
        let mut img = GrayImage::new(40, 40);
        for y in 10..30 {
            for x in 10..30 {
                img.put_pixel(x, y, Luma([255u8]));
            }
        }
        img
    }

    #[test]
    fn test_thresholded_image() {
        let bitmap = Bitmap::from_luma_threshold(&create_test_image(), 128);
        let contour = trace_bitmap(&bitmap, &ContourParameters::default())
            .expect("Should trace successfully");

        assert_eq!(contour.rings.len(), 1);
        assert_eq!(contour.rings[0].len(), 4);
        assert_eq!(contour.signed_area(), 400.0);
    }

    #[test]
    fn test_gray_image_as_labels() {
        let mut image = GrayImage::new(4, 4);
        for (x, y, pixel) in image.enumerate_pixels_mut() {
            *pixel = Luma([if x < 2 { 0 } else if y < 2 { 1 } else { 2 }]);
        }
        let result = ContourTracer::default()
            .trace(&image, 3)
            .expect("Should trace successfully");

        assert_eq!(result.class_count(), 3);
        assert_eq!(result.image_width, 4);
        let areas: Vec<f64> = result.contours.iter().map(Contour::signed_area).collect();
        assert_eq!(areas, vec![8.0, 4.0, 4.0]);
    }

    #[test]
    fn test_shapes_attach_holes() {
        let bitmap = Bitmap::from_rows(&["#####", "#...#", "#.#.#", "#...#", "#####"]);
        let contour = trace_bitmap(&bitmap, &ContourParameters::default())
            .expect("Should trace successfully");
        assert_eq!(contour.rings.len(), 3);

        let shapes = contour.shapes().expect("Should group rings");
        assert_eq!(shapes.len(), 2);
        let framed = shapes.iter().filter(|s| s.has_holes()).count();
        assert_eq!(framed, 1);
    }
}
