use crate::{error::Result, types::{ComplexShape, Ring}};

/// Read access to a labeled raster.
///
/// `class_at` returns a class id in `0..class_count`. Negative values mark
/// invalid pixels and values `>= class_count` mark pixels outside the labeled
/// area; both only shape topology and never produce rings of their own.
pub trait ClassRaster {
    fn width(&self) -> usize;

    fn height(&self) -> usize;

    /// Class of the cell at `(x, y)`; callers stay within `width x height`.
    fn class_at(&self, x: usize, y: usize) -> i32;
}

impl<R: ClassRaster + ?Sized> ClassRaster for &R {
    fn width(&self) -> usize {
        (**self).width()
    }

    fn height(&self) -> usize {
        (**self).height()
    }

    fn class_at(&self, x: usize, y: usize) -> i32 {
        (**self).class_at(x, y)
    }
}

/// Trait for hole detection algorithms
pub trait HoleDetector: Send + Sync {
    /// Group traced rings into shapes with holes
    fn detect_holes(&self, rings: &[Ring]) -> Result<Vec<ComplexShape>>;
}
