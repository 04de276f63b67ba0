//! Per-window classification of a labeled raster.

use crate::traits::ClassRaster;

/// Corner-membership pattern of one class in a 2x2 window.
///
/// Bits: upper-left `8`, upper-right `4`, lower-right `2`, lower-left `1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellType(pub u8);

impl CellType {
    pub const UL: u8 = 0b1000;
    pub const UR: u8 = 0b0100;
    pub const LR: u8 = 0b0010;
    pub const LL: u8 = 0b0001;

    pub fn has(self, corner: u8) -> bool {
        self.0 & corner != 0
    }

    /// Empty and full windows carry no boundary.
    pub fn is_trivial(self) -> bool {
        self.0 == 0 || self.0 == 0b1111
    }
}

/// A pixel as seen by the topology: a real class or one of two virtual regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Region {
    Class(u32),
    Invalid,
    Outside,
}

impl Region {
    pub fn from_label(label: i32, class_count: usize) -> Self {
        if label < 0 {
            Self::Invalid
        } else if (label as u64) >= class_count as u64 {
            Self::Outside
        } else {
            Self::Class(label as u32)
        }
    }
}

/// Classification of the window centered on pixel corner `(x, y)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub x: usize,
    pub y: usize,
    /// Corners in order upper-left, upper-right, lower-right, lower-left
    pub corners: [Region; 4],
    /// Number of distinct regions (real and virtual) meeting here
    pub region_count: usize,
}

impl Cell {
    /// Reads the window whose lower-right pixel is `(x, y)`. Pixels beyond the
    /// raster edge read as [`Region::Outside`].
    pub fn read<R: ClassRaster + ?Sized>(raster: &R, class_count: usize, x: usize, y: usize) -> Self {
        let at = |px: Option<usize>, py: Option<usize>| match (px, py) {
            (Some(px), Some(py)) if px < raster.width() && py < raster.height() => {
                Region::from_label(raster.class_at(px, py), class_count)
            }
            _ => Region::Outside,
        };
        let left = x.checked_sub(1);
        let up = y.checked_sub(1);
        let corners = [
            at(left, up),
            at(Some(x), up),
            at(Some(x), Some(y)),
            at(left, Some(y)),
        ];
        Self {
            x,
            y,
            corners,
            region_count: count_distinct(&corners),
        }
    }

    /// True when more than two regions meet and connections must be mitred.
    pub fn needs_mitre(&self) -> bool {
        self.region_count > 2
    }

    pub fn cell_type(&self, class: u32) -> CellType {
        let bits = [CellType::UL, CellType::UR, CellType::LR, CellType::LL];
        let mut pattern = 0;
        for (corner, bit) in self.corners.iter().zip(bits) {
            if *corner == Region::Class(class) {
                pattern |= bit;
            }
        }
        CellType(pattern)
    }

    /// Real classes present in the window, ascending.
    pub fn classes(&self) -> impl Iterator<Item = u32> + '_ {
        let mut seen = [u32::MAX; 4];
        let mut n = 0;
        for corner in &self.corners {
            if let Region::Class(c) = *corner {
                if !seen[..n].contains(&c) {
                    seen[n] = c;
                    n += 1;
                }
            }
        }
        seen[..n].sort_unstable();
        seen.into_iter().take(n)
    }
}

fn count_distinct(corners: &[Region; 4]) -> usize {
    (0..4)
        .filter(|&i| !corners[..i].contains(&corners[i]))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::LabelRaster;

    fn raster() -> LabelRaster {
        LabelRaster::from_rows(&[&[0, 1], &[-1, 0]]).expect("Should build raster")
    }

    #[test]
    fn test_interior_window() {
        let cell = Cell::read(&raster(), 2, 1, 1);
        assert_eq!(
            cell.corners,
            [Region::Class(0), Region::Class(1), Region::Class(0), Region::Invalid]
        );
        assert_eq!(cell.region_count, 3);
        assert!(cell.needs_mitre());
        assert_eq!(cell.cell_type(0), CellType(CellType::UL | CellType::LR));
        assert_eq!(cell.cell_type(1), CellType(CellType::UR));
        assert_eq!(cell.classes().collect::<Vec<_>>(), vec![0, 1]);
    }

    #[test]
    fn test_out_of_range_labels_are_outside() {
        let cell = Cell::read(&raster(), 1, 1, 1);
        assert_eq!(cell.corners[1], Region::Outside);
        assert_eq!(cell.classes().collect::<Vec<_>>(), vec![0]);
    }

    #[test]
    fn test_corner_window_reads_outside() {
        let cell = Cell::read(&raster(), 2, 0, 0);
        assert_eq!(
            cell.corners,
            [Region::Outside, Region::Outside, Region::Class(0), Region::Outside]
        );
        assert_eq!(cell.region_count, 2);
        assert!(!cell.needs_mitre());
        assert_eq!(cell.cell_type(0), CellType(CellType::LR));
    }

    #[test]
    fn test_trivial_patterns() {
        assert!(CellType(0).is_trivial());
        assert!(CellType(0b1111).is_trivial());
        assert!(!CellType(0b0101).is_trivial());
    }
}
