use serde::{Deserialize, Serialize};
use geo_types::{Coord, LineString, Polygon};

use crate::raster::Bitmap;

/// Identity token shared by every segment of one growing ring.
pub type RingId = u32;

/// A closed ring in output coordinates. The first vertex is not repeated.
pub type Ring = Vec<[f32; 2]>;

/// Integer point in doubled raster coordinates: pixel `(x, y)` spans
/// `[2x, 2x + 2] x [2y, 2y + 2]`, so edge midpoints stay integral.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Vertex {
    pub x: i32,
    pub y: i32,
}

impl Vertex {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Converts to output coordinates, adding `offset` on both axes.
    pub fn to_output(self, offset: f32) -> [f32; 2] {
        [self.x as f32 / 2.0 + offset, self.y as f32 / 2.0 + offset]
    }
}

/// Travel direction of a segment, X to the right and Y downward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    East,
    South,
    West,
    NorthEast,
    SouthEast,
    SouthWest,
    NorthWest,
}

impl Direction {
    /// Direction of travel from `a` to `b`. Both points must differ.
    pub fn between(a: Vertex, b: Vertex) -> Self {
        match ((b.x - a.x).signum(), (b.y - a.y).signum()) {
            (0, -1) => Self::North,
            (1, 0) => Self::East,
            (0, 1) => Self::South,
            (-1, 0) => Self::West,
            (1, -1) => Self::NorthEast,
            (1, 1) => Self::SouthEast,
            (-1, 1) => Self::SouthWest,
            _ => Self::NorthWest,
        }
    }

    pub fn is_diagonal(self) -> bool {
        matches!(
            self,
            Self::NorthEast | Self::SouthEast | Self::SouthWest | Self::NorthWest
        )
    }
}

/// Per-class boundary output for one traced raster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contour {
    /// Closed rings; outer rings clockwise, holes counter-clockwise (Y down)
    pub rings: Vec<Ring>,
    /// Mandatory vertex indices per ring, only populated in `rdp` mode
    pub keystones: Vec<Vec<usize>>,
    /// Cells of this class that touch one of its boundaries
    pub border: Bitmap,
}

impl Contour {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            rings: Vec::new(),
            keystones: Vec::new(),
            border: Bitmap::new(width, height),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rings.is_empty()
    }

    /// Sum of signed ring areas: exteriors add, holes subtract.
    pub fn signed_area(&self) -> f64 {
        self.rings.iter().map(|ring| signed_area(ring)).sum()
    }

    pub fn vertex_count(&self) -> usize {
        self.rings.iter().map(Vec::len).sum()
    }
}

/// Contours of every class of a raster, indexed by class id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputedContours {
    pub contours: Vec<Contour>,
    pub image_width: usize,
    pub image_height: usize,
}

impl ComputedContours {
    pub fn class_count(&self) -> usize {
        self.contours.len()
    }

    pub fn contour(&self, class: usize) -> Option<&Contour> {
        self.contours.get(class)
    }

    pub fn ring_count(&self) -> usize {
        self.contours.iter().map(|c| c.rings.len()).sum()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplexShape {
    /// The exterior boundary of the shape (clockwise)
    pub exterior: Ring,
    /// Interior boundaries (counter-clockwise)
    pub holes: Vec<Ring>,
}

impl ComplexShape {
    /// Convert to geo-types Polygon for geometric operations
    pub fn to_geo_polygon(&self) -> Polygon<f32> {
        Polygon::new(
            ring_to_linestring(&self.exterior),
            self.holes.iter().map(|hole| ring_to_linestring(hole)).collect(),
        )
    }

    /// Area of the exterior minus the holes
    pub fn area(&self) -> f32 {
        use geo::Area;
        self.to_geo_polygon().unsigned_area()
    }

    pub fn has_holes(&self) -> bool {
        !self.holes.is_empty()
    }

    /// Closed length of every ring, holes included
    pub fn perimeter(&self) -> f32 {
        std::iter::once(&self.exterior)
            .chain(self.holes.iter())
            .map(|ring| ring_perimeter(ring))
            .sum()
    }
}

pub(crate) fn ring_to_linestring(ring: &[[f32; 2]]) -> LineString<f32> {
    // LineString::new closes nothing by itself; Polygon::new closes the ring.
    LineString::new(ring.iter().map(|&[x, y]| Coord { x, y }).collect())
}

/// Shoelace area; positive for clockwise rings with Y pointing down.
pub fn signed_area(ring: &[[f32; 2]]) -> f64 {
    let n = ring.len();
    if n < 3 {
        return 0.0;
    }
    let mut twice = 0.0_f64;
    for i in 0..n {
        let [x0, y0] = ring[i];
        let [x1, y1] = ring[(i + 1) % n];
        twice += f64::from(x0) * f64::from(y1) - f64::from(x1) * f64::from(y0);
    }
    twice / 2.0
}

pub fn ring_perimeter(ring: &[[f32; 2]]) -> f32 {
    let n = ring.len();
    if n < 2 {
        return 0.0;
    }
    (0..n)
        .map(|i| {
            let [x0, y0] = ring[i];
            let [x1, y1] = ring[(i + 1) % n];
            ((x1 - x0) * (x1 - x0) + (y1 - y0) * (y1 - y0)).sqrt()
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clockwise_square_has_positive_area() {
        let square = vec![[0.0, 0.0], [2.0, 0.0], [2.0, 2.0], [0.0, 2.0]];
        assert_eq!(signed_area(&square), 4.0);

        let mut reversed = square.clone();
        reversed.reverse();
        assert_eq!(signed_area(&reversed), -4.0);
    }

    #[test]
    fn test_direction_between() {
        let o = Vertex::new(2, 2);
        assert_eq!(Direction::between(o, Vertex::new(2, 1)), Direction::North);
        assert_eq!(Direction::between(o, Vertex::new(3, 2)), Direction::East);
        assert_eq!(Direction::between(Vertex::new(2, 1), Vertex::new(3, 2)), Direction::SouthEast);
        assert_eq!(Direction::between(Vertex::new(3, 2), Vertex::new(2, 1)), Direction::NorthWest);
        assert!(Direction::NorthWest.is_diagonal());
        assert!(!Direction::West.is_diagonal());
    }

    #[test]
    fn test_complex_shape_metrics() {
        let shape = ComplexShape {
            exterior: vec![[0.0, 0.0], [4.0, 0.0], [4.0, 4.0], [0.0, 4.0]],
            holes: vec![vec![[1.0, 1.0], [1.0, 2.0], [2.0, 2.0], [2.0, 1.0]]],
        };
        assert!(shape.has_holes());
        assert!((shape.area() - 15.0).abs() < 1e-5);
        assert!((shape.perimeter() - 20.0).abs() < 1e-5);
    }
}
