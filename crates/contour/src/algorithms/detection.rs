use geo::{Area, Contains};
use geo_types::{Coord, Point, Polygon};
use tracing::warn;

use crate::{
    error::Result,
    traits::HoleDetector,
    types::{ComplexShape, Ring, ring_to_linestring, signed_area},
};

/// Orientation-based hole detector
///
/// Traced rings are oriented: clockwise rings (positive signed area, Y down)
/// bound a region from outside, counter-clockwise rings bound holes in it.
/// Each hole is attached to the smallest exterior that contains it.
#[derive(Debug, Clone, Default)]
pub struct OrientationHoleDetector;

impl HoleDetector for OrientationHoleDetector {
    fn detect_holes(&self, rings: &[Ring]) -> Result<Vec<ComplexShape>> {
        let (exteriors, holes): (Vec<&Ring>, Vec<&Ring>) =
            rings.iter().partition(|ring| signed_area(ring) >= 0.0);

        let outlines: Vec<(Polygon<f32>, f32)> = exteriors
            .iter()
            .map(|ring| {
                let polygon = Polygon::new(ring_to_linestring(ring), vec![]);
                let area = polygon.unsigned_area();
                (polygon, area)
            })
            .collect();

        let mut shapes: Vec<ComplexShape> = exteriors
            .iter()
            .map(|ring| ComplexShape {
                exterior: (*ring).clone(),
                holes: Vec::new(),
            })
            .collect();

        for hole in holes {
            let Some(probe) = interior_probe(hole) else {
                continue;
            };
            let parent = outlines
                .iter()
                .enumerate()
                .filter(|(_, (polygon, _))| polygon.contains(&probe))
                .min_by(|a, b| a.1.1.total_cmp(&b.1.1))
                .map(|(i, _)| i);

            match parent {
                Some(i) => shapes[i].holes.push(hole.clone()),
                None => warn!(
                    vertices = hole.len(),
                    "Hole ring has no enclosing exterior, dropping it"
                ),
            }
        }

        Ok(shapes)
    }
}

/// Every ring becomes its own shape, whatever its orientation
#[derive(Debug, Clone, Default)]
pub struct NoHoleDetector;

impl HoleDetector for NoHoleDetector {
    fn detect_holes(&self, rings: &[Ring]) -> Result<Vec<ComplexShape>> {
        Ok(rings
            .iter()
            .map(|ring| ComplexShape {
                exterior: ring.clone(),
                holes: Vec::new(),
            })
            .collect())
    }
}

/// A point just inside the region a hole ring bounds.
///
/// The region lies to the right of travel, so for the first edge of length
/// > 0 the point a small step to the right of its midpoint belongs to the
/// enclosing exterior and never lies on the hole itself.
fn interior_probe(ring: &[[f32; 2]]) -> Option<Point<f32>> {
    let n = ring.len();
    (0..n).find_map(|i| {
        let [x0, y0] = ring[i];
        let [x1, y1] = ring[(i + 1) % n];
        let (dx, dy) = (x1 - x0, y1 - y0);
        let length = dx.hypot(dy);
        if length == 0.0 {
            return None;
        }
        // right of travel with Y down is (-dy, dx)
        let step = 0.125 / length;
        Some(Point::from(Coord {
            x: (x0 + x1) / 2.0 - dy * step,
            y: (y0 + y1) / 2.0 + dx * step,
        }))
    })
}
