//! Ramer-Douglas-Peucker simplification of closed rings with pinned vertices.
//!
//! Rings are always processed clockwise so that a boundary shared by two
//! classes is simplified in the same direction from both sides. Keystones
//! (junction vertices) survive verbatim and split the ring into pieces that
//! are simplified independently.

use crate::types::{Ring, signed_area};

#[derive(Debug, Clone, PartialEq)]
pub struct SimplifiedRing {
    pub vertices: Ring,
    /// Positions of the surviving keystones in `vertices`
    pub keystones: Vec<usize>,
}

/// Read-only view of a ring that can be walked backwards without copying.
#[derive(Debug, Clone, Copy)]
struct RingView<'a> {
    points: &'a [[f32; 2]],
    reversed: bool,
}

impl RingView<'_> {
    fn len(&self) -> usize {
        self.points.len()
    }

    /// Physical index of logical index `i`, modulo the ring length. The
    /// mapping is its own inverse.
    fn physical(&self, i: usize) -> usize {
        let n = self.len();
        let i = i % n;
        if self.reversed { n - 1 - i } else { i }
    }

    fn at(&self, i: usize) -> [f32; 2] {
        self.points[self.physical(i)]
    }
}

/// Simplifies `ring` so that no dropped vertex lies farther than `max_error`
/// from the chord that replaced it. `keystones` index into `ring` and are
/// always kept. The output keeps the input's orientation.
pub fn simplify_ring(ring: &[[f32; 2]], keystones: &[usize], max_error: f32) -> SimplifiedRing {
    let n = ring.len();
    let mut pinned: Vec<usize> = keystones.iter().copied().filter(|&k| k < n).collect();
    pinned.sort_unstable();
    pinned.dedup();
    if n < 5 {
        return SimplifiedRing {
            vertices: ring.to_vec(),
            keystones: pinned,
        };
    }

    let view = RingView {
        points: ring,
        reversed: signed_area(ring) < 0.0,
    };
    let mut logical: Vec<usize> = pinned.iter().map(|&k| view.physical(k)).collect();
    logical.sort_unstable();

    let start = logical.first().copied().unwrap_or_else(|| lowest_vertex(&view));
    // offsets from `start`; offset `n` is `start` again
    let mut anchors: Vec<usize> = if logical.len() >= 2 {
        logical.iter().map(|&k| k - start).collect()
    } else {
        vec![0, farthest_from(&view, start)]
    };
    anchors.push(n);

    let mut kept = vec![false; n];
    for piece in anchors.windows(2) {
        kept[piece[0]] = true;
        douglas_peucker(&view, start, piece[0], piece[1], max_error, &mut kept);
    }

    let mut survivors: Vec<usize> = kept
        .iter()
        .enumerate()
        .filter(|&(_, &k)| k)
        .map(|(offset, _)| view.physical(start + offset))
        .collect();
    survivors.sort_unstable();

    SimplifiedRing {
        vertices: survivors.iter().map(|&i| ring[i]).collect(),
        keystones: pinned
            .iter()
            .filter_map(|k| survivors.binary_search(k).ok())
            .collect(),
    }
}

/// Simplifies every ring of a contour in place, remapping its keystones.
pub fn simplify_rings(rings: &mut [Ring], keystones: &mut [Vec<usize>], max_error: f32) {
    for (ring, pins) in rings.iter_mut().zip(keystones.iter_mut()) {
        let simplified = simplify_ring(ring, pins, max_error);
        *ring = simplified.vertices;
        *pins = simplified.keystones;
    }
}

fn douglas_peucker(
    view: &RingView<'_>,
    base: usize,
    first: usize,
    last: usize,
    max_error: f32,
    kept: &mut [bool],
) {
    let n = kept.len();
    if last - first < 3 {
        for offset in first..=last {
            kept[offset % n] = true;
        }
        return;
    }

    let a = view.at(base + first);
    let b = view.at(base + last);
    let (index, distance) = ((first + 1)..last).fold((first, -1.0), |best, offset| {
        let d = perpendicular_distance(view.at(base + offset), a, b);
        if d > best.1 { (offset, d) } else { best }
    });

    if distance > f64::from(max_error) {
        kept[index % n] = true;
        douglas_peucker(view, base, first, index, max_error, kept);
        douglas_peucker(view, base, index, last, max_error, kept);
    }
}

/// Distance from `p` to the line through `a` and `b`, or to `a` when the two
/// coincide.
pub fn perpendicular_distance(p: [f32; 2], a: [f32; 2], b: [f32; 2]) -> f64 {
    let [px, py] = p.map(f64::from);
    let [ax, ay] = a.map(f64::from);
    let [bx, by] = b.map(f64::from);
    let dx = bx - ax;
    let dy = by - ay;
    let length_sq = dx.mul_add(dx, dy * dy);
    if length_sq == 0.0 {
        return (px - ax).hypot(py - ay);
    }
    let cross = dx.mul_add(ay - py, -(dy * (ax - px)));
    cross.abs() / length_sq.sqrt()
}

/// Logical index of the lexicographically smallest vertex, first on ties.
fn lowest_vertex(view: &RingView<'_>) -> usize {
    (0..view.len())
        .min_by(|&i, &j| {
            let (p, q) = (view.at(i), view.at(j));
            p[0].total_cmp(&q[0]).then(p[1].total_cmp(&q[1]))
        })
        .unwrap_or(0)
}

/// Offset (1..n) of the vertex farthest from logical index `start`.
fn farthest_from(view: &RingView<'_>, start: usize) -> usize {
    let [sx, sy] = view.at(start);
    (1..view.len())
        .fold((1, -1.0_f32), |best, offset| {
            let [x, y] = view.at(start + offset);
            let d = (x - sx).hypot(y - sy);
            if d > best.1 { (offset, d) } else { best }
        })
        .0
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Clockwise staircase-ish blob with a long flat top.
    fn blob() -> Ring {
        vec![
            [0.0, 0.0],
            [2.0, 0.0],
            [4.0, 0.1],
            [6.0, 0.0],
            [8.0, 0.0],
            [8.0, 4.0],
            [6.0, 4.1],
            [4.0, 4.0],
            [2.0, 3.9],
            [0.0, 4.0],
        ]
    }

    fn max_dropped_distance(original: &[[f32; 2]], simplified: &[[f32; 2]]) -> f64 {
        let positions: Vec<usize> = simplified
            .iter()
            .map(|v| original.iter().position(|o| o == v).expect("Should be an input vertex"))
            .collect();
        let n = original.len();
        let mut worst = 0.0_f64;
        for (i, &from) in positions.iter().enumerate() {
            let to = positions[(i + 1) % positions.len()];
            let mut k = (from + 1) % n;
            while k != to {
                worst = worst.max(perpendicular_distance(original[k], original[from], original[to]));
                k = (k + 1) % n;
            }
        }
        worst
    }

    #[test]
    fn test_short_rings_unchanged() {
        let ring = vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
        let result = simplify_ring(&ring, &[], 10.0);
        assert_eq!(result.vertices, ring);
    }

    #[test]
    fn test_flat_runs_collapse_within_bound() {
        let ring = blob();
        let result = simplify_ring(&ring, &[], 0.5);
        assert!(result.vertices.len() < ring.len());
        for corner in [[0.0, 0.0], [8.0, 0.0], [8.0, 4.0], [0.0, 4.0]] {
            assert!(result.vertices.contains(&corner), "missing {corner:?}");
        }
        assert!(max_dropped_distance(&ring, &result.vertices) <= 0.5);
    }

    #[test]
    fn test_orientation_is_preserved() {
        let mut ring = blob();
        ring.reverse();
        let result = simplify_ring(&ring, &[], 0.5);
        assert!(signed_area(&result.vertices) < 0.0);
        assert!(max_dropped_distance(&ring, &result.vertices) <= 0.5);
    }

    #[test]
    fn test_keystones_survive() {
        let ring = blob();
        let result = simplify_ring(&ring, &[2, 7], 0.5);
        assert!(result.vertices.contains(&[4.0, 0.1]));
        assert!(result.vertices.contains(&[4.0, 4.0]));
        assert_eq!(result.keystones.len(), 2);
        for (&k, original) in result.keystones.iter().zip([2usize, 7]) {
            assert_eq!(result.vertices[k], ring[original]);
        }
    }

    #[test]
    fn test_single_keystone_is_kept() {
        let ring = blob();
        let result = simplify_ring(&ring, &[3], 5.0);
        assert!(result.vertices.contains(&ring[3]));
        assert_eq!(result.vertices[result.keystones[0]], ring[3]);
        assert!(result.vertices.len() >= 2);
    }

    #[test]
    fn test_perpendicular_distance() {
        let d = perpendicular_distance([1.0, 3.0], [0.0, 0.0], [2.0, 0.0]);
        assert!((d - 3.0).abs() < 1e-10);
        let d = perpendicular_distance([3.0, 4.0], [0.0, 0.0], [0.0, 0.0]);
        assert!((d - 5.0).abs() < 1e-10);
    }

    #[test]
    fn test_reversed_view_indexing() {
        let points = [[0.0, 0.0], [1.0, 0.0], [2.0, 0.0]];
        let view = RingView { points: &points, reversed: true };
        assert_eq!(view.at(0), [2.0, 0.0]);
        assert_eq!(view.at(4), [1.0, 0.0]);
        assert_eq!(view.physical(view.physical(1)), 1);
    }
}
