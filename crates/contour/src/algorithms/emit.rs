//! Cell type to boundary segments.
//!
//! Each window is centered on a pixel corner `C`. A boundary crosses the
//! window along its arms (the half pixel edges from `C` to the midpoints
//! `N`, `E`, `S`, `W`). Arms are oriented so the class lies on the right of
//! travel, which makes outer rings clockwise with Y pointing down.
//!
//! Twelve patterns are a single path `in -> C -> out`. The two saddle
//! patterns have two in-arms and two out-arms; which ones pair up is decided
//! once per raster position in a [`SaddleMap`] shared by all classes.

use std::collections::HashMap;

use crate::{
    raster::Bitmap,
    types::{Direction, Vertex},
};

use super::{classify::CellType, graph::Node};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arm {
    N,
    E,
    S,
    W,
}

impl Arm {
    /// The two corners this arm separates, in clockwise order.
    const fn corners(self) -> (u8, u8) {
        match self {
            Self::N => (CellType::UL, CellType::UR),
            Self::E => (CellType::UR, CellType::LR),
            Self::S => (CellType::LR, CellType::LL),
            Self::W => (CellType::LL, CellType::UL),
        }
    }

    fn midpoint(self, center: Vertex) -> Vertex {
        match self {
            Self::N => Vertex::new(center.x, center.y - 1),
            Self::E => Vertex::new(center.x + 1, center.y),
            Self::S => Vertex::new(center.x, center.y + 1),
            Self::W => Vertex::new(center.x - 1, center.y),
        }
    }

    /// Travel on this arm ends at the center.
    fn is_inbound(self, cell_type: CellType) -> bool {
        let (a, b) = self.corners();
        cell_type.has(a) && !cell_type.has(b)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellCase {
    Empty,
    Path { from: Arm, to: Arm },
    Saddle,
}

const CASES: [CellCase; 16] = [
    CellCase::Empty,
    CellCase::Path { from: Arm::W, to: Arm::S },
    CellCase::Path { from: Arm::S, to: Arm::E },
    CellCase::Path { from: Arm::W, to: Arm::E },
    CellCase::Path { from: Arm::E, to: Arm::N },
    CellCase::Saddle,
    CellCase::Path { from: Arm::S, to: Arm::N },
    CellCase::Path { from: Arm::W, to: Arm::N },
    CellCase::Path { from: Arm::N, to: Arm::W },
    CellCase::Path { from: Arm::N, to: Arm::S },
    CellCase::Saddle,
    CellCase::Path { from: Arm::N, to: Arm::E },
    CellCase::Path { from: Arm::E, to: Arm::W },
    CellCase::Path { from: Arm::E, to: Arm::S },
    CellCase::Path { from: Arm::S, to: Arm::W },
    CellCase::Empty,
];

/// How a saddle window is split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Saddle {
    /// Upper-left and lower-right connect through the center; the cuts run
    /// N-E and S-W around the other two corners.
    JoinUlLr,
    /// Upper-right and lower-left connect; the cuts run N-W and S-E.
    JoinUrLl,
}

impl Saddle {
    fn cut_lines(self) -> [(Arm, Arm); 2] {
        match self {
            Self::JoinUlLr => [(Arm::N, Arm::E), (Arm::S, Arm::W)],
            Self::JoinUrLl => [(Arm::N, Arm::W), (Arm::S, Arm::E)],
        }
    }

    /// The resolution a class picks when it is first to reach a saddle: its
    /// own diagonal stays connected.
    fn joining(cell_type: CellType) -> Self {
        if cell_type.has(CellType::UL) {
            Self::JoinUlLr
        } else {
            Self::JoinUrLl
        }
    }
}

/// Saddle resolutions of one raster scan, keyed by window position.
///
/// Shared by every class builder of the scan; the first class to reach a
/// saddle decides, later classes reuse the decision so their boundaries
/// coincide.
#[derive(Debug, Default)]
pub struct SaddleMap {
    resolved: HashMap<(usize, usize), Saddle>,
}

impl SaddleMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolve(&mut self, x: usize, y: usize, cell_type: CellType) -> Saddle {
        *self
            .resolved
            .entry((x, y))
            .or_insert_with(|| Saddle::joining(cell_type))
    }

    pub fn get(&self, x: usize, y: usize) -> Option<Saddle> {
        self.resolved.get(&(x, y)).copied()
    }

    pub fn len(&self) -> usize {
        self.resolved.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolved.is_empty()
    }
}

/// A directed unit boundary edge produced for one class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmittedSegment {
    pub cell_type: CellType,
    pub direction: Direction,
    pub start: Node,
    pub end: Node,
    /// Starts at a junction of three or more regions
    pub keystone: bool,
}

/// Emits the segments of one class at window `(x, y)` into `out` and marks
/// the class's cells along them in `border`.
///
/// `use_mitre` selects right-angle routing through the window center; the
/// caller sets it whenever more than two regions meet at the window.
pub fn emit(
    cell_type: CellType,
    x: usize,
    y: usize,
    use_mitre: bool,
    saddles: &mut SaddleMap,
    border: &mut Bitmap,
    out: &mut Vec<EmittedSegment>,
) {
    let center = Vertex::new(2 * x as i32, 2 * y as i32);
    match CASES[usize::from(cell_type.0 & 0b1111)] {
        CellCase::Empty => {}
        CellCase::Path { from, to } => {
            push_via_center(cell_type, center, 0, from, to, use_mitre, out);
            mark_border(cell_type, x, y, [from, to], border);
        }
        CellCase::Saddle => {
            let saddle = saddles.resolve(x, y, cell_type);
            for (slot, (a, b)) in saddle.cut_lines().into_iter().enumerate() {
                let (from, to) = if a.is_inbound(cell_type) { (a, b) } else { (b, a) };
                if use_mitre {
                    push_via_center(cell_type, center, slot as u8, from, to, true, out);
                } else {
                    let start = from.midpoint(center);
                    let end = to.midpoint(center);
                    out.push(EmittedSegment {
                        cell_type,
                        direction: Direction::between(start, end),
                        start: Node::new(start),
                        end: Node::new(end),
                        keystone: false,
                    });
                }
                mark_border(cell_type, x, y, [from, to], border);
            }
        }
    }
}

fn push_via_center(
    cell_type: CellType,
    center: Vertex,
    slot: u8,
    from: Arm,
    to: Arm,
    keystone: bool,
    out: &mut Vec<EmittedSegment>,
) {
    let start = from.midpoint(center);
    let end = to.midpoint(center);
    let junction = Node { point: center, slot };
    out.push(EmittedSegment {
        cell_type,
        direction: Direction::between(start, center),
        start: Node::new(start),
        end: junction,
        keystone: false,
    });
    out.push(EmittedSegment {
        cell_type,
        direction: Direction::between(center, end),
        start: junction,
        end: Node::new(end),
        keystone,
    });
}

fn mark_border(cell_type: CellType, x: usize, y: usize, arms: [Arm; 2], border: &mut Bitmap) {
    for arm in arms {
        let (a, b) = arm.corners();
        let corner = if cell_type.has(a) { a } else { b };
        let pixel = match corner {
            CellType::UL => x.checked_sub(1).zip(y.checked_sub(1)),
            CellType::UR => y.checked_sub(1).map(|py| (x, py)),
            CellType::LR => Some((x, y)),
            _ => x.checked_sub(1).map(|px| (px, y)),
        };
        if let Some((px, py)) = pixel {
            border.set(px, py, true);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn emit_one(pattern: u8, mitre: bool, saddles: &mut SaddleMap) -> Vec<EmittedSegment> {
        let mut border = Bitmap::new(4, 4);
        let mut out = Vec::new();
        emit(CellType(pattern), 1, 1, mitre, saddles, &mut border, &mut out);
        out
    }

    #[test]
    fn test_table_matches_arm_orientation() {
        for pattern in 0u8..16 {
            let t = CellType(pattern);
            let inbound: Vec<Arm> = [Arm::N, Arm::E, Arm::S, Arm::W]
                .into_iter()
                .filter(|a| a.is_inbound(t))
                .collect();
            let outbound: Vec<Arm> = [Arm::N, Arm::E, Arm::S, Arm::W]
                .into_iter()
                .filter(|a| {
                    let (x, y) = a.corners();
                    t.has(y) && !t.has(x)
                })
                .collect();
            match CASES[pattern as usize] {
                CellCase::Empty => assert!(inbound.is_empty() && outbound.is_empty()),
                CellCase::Path { from, to } => {
                    assert_eq!(inbound, vec![from], "pattern {pattern:04b}");
                    assert_eq!(outbound, vec![to], "pattern {pattern:04b}");
                }
                CellCase::Saddle => {
                    assert_eq!(inbound.len(), 2);
                    assert_eq!(outbound.len(), 2);
                }
            }
        }
    }

    #[test]
    fn test_single_corner_turns_at_center() {
        let mut saddles = SaddleMap::new();
        // lower-right only: up the west edge of the pixel, then east along its top
        let out = emit_one(CellType::LR, false, &mut saddles);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].start.point, Vertex::new(2, 3));
        assert_eq!(out[0].end.point, Vertex::new(2, 2));
        assert_eq!(out[0].direction, Direction::North);
        assert_eq!(out[1].start, out[0].end);
        assert_eq!(out[1].end.point, Vertex::new(3, 2));
        assert_eq!(out[1].direction, Direction::East);
        assert!(out.iter().all(|s| !s.keystone));
    }

    #[test]
    fn test_mitre_flags_keystone() {
        let mut saddles = SaddleMap::new();
        let out = emit_one(CellType::UL | CellType::UR, true, &mut saddles);
        assert_eq!(out.len(), 2);
        assert!(!out[0].keystone);
        assert!(out[1].keystone);
        assert_eq!(out[1].direction, Direction::West);
    }

    #[test]
    fn test_saddle_diagonals_follow_first_resolution() {
        let mut saddles = SaddleMap::new();
        let a = emit_one(CellType::UL | CellType::LR, false, &mut saddles);
        assert_eq!(saddles.get(1, 1), Some(Saddle::JoinUlLr));
        let b = emit_one(CellType::UR | CellType::LL, false, &mut saddles);

        assert_eq!(a.len(), 2);
        assert_eq!(b.len(), 2);
        assert!(a.iter().all(|s| s.direction.is_diagonal()));
        // the complement traverses the same cut lines backwards
        for seg in &a {
            assert!(b.iter().any(|o| o.start == seg.end && o.end == seg.start));
        }
    }

    #[test]
    fn test_mitred_saddle_uses_distinct_slots() {
        let mut saddles = SaddleMap::new();
        let out = emit_one(CellType::UL | CellType::LR, true, &mut saddles);
        assert_eq!(out.len(), 4);
        let center = Vertex::new(2, 2);
        let slots: Vec<u8> = out
            .iter()
            .filter(|s| s.start.point == center)
            .map(|s| s.start.slot)
            .collect();
        assert_eq!(slots, vec![0, 1]);
        assert!(out.iter().all(|s| !s.direction.is_diagonal()));
    }

    #[test]
    fn test_border_marks_class_cells() {
        let mut saddles = SaddleMap::new();
        let mut border = Bitmap::new(3, 3);
        let mut out = Vec::new();
        emit(CellType(CellType::UL | CellType::LL), 1, 1, false, &mut saddles, &mut border, &mut out);
        assert!(border.get(0, 0));
        assert!(border.get(0, 1));
        assert!(!border.get(1, 0));
        assert!(!border.get(1, 1));
    }
}
