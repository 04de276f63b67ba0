//! The tracing stages, leaves first: classify a window, emit its segments,
//! link them into rings, read rings back, simplify them.

pub mod classify;
pub mod emit;
pub mod graph;
pub mod extract;
pub mod simplification;
pub mod detection;

pub use classify::{Cell, CellType, Region};
pub use emit::{EmittedSegment, Saddle, SaddleMap, emit};
pub use graph::{Node, Segment, SegmentGraph, SegmentKey};
pub use extract::{ExtractedRing, extract_ring};
pub use simplification::{SimplifiedRing, simplify_ring, simplify_rings};
pub use detection::{NoHoleDetector, OrientationHoleDetector};
