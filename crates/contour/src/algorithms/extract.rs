//! Reads a closed ring out of the segment graph.

use crate::{
    error::TopologyError,
    params::Simplification,
    types::{Ring, RingId, Vertex},
};

use super::graph::{SegmentGraph, SegmentKey};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedRing {
    pub vertices: Ring,
    /// Indices into `vertices` that simplification must keep
    pub keystones: Vec<usize>,
}

/// Walks the ring closed by `head`, retiring every segment as it is read.
///
/// `offset` is added to both output coordinates after halving.
pub fn extract_ring(
    graph: &mut SegmentGraph,
    head: SegmentKey,
    simplification: Simplification,
    offset: f32,
) -> Result<ExtractedRing, TopologyError> {
    let first = graph.get(head).ok_or(TopologyError::MissingHead)?;
    let origin = first.start.point;
    let ring = graph.ring_of(head).ok_or(TopologyError::UnlinkedHead {
        x: origin.x,
        y: origin.y,
    })?;

    let start = match simplification {
        Simplification::None => head,
        Simplification::Simple | Simplification::Rdp => rewind_to_turn(graph, head, ring, origin)?,
    };
    let mut previous_direction = graph
        .get(start)
        .and_then(|s| s.prev)
        .and_then(|p| graph.get(p))
        .map(|p| p.direction);

    let mut walk = RingWalk {
        graph,
        pending: Some(start),
    };
    let mut extracted = ExtractedRing::default();
    // where the walk currently stands, for error reports
    let mut at = walk.graph.get(start).map_or(origin, |s| s.start.point);

    while let Some(key) = walk.pending {
        let found = walk.graph.ring_of(key);
        let Some(segment) = walk.graph.retire(key) else {
            return Err(TopologyError::OpenRing { ring, x: at.x, y: at.y });
        };
        walk.pending = segment.next;
        if found != Some(ring) {
            return Err(TopologyError::RingMismatch {
                x: segment.start.point.x,
                y: segment.start.point.y,
                expected: ring,
                found,
            });
        }
        at = segment.end.point;

        let turns = previous_direction != Some(segment.direction);
        let keep = match simplification {
            Simplification::None => true,
            Simplification::Simple => turns,
            Simplification::Rdp => turns || segment.keystone,
        };
        if keep {
            if simplification == Simplification::Rdp && segment.keystone {
                extracted.keystones.push(extracted.vertices.len());
            }
            extracted.vertices.push(segment.start.point.to_output(offset));
        }
        previous_direction = Some(segment.direction);

        match segment.next {
            Some(next) if next == start => walk.pending = None,
            Some(_) => {}
            None => {
                return Err(TopologyError::OpenRing {
                    ring,
                    x: segment.end.point.x,
                    y: segment.end.point.y,
                });
            }
        }
    }
    Ok(extracted)
}

/// Steps back from `head` to the nearest segment that starts a new direction.
fn rewind_to_turn(
    graph: &SegmentGraph,
    head: SegmentKey,
    ring: RingId,
    origin: Vertex,
) -> Result<SegmentKey, TopologyError> {
    let mut cursor = head;
    let mut at = origin;
    // bounded by the live segment count in case the ring is malformed
    for _ in 0..=graph.len() {
        let segment = graph
            .get(cursor)
            .ok_or(TopologyError::OpenRing { ring, x: at.x, y: at.y })?;
        let Some(prev) = segment.prev.and_then(|p| graph.get(p).map(|s| (p, s))) else {
            return Err(TopologyError::OpenRing {
                ring,
                x: segment.start.point.x,
                y: segment.start.point.y,
            });
        };
        if prev.1.direction != segment.direction || prev.0 == head {
            return Ok(cursor);
        }
        at = prev.1.start.point;
        cursor = prev.0;
    }
    Ok(cursor)
}

/// Retires whatever remains of a partially read ring when extraction stops
/// early, so no segment of a closed ring outlives its extraction.
struct RingWalk<'a> {
    graph: &'a mut SegmentGraph,
    pending: Option<SegmentKey>,
}

impl Drop for RingWalk<'_> {
    fn drop(&mut self) {
        let mut cursor = self.pending.take();
        while let Some(key) = cursor {
            cursor = self.graph.retire(key).and_then(|s| s.next);
        }
    }
}
