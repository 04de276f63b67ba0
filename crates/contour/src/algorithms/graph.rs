//! Incremental assembly of unit segments into rings.
//!
//! Segments live in an arena and point at each other through arena keys.
//! Every chain of two or more linked segments carries one ring id; a new
//! segment whose predecessor and successor already share an id closes that
//! ring. Ring ids live in a disjoint-set table, so joining two chains is a
//! single union instead of a walk over the successor chain.

use std::collections::BTreeMap;

use slotmap::SlotMap;

use crate::types::{Direction, RingId, Vertex};

use super::{classify::CellType, emit::EmittedSegment};

slotmap::new_key_type! {
    pub struct SegmentKey;
}

/// Graph key of a segment endpoint. `slot` separates the two connections
/// routed through the same window center at a mitred saddle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Node {
    pub point: Vertex,
    pub slot: u8,
}

impl Node {
    pub const fn new(point: Vertex) -> Self {
        Self { point, slot: 0 }
    }
}

#[derive(Debug, Clone)]
pub struct Segment {
    pub cell_type: CellType,
    pub direction: Direction,
    pub start: Node,
    pub end: Node,
    pub keystone: bool,
    pub prev: Option<SegmentKey>,
    pub next: Option<SegmentKey>,
    /// Entry in the graph's ring table; resolve with [`SegmentGraph::ring_of`]
    pub ring: Option<RingSet>,
}

/// Index of a ring table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RingSet(usize);

/// Disjoint sets of ring table entries, union by size with path halving.
/// Each root carries the ring id its whole set reports.
#[derive(Debug, Default)]
struct RingTable {
    parent: Vec<usize>,
    size: Vec<usize>,
    label: Vec<RingId>,
}

impl RingTable {
    fn make(&mut self, label: RingId) -> RingSet {
        let index = self.parent.len();
        self.parent.push(index);
        self.size.push(1);
        self.label.push(label);
        RingSet(index)
    }

    fn root(&self, RingSet(mut i): RingSet) -> usize {
        while self.parent[i] != i {
            i = self.parent[i];
        }
        i
    }

    fn find(&mut self, RingSet(mut i): RingSet) -> usize {
        while self.parent[i] != i {
            self.parent[i] = self.parent[self.parent[i]];
            i = self.parent[i];
        }
        i
    }

    fn label(&self, set: RingSet) -> RingId {
        self.label[self.root(set)]
    }

    /// Merges the set of `loser` into the set of `winner`; the merged set
    /// reports the winner's id whichever root survives.
    fn union(&mut self, winner: RingSet, loser: RingSet) {
        let (w, l) = (self.find(winner), self.find(loser));
        if w == l {
            return;
        }
        let label = self.label[w];
        let (root, child) = if self.size[w] >= self.size[l] { (w, l) } else { (l, w) };
        self.parent[child] = root;
        self.size[root] += self.size[child];
        self.label[root] = label;
    }

    #[cfg(test)]
    fn depth(&self, RingSet(mut i): RingSet) -> usize {
        let mut depth = 0;
        while self.parent[i] != i {
            i = self.parent[i];
            depth += 1;
        }
        depth
    }
}

#[derive(Debug, Default)]
pub struct SegmentGraph {
    segments: SlotMap<SegmentKey, Segment>,
    /// Segments whose start has no predecessor yet
    by_start: BTreeMap<Node, SegmentKey>,
    /// Segments whose end has no successor yet
    by_end: BTreeMap<Node, SegmentKey>,
    rings: RingTable,
    next_ring: RingId,
}

impl SegmentGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (not yet retired) segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn get(&self, key: SegmentKey) -> Option<&Segment> {
        self.segments.get(key)
    }

    /// Ring id of a live segment, `None` while it is not linked to anything.
    pub fn ring_of(&self, key: SegmentKey) -> Option<RingId> {
        self.segments
            .get(key)
            .and_then(|s| s.ring)
            .map(|set| self.rings.label(set))
    }

    /// Inserts a segment, links it to its neighbors and updates ring ids.
    ///
    /// Returns the new segment's key when it closes a ring; that segment is
    /// the head to extract the ring from.
    pub fn link(&mut self, emitted: EmittedSegment) -> Option<SegmentKey> {
        let pred = self.by_end.remove(&emitted.start);
        let succ = self.by_start.remove(&emitted.end);

        let key = self.segments.insert(Segment {
            cell_type: emitted.cell_type,
            direction: emitted.direction,
            start: emitted.start,
            end: emitted.end,
            keystone: emitted.keystone,
            prev: pred,
            next: succ,
            ring: None,
        });
        if pred.is_none() {
            self.by_start.insert(emitted.start, key);
        }
        if succ.is_none() {
            self.by_end.insert(emitted.end, key);
        }
        if let Some(p) = pred {
            self.segments[p].next = Some(key);
        }
        if let Some(n) = succ {
            self.segments[n].prev = Some(key);
        }

        let pred_ring = pred.and_then(|p| self.segments[p].ring);
        let succ_ring = succ.and_then(|n| self.segments[n].ring);
        match (pred_ring, succ_ring) {
            (None, None) => {
                let ring = self.fresh_ring();
                for k in [Some(key), pred, succ].into_iter().flatten() {
                    self.segments[k].ring = Some(ring);
                }
                None
            }
            // an unringed neighbor is a lone segment and joins the chain
            (Some(ring), None) => {
                self.adopt([Some(key), succ], ring);
                None
            }
            (None, Some(ring)) => {
                self.adopt([Some(key), pred], ring);
                None
            }
            (Some(ring), Some(other)) if self.rings.find(ring) != self.rings.find(other) => {
                // predecessor's identity wins
                self.segments[key].ring = Some(ring);
                self.rings.union(ring, other);
                None
            }
            (Some(ring), Some(_)) => {
                self.segments[key].ring = Some(ring);
                Some(key)
            }
        }
    }

    /// Removes a segment from the graph for good.
    pub fn retire(&mut self, key: SegmentKey) -> Option<Segment> {
        let segment = self.segments.remove(key)?;
        if self.by_start.get(&segment.start) == Some(&key) {
            self.by_start.remove(&segment.start);
        }
        if self.by_end.get(&segment.end) == Some(&key) {
            self.by_end.remove(&segment.end);
        }
        Some(segment)
    }

    /// End point of some segment still waiting for a successor.
    pub fn first_dangling_end(&self) -> Option<(Vertex, Option<RingId>)> {
        self.by_end
            .iter()
            .next()
            .map(|(node, &key)| (node.point, self.ring_of(key)))
    }

    #[cfg(test)]
    pub(crate) fn keys(&self) -> impl Iterator<Item = SegmentKey> + '_ {
        self.segments.keys()
    }

    /// Moves a segment into a ring table entry of its own reporting `ring`.
    #[cfg(test)]
    pub(crate) fn set_ring(&mut self, key: SegmentKey, ring: RingId) {
        let set = self.rings.make(ring);
        self.segments[key].ring = Some(set);
    }

    fn fresh_ring(&mut self) -> RingSet {
        let ring = self.next_ring;
        self.next_ring += 1;
        self.rings.make(ring)
    }

    fn adopt(&mut self, keys: [Option<SegmentKey>; 2], ring: RingSet) {
        for key in keys.into_iter().flatten() {
            self.segments[key].ring = Some(ring);
        }
    }
}
