//! Raster scan driving one ring builder per class.

use tracing::{debug, info, instrument, trace};

use crate::{
    algorithms::{
        classify::{Cell, CellType},
        emit::{EmittedSegment, SaddleMap, emit},
        extract::extract_ring,
        graph::SegmentGraph,
        simplification::simplify_rings,
    },
    error::{Result, TopologyError},
    params::{ContourParameters, Simplification},
    raster::Bitmap,
    traits::ClassRaster,
    types::{ComputedContours, Contour},
};

/// Traces the region boundaries of labeled rasters.
///
/// Holds validated parameters only; every call to [`trace`](Self::trace)
/// starts from fresh builders and a fresh saddle map.
#[derive(Debug, Clone, Default)]
pub struct ContourTracer {
    params: ContourParameters,
}

impl ContourTracer {
    pub fn new(params: ContourParameters) -> Result<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &ContourParameters {
        &self.params
    }

    /// Traces every class in `0..class_count`.
    ///
    /// Labels outside that range are treated as regions without rings of
    /// their own. A topology error aborts the whole call.
    #[instrument(skip_all, fields(width = raster.width(), height = raster.height(), class_count = class_count))]
    pub fn trace<R: ClassRaster + ?Sized>(
        &self,
        raster: &R,
        class_count: usize,
    ) -> Result<ComputedContours> {
        let (width, height) = (raster.width(), raster.height());
        let mut builders: Vec<ClassBuilder> = (0..class_count)
            .map(|_| ClassBuilder::new(width, height, &self.params))
            .collect();
        let mut saddles = SaddleMap::new();

        for y in 0..=height {
            for x in 0..=width {
                let cell = Cell::read(raster, class_count, x, y);
                if cell.region_count < 2 {
                    continue;
                }
                let mitre = cell.needs_mitre();
                for class in cell.classes() {
                    let builder = &mut builders[class as usize];
                    let cell_type = cell.cell_type(class);
                    if mitre {
                        builder.add_mitre(cell_type, x, y, &mut saddles)?;
                    } else {
                        builder.add(cell_type, x, y, &mut saddles)?;
                    }
                }
            }
        }

        let contours = builders
            .into_iter()
            .enumerate()
            .map(|(class, builder)| builder.finish(class))
            .collect::<Result<Vec<_>>>()?;

        let result = ComputedContours {
            contours,
            image_width: width,
            image_height: height,
        };
        info!(
            rings = result.ring_count(),
            saddles = saddles.len(),
            "Traced {} classes",
            class_count
        );
        Ok(result)
    }

    /// Traces a single-class bitmap: set cells are the class, the rest is
    /// outside.
    pub fn trace_bitmap(&self, bitmap: &Bitmap) -> Result<Contour> {
        let mut result = self.trace(bitmap, 1)?;
        Ok(result
            .contours
            .pop()
            .unwrap_or_else(|| Contour::new(bitmap.width(), bitmap.height())))
    }
}

/// Traces `raster` with `params` in one call.
pub fn trace<R: ClassRaster + ?Sized>(
    raster: &R,
    class_count: usize,
    params: &ContourParameters,
) -> Result<ComputedContours> {
    ContourTracer::new(params.clone())?.trace(raster, class_count)
}

/// Traces the set cells of `bitmap` as a single class.
pub fn trace_bitmap(bitmap: &Bitmap, params: &ContourParameters) -> Result<Contour> {
    ContourTracer::new(params.clone())?.trace_bitmap(bitmap)
}

/// Ring builder for one class: owns its segment graph, its output and its
/// border mask.
struct ClassBuilder {
    graph: SegmentGraph,
    contour: Contour,
    pending: Vec<EmittedSegment>,
    simplification: Simplification,
    rdp_max_error: f32,
    offset: f32,
}

impl ClassBuilder {
    fn new(width: usize, height: usize, params: &ContourParameters) -> Self {
        Self {
            graph: SegmentGraph::new(),
            contour: Contour::new(width, height),
            pending: Vec::with_capacity(4),
            simplification: params.simplification,
            rdp_max_error: params.rdp_max_error,
            offset: params.pixel_origin.offset(),
        }
    }

    /// Window where at most two regions meet.
    fn add(
        &mut self,
        cell_type: CellType,
        x: usize,
        y: usize,
        saddles: &mut SaddleMap,
    ) -> std::result::Result<(), TopologyError> {
        self.step(cell_type, x, y, false, saddles)
    }

    /// Window where three or more regions meet.
    fn add_mitre(
        &mut self,
        cell_type: CellType,
        x: usize,
        y: usize,
        saddles: &mut SaddleMap,
    ) -> std::result::Result<(), TopologyError> {
        self.step(cell_type, x, y, true, saddles)
    }

    fn step(
        &mut self,
        cell_type: CellType,
        x: usize,
        y: usize,
        use_mitre: bool,
        saddles: &mut SaddleMap,
    ) -> std::result::Result<(), TopologyError> {
        if cell_type.is_trivial() {
            return Ok(());
        }
        emit(
            cell_type,
            x,
            y,
            use_mitre,
            saddles,
            &mut self.contour.border,
            &mut self.pending,
        );
        for segment in self.pending.drain(..) {
            let Some(head) = self.graph.link(segment) else {
                continue;
            };
            let ring = extract_ring(&mut self.graph, head, self.simplification, self.offset)?;
            trace!(x, y, vertices = ring.vertices.len(), "Closed ring");
            self.contour.rings.push(ring.vertices);
            self.contour.keystones.push(ring.keystones);
        }
        Ok(())
    }

    fn finish(mut self, class: usize) -> Result<Contour> {
        if let Some((end, ring)) = self.graph.first_dangling_end() {
            let error = match ring {
                Some(ring) => TopologyError::OpenRing { ring, x: end.x, y: end.y },
                None => TopologyError::DanglingSegment { x: end.x, y: end.y },
            };
            return Err(error.into());
        }
        if self.simplification == Simplification::Rdp {
            let before = self.contour.vertex_count();
            simplify_rings(
                &mut self.contour.rings,
                &mut self.contour.keystones,
                self.rdp_max_error,
            );
            debug!(class, before, after = self.contour.vertex_count(), "Simplified rings");
        }
        debug!(class, rings = self.contour.rings.len(), "Traced class");
        Ok(self.contour)
    }
}
