use std::path::Path;

use geojson::{Feature, FeatureCollection, Geometry, Value, feature::Id};
use serde_json::{Map, Number, Value as JsonValue};

use crate::{
    algorithms::OrientationHoleDetector,
    error::{ContourError, Result},
    traits::HoleDetector,
    types::{ComplexShape, ComputedContours, Contour, Ring},
};

impl Contour {
    /// Groups the rings into shapes, holes attached to their exteriors
    pub fn shapes(&self) -> Result<Vec<ComplexShape>> {
        self.shapes_with(&OrientationHoleDetector)
    }

    pub fn shapes_with<H: HoleDetector + ?Sized>(&self, detector: &H) -> Result<Vec<ComplexShape>> {
        detector.detect_holes(&self.rings)
    }
}

impl ComputedContours {
    /// Export to GeoJSON, one `MultiPolygon` feature per class that has rings
    pub fn to_geojson(&self) -> Result<FeatureCollection> {
        let mut features = Vec::new();

        for (class, contour) in self.contours.iter().enumerate() {
            if contour.is_empty() {
                continue;
            }
            let shapes = contour.shapes()?;

            let polygons = shapes
                .iter()
                .map(|shape| {
                    std::iter::once(&shape.exterior)
                        .chain(shape.holes.iter())
                        .map(closed_positions)
                        .collect()
                })
                .collect();
            let geometry = Geometry::new(Value::MultiPolygon(polygons));

            let area: f32 = shapes.iter().map(ComplexShape::area).sum();
            let perimeter: f32 = shapes.iter().map(ComplexShape::perimeter).sum();
            let hole_count: usize = shapes.iter().map(|s| s.holes.len()).sum();

            let mut properties = Map::new();
            properties.insert("class".to_string(), JsonValue::Number(Number::from(class)));
            properties.insert("area".to_string(), float(area));
            properties.insert(
                "ring_count".to_string(),
                JsonValue::Number(Number::from(contour.rings.len())),
            );
            properties.insert("hole_count".to_string(), JsonValue::Number(Number::from(hole_count)));
            properties.insert("perimeter".to_string(), float(perimeter));

            features.push(Feature {
                bbox: None,
                geometry: Some(geometry),
                id: Some(Id::Number(Number::from(class))),
                properties: Some(properties),
                foreign_members: None,
            });
        }

        // Raster metadata lives in the collection's foreign members
        let mut foreign_members = Map::new();
        foreign_members.insert("image_width".to_string(), JsonValue::Number(Number::from(self.image_width)));
        foreign_members.insert("image_height".to_string(), JsonValue::Number(Number::from(self.image_height)));
        foreign_members.insert("class_count".to_string(), JsonValue::Number(Number::from(self.class_count())));

        Ok(FeatureCollection {
            bbox: None,
            features,
            foreign_members: Some(foreign_members),
        })
    }

    /// Export to GeoJSON and serialize to JSON string
    pub fn to_geojson_string(&self) -> Result<String> {
        let geojson = self.to_geojson()?;
        Ok(serde_json::to_string_pretty(&geojson)?)
    }

    /// Save GeoJSON to file
    pub fn save_geojson(&self, path: impl AsRef<Path>) -> Result<()> {
        let geojson_string = self.to_geojson_string()?;
        std::fs::write(path, geojson_string)?;
        Ok(())
    }

    /// Load ComputedContours from a GeoJSON file written by [`save_geojson`](Self::save_geojson)
    pub fn from_geojson_file(path: impl AsRef<Path>) -> Result<Self> {
        let geojson_str = std::fs::read_to_string(path)?;
        Self::from_geojson_string(&geojson_str)
    }

    /// Load ComputedContours from a GeoJSON string
    ///
    /// Rings come back in their stored order and orientation. Keystones and
    /// border masks are not part of the export and come back empty.
    pub fn from_geojson_string(geojson_str: &str) -> Result<Self> {
        let geojson: FeatureCollection = geojson_str.parse()?;

        let foreign_members = geojson
            .foreign_members
            .as_ref()
            .ok_or_else(|| ContourError::MalformedGeoJson("missing metadata".to_string()))?;
        let member = |name: &str| {
            foreign_members
                .get(name)
                .and_then(JsonValue::as_u64)
                .map(|v| v as usize)
                .ok_or_else(|| ContourError::MalformedGeoJson(format!("missing or invalid {name}")))
        };
        let image_width = member("image_width")?;
        let image_height = member("image_height")?;
        let class_count = member("class_count")?;

        let mut contours: Vec<Contour> = (0..class_count)
            .map(|_| Contour::new(image_width, image_height))
            .collect();

        for feature in geojson.features {
            let class = feature
                .property("class")
                .and_then(JsonValue::as_u64)
                .map(|c| c as usize)
                .filter(|&c| c < class_count)
                .ok_or_else(|| ContourError::MalformedGeoJson("missing or invalid class".to_string()))?;
            let Some(Value::MultiPolygon(polygons)) = feature.geometry.map(|g| g.value) else {
                return Err(ContourError::MalformedGeoJson(format!(
                    "class {class} is not a MultiPolygon"
                )));
            };
            let contour = &mut contours[class];
            for ring in polygons.iter().flatten() {
                contour.rings.push(open_ring(ring));
                contour.keystones.push(Vec::new());
            }
        }

        Ok(Self {
            contours,
            image_width,
            image_height,
        })
    }
}

/// GeoJSON linear rings repeat their first position at the end.
fn closed_positions(ring: &Ring) -> Vec<Vec<f64>> {
    ring.iter()
        .chain(ring.first())
        .map(|&[x, y]| vec![f64::from(x), f64::from(y)])
        .collect()
}

/// Drops the repeated closing position.
fn open_ring(positions: &[Vec<f64>]) -> Ring {
    let n = match (positions.first(), positions.last()) {
        (Some(first), Some(last)) if positions.len() > 1 && first == last => positions.len() - 1,
        _ => positions.len(),
    };
    positions[..n]
        .iter()
        .map(|p| {
            let coord = |i: usize| p.get(i).copied().unwrap_or_default() as f32;
            [coord(0), coord(1)]
        })
        .collect()
}

fn float(value: f32) -> JsonValue {
    Number::from_f64(f64::from(value))
        .map(JsonValue::Number)
        .unwrap_or(JsonValue::Null)
}
