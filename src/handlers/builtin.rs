//! handlers::builtin
//!
//! Reference handlers for [`MemoryDocument`].
//!
//! Missing dimensions fall back to fixed defaults: plate 100 x 80 x 10 mm,
//! cylinder 20 mm x 30 mm, 5 mm holes, and a circular pattern radius of 30%
//! of the smaller face side. Each call records one feature.

use super::memory::{MemoryDocument, PlanarFace};
use super::{CapabilityHandler, HandlerKind, HandlerOutcome, HandlerRegistry};
use crate::core::operation::{Parameters, PatternType};

pub const DEFAULT_PLATE_LENGTH_MM: f64 = 100.0;
pub const DEFAULT_PLATE_WIDTH_MM: f64 = 80.0;
pub const DEFAULT_PLATE_THICKNESS_MM: f64 = 10.0;
pub const DEFAULT_CYLINDER_DIAMETER_MM: f64 = 20.0;
pub const DEFAULT_CYLINDER_HEIGHT_MM: f64 = 30.0;
pub const DEFAULT_HOLE_DIAMETER_MM: f64 = 5.0;
pub const DEFAULT_PATTERN_COUNT: i64 = 4;

/// Registry with every reference handler installed.
pub fn reference_registry() -> HandlerRegistry<MemoryDocument> {
    HandlerRegistry::new()
        .with(Box::new(PlateHandler))
        .with(Box::new(CylinderHandler))
        .with(Box::new(HoleHandler))
        .with(Box::new(FilletHandler))
        .with(Box::new(ChamferHandler))
}

pub struct PlateHandler;

impl CapabilityHandler<MemoryDocument> for PlateHandler {
    fn kind(&self) -> HandlerKind {
        HandlerKind::Plate
    }

    fn validate(&self, _params: &Parameters) -> Result<(), String> {
        Ok(())
    }

    fn execute(&self, document: &mut MemoryDocument, params: &Parameters) -> HandlerOutcome {
        let length = params.length_mm.unwrap_or(DEFAULT_PLATE_LENGTH_MM);
        let width = params.width_mm.unwrap_or(DEFAULT_PLATE_WIDTH_MM);
        let thickness = params.height_mm.unwrap_or(DEFAULT_PLATE_THICKNESS_MM);
        let shape = params.shape_tag().unwrap_or("plate");

        let feature_id = document.add_feature(
            &format!("{} {}x{}x{}", shape, length, width, thickness),
            vec![
                PlanarFace::horizontal("bottom", 0.0, length, width),
                PlanarFace::horizontal("top", thickness, length, width),
            ],
        );
        HandlerOutcome::Success { feature_id }
    }
}

pub struct CylinderHandler;

impl CapabilityHandler<MemoryDocument> for CylinderHandler {
    fn kind(&self) -> HandlerKind {
        HandlerKind::Cylinder
    }

    fn validate(&self, params: &Parameters) -> Result<(), String> {
        if let (Some(d), Some(r)) = (params.diameter_mm, params.radius_mm) {
            if (d - 2.0 * r).abs() > 1e-9 {
                return Err(format!(
                    "diameter {} mm conflicts with radius {} mm",
                    d, r
                ));
            }
        }
        Ok(())
    }

    fn execute(&self, document: &mut MemoryDocument, params: &Parameters) -> HandlerOutcome {
        let diameter = params
            .diameter_mm
            .or(params.radius_mm.map(|r| r * 2.0))
            .unwrap_or(DEFAULT_CYLINDER_DIAMETER_MM);
        let height = params.height_mm.unwrap_or(DEFAULT_CYLINDER_HEIGHT_MM);

        let base = match params.use_top_face {
            Some(true) => document.top_z().unwrap_or(0.0),
            _ => params.center_z_mm.unwrap_or(0.0),
        };
        let (bottom, top) = if params.extrude_midplane == Some(true) {
            (base - height / 2.0, base + height / 2.0)
        } else if params.flip_direction == Some(true) {
            (base - height, base)
        } else {
            (base, base + height)
        };

        let feature_id = document.add_feature(
            &format!("cylinder d{} h{}", diameter, height),
            vec![
                PlanarFace::horizontal("bottom", bottom, diameter, diameter),
                PlanarFace::horizontal("top", top, diameter, diameter),
            ],
        );
        HandlerOutcome::Success { feature_id }
    }
}

pub struct HoleHandler;

impl CapabilityHandler<MemoryDocument> for HoleHandler {
    fn kind(&self) -> HandlerKind {
        HandlerKind::Hole
    }

    fn validate(&self, params: &Parameters) -> Result<(), String> {
        let pattern_count = params.pattern.as_ref().and_then(|p| p.count);
        if params.count == Some(0) || pattern_count == Some(0) {
            return Err("hole count must be at least 1".to_string());
        }
        Ok(())
    }

    fn execute(&self, document: &mut MemoryDocument, params: &Parameters) -> HandlerOutcome {
        let use_top = params.use_top_face != Some(false);
        let face = if use_top {
            document.top_face().cloned()
        } else {
            document
                .features()
                .iter()
                .flat_map(|f| f.faces.iter())
                .min_by(|a, b| a.bounds.min[2].total_cmp(&b.bounds.min[2]))
                .cloned()
        };
        let Some(face) = face else {
            return HandlerOutcome::Failure {
                error: "no solid body to cut".to_string(),
            };
        };

        let diameter = params.diameter_mm.unwrap_or(DEFAULT_HOLE_DIAMETER_MM);
        let face_length = face.bounds.max[0] - face.bounds.min[0];
        let face_width = face.bounds.max[1] - face.bounds.min[1];
        let smaller_side = face_length.min(face_width);
        if diameter >= smaller_side {
            return HandlerOutcome::Failure {
                error: format!(
                    "hole diameter {} mm does not fit on face '{}' ({} x {} mm)",
                    diameter, face.name, face_length, face_width
                ),
            };
        }

        let pattern = params.pattern.as_ref();
        let count = pattern
            .and_then(|p| p.count)
            .or(params.count)
            .unwrap_or(if pattern.is_some() { DEFAULT_PATTERN_COUNT } else { 1 });
        let layout = match pattern.map(|p| p.kind.unwrap_or(PatternType::Circular)) {
            Some(PatternType::Circular) => {
                let radius = pattern
                    .and_then(|p| p.radius_mm)
                    .unwrap_or(smaller_side * 0.3);
                format!("circular r{}", radius)
            }
            Some(PatternType::Linear) => {
                let spacing = face_length * 0.8 / (count.max(2) - 1) as f64;
                format!("linear pitch {}", spacing)
            }
            None => "single".to_string(),
        };
        let depth = params
            .depth_mm
            .map(|d| format!("depth {}", d))
            .unwrap_or_else(|| "through".to_string());

        let feature_id = document.add_feature(
            &format!(
                "{} x hole d{} {} {} at z{}",
                count, diameter, layout, depth, face.bounds.max[2]
            ),
            Vec::new(),
        );
        HandlerOutcome::Success { feature_id }
    }
}

pub struct FilletHandler;

impl CapabilityHandler<MemoryDocument> for FilletHandler {
    fn kind(&self) -> HandlerKind {
        HandlerKind::Fillet
    }

    fn validate(&self, params: &Parameters) -> Result<(), String> {
        match params.radius_mm {
            Some(_) => Ok(()),
            None => Err("fillet radius is required".to_string()),
        }
    }

    fn execute(&self, document: &mut MemoryDocument, params: &Parameters) -> HandlerOutcome {
        edge_modifier(
            document,
            "fillet",
            params.radius_mm.unwrap_or_default(),
            params.fillet_target.as_deref(),
        )
    }
}

pub struct ChamferHandler;

impl CapabilityHandler<MemoryDocument> for ChamferHandler {
    fn kind(&self) -> HandlerKind {
        HandlerKind::Chamfer
    }

    fn validate(&self, params: &Parameters) -> Result<(), String> {
        match params.chamfer_distance_mm {
            Some(_) => Ok(()),
            None => Err("chamfer distance is required".to_string()),
        }
    }

    fn execute(&self, document: &mut MemoryDocument, params: &Parameters) -> HandlerOutcome {
        edge_modifier(
            document,
            "chamfer",
            params.chamfer_distance_mm.unwrap_or_default(),
            params.chamfer_target.as_deref(),
        )
    }
}

fn edge_modifier(
    document: &mut MemoryDocument,
    name: &str,
    size: f64,
    target: Option<&str>,
) -> HandlerOutcome {
    if !document.has_solid() {
        return HandlerOutcome::Failure {
            error: format!("no edges to {}", name),
        };
    }
    let feature_id = document.add_feature(
        &format!("{} {} on {}", name, size, target.unwrap_or("all_edges")),
        Vec::new(),
    );
    HandlerOutcome::Success { feature_id }
}
