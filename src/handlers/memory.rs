//! handlers::memory
//!
//! In-memory reference document.
//!
//! [`MemoryDocument`] records features and their planar faces without doing
//! any real geometry. It implements the same weak checkpoint/rollback
//! contract a live CAD host offers: rollback truncates back to the feature
//! list at the last checkpoint, and can be made to fail on demand.
//!
//! # Top face
//!
//! [`MemoryDocument::top_face`] picks the planar face whose bounding box
//! reaches the highest Z. This single-axis heuristic is the placement
//! convention every reference handler relies on.
//!
//! # Example
//!
//! ```
//! use textcad::handlers::Document;
//! use textcad::handlers::memory::{MemoryDocument, PlanarFace};
//!
//! let mut doc = MemoryDocument::new();
//! doc.add_feature("plate", vec![PlanarFace::horizontal("top", 10.0, 50.0, 40.0)]);
//! assert!(doc.checkpoint("plate"));
//!
//! doc.add_feature("boss", vec![PlanarFace::horizontal("top", 25.0, 5.0, 5.0)]);
//! assert_eq!(doc.top_z(), Some(25.0));
//!
//! assert!(doc.best_effort_rollback());
//! assert_eq!(doc.features().len(), 1);
//! assert_eq!(doc.top_z(), Some(10.0));
//! ```

use super::Document;

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: [f64; 3],
    pub max: [f64; 3],
}

/// One planar face of a feature.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanarFace {
    pub name: String,
    pub bounds: BoundingBox,
}

impl PlanarFace {
    /// A horizontal face at height `z`, centered on the origin.
    pub fn horizontal(name: &str, z: f64, length: f64, width: f64) -> Self {
        Self {
            name: name.to_string(),
            bounds: BoundingBox {
                min: [-length / 2.0, -width / 2.0, z],
                max: [length / 2.0, width / 2.0, z],
            },
        }
    }
}

/// One recorded feature.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub id: String,
    pub description: String,
    pub faces: Vec<PlanarFace>,
}

/// Feature-recording document with checkpoint/rollback.
#[derive(Debug, Default)]
pub struct MemoryDocument {
    features: Vec<Feature>,
    checkpoint_len: usize,
    checkpoints: Vec<String>,
    next_id: u64,
    fail_rollback: bool,
    rollback_calls: usize,
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent rollback fail and leave state untouched.
    pub fn set_fail_rollback(&mut self, fail: bool) {
        self.fail_rollback = fail;
    }

    /// Record a feature and return its id.
    pub fn add_feature(&mut self, description: &str, faces: Vec<PlanarFace>) -> String {
        self.next_id += 1;
        let id = format!("F{}", self.next_id);
        self.features.push(Feature {
            id: id.clone(),
            description: description.to_string(),
            faces,
        });
        id
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    /// True when at least one feature has faces.
    pub fn has_solid(&self) -> bool {
        self.features.iter().any(|f| !f.faces.is_empty())
    }

    /// The planar face with the highest bounding-box Z.
    pub fn top_face(&self) -> Option<&PlanarFace> {
        self.features
            .iter()
            .flat_map(|f| f.faces.iter())
            .max_by(|a, b| a.bounds.max[2].total_cmp(&b.bounds.max[2]))
    }

    /// Z of [`top_face`](Self::top_face).
    pub fn top_z(&self) -> Option<f64> {
        self.top_face().map(|f| f.bounds.max[2])
    }

    /// Checkpoint labels recorded so far, oldest first.
    pub fn checkpoints(&self) -> &[String] {
        &self.checkpoints
    }

    /// Number of rollback attempts so far.
    pub fn rollback_calls(&self) -> usize {
        self.rollback_calls
    }
}

impl Document for MemoryDocument {
    fn best_effort_rollback(&mut self) -> bool {
        self.rollback_calls += 1;
        if self.fail_rollback {
            return false;
        }
        self.features.truncate(self.checkpoint_len);
        true
    }

    fn checkpoint(&mut self, label: &str) -> bool {
        self.checkpoint_len = self.features.len();
        self.checkpoints.push(label.to_string());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rollback_reverts_to_last_checkpoint_not_further() {
        let mut doc = MemoryDocument::new();
        doc.add_feature("a", vec![]);
        doc.checkpoint("a");
        doc.add_feature("b", vec![]);
        doc.add_feature("c", vec![]);

        assert!(doc.best_effort_rollback());
        let ids: Vec<&str> = doc.features().iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["F1"]);
    }

    #[test]
    fn failing_rollback_leaves_state() {
        let mut doc = MemoryDocument::new();
        doc.add_feature("a", vec![]);
        doc.set_fail_rollback(true);

        assert!(!doc.best_effort_rollback());
        assert_eq!(doc.features().len(), 1);
        assert_eq!(doc.rollback_calls(), 1);
    }

    #[test]
    fn top_face_is_max_z_over_planar_faces() {
        let mut doc = MemoryDocument::new();
        assert!(doc.top_face().is_none());

        doc.add_feature(
            "plate",
            vec![
                PlanarFace::horizontal("bottom", 0.0, 100.0, 80.0),
                PlanarFace::horizontal("top", 6.0, 100.0, 80.0),
            ],
        );
        doc.add_feature("fillet", vec![]);

        assert_eq!(doc.top_face().map(|f| f.name.as_str()), Some("top"));
        assert!(doc.has_solid());
    }

    #[test]
    fn ids_are_not_reused_after_rollback() {
        let mut doc = MemoryDocument::new();
        doc.add_feature("a", vec![]);
        doc.best_effort_rollback();
        let id = doc.add_feature("b", vec![]);
        assert_eq!(id, "F2");
    }
}
