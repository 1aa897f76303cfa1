//! core::operation
//!
//! The canonical operation schema.
//!
//! An [`Operation`] is the schema-stable form of one CAD intent. Every
//! parameter key is always present; a value that was not detected is an
//! explicit `null` on the wire and `None` in memory. The same shape comes
//! out of the Normalizer regardless of which stage produced it, so nothing
//! downstream needs to know the source.
//!
//! # Example
//!
//! ```
//! use textcad::core::operation::{Action, Operation, Parameters};
//!
//! let op = Operation::new(
//!     Action::Fillet,
//!     Parameters {
//!         radius_mm: Some(2.0),
//!         ..Parameters::default()
//!     },
//! );
//!
//! let json = serde_json::to_value(&op).unwrap();
//! assert_eq!(json["action"], "fillet");
//! assert!(json["parameters"]["shape"].is_null());
//! assert!(json["parameters"]["pattern"].is_null());
//! ```

use serde::{Deserialize, Serialize};

/// Closed vocabulary of canonical actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Create a base feature (plate, block, box, ...).
    CreateFeature,
    /// Create one or more holes.
    CreateHole,
    /// Extrude a profile.
    Extrude,
    /// Round edges.
    Fillet,
    /// Bevel edges.
    Chamfer,
    /// Pattern an existing feature.
    Pattern,
    /// Sentinel for a segment nothing could classify.
    Unknown,
}

impl Action {
    /// Wire name of the action.
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::CreateFeature => "create_feature",
            Action::CreateHole => "create_hole",
            Action::Extrude => "extrude",
            Action::Fillet => "fillet",
            Action::Chamfer => "chamfer",
            Action::Pattern => "pattern",
            Action::Unknown => "unknown",
        }
    }

    /// Fold an action name, including common aliases, into the vocabulary.
    ///
    /// Returns `None` for names outside the vocabulary.
    ///
    /// ```
    /// use textcad::core::operation::Action;
    ///
    /// assert_eq!(Action::from_alias("create_hole"), Some(Action::CreateHole));
    /// assert_eq!(Action::from_alias("Drill-Hole"), Some(Action::CreateHole));
    /// assert_eq!(Action::from_alias("teleport"), None);
    /// ```
    pub fn from_alias(name: &str) -> Option<Self> {
        let folded = name.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        let action = match folded.as_str() {
            "create_feature" | "create" | "create_plate" | "create_block" | "create_box"
            | "base_feature" => Action::CreateFeature,
            "create_hole" | "hole" | "holes" | "drill" | "drill_hole" | "create_holes" => {
                Action::CreateHole
            }
            "extrude" | "create_cylinder" | "cylinder" | "boss" => Action::Extrude,
            "fillet" | "round" | "create_fillet" => Action::Fillet,
            "chamfer" | "bevel" | "create_chamfer" => Action::Chamfer,
            "pattern" | "create_pattern" => Action::Pattern,
            "unknown" | "unhandled" => Action::Unknown,
            _ => return None,
        };
        Some(action)
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pattern type of a nested pattern descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternType {
    /// Instances arranged on a circle.
    Circular,
    /// Instances arranged on a line.
    Linear,
}

impl PatternType {
    /// Wire name of the pattern type.
    pub fn as_str(&self) -> &'static str {
        match self {
            PatternType::Circular => "circular",
            PatternType::Linear => "linear",
        }
    }
}

/// Nested pattern descriptor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatternSpec {
    #[serde(rename = "type")]
    pub kind: Option<PatternType>,
    pub count: Option<i64>,
    pub angle_deg: Option<f64>,
    pub radius_mm: Option<f64>,
    pub center_x_mm: Option<f64>,
    pub center_y_mm: Option<f64>,
    pub center_z_mm: Option<f64>,
}

impl PatternSpec {
    /// True when no field of the descriptor was detected.
    pub fn is_empty(&self) -> bool {
        self.kind.is_none()
            && self.count.is_none()
            && self.angle_deg.is_none()
            && self.radius_mm.is_none()
            && self.center_x_mm.is_none()
            && self.center_y_mm.is_none()
            && self.center_z_mm.is_none()
    }
}

/// The closed parameter set of an operation.
///
/// Field order matches the wire schema. No field is ever skipped during
/// serialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Parameters {
    pub count: Option<i64>,
    pub diameter_mm: Option<f64>,
    pub height_mm: Option<f64>,
    pub width_mm: Option<f64>,
    pub length_mm: Option<f64>,
    pub depth_mm: Option<f64>,
    pub radius_mm: Option<f64>,
    pub angle_deg: Option<f64>,
    pub shape: Option<String>,
    pub pattern: Option<PatternSpec>,
    pub center_x_mm: Option<f64>,
    pub center_y_mm: Option<f64>,
    pub center_z_mm: Option<f64>,
    pub axis: Option<String>,
    pub use_top_face: Option<bool>,
    pub extrude_midplane: Option<bool>,
    pub draft_angle_deg: Option<f64>,
    pub draft_outward: Option<bool>,
    pub flip_direction: Option<bool>,
    pub fillet_target: Option<String>,
    pub chamfer_distance_mm: Option<f64>,
    pub chamfer_target: Option<String>,
}

impl Parameters {
    /// True when every parameter is null.
    ///
    /// A pattern descriptor whose own fields are all null counts as null.
    pub fn is_all_null(&self) -> bool {
        self.count.is_none()
            && self.diameter_mm.is_none()
            && self.height_mm.is_none()
            && self.width_mm.is_none()
            && self.length_mm.is_none()
            && self.depth_mm.is_none()
            && self.radius_mm.is_none()
            && self.angle_deg.is_none()
            && self.shape.is_none()
            && self.pattern.as_ref().map_or(true, PatternSpec::is_empty)
            && self.center_x_mm.is_none()
            && self.center_y_mm.is_none()
            && self.center_z_mm.is_none()
            && self.axis.is_none()
            && self.use_top_face.is_none()
            && self.extrude_midplane.is_none()
            && self.draft_angle_deg.is_none()
            && self.draft_outward.is_none()
            && self.flip_direction.is_none()
            && self.fillet_target.is_none()
            && self.chamfer_distance_mm.is_none()
            && self.chamfer_target.is_none()
    }

    /// The shape tag, treating an empty or blank string as absent.
    pub fn shape_tag(&self) -> Option<&str> {
        self.shape.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

/// Placement hints an upstream planner may inject before routing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlacementHints {
    pub center_x_mm: Option<f64>,
    pub center_y_mm: Option<f64>,
    pub center_z_mm: Option<f64>,
    pub use_top_face: Option<bool>,
}

/// One canonical CAD intent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    action: Action,
    parameters: Parameters,
}

impl Operation {
    /// Create an operation from an action and a full parameter set.
    pub fn new(action: Action, parameters: Parameters) -> Self {
        Self { action, parameters }
    }

    /// The "unhandled" sentinel with every parameter null.
    pub fn unknown() -> Self {
        Self::new(Action::Unknown, Parameters::default())
    }

    /// The canonical action.
    pub fn action(&self) -> Action {
        self.action
    }

    /// The full parameter set.
    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// Return a copy with placement hints applied.
    ///
    /// Only hints that are set override existing values. This is the
    /// single sanctioned change to an operation after normalization.
    pub fn with_placement(&self, hints: &PlacementHints) -> Self {
        let mut parameters = self.parameters.clone();
        if hints.center_x_mm.is_some() {
            parameters.center_x_mm = hints.center_x_mm;
        }
        if hints.center_y_mm.is_some() {
            parameters.center_y_mm = hints.center_y_mm;
        }
        if hints.center_z_mm.is_some() {
            parameters.center_z_mm = hints.center_z_mm;
        }
        if hints.use_top_face.is_some() {
            parameters.use_top_face = hints.use_top_face;
        }
        Self::new(self.action, parameters)
    }
}
