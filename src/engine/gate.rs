//! engine::gate
//!
//! Parameter validation before dispatch.
//!
//! # Architecture
//!
//! Every operation passes the gate before the router sees it. The gate does
//! not touch the document: a rejected operation has zero side effects and
//! is reported with every violation found, not just the first.
//!
//! # Rules
//!
//! - Dimensions (`*_mm` sizes, pattern radius, chamfer distance) must be
//!   finite and strictly positive
//! - Counts (including the pattern count) must be non-negative
//! - Angles and center coordinates must be finite
//!
//! Absent values are never violations.
//!
//! # Example
//!
//! ```
//! use textcad::core::operation::{Action, Operation, Parameters};
//! use textcad::engine::gate::{gate, GateResult};
//!
//! let params = Parameters { diameter_mm: Some(-3.0), ..Parameters::default() };
//! let op = Operation::new(Action::CreateHole, params);
//!
//! match gate(&op) {
//!     GateResult::Ready => unreachable!(),
//!     GateResult::Rejected(failure) => {
//!         assert_eq!(failure.violations[0].field, "diameter_mm");
//!     }
//! }
//! ```

use crate::core::operation::Operation;

/// Outcome of gating one operation.
#[derive(Debug, Clone, PartialEq)]
pub enum GateResult {
    /// All present parameters are in range.
    Ready,
    /// At least one parameter is out of range.
    Rejected(ValidationFailure),
}

impl GateResult {
    pub fn is_ready(&self) -> bool {
        matches!(self, GateResult::Ready)
    }
}

/// The rule a parameter broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    PositiveFinite,
    NonNegative,
    Finite,
}

impl Rule {
    pub fn describe(&self) -> &'static str {
        match self {
            Rule::PositiveFinite => "must be finite and > 0",
            Rule::NonNegative => "must be >= 0",
            Rule::Finite => "must be finite",
        }
    }
}

/// One out-of-range parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    /// Canonical key, dotted for pattern fields (`pattern.radius_mm`).
    pub field: &'static str,
    /// Offending value, rendered for display.
    pub value: String,
    pub rule: Rule,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} = {} {}", self.field, self.value, self.rule.describe())
    }
}

/// All violations found on one operation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationFailure {
    pub violations: Vec<Violation>,
}

impl std::fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self.violations.iter().map(|v| v.to_string()).collect();
        f.write_str(&parts.join("; "))
    }
}

#[derive(Default)]
struct Checker {
    violations: Vec<Violation>,
}

impl Checker {
    fn dimension(&mut self, field: &'static str, value: Option<f64>) {
        if let Some(v) = value {
            if !(v.is_finite() && v > 0.0) {
                self.push(field, v.to_string(), Rule::PositiveFinite);
            }
        }
    }

    fn count(&mut self, field: &'static str, value: Option<i64>) {
        if let Some(v) = value {
            if v < 0 {
                self.push(field, v.to_string(), Rule::NonNegative);
            }
        }
    }

    fn finite(&mut self, field: &'static str, value: Option<f64>) {
        if let Some(v) = value {
            if !v.is_finite() {
                self.push(field, v.to_string(), Rule::Finite);
            }
        }
    }

    fn push(&mut self, field: &'static str, value: String, rule: Rule) {
        self.violations.push(Violation { field, value, rule });
    }
}

/// Check every present parameter of `op`.
pub fn gate(op: &Operation) -> GateResult {
    let p = op.parameters();
    let mut check = Checker::default();

    check.count("count", p.count);
    check.dimension("diameter_mm", p.diameter_mm);
    check.dimension("height_mm", p.height_mm);
    check.dimension("width_mm", p.width_mm);
    check.dimension("length_mm", p.length_mm);
    check.dimension("depth_mm", p.depth_mm);
    check.dimension("radius_mm", p.radius_mm);
    check.finite("angle_deg", p.angle_deg);

    if let Some(pattern) = &p.pattern {
        check.count("pattern.count", pattern.count);
        check.finite("pattern.angle_deg", pattern.angle_deg);
        check.dimension("pattern.radius_mm", pattern.radius_mm);
        check.finite("pattern.center_x_mm", pattern.center_x_mm);
        check.finite("pattern.center_y_mm", pattern.center_y_mm);
        check.finite("pattern.center_z_mm", pattern.center_z_mm);
    }

    check.finite("center_x_mm", p.center_x_mm);
    check.finite("center_y_mm", p.center_y_mm);
    check.finite("center_z_mm", p.center_z_mm);
    check.finite("draft_angle_deg", p.draft_angle_deg);
    check.dimension("chamfer_distance_mm", p.chamfer_distance_mm);

    if check.violations.is_empty() {
        GateResult::Ready
    } else {
        GateResult::Rejected(ValidationFailure {
            violations: check.violations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::operation::{Action, Parameters, PatternSpec};

    fn op(params: Parameters) -> Operation {
        Operation::new(Action::CreateFeature, params)
    }

    fn violations(params: Parameters) -> Vec<&'static str> {
        match gate(&op(params)) {
            GateResult::Ready => Vec::new(),
            GateResult::Rejected(f) => f.violations.iter().map(|v| v.field).collect(),
        }
    }

    #[test]
    fn empty_parameters_pass() {
        assert!(gate(&op(Parameters::default())).is_ready());
    }

    #[test]
    fn zero_dimension_rejected() {
        let found = violations(Parameters {
            height_mm: Some(0.0),
            ..Parameters::default()
        });
        assert_eq!(found, vec!["height_mm"]);
    }

    #[test]
    fn non_finite_values_rejected() {
        let found = violations(Parameters {
            length_mm: Some(f64::INFINITY),
            angle_deg: Some(f64::NAN),
            center_x_mm: Some(f64::NEG_INFINITY),
            ..Parameters::default()
        });
        assert_eq!(found, vec!["length_mm", "angle_deg", "center_x_mm"]);
    }

    #[test]
    fn zero_count_is_allowed_negative_is_not() {
        assert!(violations(Parameters {
            count: Some(0),
            ..Parameters::default()
        })
        .is_empty());
        assert_eq!(
            violations(Parameters {
                count: Some(-1),
                ..Parameters::default()
            }),
            vec!["count"]
        );
    }

    #[test]
    fn pattern_fields_are_checked() {
        let found = violations(Parameters {
            pattern: Some(PatternSpec {
                count: Some(-2),
                radius_mm: Some(-5.0),
                ..PatternSpec::default()
            }),
            chamfer_distance_mm: Some(0.0),
            ..Parameters::default()
        });
        assert_eq!(
            found,
            vec!["pattern.count", "pattern.radius_mm", "chamfer_distance_mm"]
        );
    }

    #[test]
    fn negative_center_is_fine() {
        assert!(violations(Parameters {
            center_x_mm: Some(-20.0),
            center_z_mm: Some(-1.5),
            ..Parameters::default()
        })
        .is_empty());
    }

    #[test]
    fn failure_display_lists_each_violation() {
        let GateResult::Rejected(failure) = gate(&op(Parameters {
            width_mm: Some(-1.0),
            depth_mm: Some(0.0),
            ..Parameters::default()
        })) else {
            panic!("expected rejection");
        };
        assert_eq!(
            failure.to_string(),
            "width_mm = -1 must be finite and > 0; depth_mm = 0 must be finite and > 0"
        );
    }
}
