//! parse::plan
//!
//! Human-readable plan lines, one per canonical operation.

use crate::core::operation::{Action, Operation, Parameters, PatternType};

/// Describe one operation in a single line.
///
/// ```
/// use textcad::core::operation::{Action, Operation, Parameters};
/// use textcad::parse::plan::describe;
///
/// let op = Operation::new(
///     Action::CreateFeature,
///     Parameters {
///         shape: Some("base_plate".to_string()),
///         length_mm: Some(120.0),
///         width_mm: Some(80.0),
///         height_mm: Some(6.0),
///         ..Parameters::default()
///     },
/// );
/// assert_eq!(describe(&op), "Create base plate 120 x 80 x 6 mm");
/// ```
pub fn describe(op: &Operation) -> String {
    let p = op.parameters();
    let mut line = match op.action() {
        Action::CreateFeature => format!("Create {}", shape_name(p, "feature")),
        Action::Extrude => match p.shape_tag() {
            Some(_) => format!("Extrude {}", shape_name(p, "profile")),
            None => "Extrude profile".to_string(),
        },
        Action::CreateHole => match p.count {
            Some(1) => "Drill 1 hole".to_string(),
            Some(n) => format!("Drill {} holes", n),
            None => "Drill hole".to_string(),
        },
        Action::Fillet => "Fillet".to_string(),
        Action::Chamfer => "Chamfer".to_string(),
        Action::Pattern => "Pattern feature".to_string(),
        Action::Unknown => return "Unrecognized instruction (skipped)".to_string(),
    };

    if let Some(sizes) = sizes(p) {
        line.push(' ');
        line.push_str(&sizes);
    }
    if let Some(d) = p.diameter_mm {
        line.push_str(&format!(" Ø{} mm", d));
    }
    if let Some(d) = p.depth_mm {
        line.push_str(&format!(", {} mm deep", d));
    }
    match op.action() {
        Action::Fillet => {
            if let Some(r) = p.radius_mm {
                line.push_str(&format!(" R{} mm", r));
            }
            if let Some(t) = &p.fillet_target {
                line.push_str(&format!(" on {}", t.replace('_', " ")));
            }
        }
        Action::Chamfer => {
            if let Some(d) = p.chamfer_distance_mm {
                line.push_str(&format!(" {} mm", d));
            }
            if let Some(t) = &p.chamfer_target {
                line.push_str(&format!(" on {}", t.replace('_', " ")));
            }
        }
        _ => {}
    }
    if let Some(pattern) = &p.pattern {
        let kind = match pattern.kind {
            Some(PatternType::Circular) => "circular ",
            Some(PatternType::Linear) => "linear ",
            None => "",
        };
        line.push_str(&format!(" in {}pattern", kind));
        if let Some(r) = pattern.radius_mm {
            line.push_str(&format!(" (radius {} mm)", r));
        }
    }
    if p.use_top_face == Some(true) {
        line.push_str(" on top face");
    }
    line
}

/// Describe every operation of a batch, in order.
pub fn plan_lines<'a>(ops: impl IntoIterator<Item = &'a Operation>) -> Vec<String> {
    ops.into_iter().map(describe).collect()
}

fn shape_name(p: &Parameters, fallback: &str) -> String {
    p.shape_tag()
        .map(|s| s.replace('_', " "))
        .unwrap_or_else(|| fallback.to_string())
}

fn sizes(p: &Parameters) -> Option<String> {
    let dims: Vec<String> = [p.length_mm, p.width_mm, p.height_mm]
        .iter()
        .flatten()
        .map(|v| v.to_string())
        .collect();
    (!dims.is_empty()).then(|| format!("{} mm", dims.join(" x ")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::operation::PatternSpec;

    #[test]
    fn pattern_holes() {
        let op = Operation::new(
            Action::CreateHole,
            Parameters {
                count: Some(4),
                diameter_mm: Some(6.0),
                pattern: Some(PatternSpec {
                    kind: Some(PatternType::Circular),
                    count: Some(4),
                    ..PatternSpec::default()
                }),
                ..Parameters::default()
            },
        );
        assert_eq!(describe(&op), "Drill 4 holes Ø6 mm in circular pattern");
    }

    #[test]
    fn unknown_is_marked_skipped() {
        assert_eq!(
            describe(&Operation::unknown()),
            "Unrecognized instruction (skipped)"
        );
    }

    #[test]
    fn cylinder_with_height() {
        let op = Operation::new(
            Action::Extrude,
            Parameters {
                shape: Some("cylinder".to_string()),
                diameter_mm: Some(15.0),
                height_mm: Some(30.0),
                ..Parameters::default()
            },
        );
        assert_eq!(describe(&op), "Extrude cylinder 30 mm Ø15 mm");
    }
}
