//! parse::canonical
//!
//! Turn raw assistant text into a canonical [`Operation`], or reject it.
//!
//! Acceptance is all-or-nothing. Any of these rejects the whole response:
//! - nothing left after stripping markdown fences
//! - not a JSON object with an `action` string and a `parameters` object
//! - a known parameter with the wrong JSON type
//! - an action outside the vocabulary after alias folding, or `unknown`
//! - every parameter null
//!
//! Unknown parameter keys are ignored.

use serde_json::{Map, Value};

use super::assist::AssistError;
use crate::core::operation::{Action, Operation, Parameters, PatternSpec, PatternType};

/// Strip surrounding whitespace and markdown code fences.
///
/// ```
/// use textcad::parse::canonical::strip_fences;
///
/// assert_eq!(strip_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
/// assert_eq!(strip_fences("  {}  "), "{}");
/// ```
pub fn strip_fences(raw: &str) -> &str {
    let mut content = raw.trim();
    if let Some(rest) = content.strip_prefix("```json") {
        content = rest;
    } else if let Some(rest) = content.strip_prefix("```") {
        content = rest;
    }
    if let Some(rest) = content.strip_suffix("```") {
        content = rest;
    }
    content.trim()
}

/// Parse and canonicalize one assistant response.
pub fn operation_from_response(raw: &str) -> Result<Operation, AssistError> {
    let content = strip_fences(raw);
    if content.is_empty() {
        return Err(AssistError::EmptyResponse);
    }

    let value: Value =
        serde_json::from_str(content).map_err(|e| AssistError::InvalidJson(e.to_string()))?;
    let object = value
        .as_object()
        .ok_or_else(|| AssistError::Structure("response is not a JSON object".to_string()))?;

    let action_name = match object.get("action") {
        Some(Value::String(name)) => name,
        Some(_) => {
            return Err(AssistError::InvalidField {
                field: "action".to_string(),
                reason: "expected a string".to_string(),
            })
        }
        None => return Err(AssistError::Structure("missing 'action' field".to_string())),
    };
    let action = match Action::from_alias(action_name) {
        Some(Action::Unknown) | None => {
            return Err(AssistError::UnknownAction(action_name.clone()))
        }
        Some(action) => action,
    };

    let params = match object.get("parameters") {
        Some(Value::Object(params)) => params,
        Some(_) => {
            return Err(AssistError::InvalidField {
                field: "parameters".to_string(),
                reason: "expected an object".to_string(),
            })
        }
        None => {
            return Err(AssistError::Structure(
                "missing 'parameters' field".to_string(),
            ))
        }
    };

    let parameters = canonical_parameters(params)?;
    if parameters.is_all_null() {
        return Err(AssistError::AllNull);
    }
    Ok(Operation::new(action, parameters))
}

fn canonical_parameters(params: &Map<String, Value>) -> Result<Parameters, AssistError> {
    let f = Fields::new(params, "");
    Ok(Parameters {
        count: f.count("count")?,
        diameter_mm: f.number("diameter_mm")?,
        height_mm: f.number("height_mm")?,
        width_mm: f.number("width_mm")?,
        length_mm: f.number("length_mm")?,
        depth_mm: f.number("depth_mm")?,
        radius_mm: f.number("radius_mm")?,
        angle_deg: f.number("angle_deg")?,
        shape: f.text("shape")?.map(|s| canonical_tag(&s)).filter(|s| !s.is_empty()),
        pattern: pattern(params)?,
        center_x_mm: f.number("center_x_mm")?,
        center_y_mm: f.number("center_y_mm")?,
        center_z_mm: f.number("center_z_mm")?,
        axis: f
            .text("axis")?
            .map(|s| s.trim().to_ascii_uppercase())
            .filter(|s| !s.is_empty()),
        use_top_face: f.flag("use_top_face")?,
        extrude_midplane: f.flag("extrude_midplane")?,
        draft_angle_deg: f.number("draft_angle_deg")?,
        draft_outward: f.flag("draft_outward")?,
        flip_direction: f.flag("flip_direction")?,
        fillet_target: f
            .text("fillet_target")?
            .map(|s| canonical_tag(&s))
            .filter(|s| !s.is_empty()),
        chamfer_distance_mm: f.number("chamfer_distance_mm")?,
        chamfer_target: f
            .text("chamfer_target")?
            .map(|s| canonical_tag(&s))
            .filter(|s| !s.is_empty()),
    })
}

fn pattern(params: &Map<String, Value>) -> Result<Option<PatternSpec>, AssistError> {
    let object = match params.get("pattern") {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Object(object)) => object,
        Some(_) => {
            return Err(AssistError::InvalidField {
                field: "pattern".to_string(),
                reason: "expected an object or null".to_string(),
            })
        }
    };

    let f = Fields::new(object, "pattern.");
    let kind = match f.text("type")? {
        None => None,
        Some(name) => match name.trim().to_ascii_lowercase().as_str() {
            "circular" | "circle" | "polar" => Some(PatternType::Circular),
            "linear" | "line" | "rectangular" => Some(PatternType::Linear),
            _ => {
                return Err(AssistError::InvalidField {
                    field: "pattern.type".to_string(),
                    reason: format!("unknown pattern type '{}'", name),
                })
            }
        },
    };

    let spec = PatternSpec {
        kind,
        count: f.count("count")?,
        angle_deg: f.number("angle_deg")?,
        radius_mm: f.number("radius_mm")?,
        center_x_mm: f.number("center_x_mm")?,
        center_y_mm: f.number("center_y_mm")?,
        center_z_mm: f.number("center_z_mm")?,
    };
    Ok((!spec.is_empty()).then_some(spec))
}

fn canonical_tag(raw: &str) -> String {
    raw.trim().to_ascii_lowercase().replace([' ', '-'], "_")
}

/// Typed accessors over one JSON object.
struct Fields<'a> {
    object: &'a Map<String, Value>,
    prefix: &'static str,
}

impl<'a> Fields<'a> {
    fn new(object: &'a Map<String, Value>, prefix: &'static str) -> Self {
        Self { object, prefix }
    }

    fn get(&self, key: &str) -> Option<&'a Value> {
        self.object.get(key).filter(|v| !v.is_null())
    }

    fn invalid(&self, key: &str, expected: &str) -> AssistError {
        AssistError::InvalidField {
            field: format!("{}{}", self.prefix, key),
            reason: format!("expected {} or null", expected),
        }
    }

    fn number(&self, key: &str) -> Result<Option<f64>, AssistError> {
        match self.get(key) {
            None => Ok(None),
            Some(v) => v
                .as_f64()
                .map(Some)
                .ok_or_else(|| self.invalid(key, "a number")),
        }
    }

    fn count(&self, key: &str) -> Result<Option<i64>, AssistError> {
        match self.get(key) {
            None => Ok(None),
            Some(v) => {
                if let Some(n) = v.as_i64() {
                    return Ok(Some(n));
                }
                match v.as_f64() {
                    Some(n) if n.fract() == 0.0 && n.abs() < i64::MAX as f64 => {
                        Ok(Some(n as i64))
                    }
                    _ => Err(self.invalid(key, "an integer")),
                }
            }
        }
    }

    fn text(&self, key: &str) -> Result<Option<String>, AssistError> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(_) => Err(self.invalid(key, "a string")),
        }
    }

    fn flag(&self, key: &str) -> Result<Option<bool>, AssistError> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(_) => Err(self.invalid(key, "a boolean")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod fences {
        use super::*;

        #[test]
        fn bare_fence_is_stripped() {
            assert_eq!(strip_fences("```\n{}\n```"), "{}");
        }

        #[test]
        fn only_fences_is_empty() {
            assert_eq!(
                operation_from_response("```json\n```"),
                Err(AssistError::EmptyResponse)
            );
            assert_eq!(operation_from_response("   "), Err(AssistError::EmptyResponse));
        }
    }

    mod accepted {
        use super::*;

        #[test]
        fn fenced_hole_response() {
            let raw = r#"```json
            {"action": "create_hole", "parameters": {"count": 4, "diameter_mm": 6,
             "height_mm": null, "pattern": {"type": "circular", "count": 4, "angle_deg": null}}}
            ```"#;
            let op = operation_from_response(raw).unwrap();
            assert_eq!(op.action(), Action::CreateHole);
            assert_eq!(op.parameters().count, Some(4));
            assert_eq!(op.parameters().diameter_mm, Some(6.0));
            let pattern = op.parameters().pattern.as_ref().unwrap();
            assert_eq!(pattern.kind, Some(PatternType::Circular));
            assert_eq!(pattern.radius_mm, None);
        }

        #[test]
        fn alias_and_tags_are_folded() {
            let raw = r#"{"action": "Create-Plate", "parameters": {"shape": "Base Plate",
                "length_mm": 100, "axis": "z", "extra_key": "ignored"}}"#;
            let op = operation_from_response(raw).unwrap();
            assert_eq!(op.action(), Action::CreateFeature);
            assert_eq!(op.parameters().shape.as_deref(), Some("base_plate"));
            assert_eq!(op.parameters().axis.as_deref(), Some("Z"));
        }

        #[test]
        fn integral_float_count_is_accepted() {
            let raw = r#"{"action": "pattern", "parameters": {"count": 6.0}}"#;
            let op = operation_from_response(raw).unwrap();
            assert_eq!(op.parameters().count, Some(6));
        }

        #[test]
        fn empty_pattern_object_becomes_null() {
            let raw = r#"{"action": "fillet", "parameters": {"radius_mm": 2,
                "pattern": {"type": null, "count": null}}}"#;
            let op = operation_from_response(raw).unwrap();
            assert!(op.parameters().pattern.is_none());
        }
    }

    mod rejected {
        use super::*;

        #[test]
        fn all_null_parameters() {
            let raw = r#"{"action": "create_hole", "parameters": {"count": null,
                "diameter_mm": null, "pattern": null}}"#;
            assert_eq!(operation_from_response(raw), Err(AssistError::AllNull));
        }

        #[test]
        fn not_json() {
            assert!(matches!(
                operation_from_response("I think you want a hole."),
                Err(AssistError::InvalidJson(_))
            ));
        }

        #[test]
        fn not_an_object() {
            assert!(matches!(
                operation_from_response("[1, 2]"),
                Err(AssistError::Structure(_))
            ));
        }

        #[test]
        fn missing_parameters() {
            assert!(matches!(
                operation_from_response(r#"{"action": "fillet"}"#),
                Err(AssistError::Structure(_))
            ));
        }

        #[test]
        fn wrong_parameter_type() {
            let raw = r#"{"action": "fillet", "parameters": {"radius_mm": "2mm"}}"#;
            assert!(matches!(
                operation_from_response(raw),
                Err(AssistError::InvalidField { field, .. }) if field == "radius_mm"
            ));
        }

        #[test]
        fn fractional_count() {
            let raw = r#"{"action": "create_hole", "parameters": {"count": 2.5}}"#;
            assert!(matches!(
                operation_from_response(raw),
                Err(AssistError::InvalidField { .. })
            ));
        }

        #[test]
        fn bad_pattern_type() {
            let raw = r#"{"action": "pattern", "parameters": {"pattern": {"type": "spiral"}}}"#;
            assert!(matches!(
                operation_from_response(raw),
                Err(AssistError::InvalidField { field, .. }) if field == "pattern.type"
            ));
        }

        #[test]
        fn action_outside_vocabulary() {
            let raw = r#"{"action": "loft", "parameters": {"height_mm": 3}}"#;
            assert_eq!(
                operation_from_response(raw),
                Err(AssistError::UnknownAction("loft".to_string()))
            );
            let raw = r#"{"action": "unknown", "parameters": {"height_mm": 3}}"#;
            assert!(matches!(
                operation_from_response(raw),
                Err(AssistError::UnknownAction(_))
            ));
        }
    }
}
