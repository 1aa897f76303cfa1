//! parse::rules
//!
//! The deterministic, rule-based stage.
//!
//! [`resolve_segment`] never fails: a segment it cannot classify becomes
//! [`Operation::unknown`]. The same input always yields the same output.
//!
//! # Classification
//!
//! Checked in order, first match wins:
//! 1. `fillet`, `round(ed) ... edges` - fillet
//! 2. `chamfer`, `bevel` - chamfer
//! 3. `hole(s)`, `drill` - create_hole
//! 4. cylinder, rod, shaft, disc, disk, boss - extrude
//! 5. base plate, plate, block, box, cube, rectangle - create_feature
//! 6. `extrude` - extrude
//! 7. `pattern` - pattern
//!
//! # Dimensions
//!
//! - `AxBxC` is length x width x height, `AxB` is length x width (for a
//!   cylinder, diameter x height)
//! - `N mm diameter`, `diameter N`, `N mm cylinder`, and for cylinders
//!   `N wide` / `N across` give the diameter
//! - `N tall|high|thick`, `height|thickness N` give the height; for
//!   cylinders `long|deep|length|depth` also mean height
//! - `N mm hole` gives a hole diameter, `N deep` a hole depth

use regex::Regex;
use std::sync::LazyLock;

use crate::core::operation::{Action, Operation, Parameters, PatternSpec, PatternType};

/// Signed decimal with an optional exponent: `-5`, `2.5`, `.5`, `1e3`.
const NUM: &str = r"(-?(?:\d+(?:\.\d+)?|\.\d+)(?:e[+-]?\d+)?)";
const UNIT: &str = r"\s*(?:mm|millimet(?:er|re)s?)?";

fn build(pattern: &str) -> Regex {
    let expanded = pattern.replace("{NUM}", NUM).replace("{U}", UNIT);
    Regex::new(&expanded).unwrap()
}

macro_rules! rule {
    ($name:ident, $pattern:expr) => {
        static $name: LazyLock<Regex> = LazyLock::new(|| build($pattern));
    };
}

// classification
rule!(FILLET_RE, r"\bfillet|\bround(?:ed|ing)?\b.*\bedges?\b");
rule!(CHAMFER_RE, r"\bchamfer|\bbevel");
rule!(HOLE_RE, r"\bholes?\b|\bdrill");
rule!(CYLINDER_RE, r"\b(cylinder|rod|shaft|disc|disk|boss)(?:e?s)?\b");
rule!(BASE_PLATE_RE, r"\bbase[\s_-]*plate\b");
rule!(PLATE_RE, r"\b(plate|block|box|cube|rectangle)(?:e?s)?\b");
rule!(EXTRUDE_RE, r"\bextru(?:de|sion)");
rule!(PATTERN_WORD_RE, r"\bpattern\b");

// sizes
rule!(TRIPLE_RE, r"{NUM}{U}\s*[x×*]\s*{NUM}{U}\s*[x×*]\s*{NUM}{U}");
rule!(PAIR_RE, r"{NUM}{U}\s*[x×*]\s*{NUM}{U}");
rule!(DIAMETER_AFTER_RE, r"{NUM}{U}\s+(?:diameter|dia)\b");
rule!(DIAMETER_BEFORE_RE, r"\b(?:diameter|dia)\s*(?:of\s*)?{NUM}");
rule!(WIDE_AFTER_RE, r"{NUM}{U}\s+(?:width|wide)\b");
rule!(WIDE_BEFORE_RE, r"\b(?:width|wide)\s*(?:of\s*)?{NUM}");
rule!(ACROSS_RE, r"{NUM}{U}\s+(?:across|around)\b");
rule!(SIZED_CYLINDER_RE, r"{NUM}{U}\s+(?:cylinder|rod|shaft|disc|disk|boss)");
rule!(SIZED_HOLE_RE, r"{NUM}\s*mm\s+(?:diameter\s+)?(?:through[\s-]+)?holes?\b");
rule!(SIZED_SHAPE_RE, r"{NUM}{U}\s+(?:base[\s_-]*)?(?:plate|block|box|cube)\b");
rule!(HEIGHT_BEFORE_RE, r"\b(?:height|tall|thick(?:ness)?)\s+(?:of\s+)?{NUM}");
rule!(HEIGHT_AFTER_RE, r"{NUM}{U}\s+(?:tall|high|thick)\b");
rule!(LENGTH_BEFORE_RE, r"\blength\s+(?:of\s+)?{NUM}");
rule!(LENGTH_AFTER_RE, r"{NUM}{U}\s+long\b");
rule!(DEPTH_BEFORE_RE, r"\bdepth\s+(?:of\s+)?{NUM}");
rule!(DEPTH_AFTER_RE, r"{NUM}{U}\s+deep\b");
rule!(RADIUS_BEFORE_RE, r"\bradius\s+(?:of\s+)?{NUM}");
rule!(RADIUS_AFTER_RE, r"{NUM}{U}\s+radius\b");
rule!(CHAMFER_DISTANCE_RE, r"\b(?:distance|chamfer|bevel)\s+(?:of\s+)?{NUM}");
rule!(FIRST_MM_RE, r"{NUM}\s*mm\b");

// counts and angles
rule!(
    COUNT_RE,
    r"(-?\b\d+|\b(?:one|two|three|four|five|six|seven|eight|nine|ten|eleven|twelve))\s+(?:\w+\s+)?(?:holes?|instances?|copies|cylinders?)\b"
);
rule!(COUNT_OF_RE, r"\b(?:count|pattern)\s+of\s+(-?\d+)\b");
rule!(ANGLE_RE, r"{NUM}\s*(?:°|deg(?:rees?|s)?\b)");
rule!(DRAFT_RE, r"\bdraft\b");
rule!(
    DRAFT_ANGLE_RE,
    r"\bdraft(?:\s+angle)?\s+(?:of\s+)?{NUM}|{NUM}\s*(?:°|deg(?:rees?|s)?)?\s+draft\b"
);

// pattern
rule!(CIRCULAR_RE, r"\b(?:circular|circle|polar|radial|around|bolt[\s-]circle)\b");
rule!(LINEAR_RE, r"\b(?:linear|row|line|grid|array)\b");

// placement
rule!(TOP_FACE_RE, r"\btop\s+(?:face|surface)\b|\bon\s+(?:the\s+)?top\b");
rule!(BOTTOM_FACE_RE, r"\bbottom\s+(?:face|surface)\b");
rule!(
    CENTER_AT_RE,
    r"\bat\s*\(?\s*{NUM}\s*,\s*{NUM}(?:\s*,\s*{NUM})?\s*\)?"
);
rule!(CENTER_X_RE, r"\bx\s*=\s*{NUM}");
rule!(CENTER_Y_RE, r"\by\s*=\s*{NUM}");
rule!(CENTER_Z_RE, r"\bz\s*=\s*{NUM}");
rule!(
    AXIS_RE,
    r"\b(?:along|about|around)\s+(?:the\s+)?([xyz])(?:[\s-]*axis)?\b|\b([xyz])[\s-]axis\b"
);
rule!(
    MIDPLANE_RE,
    r"\bmid[\s-]?plane\b|\bsymmetric(?:al|ally)?\b|\bboth\s+(?:sides|directions)\b"
);
rule!(OUTWARD_RE, r"\boutwards?\b");
rule!(INWARD_RE, r"\binwards?\b");
rule!(FLIP_RE, r"\bflip(?:ped)?\b|\breversed?\b|\bopposite\s+direction\b|\bdownwards?\b");

// modifier targets
rule!(
    EDGE_TARGET_RE,
    r"\b(top|bottom|all|outer|inner|vertical|side)\s+edges?\b"
);
rule!(EDGE_RE, r"\bedges?\b");

/// Classified intent of one segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Intent {
    Fillet,
    Chamfer,
    Hole,
    Cylinder,
    Solid,
    Extrude,
    Pattern,
}

/// Resolve one segment into a canonical operation.
///
/// # Example
///
/// ```
/// use textcad::core::operation::Action;
/// use textcad::parse::rules::resolve_segment;
///
/// let op = resolve_segment("create a cylinder 25mm diameter 15mm tall");
/// assert_eq!(op.action(), Action::Extrude);
/// assert_eq!(op.parameters().diameter_mm, Some(25.0));
/// assert_eq!(op.parameters().height_mm, Some(15.0));
/// ```
pub fn resolve_segment(segment: &str) -> Operation {
    let text = segment.to_lowercase();

    let Some((intent, shape)) = classify(&text) else {
        return Operation::unknown();
    };

    let mut params = Parameters {
        shape,
        ..Parameters::default()
    };

    let text = extract_sizes(&text, intent, &mut params);
    extract_counts_and_pattern(&text, intent, &mut params);
    extract_angles(&text, &mut params);
    extract_placement(&text, &mut params);
    extract_modifiers(&text, intent, &mut params);

    let action = match intent {
        Intent::Fillet => Action::Fillet,
        Intent::Chamfer => Action::Chamfer,
        Intent::Hole => Action::CreateHole,
        Intent::Cylinder | Intent::Extrude => Action::Extrude,
        Intent::Solid => Action::CreateFeature,
        Intent::Pattern => Action::Pattern,
    };
    Operation::new(action, params)
}

fn classify(text: &str) -> Option<(Intent, Option<String>)> {
    if FILLET_RE.is_match(text) {
        return Some((Intent::Fillet, None));
    }
    if CHAMFER_RE.is_match(text) {
        return Some((Intent::Chamfer, None));
    }
    if HOLE_RE.is_match(text) {
        return Some((Intent::Hole, None));
    }
    if let Some(caps) = CYLINDER_RE.captures(text) {
        let shape = match &caps[1] {
            "boss" => "cylinder",
            other => other,
        };
        return Some((Intent::Cylinder, Some(shape.to_string())));
    }
    if BASE_PLATE_RE.is_match(text) {
        return Some((Intent::Solid, Some("base_plate".to_string())));
    }
    if let Some(caps) = PLATE_RE.captures(text) {
        return Some((Intent::Solid, Some(caps[1].to_string())));
    }
    if EXTRUDE_RE.is_match(text) {
        return Some((Intent::Extrude, None));
    }
    if PATTERN_WORD_RE.is_match(text) {
        return Some((Intent::Pattern, None));
    }
    None
}

/// Extract sizes and return the text with `AxB(xC)` groups blanked out.
fn extract_sizes(text: &str, intent: Intent, params: &mut Parameters) -> String {
    let mut working = text.to_string();

    if let Some(caps) = TRIPLE_RE.captures(text) {
        params.length_mm = parse_f64(&caps[1]);
        params.width_mm = parse_f64(&caps[2]);
        params.height_mm = parse_f64(&caps[3]);
        working = blank(&working, caps.get(0).map(|m| m.range()));
    } else if let Some(caps) = PAIR_RE.captures(text) {
        if intent == Intent::Cylinder {
            params.diameter_mm = parse_f64(&caps[1]);
            params.height_mm = parse_f64(&caps[2]);
        } else {
            params.length_mm = parse_f64(&caps[1]);
            params.width_mm = parse_f64(&caps[2]);
        }
        working = blank(&working, caps.get(0).map(|m| m.range()));
    }
    let text = working.as_str();

    match intent {
        Intent::Cylinder => {
            params.diameter_mm = params.diameter_mm.or_else(|| {
                first_f64(
                    &[
                        &DIAMETER_AFTER_RE,
                        &WIDE_AFTER_RE,
                        &DIAMETER_BEFORE_RE,
                        &WIDE_BEFORE_RE,
                        &ACROSS_RE,
                        &SIZED_CYLINDER_RE,
                    ],
                    text,
                )
            });
            params.height_mm = params.height_mm.or_else(|| {
                first_f64(
                    &[
                        &HEIGHT_BEFORE_RE,
                        &LENGTH_BEFORE_RE,
                        &DEPTH_BEFORE_RE,
                        &HEIGHT_AFTER_RE,
                        &LENGTH_AFTER_RE,
                        &DEPTH_AFTER_RE,
                    ],
                    text,
                )
            });
        }
        Intent::Hole => {
            params.diameter_mm = first_f64(
                &[&DIAMETER_AFTER_RE, &DIAMETER_BEFORE_RE, &SIZED_HOLE_RE],
                text,
            );
            params.depth_mm = first_f64(&[&DEPTH_BEFORE_RE, &DEPTH_AFTER_RE], text);
        }
        _ => {
            params.length_mm = params
                .length_mm
                .or_else(|| first_f64(&[&LENGTH_BEFORE_RE, &LENGTH_AFTER_RE], text));
            params.width_mm = params
                .width_mm
                .or_else(|| first_f64(&[&WIDE_AFTER_RE, &WIDE_BEFORE_RE], text));
            params.height_mm = params
                .height_mm
                .or_else(|| first_f64(&[&HEIGHT_AFTER_RE, &HEIGHT_BEFORE_RE], text));
            params.depth_mm = first_f64(&[&DEPTH_BEFORE_RE, &DEPTH_AFTER_RE], text);
            params.diameter_mm = first_f64(&[&DIAMETER_AFTER_RE, &DIAMETER_BEFORE_RE], text);

            if intent == Intent::Solid && params.length_mm.is_none() {
                if let Some(size) = first_f64(&[&SIZED_SHAPE_RE], text) {
                    params.length_mm = Some(size);
                    if params.shape.as_deref() == Some("cube") {
                        params.width_mm = params.width_mm.or(Some(size));
                        params.height_mm = params.height_mm.or(Some(size));
                    }
                }
            }
        }
    }

    working
}

fn extract_counts_and_pattern(text: &str, intent: Intent, params: &mut Parameters) {
    params.count = COUNT_RE
        .captures(text)
        .and_then(|caps| parse_count(&caps[1]))
        .or_else(|| {
            COUNT_OF_RE
                .captures(text)
                .and_then(|caps| parse_count(&caps[1]))
        });

    let kind = if CIRCULAR_RE.is_match(text) && intent != Intent::Cylinder {
        Some(PatternType::Circular)
    } else if LINEAR_RE.is_match(text) {
        Some(PatternType::Linear)
    } else {
        None
    };

    if kind.is_some() || PATTERN_WORD_RE.is_match(text) {
        params.pattern = Some(PatternSpec {
            kind,
            count: params.count,
            ..PatternSpec::default()
        });
    }

    let radius = first_f64(&[&RADIUS_BEFORE_RE, &RADIUS_AFTER_RE], text);
    match params.pattern.as_mut() {
        Some(pattern) if intent != Intent::Fillet => pattern.radius_mm = radius,
        _ => params.radius_mm = radius,
    }
}

fn extract_angles(text: &str, params: &mut Parameters) {
    if DRAFT_RE.is_match(text) {
        params.draft_angle_deg = DRAFT_ANGLE_RE.captures(text).and_then(|caps| {
            caps.get(1)
                .or_else(|| caps.get(2))
                .and_then(|m| parse_f64(m.as_str()))
        });
        if OUTWARD_RE.is_match(text) {
            params.draft_outward = Some(true);
        } else if INWARD_RE.is_match(text) {
            params.draft_outward = Some(false);
        }
        return;
    }

    let angle = first_f64(&[&ANGLE_RE], text);
    match params.pattern.as_mut() {
        Some(pattern) => pattern.angle_deg = angle,
        None => params.angle_deg = angle,
    }
}

fn extract_placement(text: &str, params: &mut Parameters) {
    if TOP_FACE_RE.is_match(text) {
        params.use_top_face = Some(true);
    } else if BOTTOM_FACE_RE.is_match(text) {
        params.use_top_face = Some(false);
    }

    if let Some(caps) = CENTER_AT_RE.captures(text) {
        params.center_x_mm = parse_f64(&caps[1]);
        params.center_y_mm = parse_f64(&caps[2]);
        params.center_z_mm = caps.get(3).and_then(|m| parse_f64(m.as_str()));
    } else {
        params.center_x_mm = first_f64(&[&CENTER_X_RE], text);
        params.center_y_mm = first_f64(&[&CENTER_Y_RE], text);
        params.center_z_mm = first_f64(&[&CENTER_Z_RE], text);
    }

    params.axis = AXIS_RE.captures(text).and_then(|caps| {
        caps.get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str().to_ascii_uppercase())
    });

    if MIDPLANE_RE.is_match(text) {
        params.extrude_midplane = Some(true);
    }
    if FLIP_RE.is_match(text) {
        params.flip_direction = Some(true);
    }
}

fn extract_modifiers(text: &str, intent: Intent, params: &mut Parameters) {
    let target = EDGE_TARGET_RE
        .captures(text)
        .map(|caps| format!("{}_edges", &caps[1]))
        .or_else(|| EDGE_RE.is_match(text).then(|| "all_edges".to_string()));

    match intent {
        Intent::Fillet => {
            params.fillet_target = target;
            if params.radius_mm.is_none() {
                params.radius_mm = first_f64(&[&FIRST_MM_RE], text);
            }
        }
        Intent::Chamfer => {
            params.chamfer_target = target;
            params.chamfer_distance_mm = first_f64(&[&CHAMFER_DISTANCE_RE, &FIRST_MM_RE], text);
        }
        _ => {}
    }
}

fn first_f64(rules: &[&LazyLock<Regex>], text: &str) -> Option<f64> {
    rules.iter().find_map(|re| {
        re.captures(text)
            .and_then(|caps| caps.get(1).and_then(|m| parse_f64(m.as_str())))
    })
}

fn parse_f64(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_count(raw: &str) -> Option<i64> {
    let word = match raw {
        "one" => 1,
        "two" => 2,
        "three" => 3,
        "four" => 4,
        "five" => 5,
        "six" => 6,
        "seven" => 7,
        "eight" => 8,
        "nine" => 9,
        "ten" => 10,
        "eleven" => 11,
        "twelve" => 12,
        digits => return digits.parse().ok(),
    };
    Some(word)
}

fn blank(text: &str, range: Option<std::ops::Range<usize>>) -> String {
    match range {
        Some(range) => {
            let mut out = String::with_capacity(text.len());
            out.push_str(&text[..range.start]);
            out.push_str(&" ".repeat(range.end - range.start));
            out.push_str(&text[range.end..]);
            out
        }
        None => text.to_string(),
    }
}
