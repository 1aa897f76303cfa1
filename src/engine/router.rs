//! engine::router
//!
//! Ordered predicate dispatch from an [`Operation`] to a [`HandlerKind`].
//!
//! # Architecture
//!
//! Routing is a closed, ordered table of [`RouteRule`]s. Each rule is a pure
//! predicate over the operation; the first one that matches wins. There is
//! no string-keyed lookup, and an operation that matches nothing routes to
//! [`Route::Unhandled`], which is non-fatal.
//!
//! | Order | Kind     | Matches when |
//! |-------|----------|--------------|
//! | 1     | fillet   | action is `fillet`, or shape is `fillet`, or `fillet_target` is set with no shape |
//! | 2     | plate    | shape contains `plate`, `rect`, `block`, `box` or `cube` |
//! | 3     | cylinder | shape contains `cylinder`, `rod`, `shaft`, `disc` or `disk` |
//! | 4     | hole     | action is `create_hole`, or a pattern descriptor is present |
//! | 5     | chamfer  | action is `chamfer`, or shape is `chamfer`, or `chamfer_target` is set with no shape |
//!
//! Because the shape rules come before the hole rule, an operation tagged
//! `shape: "plate"` with a pattern routes to the plate handler.

use tracing::debug;

use crate::core::operation::{Action, Operation};
use crate::handlers::HandlerKind;

/// Where an operation goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Handler(HandlerKind),
    Unhandled,
}

/// One row of the dispatch table.
pub struct RouteRule {
    pub kind: HandlerKind,
    pub name: &'static str,
    pub matches: fn(&Operation) -> bool,
}

const PLATE_WORDS: &[&str] = &["plate", "rect", "block", "box", "cube"];
const CYLINDER_WORDS: &[&str] = &["cylinder", "rod", "shaft", "disc", "disk"];

/// The dispatch table, in evaluation order.
pub static ROUTE_TABLE: &[RouteRule] = &[
    RouteRule {
        kind: HandlerKind::Fillet,
        name: "fillet",
        matches: is_fillet,
    },
    RouteRule {
        kind: HandlerKind::Plate,
        name: "plate family",
        matches: is_plate,
    },
    RouteRule {
        kind: HandlerKind::Cylinder,
        name: "cylinder family",
        matches: is_cylinder,
    },
    RouteRule {
        kind: HandlerKind::Hole,
        name: "hole or pattern",
        matches: is_hole,
    },
    RouteRule {
        kind: HandlerKind::Chamfer,
        name: "chamfer",
        matches: is_chamfer,
    },
];

fn shape(op: &Operation) -> Option<String> {
    op.parameters().shape_tag().map(str::to_lowercase)
}

fn shape_contains(op: &Operation, words: &[&str]) -> bool {
    shape(op).is_some_and(|s| words.iter().any(|w| s.contains(w)))
}

fn edge_modifier(op: &Operation, action: Action, name: &str, target: Option<&String>) -> bool {
    if op.action() == action {
        return true;
    }
    match shape(op) {
        Some(s) => s == name,
        None => target.is_some_and(|t| !t.trim().is_empty()),
    }
}

fn is_fillet(op: &Operation) -> bool {
    edge_modifier(
        op,
        Action::Fillet,
        "fillet",
        op.parameters().fillet_target.as_ref(),
    )
}

fn is_plate(op: &Operation) -> bool {
    shape_contains(op, PLATE_WORDS)
}

fn is_cylinder(op: &Operation) -> bool {
    shape_contains(op, CYLINDER_WORDS)
}

fn is_hole(op: &Operation) -> bool {
    op.action() == Action::CreateHole || op.parameters().pattern.is_some()
}

fn is_chamfer(op: &Operation) -> bool {
    edge_modifier(
        op,
        Action::Chamfer,
        "chamfer",
        op.parameters().chamfer_target.as_ref(),
    )
}

/// Select the handler family for `op`.
pub fn route(op: &Operation) -> Route {
    for rule in ROUTE_TABLE {
        if (rule.matches)(op) {
            debug!(rule = rule.name, action = %op.action(), "route chosen");
            return Route::Handler(rule.kind);
        }
    }
    debug!(action = %op.action(), "no route matched");
    Route::Unhandled
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::operation::{Parameters, PatternSpec};

    fn with_shape(action: Action, shape: &str) -> Operation {
        Operation::new(
            action,
            Parameters {
                shape: Some(shape.to_string()),
                ..Parameters::default()
            },
        )
    }

    mod rules {
        use super::*;

        #[test]
        fn fillet_action_without_shape() {
            let op = Operation::new(
                Action::Fillet,
                Parameters {
                    radius_mm: Some(2.0),
                    ..Parameters::default()
                },
            );
            assert_eq!(route(&op), Route::Handler(HandlerKind::Fillet));
        }

        #[test]
        fn fillet_target_with_empty_shape() {
            let op = Operation::new(
                Action::Unknown,
                Parameters {
                    shape: Some("  ".to_string()),
                    fillet_target: Some("top_edges".to_string()),
                    ..Parameters::default()
                },
            );
            assert_eq!(route(&op), Route::Handler(HandlerKind::Fillet));
        }

        #[test]
        fn plate_family_by_substring() {
            for shape in ["base_plate", "rectangle", "block", "BOX", "cube"] {
                let op = with_shape(Action::CreateFeature, shape);
                assert_eq!(route(&op), Route::Handler(HandlerKind::Plate), "{}", shape);
            }
        }

        #[test]
        fn cylinder_family_by_substring() {
            for shape in ["cylinder", "rod", "shaft", "disc", "disk"] {
                let op = with_shape(Action::Extrude, shape);
                assert_eq!(route(&op), Route::Handler(HandlerKind::Cylinder), "{}", shape);
            }
        }

        #[test]
        fn hole_by_action_or_pattern() {
            let hole = Operation::new(Action::CreateHole, Parameters::default());
            assert_eq!(route(&hole), Route::Handler(HandlerKind::Hole));

            let patterned = Operation::new(
                Action::Pattern,
                Parameters {
                    pattern: Some(PatternSpec {
                        count: Some(6),
                        ..PatternSpec::default()
                    }),
                    ..Parameters::default()
                },
            );
            assert_eq!(route(&patterned), Route::Handler(HandlerKind::Hole));
        }

        #[test]
        fn chamfer_action() {
            let op = Operation::new(Action::Chamfer, Parameters::default());
            assert_eq!(route(&op), Route::Handler(HandlerKind::Chamfer));
        }

        #[test]
        fn chamfer_target_without_shape() {
            let op = Operation::new(
                Action::Unknown,
                Parameters {
                    chamfer_target: Some("all_edges".to_string()),
                    ..Parameters::default()
                },
            );
            assert_eq!(route(&op), Route::Handler(HandlerKind::Chamfer));
        }
    }

    mod ordering {
        use super::*;

        #[test]
        fn shape_beats_pattern() {
            let op = Operation::new(
                Action::CreateHole,
                Parameters {
                    shape: Some("plate".to_string()),
                    pattern: Some(PatternSpec {
                        count: Some(4),
                        ..PatternSpec::default()
                    }),
                    ..Parameters::default()
                },
            );
            assert_eq!(route(&op), Route::Handler(HandlerKind::Plate));
        }

        #[test]
        fn fillet_beats_plate() {
            let op = with_shape(Action::Fillet, "plate");
            assert_eq!(route(&op), Route::Handler(HandlerKind::Fillet));
        }

        #[test]
        fn fillet_target_ignored_when_shape_present() {
            let op = Operation::new(
                Action::CreateFeature,
                Parameters {
                    shape: Some("plate".to_string()),
                    fillet_target: Some("top_edges".to_string()),
                    ..Parameters::default()
                },
            );
            assert_eq!(route(&op), Route::Handler(HandlerKind::Plate));
        }

        #[test]
        fn table_order_is_documented_order() {
            let kinds: Vec<HandlerKind> = ROUTE_TABLE.iter().map(|r| r.kind).collect();
            assert_eq!(
                kinds,
                vec![
                    HandlerKind::Fillet,
                    HandlerKind::Plate,
                    HandlerKind::Cylinder,
                    HandlerKind::Hole,
                    HandlerKind::Chamfer,
                ]
            );
        }
    }

    #[test]
    fn unknown_is_unhandled() {
        assert_eq!(route(&Operation::unknown()), Route::Unhandled);
    }

    #[test]
    fn unrecognized_shape_is_unhandled() {
        let op = with_shape(Action::CreateFeature, "sphere");
        assert_eq!(route(&op), Route::Unhandled);
    }
}
