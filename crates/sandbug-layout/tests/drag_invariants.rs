//! Property-style invariants for drag sequences.
//!
//! Random gesture streams (resizer choice, pointer paths, layout switches)
//! are replayed against the public engine API and every panel is
//! checked against the minimum size after each move.

use std::time::Duration;

use proptest::prelude::*;
use sandbug_layout::{
    LayoutConfig, LayoutKind, PanelId, PanelLayoutEngine, Point, Rect, ResizerId,
};

const MIN: f64 = 40.0;
const EPSILON: f64 = 1e-6;

#[derive(Debug, Clone)]
enum Step {
    Drag { resizer: ResizerId, path: Vec<f64> },
    Cancel { resizer: ResizerId, path: Vec<f64> },
    Cycle,
}

fn resizer_strategy() -> impl Strategy<Value = ResizerId> {
    prop_oneof![
        Just(ResizerId::Input(0)),
        Just(ResizerId::Input(1)),
        Just(ResizerId::Master),
    ]
}

fn step_strategy() -> impl Strategy<Value = Step> {
    prop_oneof![
        6 => (resizer_strategy(), prop::collection::vec(-3000.0f64..3000.0, 1..12))
            .prop_map(|(resizer, path)| Step::Drag { resizer, path }),
        2 => (resizer_strategy(), prop::collection::vec(-3000.0f64..3000.0, 1..4))
            .prop_map(|(resizer, path)| Step::Cancel { resizer, path }),
        1 => Just(Step::Cycle),
    ]
}

fn layout_strategy() -> impl Strategy<Value = LayoutKind> {
    prop_oneof![
        Just(LayoutKind::Columns),
        Just(LayoutKind::Top),
        Just(LayoutKind::Left),
    ]
}

fn assert_min_sizes(engine: &PanelLayoutEngine) {
    let rects = engine.panel_rects();
    let layout = engine.layout();
    for id in PanelId::INPUTS {
        let extent = rects.panels[&id].extent(layout.input_axis());
        assert!(extent >= MIN - EPSILON, "{id} shrank to {extent}");
    }
    let output = rects.panels[&PanelId::Output].extent(layout.master_axis());
    assert!(output >= MIN - EPSILON, "output shrank to {output}");
    let group = rects.input_group.extent(layout.master_axis());
    assert!(group >= MIN - EPSILON, "input group shrank to {group}");
}

proptest! {
    #[test]
    fn drags_never_shrink_panels_below_minimum(
        layout in layout_strategy(),
        width in 600.0f64..2400.0,
        height in 400.0f64..1600.0,
        steps in prop::collection::vec(step_strategy(), 1..24),
    ) {
        let mut engine = PanelLayoutEngine::new(LayoutConfig {
            min_panel_size: MIN,
            initial_layout: layout,
            ..LayoutConfig::default()
        })
        .expect("config is valid");
        engine.set_container(Rect::from_size(width, height));
        let mut now = Duration::ZERO;

        for step in steps {
            now += Duration::from_millis(1000);
            engine.tick(now);
            match step {
                Step::Drag { resizer, path } => {
                    let axis = engine.resizer(resizer).expect("resizer exists").axis;
                    let origin = engine.panel_rects().input_group.extent(axis) / 2.0;
                    let start = Point::new(origin, origin);
                    engine.begin_drag(resizer, start).expect("no drag in progress");
                    for offset in path {
                        engine
                            .drag_move(Point::new(origin + offset, origin + offset))
                            .expect("drag active");
                        assert_min_sizes(&engine);
                    }
                    engine.end_drag().expect("drag active");
                }
                Step::Cancel { resizer, path } => {
                    let before = engine.panel_rects();
                    engine.begin_drag(resizer, Point::new(0.0, 0.0)).expect("no drag in progress");
                    for offset in path {
                        engine.drag_move(Point::new(offset, offset)).expect("drag active");
                    }
                    engine.cancel_drag().expect("drag active");
                    prop_assert_eq!(engine.panel_rects(), before);
                }
                Step::Cycle => {
                    prop_assert!(engine.cycle_layout(now));
                    engine.tick(now + Duration::from_millis(500));
                    now += Duration::from_millis(500);
                }
            }
            assert_min_sizes(&engine);
        }
    }

    #[test]
    fn opposite_offsets_always_cancel(
        path in prop::collection::vec(-800.0f64..800.0, 1..16),
    ) {
        let mut engine = PanelLayoutEngine::new(LayoutConfig::default()).expect("valid");
        engine.set_container(Rect::from_size(1200.0, 800.0));
        engine.begin_drag(ResizerId::Input(1), Point::new(600.0, 0.0)).expect("idle");
        for x in path {
            engine.drag_move(Point::new(600.0 + x, 0.0)).expect("dragging");
            let style = engine.offset(sandbug_layout::LayoutNode::Panel(PanelId::Style));
            let script = engine.offset(sandbug_layout::LayoutNode::Panel(PanelId::Script));
            prop_assert!((style + script).abs() < EPSILON);
        }
    }
}
