#![no_main]

use std::time::Duration;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use sandbug_layout::{
    LayoutConfig, LayoutKind, PanelId, PanelLayoutEngine, Point, Rect, ResizerId,
};

#[derive(Debug, Arbitrary)]
enum Step {
    Begin { resizer: u8, x: i16, y: i16 },
    Move { x: i16, y: i16 },
    End,
    Cancel,
    Reset { resizer: u8, with_resizer: bool },
    SetLayout { layout: u8, immediate: bool },
    Resize { width: u16, height: u16 },
    Tick { ms: u16 },
}

#[derive(Debug, Arbitrary)]
struct Input {
    min_size: u8,
    steps: Vec<Step>,
}

fn resizer(raw: u8) -> ResizerId {
    match raw % 3 {
        0 => ResizerId::Input(0),
        1 => ResizerId::Input(1),
        _ => ResizerId::Master,
    }
}

fuzz_target!(|input: Input| {
    let config = LayoutConfig {
        min_panel_size: f64::from(input.min_size),
        ..LayoutConfig::default()
    };
    let Ok(mut engine) = PanelLayoutEngine::new(config) else {
        return;
    };
    engine.set_container(Rect::from_size(1200.0, 800.0));
    let mut now = Duration::ZERO;

    for step in input.steps.into_iter().take(256) {
        match step {
            Step::Begin { resizer: raw, x, y } => {
                let _ = engine.begin_drag(resizer(raw), Point::new(f64::from(x), f64::from(y)));
            }
            Step::Move { x, y } => {
                let _ = engine.drag_move(Point::new(f64::from(x), f64::from(y)));
            }
            Step::End => {
                let _ = engine.end_drag();
            }
            Step::Cancel => {
                let _ = engine.cancel_drag();
            }
            Step::Reset {
                resizer: raw,
                with_resizer,
            } => {
                let _ = engine.reset_panel_pair(resizer(raw), with_resizer, now);
            }
            Step::SetLayout { layout, immediate } => {
                let kind = LayoutKind::CYCLE[usize::from(layout) % LayoutKind::CYCLE.len()];
                engine.set_layout(kind, immediate, now);
            }
            Step::Resize { width, height } => {
                engine.set_container(Rect::from_size(f64::from(width), f64::from(height)));
            }
            Step::Tick { ms } => {
                now += Duration::from_millis(u64::from(ms));
                engine.tick(now);
            }
        }

        // Never more than one drag, and never resizers mid-transition.
        assert!(!(engine.is_transitioning() && engine.is_dragging()));
        assert!(!engine.is_transitioning() || engine.resizers().is_empty());
        for id in PanelId::ALL {
            let rect = engine.panel_rects().panels[&id];
            assert!(rect.width.is_finite() && rect.height.is_finite());
        }
        let _ = engine.styles();
        engine.drain_events().for_each(drop);
    }
});
