#![forbid(unsafe_code)]

use std::fmt::Write as _;
use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use sandbug_layout::{LayoutConfig, PanelLayoutEngine, Point, Rect, ResizerId};
use sandbug_web::{PointerButton, ResizerPointerAdapter, diff, parse_fragment};

fn list_markup(items: usize, edited: Option<usize>) -> String {
    let mut html = String::from("<main><ul class=\"items\">");
    for i in 0..items {
        let label = if Some(i) == edited { "edited" } else { "item" };
        let _ = write!(html, "<li data-i=\"{i}\"><span>{label} {i}</span></li>");
    }
    html.push_str("</ul></main>");
    html
}

fn bench_dom_patch(c: &mut Criterion) {
    let mut group = c.benchmark_group("preview/dom_patch");
    let old = list_markup(200, None);
    let new = list_markup(200, Some(117));

    group.bench_function("parse_200_items", |b| {
        b.iter(|| black_box(parse_fragment(black_box(&old))));
    });

    let old_tree = parse_fragment(&old);
    let new_tree = parse_fragment(&new);
    group.bench_function("diff_one_text_edit", |b| {
        b.iter(|| black_box(diff(black_box(&old_tree), black_box(&new_tree))));
    });

    group.finish();
}

fn bench_resizer_drag(c: &mut Criterion) {
    let mut group = c.benchmark_group("preview/resizer_pointer");

    group.bench_function("down_ack_move_120_up", |b| {
        b.iter(|| {
            let mut engine = PanelLayoutEngine::new(LayoutConfig::default())
                .expect("default layout config should be valid");
            engine.set_container(Rect::from_size(1600.0, 900.0));
            let mut adapter = ResizerPointerAdapter::default();

            let down = adapter.pointer_down(
                &mut engine,
                ResizerId::Input(0),
                7,
                PointerButton::Primary,
                Point::new(400.0, 10.0),
            );
            black_box(down.log.sequence);
            adapter.capture_acquired(7);
            for step in 0..120 {
                let x = 400.0 + f64::from(step % 40) * 3.0 - 60.0;
                let dispatch = adapter.pointer_move(&mut engine, 7, Point::new(x, 10.0));
                black_box(dispatch.effect);
            }
            let up = adapter.pointer_up(
                &mut engine,
                7,
                PointerButton::Primary,
                Point::new(420.0, 10.0),
            );
            black_box(up.capture_command);
            black_box(engine.styles());
        });
    });

    group.finish();
}

criterion_group!(benches, bench_dom_patch, bench_resizer_drag);
criterion_main!(benches);
