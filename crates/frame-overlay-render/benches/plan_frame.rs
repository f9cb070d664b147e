use criterion::{black_box, criterion_group, criterion_main, Criterion};
use frame_overlay_core::{BoxSpec, Detection, FrameGeometry};
use frame_overlay_render::{CategoryPalette, OverlayOptions, OverlayRenderer, RecordingSurface};

fn detections(n: usize) -> Vec<Detection> {
    (0..n)
        .map(|i| {
            let x = (i % 20) as f64 * 5.0;
            let y = (i / 20 % 20) as f64 * 5.0;
            let confidence = 0.5 + (i % 50) as f64 / 100.0;
            Detection::new("Signage", confidence, BoxSpec::percentage(x, y, 4.0, 4.0))
                .with_condition(if i % 3 == 0 { "broken" } else { "good" })
        })
        .collect()
}

fn bench_plan(c: &mut Criterion) {
    let geometry = FrameGeometry::new(1920.0, 1080.0, 1280.0, 960.0);
    let metrics = RecordingSurface::new();

    for (name, options) in [
        ("plan_200_labels", OverlayOptions::comparison_popup()),
        ("plan_200_video", OverlayOptions::video_marker()),
    ] {
        let renderer = OverlayRenderer::new(options, CategoryPalette::road_assets());
        let dets = detections(200);
        c.bench_function(name, |b| {
            b.iter(|| {
                let plan = renderer
                    .plan(&metrics, black_box(&geometry), black_box(&dets))
                    .expect("valid geometry");
                black_box(plan.commands.len())
            })
        });
    }
}

criterion_group!(benches, bench_plan);
criterion_main!(benches);
