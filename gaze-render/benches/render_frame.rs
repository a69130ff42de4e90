use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use gaze_core::Position;
use gaze_render::{Scene, SceneRenderer, Sprite};
use gaze_timing::HighPrecisionTimer;

const WIDTH: u32 = 1280;
const HEIGHT: u32 = 720;

fn harness(scene: &Scene) -> (SceneRenderer, Vec<u8>, HighPrecisionTimer) {
    let r = SceneRenderer::new(WIDTH, HEIGHT, scene).expect("renderer");
    let fb = vec![0u8; (WIDTH * HEIGHT * 4) as usize];
    (r, fb, HighPrecisionTimer::new())
}

pub fn bench_frames(c: &mut Criterion) {
    let mut g = c.benchmark_group("render_frame");
    g.sample_size(40);

    g.bench_function("drift_target_moving", |b| {
        let mut scene = Scene {
            drift_target: Some(Position::new(640.0, 360.0)),
            recording: true,
            ..Scene::default()
        };
        let (mut r, mut fb, timer) = harness(&scene);
        let mut x = 0.0;
        b.iter(|| {
            x = (x + 7.0) % WIDTH as f64;
            scene.drift_target = Some(Position::new(x, 360.0));
            black_box(r.render_frame(&scene, &mut fb, &timer).expect("frame"));
        })
    });

    g.bench_function("first_frame", |b| {
        let scene = Scene {
            fixation_cross: true,
            ..Scene::default()
        };
        b.iter_batched(
            || harness(&scene),
            |(mut r, mut fb, timer)| {
                black_box(r.render_frame(&scene, &mut fb, &timer).expect("frame"));
            },
            BatchSize::LargeInput,
        )
    });

    g.bench_function("blit_fixation_cross", |b| {
        let (mut r, _, _) = harness(&Scene::default());
        b.iter(|| r.blit_sprite(Sprite::FixationCross, black_box((640.0, 360.0))))
    });

    g.finish();
}

criterion_group!(benches, bench_frames);
criterion_main!(benches);
