use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use nou_math::Vec3;
use nou_scene::Hierarchy;
use std::hint::black_box;

/// Build `width` chains of `length` nodes each
fn create_test_scene(width: usize, length: usize) -> Hierarchy {
    let mut scene = Hierarchy::new();
    for w in 0..width {
        let mut parent = scene.create(format!("chain{w}"));
        for l in 0..length {
            let child = scene.create_child(format!("chain{w}_{l}"), parent).unwrap();
            scene
                .transform_mut(child)
                .unwrap()
                .set_local_position(Vec3::new(0.0, 1.0, 0.0))
                .rotate_local(Vec3::new(0.0, 5.0, 0.0));
            parent = child;
        }
    }
    scene
}

fn bench_recompute_global(c: &mut Criterion) {
    let mut group = c.benchmark_group("recompute_global");
    for (width, length) in [(1, 64), (16, 16), (64, 64)] {
        let mut scene = create_test_scene(width, length);
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{width}x{length}")),
            &(),
            |b, ()| b.iter(|| black_box(&mut scene).recompute_global()),
        );
    }
    group.finish();
}

fn bench_reparent(c: &mut Criterion) {
    let mut scene = create_test_scene(16, 16);
    let a = scene.find_by_name("chain0_3").unwrap();
    let b = scene.find_by_name("chain1_3").unwrap();
    let moving = scene.find_by_name("chain0_4").unwrap();

    c.bench_function("reparent_subtree", |bench| {
        let mut flip = false;
        bench.iter(|| {
            let target = if flip { a } else { b };
            flip = !flip;
            scene.set_parent(moving, Some(target)).unwrap();
        })
    });
}

criterion_group!(benches, bench_recompute_global, bench_reparent);
criterion_main!(benches);
