mod common;

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use presence_map::config::DEFAULT_MIN_MASK_HEIGHT;
use presence_map::mask::{mask_height_for, Mask};

const WIDTHS: [u32; 3] = [300, 900, 1800];

fn mask_build_benches(c: &mut Criterion) {
    let boundaries = [
        ("star_12", common::star_boundary(12)),
        ("star_180", common::star_boundary(180)),
        ("ring", common::ring_boundary()),
    ];

    for (name, boundary) in &boundaries {
        let mut group = c.benchmark_group(format!("mask/build/{name}"));

        for &width in &WIDTHS {
            let height = mask_height_for(boundary.view_box(), width, DEFAULT_MIN_MASK_HEIGHT);
            group.throughput(common::elements_throughput((width * height) as usize));

            group.bench_with_input(BenchmarkId::from_parameter(width), &width, |b, &width| {
                b.iter(|| {
                    let mask = Mask::build(boundary, width, DEFAULT_MIN_MASK_HEIGHT)
                        .expect("mask builds");
                    black_box(mask.occupied_cells());
                });
            });
        }

        group.finish();
    }
}

criterion_group! {
    name = benches;
    config = common::default_criterion();
    targets = mask_build_benches
}
criterion_main!(benches);
