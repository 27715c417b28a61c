use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use nvmkit_3d::{geometry, io::nvm};

// synthetic model with a fixed number of views per point
fn make_nvm(num_cameras: usize, num_points: usize) -> String {
    let mut content = format!("NVM_V3\n\n{num_cameras}\n");
    for i in 0..num_cameras {
        let a = i as f64 * 0.1;
        content.push_str(&format!(
            "img_{i:05}.jpg 1234.5 {} {} {} 0.1 {a} {} 1.0 -0.02 0\n",
            a.cos(),
            a.sin(),
            0.3,
            -a
        ));
    }
    content.push_str(&format!("\n{num_points}\n"));
    for j in 0..num_points {
        content.push_str(&format!("{j}.5 -{j}.25 3.0 120 64 200 3"));
        for k in 0..3 {
            content.push_str(&format!(" {} {} 12.5 -4.75", (j + k) % num_cameras, j * 3 + k));
        }
        content.push('\n');
    }
    content
}

fn bench_read_nvm(c: &mut Criterion) {
    let mut group = c.benchmark_group("read_nvm");

    for (num_cameras, num_points) in [(10, 1_000), (100, 10_000), (500, 100_000)].iter() {
        let content = make_nvm(*num_cameras, *num_points);
        let parameter_string = format!("{num_cameras}x{num_points}");

        group.bench_with_input(
            BenchmarkId::new("read_nvm_from_reader", &parameter_string),
            &content,
            |b, content| {
                b.iter(|| {
                    let model = nvm::read_nvm_from_reader(black_box(content.as_bytes()));
                    black_box(model)
                })
            },
        );
    }

    group.finish();
}

fn bench_world_matrix(c: &mut Criterion) {
    let content = make_nvm(1_000, 0);
    let model = match nvm::read_nvm_from_reader(content.as_bytes()) {
        Ok(model) => model,
        Err(e) => panic!("failed to build benchmark model: {e}"),
    };

    c.bench_function("world_matrix", |b| {
        b.iter(|| {
            for camera in model.cameras.iter() {
                black_box(geometry::world_matrix(black_box(camera)));
            }
        })
    });
}

criterion_group!(benches, bench_read_nvm, bench_world_matrix);
criterion_main!(benches);
