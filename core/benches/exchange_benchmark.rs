use criterion::{Criterion, criterion_group, criterion_main};
use halo_life::{ExchangeMode, LifeConfig, run};
use std::hint::black_box;

fn benchmark_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("run");
    group.sample_size(20);
    let shard_counts = [1, 2, 4, 8];

    for mode in [ExchangeMode::Synchronous, ExchangeMode::Asynchronous] {
        for &shards in &shard_counts {
            let config = LifeConfig::new(256, 256)
                .with_generations(20)
                .with_mode(mode)
                .with_seed(1);

            group.bench_function(format!("{:?}/{}", mode, shards), |b| {
                b.iter(|| run(black_box(&config), shards).unwrap())
            });
        }
    }
    group.finish();
}

criterion_group!(benches, benchmark_run);
criterion_main!(benches);
