use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use map_runtime::TerrainRuleset;
use mapgen_core::{
    fractal_height_field, generate_map, GeneratorMode, HeightNoiseOptions, MapGenSettings, MapRng,
};

fn bench_generate(c: &mut Criterion) {
    let ruleset = TerrainRuleset::builtin();
    let mut group = c.benchmark_group("generate");

    for mode in [GeneratorMode::Standard, GeneratorMode::Fracture] {
        let settings = MapGenSettings {
            generator: mode,
            ..Default::default()
        };
        for size in [32u32, 64, 128] {
            let field = fractal_height_field(size, size, 11, &HeightNoiseOptions::default())
                .expect("bench field");
            let id = BenchmarkId::new(format!("{mode:?}").to_lowercase(), size);
            group.bench_with_input(id, &size, |b, _| {
                b.iter_batched(
                    || MapRng::seed_from_u64(11),
                    |mut rng| generate_map(&field, &settings, &ruleset, &mut rng).expect("generate"),
                    BatchSize::SmallInput,
                )
            });
        }
    }

    group.finish();
}

fn bench_height_field(c: &mut Criterion) {
    c.bench_function("height_field/128", |b| {
        b.iter(|| fractal_height_field(128, 128, 5, &HeightNoiseOptions::default()).expect("field"))
    });
}

criterion_group!(generate_benches, bench_generate, bench_height_field);
criterion_main!(generate_benches);
