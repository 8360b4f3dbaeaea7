use criterion::{criterion_group, criterion_main, Criterion};
use rating_engine::{
    config::EngineConfig,
    model::{processor::RatingProcessor, recalculation::RecalculationPipeline},
    utils::test_utils::{generate_matches, generate_players}
};

fn recalculate(count_players: i32, count_matches: i32) {
    let players = generate_players(count_players);
    let matches = generate_matches(count_matches, &players);

    RecalculationPipeline::new().run(&players, &matches);
}

fn process(count_players: i32, count_matches: i32) {
    let players = generate_players(count_players);
    let matches = generate_matches(count_matches, &players);

    RatingProcessor::new(EngineConfig::default()).process(&players, &matches, None, true);
}

fn group_call(c: &mut Criterion) {
    let mut group = c.benchmark_group("recalculation");
    group.sample_size(25);
    group.bench_function("recalculate: p=20,m=200", |b| b.iter(|| recalculate(20, 200)));
    group.bench_function("recalculate: p=100,m=1000", |b| b.iter(|| recalculate(100, 1000)));
    group.bench_function("process: p=50,m=500", |b| b.iter(|| process(50, 500)));
    group.finish();
}

criterion_group!(benches, group_call);
criterion_main!(benches);
