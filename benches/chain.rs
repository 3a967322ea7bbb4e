use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use triode_core::{StageChain, TriodeStage, TubeType};

const SAMPLE_RATE: f64 = 48000.0;
const BUFFER_SIZE: usize = 128;

fn test_signal(len: usize) -> Vec<f32> {
    (0..len)
        .map(|i| 0.5 * (2.0 * std::f32::consts::PI * 440.0 * i as f32 / SAMPLE_RATE as f32).sin())
        .collect()
}

fn bench_single_stage(c: &mut Criterion) {
    let mut group = c.benchmark_group("Single Stage");
    group.throughput(Throughput::Elements(BUFFER_SIZE as u64));

    for tube in TubeType::ALL {
        group.bench_with_input(BenchmarkId::new("f32", tube), &tube, |b, &tube| {
            let mut stage = TriodeStage::<f32>::new(tube);
            stage.set_sample_rate(SAMPLE_RATE);
            stage.setup().unwrap();
            let input = test_signal(BUFFER_SIZE);
            let mut output = vec![0.0f32; BUFFER_SIZE];

            b.iter(|| {
                stage.process_buffer(&[black_box(&input[..])], &mut [&mut output[..]], BUFFER_SIZE);
                black_box(&output);
            });
        });

        group.bench_with_input(BenchmarkId::new("f64", tube), &tube, |b, &tube| {
            let mut stage = TriodeStage::<f64>::new(tube);
            stage.set_sample_rate(SAMPLE_RATE);
            stage.setup().unwrap();
            let input: Vec<f64> = test_signal(BUFFER_SIZE).into_iter().map(f64::from).collect();
            let mut output = vec![0.0f64; BUFFER_SIZE];

            b.iter(|| {
                stage.process_buffer(&[black_box(&input[..])], &mut [&mut output[..]], BUFFER_SIZE);
                black_box(&output);
            });
        });
    }

    group.finish();
}

fn bench_chain_length(c: &mut Criterion) {
    let mut group = c.benchmark_group("Chain Length");
    group.throughput(Throughput::Elements(BUFFER_SIZE as u64));

    for stages in [1usize, 2, 3, 4] {
        group.bench_with_input(BenchmarkId::from_parameter(stages), &stages, |b, &stages| {
            let tubes = vec![TubeType::Ecc83; stages];
            let mut chain = StageChain::<f32>::with_tubes(&tubes, SAMPLE_RATE).unwrap();
            let input = test_signal(BUFFER_SIZE);
            let mut output = vec![0.0f32; BUFFER_SIZE];

            b.iter(|| {
                chain.process_buffer(black_box(&input), &mut output);
                black_box(&output);
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_single_stage, bench_chain_length);
criterion_main!(benches);
