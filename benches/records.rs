use std::sync::Arc;

use criterion::{
    criterion_group, criterion_main, AxisScale, BenchmarkId, Criterion, PlotConfiguration,
    Throughput,
};
use zarrs_dataset::{
    chunked_dataset::{append_record, create_chunked_dataset, read_record, RecordCapacity},
    group::Group,
    storage::store::MemoryStore,
    unique_dataset::{read_unique_dataset_at, write_unique_dataset_at},
};

fn records_append_read(c: &mut Criterion) {
    let plot_config = PlotConfiguration::default().summary_scale(AxisScale::Logarithmic);
    let mut group = c.benchmark_group("records");
    group.plot_config(plot_config);

    for size in [16usize, 256, 4096] {
        let record: Vec<f32> = (0..size).map(|i| i as f32).collect();
        group.throughput(Throughput::Bytes((size * std::mem::size_of::<f32>()) as u64));
        group.bench_function(BenchmarkId::new("append", size), |b| {
            let root = Group::root(Arc::new(MemoryStore::new()));
            let dataset =
                create_chunked_dataset::<Vec<f32>, _>(&root, "records", &size, RecordCapacity::Unlimited)
                    .unwrap();
            b.iter(|| append_record(&dataset, &record).unwrap());
        });
        group.bench_function(BenchmarkId::new("read", size), |b| {
            let root = Group::root(Arc::new(MemoryStore::new()));
            let dataset =
                create_chunked_dataset::<Vec<f32>, _>(&root, "records", &size, RecordCapacity::Unlimited)
                    .unwrap();
            append_record(&dataset, &record).unwrap();
            let mut out = Vec::<f32>::new();
            b.iter(|| read_record(&dataset, &mut out, -1).unwrap());
        });
    }
    group.finish();
}

fn unique_write_read(c: &mut Criterion) {
    let plot_config = PlotConfiguration::default().summary_scale(AxisScale::Logarithmic);
    let mut group = c.benchmark_group("unique");
    group.plot_config(plot_config);

    for size in [8usize, 1024, 65536] {
        let values: Vec<u16> = (0..size).map(|i| (i % 1000) as u16).collect();
        group.throughput(Throughput::Bytes((size * std::mem::size_of::<u16>()) as u64));
        let root = Group::root(Arc::new(MemoryStore::new()));
        group.bench_function(BenchmarkId::new("write", size), |b| {
            b.iter(|| write_unique_dataset_at(&root, "values", &values).unwrap());
        });
        group.bench_function(BenchmarkId::new("read", size), |b| {
            let mut out = Vec::<u16>::new();
            b.iter(|| read_unique_dataset_at(&root, "values", &mut out).unwrap());
        });
    }
    group.finish();
}

criterion_group!(benches, records_append_read, unique_write_read);
criterion_main!(benches);
