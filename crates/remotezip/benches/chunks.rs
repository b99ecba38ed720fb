use bytes::Bytes;
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use remotezip::{ChunkCache, RangeReader, RangeSource};
use std::io::{Read, Seek, SeekFrom};

fn bench_cached_small_reads(c: &mut Criterion) {
    let mut group = c.benchmark_group("chunk_cache");
    group.sample_size(50);
    group.throughput(Throughput::Elements(1));

    group.bench_function("read_64b_cached", |b| {
        let data = Bytes::from(vec![b'x'; 4 * 1024 * 1024]);
        let cache = ChunkCache::new(data, 256 * 1024, 64);
        let mut buf = [0u8; 64];

        // Warm every chunk
        for chunk in 0..16u64 {
            cache.read_at(&mut buf, chunk * 256 * 1024).unwrap();
        }

        let mut counter = 0u64;
        b.iter(|| {
            let offset = (counter * 4099) % (4 * 1024 * 1024 - 64);
            black_box(cache.read_at(&mut buf, offset).unwrap());
            counter += 1;
        });
    });

    group.finish();
}

fn bench_reader_seek_read(c: &mut Criterion) {
    let mut group = c.benchmark_group("range_reader");
    group.sample_size(50);
    group.throughput(Throughput::Elements(1));

    group.bench_function("seek_read_4kb", |b| {
        let data = Bytes::from(vec![b'y'; 1024 * 1024]);
        let mut reader = RangeReader::new(ChunkCache::new(data, 64 * 1024, 4));
        let mut buf = vec![0u8; 4096];

        let mut counter = 0u64;
        b.iter(|| {
            let offset = (counter * 65_537) % (1024 * 1024 - 4096);
            reader.seek(SeekFrom::Start(offset)).unwrap();
            reader.read_exact(&mut buf).unwrap();
            black_box(&buf);
            counter += 1;
        });
    });

    group.finish();
}

criterion_group!(benches, bench_cached_small_reads, bench_reader_seek_read);
criterion_main!(benches);
