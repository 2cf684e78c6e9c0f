/*!
 * Ring Buffer Benchmarks
 *
 * Throughput of the SPSC queue hot path: paired send/recv and the
 * full transaction codec round trip
 */

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::{Rng, SeedableRng};
use shmlink::{
    recv_transaction, send_transaction, EndpointConfig, Packet, RingBuffer, RxEndpoint,
    Transaction, TxEndpoint,
};

fn scratch_queue(tag: &str) -> String {
    let dir = std::env::temp_dir().join(format!("shmlink-bench-{}", std::process::id()));
    let _ = std::fs::create_dir_all(&dir);
    dir.join(tag).to_string_lossy().into_owned()
}

fn bench_send_recv(c: &mut Criterion) {
    let mut group = c.benchmark_group("send_recv");

    for capacity in [16usize, 256, 4096] {
        let name = scratch_queue(&format!("ring{}", capacity));
        let _ = RingBuffer::delete(&name);
        let mut producer = RingBuffer::open(&name, capacity).unwrap();
        let mut consumer = RingBuffer::open(&name, capacity).unwrap();

        let mut packet = Packet::new();
        packet.destination = 0xBEEF_CAFE;
        let mut out = Packet::new();

        group.bench_with_input(
            BenchmarkId::from_parameter(capacity),
            &capacity,
            |b, _| {
                b.iter(|| {
                    assert!(producer.send(black_box(&packet)));
                    assert!(consumer.recv(&mut out));
                    black_box(out.destination)
                });
            },
        );
        RingBuffer::delete(&name).unwrap();
    }

    group.finish();
}

fn bench_transaction_round_trip(c: &mut Criterion) {
    let mut group = c.benchmark_group("transaction_round_trip");

    for nbytes in [32usize, 128, 1024] {
        let name = scratch_queue(&format!("xact{}", nbytes));
        let _ = RingBuffer::delete(&name);
        let mut tx =
            TxEndpoint::open(&EndpointConfig::new(&name).capacity(256).fresh(true)).unwrap();
        let mut rx = RxEndpoint::open(&EndpointConfig::new(&name).capacity(256)).unwrap();

        let mut rng = rand::rngs::StdRng::seed_from_u64(0x5eed);
        let payload: Vec<u8> = (0..nbytes).map(|_| rng.gen()).collect();
        let txn = Transaction::posted_write(0x8000, 2, payload);
        let mut received = Transaction::invalid();

        group.bench_with_input(BenchmarkId::from_parameter(nbytes), &nbytes, |b, _| {
            b.iter(|| {
                assert!(send_transaction(&txn, &mut tx, false).unwrap());
                assert!(recv_transaction(&mut received, &mut rx, false).unwrap());
                black_box(received.byte_len())
            });
        });
        RingBuffer::delete(&name).unwrap();
    }

    group.finish();
}

criterion_group!(benches, bench_send_recv, bench_transaction_round_trip);
criterion_main!(benches);
