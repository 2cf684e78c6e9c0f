/*!
 * Transaction Tests
 * Merge algebra, response validation, and property-based round trips
 */

use proptest::prelude::*;
use shmlink::{
    can_merge, merge, recv_transaction, send_transaction, EndpointConfig, Expected, LinkError,
    Opcode, Policy, ResponseChecker, RxEndpoint, Transaction, TxEndpoint,
};
use std::sync::atomic::{AtomicUsize, Ordering};

static QUEUE_SEQ: AtomicUsize = AtomicUsize::new(0);

/// Fresh queue under a scratch directory, unique per test case
fn scratch_queue() -> String {
    let seq = QUEUE_SEQ.fetch_add(1, Ordering::Relaxed);
    let dir = std::env::temp_dir().join(format!("shmlink-txn-{}", std::process::id()));
    let _ = std::fs::create_dir_all(&dir);
    dir.join(format!("q{}", seq)).to_string_lossy().into_owned()
}

fn open_pair(capacity: usize) -> (TxEndpoint, RxEndpoint) {
    let name = scratch_queue();
    let tx = TxEndpoint::open(&EndpointConfig::new(&name).capacity(capacity).fresh(true)).unwrap();
    let rx = RxEndpoint::open(&EndpointConfig::new(&name).capacity(capacity)).unwrap();
    (tx, rx)
}

/// Contiguous posted-write run with eom only on the final element
fn contiguous_run(base: u64, fills: &[u8]) -> Vec<Transaction> {
    let mut out = Vec::new();
    for (i, &fill) in fills.iter().enumerate() {
        let mut txn = Transaction::posted_write(base.wrapping_add(8 * i as u64), 0, vec![fill; 8]);
        txn.cmd = txn.cmd.with_eom(i == fills.len() - 1);
        out.push(txn);
    }
    out
}

#[test]
fn test_merge_associativity_on_contiguous_run() {
    let run = contiguous_run(0x4000, &[1, 2, 3]);

    // (A + B) + C
    let mut left = run[0].clone();
    merge(&mut left, &run[1]);
    merge(&mut left, &run[2]);

    // A + (B + C)
    let mut tail = run[1].clone();
    merge(&mut tail, &run[2]);
    let mut right = run[0].clone();
    merge(&mut right, &tail);

    assert_eq!(left, right);
    assert_eq!(left.byte_len(), 24);
    assert!(left.cmd.eom());
}

#[test]
fn test_merged_run_round_trips() {
    let run = contiguous_run(0x4000, &[0xA, 0xB, 0xC]);
    let mut merged = run[0].clone();
    merge(&mut merged, &run[1]);
    merge(&mut merged, &run[2]);

    let (mut tx, mut rx) = open_pair(16);
    assert!(send_transaction(&merged, &mut tx, false).unwrap());
    let mut received = Transaction::invalid();
    assert!(recv_transaction(&mut received, &mut rx, false).unwrap());
    assert_eq!(received, merged);
}

#[test]
fn test_response_mismatches_flagged_fatal_logged_warn() {
    let expected = Expected {
        opcode: Opcode::ReadResponse,
        size: 2,
        outstanding: 8,
        destination: 0x7000,
    };

    // wrong destination, wrong opcode, over-length: each flagged under Fatal
    let wrong_dest = Transaction::read_response(0x7004, 2, vec![0; 32]);
    let wrong_opcode = Transaction::write_response(0x7000);
    let over_length = Transaction::read_response(0x7000, 2, vec![0; 64]);

    let fatal = ResponseChecker::new(Policy::Fatal);
    for response in [&wrong_dest, &wrong_opcode, &over_length] {
        let err = fatal.check(response, &expected).unwrap_err();
        assert!(matches!(err, LinkError::ResponseMismatch(_)));
    }

    // under Warn the same traffic is only logged
    let warn = ResponseChecker::new(Policy::Warn);
    for response in [&wrong_dest, &wrong_opcode, &over_length] {
        warn.check(response, &expected).unwrap();
    }

    // a correct response passes both
    let good = Transaction::read_response(0x7000, 2, vec![0; 32]);
    fatal.check(&good, &expected).unwrap();
    warn.check(&good, &expected).unwrap();
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn prop_write_round_trip_is_bit_identical(
        destination in any::<u64>(),
        source in any::<u64>(),
        size in 0u8..=3,
        units in 1usize..=64,
        seed in any::<u8>(),
    ) {
        let nbytes = units << size;
        let data: Vec<u8> = (0..nbytes).map(|i| (i as u8).wrapping_mul(31).wrapping_add(seed)).collect();
        let sent = Transaction::write(destination, source, size, data);

        let (mut tx, mut rx) = open_pair(512);
        prop_assert!(send_transaction(&sent, &mut tx, false).unwrap());

        let mut received = Transaction::invalid();
        prop_assert!(recv_transaction(&mut received, &mut rx, false).unwrap());
        prop_assert_eq!(received.cmd.raw(), sent.cmd.raw());
        prop_assert_eq!(&received, &sent);
    }

    #[test]
    fn prop_contiguous_merge_preserves_payload(
        base in any::<u64>(),
        fills in proptest::collection::vec(any::<u8>(), 2..6),
    ) {
        let run = contiguous_run(base, &fills);
        let mut merged = run[0].clone();
        for next in &run[1..] {
            prop_assert!(can_merge(&merged, next));
            merge(&mut merged, next);
        }
        prop_assert_eq!(merged.byte_len(), fills.len() * 8);
        for (i, &fill) in fills.iter().enumerate() {
            prop_assert_eq!(&merged.data[i * 8..(i + 1) * 8], &[fill; 8][..]);
        }
        prop_assert!(merged.cmd.eom());
    }
}
