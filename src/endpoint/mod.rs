/*!
 * Endpoint Module
 * Transmit/receive wrappers over one ring buffer each, with blocking
 * retry, rate limiting, and cooperative interruption
 */

pub mod rate;
pub mod rx;
pub mod tx;
pub mod types;

// Re-export public API
pub use rate::RateLimiter;
pub use rx::RxEndpoint;
pub use tx::TxEndpoint;
pub use types::{EndpointConfig, InterruptCheck};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::packet::Packet;

    fn scratch_name(tag: &str) -> String {
        let dir = std::env::temp_dir().join(format!(
            "shmlink-endpoint-{}-{}",
            tag,
            std::process::id()
        ));
        let _ = std::fs::create_dir_all(&dir);
        dir.join("queue").to_string_lossy().into_owned()
    }

    #[test]
    fn test_tx_rx_round_trip() {
        let name = scratch_name("roundtrip");
        let mut tx = TxEndpoint::open(&EndpointConfig::new(&name).capacity(8).fresh(true)).unwrap();
        let mut rx = RxEndpoint::open(&EndpointConfig::new(&name).capacity(8)).unwrap();

        let mut packet = Packet::new();
        packet.destination = 0x1234_5678;
        packet.data[0] = 0xEE;
        assert!(tx.send(&packet));

        let mut out = Packet::new();
        assert!(rx.recv(&mut out));
        assert_eq!(out.destination, 0x1234_5678);
        assert_eq!(out.data[0], 0xEE);
        assert!(!rx.recv(&mut out));
    }

    #[test]
    fn test_fresh_discards_stale_queue() {
        let name = scratch_name("fresh");
        {
            let config = EndpointConfig::new(&name).capacity(4).fresh(true);
            let mut tx = TxEndpoint::open(&config).unwrap();
            assert!(tx.send(&Packet::new()));
        }
        // reopening fresh with different geometry must succeed and be empty
        let config = EndpointConfig::new(&name).capacity(8).fresh(true);
        let mut rx = RxEndpoint::open(&config).unwrap();
        let mut out = Packet::new();
        assert!(!rx.recv(&mut out));
    }

    #[test]
    fn test_interrupt_unwinds_blocking_recv() {
        let config = EndpointConfig::new(scratch_name("interrupt")).capacity(4).fresh(true);
        let mut rx = RxEndpoint::open(&config).unwrap();
        rx.set_interrupt_check(Box::new(|| true));

        let mut out = Packet::new();
        let err = rx.recv_blocking(&mut out).unwrap_err();
        assert!(matches!(err, crate::core::types::LinkError::Interrupted));
    }

    #[test]
    fn test_blocking_send_drains_through_consumer() {
        let config = EndpointConfig::new(scratch_name("drain")).capacity(4).fresh(true);
        let mut tx = TxEndpoint::open(&config).unwrap();
        let config_rx = EndpointConfig::new(tx.name()).capacity(4);
        let mut rx = RxEndpoint::open(&config_rx).unwrap();

        let consumer = std::thread::spawn(move || {
            let mut out = Packet::new();
            for _ in 0..16 {
                rx.recv_blocking(&mut out).unwrap();
            }
            out.data[0]
        });

        let mut packet = Packet::new();
        for i in 0..16u8 {
            packet.data[0] = i;
            tx.send_blocking(&packet).unwrap();
        }
        assert_eq!(consumer.join().unwrap(), 15);
    }
}
